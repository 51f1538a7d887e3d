pub mod sendgrid;

use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::models::{CommResponse, EmailProviderId, EmailRequest};

/// Native result of an email send, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct EmailDelivery {
    pub status_code: u16,
    pub message_id: Option<String>,
    pub body: String,
}

/// Sending and normalizing are separate so the mapping can be tested without
/// reaching the provider.
#[async_trait]
pub trait EmailAdapter: Send + Sync {
    fn provider(&self) -> EmailProviderId;

    async fn send(&self, request: &EmailRequest) -> Result<EmailDelivery, AdapterError>;

    fn normalize(&self, delivery: EmailDelivery, request: &EmailRequest) -> CommResponse;

    fn parse(&self, raw: &str) -> CommResponse;
}
