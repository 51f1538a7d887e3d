pub mod infobip;
pub mod registry;
pub mod twilio;

use async_trait::async_trait;

use crate::models::{CommResponse, SmsProviderId, SmsRequest};

pub use registry::SmsAdapterRegistry;

/// One SMS gateway. Implementations never fail outward: every outcome,
/// including transport errors, is folded into a [`CommResponse`].
#[async_trait]
pub trait SmsAdapter: Send + Sync {
    fn provider(&self) -> SmsProviderId;

    async fn send(&self, request: &SmsRequest) -> CommResponse;

    /// Parses a delivery-status webhook body. Must not perform I/O.
    fn parse(&self, raw: &str) -> CommResponse;
}
