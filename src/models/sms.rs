use serde::{Deserialize, Serialize};

use crate::errors::AdapterError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub to: String,
    pub body: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl SmsRequest {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            sender_id: None,
            correlation_id: None,
        }
    }

    pub fn with_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Pre-flight check shared by every SMS adapter. Number format is left to the provider.
    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.to.trim().is_empty() {
            return Err(AdapterError::MalformedRequest("recipient is empty".into()));
        }
        if self.body.trim().is_empty() {
            return Err(AdapterError::MalformedRequest("message body is empty".into()));
        }
        Ok(())
    }
}
