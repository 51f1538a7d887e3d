use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AdapterError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnknownProvider,
    Transport,
    Upstream,
    MalformedRequest,
    MalformedCallback,
}

/// Uniform outcome of every send and callback parse.
///
/// Fields are private so that `ok` and `error_kind` can only be set together:
/// a response built with [`CommResponse::success`] never carries an error kind
/// and one built with [`CommResponse::failure`] always does.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommResponse {
    ok: bool,
    provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_message_id: Option<String>,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl CommResponse {
    pub fn success(provider: impl Into<String>, status_code: u16) -> Self {
        Self::new(provider.into(), status_code, None)
    }

    pub fn failure(provider: impl Into<String>, kind: ErrorKind, status_code: u16) -> Self {
        Self::new(provider.into(), status_code, Some(kind))
    }

    pub fn unknown_provider(provider: &str) -> Self {
        Self::failure(provider, ErrorKind::UnknownProvider, 0)
            .with_detail(format!("no adapter registered for {provider}"))
    }

    pub fn malformed_callback(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::failure(provider, ErrorKind::MalformedCallback, 0).with_detail(detail)
    }

    /// Failure raised before the upstream produced a status.
    pub fn from_adapter_error(provider: impl Into<String>, error: &AdapterError) -> Self {
        Self::failure(provider, error.kind(), 0).with_detail(error.to_string())
    }

    fn new(provider: String, status_code: u16, error_kind: Option<ErrorKind>) -> Self {
        Self {
            ok: error_kind.is_none(),
            provider,
            provider_message_id: None,
            status_code,
            error_kind,
            raw_payload: None,
            correlation_id: None,
            delivery_status: None,
            detail: None,
        }
    }

    pub fn with_message_id(mut self, message_id: Option<String>) -> Self {
        self.provider_message_id = message_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_raw_payload(mut self, payload: Value) -> Self {
        if !payload.is_null() {
            self.raw_payload = Some(payload);
        }
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_delivery_status(mut self, status: impl Into<String>) -> Self {
        self.delivery_status = Some(status.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn provider_message_id(&self) -> Option<&str> {
        self.provider_message_id.as_deref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn raw_payload(&self) -> Option<&Value> {
        self.raw_payload.as_ref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn delivery_status(&self) -> Option<&str> {
        self.delivery_status.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
