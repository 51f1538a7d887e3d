use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{CommResponse, EmailProviderId, EmailRequest, SmsProviderId, SmsRequest};
use crate::services::email::sendgrid::SendGridEmailAdapter;
use crate::services::email::EmailAdapter;
use crate::services::messaging::infobip::InfobipSmsAdapter;
use crate::services::messaging::twilio::TwilioSmsAdapter;
use crate::services::messaging::SmsAdapterRegistry;

/// Routes SMS and email traffic to provider adapters. Performs no I/O itself.
#[derive(Clone)]
pub struct CommunicationService {
    registry: Arc<SmsAdapterRegistry>,
    email: Arc<dyn EmailAdapter>,
    default_sms_provider: SmsProviderId,
}

impl CommunicationService {
    pub fn new(
        registry: SmsAdapterRegistry,
        email: Arc<dyn EmailAdapter>,
        default_sms_provider: SmsProviderId,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            email,
            default_sms_provider,
        }
    }

    /// Wires the real provider adapters from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        let twilio = TwilioSmsAdapter::new(
            config.twilio_account_sid.clone(),
            SecretString::from(config.twilio_auth_token.expose_secret()),
            config.twilio_phone_number.clone(),
            client.clone(),
        )
        .with_base_url(config.twilio_base_url.clone());

        let mut registry = SmsAdapterRegistry::new().register(Arc::new(twilio));

        if config.infobip_api_key.expose_secret().is_empty() {
            tracing::info!("INFOBIP_API_KEY not set, Infobip SMS disabled");
        } else {
            let infobip = InfobipSmsAdapter::new(
                SecretString::from(config.infobip_api_key.expose_secret()),
                config.infobip_sender.clone(),
                client.clone(),
            )
            .with_base_url(config.infobip_base_url.clone());
            registry = registry.register(Arc::new(infobip));
        }

        let default_sms_provider: SmsProviderId = config
            .default_sms_provider
            .parse()
            .map_err(|e| AppError::Config(format!("DEFAULT_SMS_PROVIDER: {e}")))?;
        if !registry.contains(default_sms_provider) {
            return Err(AppError::Config(format!(
                "default SMS provider {default_sms_provider} is not configured"
            )));
        }

        let sendgrid = SendGridEmailAdapter::new(
            SecretString::from(config.sendgrid_api_key.expose_secret()),
            client,
        )
        .with_base_url(config.sendgrid_base_url.clone());

        tracing::info!(
            sms_providers = ?registry.providers(),
            default = %default_sms_provider,
            "communication service ready"
        );

        Ok(Self::new(registry, Arc::new(sendgrid), default_sms_provider))
    }

    pub fn default_sms_provider(&self) -> SmsProviderId {
        self.default_sms_provider
    }

    pub fn sms_providers(&self) -> Vec<SmsProviderId> {
        self.registry.providers()
    }

    pub async fn send_message(&self, request: &SmsRequest) -> CommResponse {
        let provider = self.select_sms_provider();
        self.send_message_via(request, provider.as_str()).await
    }

    pub async fn send_message_via(&self, request: &SmsRequest, provider_id: &str) -> CommResponse {
        let adapter = match self.registry.get(provider_id) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::warn!(provider = provider_id, error = %e, "SMS provider lookup failed");
                return CommResponse::unknown_provider(provider_id)
                    .with_correlation_id(request.correlation_id.clone());
            }
        };

        let response = adapter.send(request).await;
        log_outcome("sms send", &response);
        response
    }

    /// Parses an SMS delivery callback. Callers decide whether to run this off the request task.
    pub fn process_response(&self, raw: &str, provider_id: &str) -> CommResponse {
        let adapter = match self.registry.get(provider_id) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::warn!(provider = provider_id, error = %e, "SMS provider lookup failed");
                return CommResponse::unknown_provider(provider_id);
            }
        };

        let response = adapter.parse(raw);
        log_outcome("sms callback", &response);
        response
    }

    pub async fn send_email(&self, request: &EmailRequest) -> CommResponse {
        let response = match self.email.send(request).await {
            Ok(delivery) => self.email.normalize(delivery, request),
            Err(e) => CommResponse::from_adapter_error(self.email.provider().as_str(), &e)
                .with_correlation_id(request.correlation_id.clone()),
        };
        log_outcome("email send", &response);
        response
    }

    /// Only one email provider exists, so `_provider` is not consulted.
    pub fn process_sendgrid_response(&self, raw: &str, _provider: EmailProviderId) -> CommResponse {
        let response = self.email.parse(raw);
        log_outcome("email callback", &response);
        response
    }

    fn select_sms_provider(&self) -> SmsProviderId {
        self.default_sms_provider
    }
}

fn log_outcome(operation: &str, response: &CommResponse) {
    if response.is_ok() {
        tracing::info!(
            provider = response.provider(),
            status = response.status_code(),
            message_id = response.provider_message_id(),
            correlation_id = response.correlation_id(),
            "{operation} succeeded"
        );
    } else {
        tracing::warn!(
            provider = response.provider(),
            status = response.status_code(),
            error_kind = ?response.error_kind(),
            detail = response.detail(),
            correlation_id = response.correlation_id(),
            "{operation} failed"
        );
    }
}
