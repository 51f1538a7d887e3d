use std::env;

use secrecy::SecretString;

use crate::services::email::sendgrid::SENDGRID_API_BASE;
use crate::services::messaging::infobip::INFOBIP_API_BASE;
use crate::services::messaging::twilio::TWILIO_API_BASE;

#[derive(Debug)]
pub struct AppConfig {
    pub port: u16,
    pub default_sms_provider: String,
    pub http_timeout_secs: u64,
    /// Externally visible origin, used to rebuild webhook URLs for signature checks.
    pub public_base_url: Option<String>,
    pub twilio_account_sid: String,
    pub twilio_auth_token: SecretString,
    pub twilio_phone_number: String,
    pub twilio_base_url: String,
    pub infobip_api_key: SecretString,
    pub infobip_sender: String,
    pub infobip_base_url: String,
    pub sendgrid_api_key: SecretString,
    pub sendgrid_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            default_sms_provider: env::var("DEFAULT_SMS_PROVIDER")
                .unwrap_or_else(|_| "TWILIO".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            public_base_url: env::var("PUBLIC_BASE_URL").ok().filter(|v| !v.is_empty()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: secret_var("TWILIO_AUTH_TOKEN"),
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            twilio_base_url: env::var("TWILIO_BASE_URL")
                .unwrap_or_else(|_| TWILIO_API_BASE.to_string()),
            infobip_api_key: secret_var("INFOBIP_API_KEY"),
            infobip_sender: env::var("INFOBIP_SENDER").unwrap_or_else(|_| "InfoSMS".to_string()),
            infobip_base_url: env::var("INFOBIP_BASE_URL")
                .unwrap_or_else(|_| INFOBIP_API_BASE.to_string()),
            sendgrid_api_key: secret_var("SENDGRID_API_KEY"),
            sendgrid_base_url: env::var("SENDGRID_BASE_URL")
                .unwrap_or_else(|_| SENDGRID_API_BASE.to_string()),
        }
    }
}

fn secret_var(key: &str) -> SecretString {
    SecretString::from(env::var(key).unwrap_or_default())
}
