use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DispatchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SmsProviderId {
    #[serde(rename = "TWILIO")]
    Twilio,
    #[serde(rename = "INFOBIP_SMS")]
    Infobip,
}

impl SmsProviderId {
    pub const DEFAULT: SmsProviderId = SmsProviderId::Twilio;

    pub fn as_str(&self) -> &'static str {
        match self {
            SmsProviderId::Twilio => "TWILIO",
            SmsProviderId::Infobip => "INFOBIP_SMS",
        }
    }
}

impl fmt::Display for SmsProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmsProviderId {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TWILIO" => Ok(SmsProviderId::Twilio),
            "INFOBIP_SMS" => Ok(SmsProviderId::Infobip),
            _ => Err(DispatchError::UnknownProvider(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailProviderId {
    #[serde(rename = "SENDGRID")]
    SendGrid,
}

impl EmailProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProviderId::SendGrid => "SENDGRID",
        }
    }
}

impl fmt::Display for EmailProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailProviderId {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SENDGRID" => Ok(EmailProviderId::SendGrid),
            _ => Err(DispatchError::UnknownProvider(s.to_string())),
        }
    }
}
