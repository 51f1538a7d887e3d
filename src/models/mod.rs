pub mod email;
pub mod provider;
pub mod response;
pub mod sms;

pub use email::{EmailRequest, TemplateRef};
pub use provider::{EmailProviderId, SmsProviderId};
pub use response::{CommResponse, ErrorKind};
pub use sms::SmsRequest;
