use crate::config::AppConfig;
use crate::services::CommunicationService;

pub struct AppState {
    pub config: AppConfig,
    pub comms: CommunicationService,
}
