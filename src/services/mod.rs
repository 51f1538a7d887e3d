pub mod communication;
pub mod email;
pub mod messaging;
pub mod upstream;

pub use communication::CommunicationService;
