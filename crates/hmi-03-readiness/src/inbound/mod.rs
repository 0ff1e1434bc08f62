//! Commands built from messages the HMI sends.

pub mod notification;
pub mod response;

pub use notification::HmiNotificationCommand;
pub use response::HmiResponseCommand;
