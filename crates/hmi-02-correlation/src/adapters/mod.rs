//! # Adapters Module
//!
//! Timer and transport implementations.

pub mod channel;
pub mod manual_timer;
#[cfg(any(test, feature = "test-utils"))]
pub mod recording;
pub mod tokio_timer;

pub use channel::{transport_channel, ChannelReceiver, ChannelTransport};
pub use manual_timer::ManualTimer;
#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingTransport;
pub use tokio_timer::TokioTimerService;
