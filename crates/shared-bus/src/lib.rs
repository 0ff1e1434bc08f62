//! # Shared Bus - Notification Bus for HMI State Changes
//!
//! Components that own HMI-facing state publish transitions here; anything
//! that gates traffic on that state subscribes instead of polling.
//!
//! ```text
//! ┌──────────────────────┐                    ┌──────────────────────┐
//! │ InterfaceStateTable  │    publish()       │ request gating,      │
//! │ capability store     │ ──────┐            │ app-facing surfaces  │
//! └──────────────────────┘       │            └──────────────────────┘
//!                                ▼                       ↑
//!                          ┌──────────────┐              │
//!                          │  Event Bus   │ ─────────────┘
//!                          └──────────────┘  subscribe()
//! ```
//!
//! Publishing never blocks: a slow subscriber lags and skips, it never holds
//! up the engine loop that produced the notification.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, HmiBusEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum notifications to buffer per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
