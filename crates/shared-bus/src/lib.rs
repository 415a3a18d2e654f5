//! # Shared Bus - Event Bus for Connection Notifications
//!
//! Carries committed connection-graph transitions from the lifecycle engine
//! to whoever delivers notifications (push, email, activity feed).
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────────┐
//! │ Lifecycle engine │                    │ Notifier / feed  │
//! │                  │    publish()       │                  │
//! │                  │ ──────┐            │                  │
//! └──────────────────┘       │            └──────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │          │
//!                      │              │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Fire-and-forget: publishing never blocks and never fails the caller.
//! - Subscribers that fall behind skip the overflowed events (logged at `debug`).

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ConnectionEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
