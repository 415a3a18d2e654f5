//! # Connection Events
//!
//! Every event that flows through the bus. Each one records a committed
//! transition of the mutual connection graph; nothing is published for
//! rejected or idempotent operations.

use serde::{Deserialize, Serialize};
use shared_types::UserId;

/// All events that can be published to the event bus.
///
/// Field names follow the hook contract consumed by the external notifier:
/// the party who acted and the party who is told about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionEvent {
    // =========================================================================
    // REQUESTS
    // =========================================================================
    /// `proposer` asked `target` to connect.
    ConnectionRequested {
        /// Account that sent the request.
        proposer: UserId,
        /// Account that received it.
        target: UserId,
    },

    /// `target` declined the request sent by `proposer`.
    ConnectionRejected {
        /// Account that declined.
        target: UserId,
        /// Account whose request was declined.
        proposer: UserId,
    },

    /// `proposer` withdrew a request before `target` answered.
    RequestCancelled {
        /// Account that withdrew.
        proposer: UserId,
        /// Account the request was addressed to.
        target: UserId,
    },

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================
    /// `a` and `b` are now connected. `a` is the account whose action
    /// completed the connection.
    ConnectionAccepted {
        /// Account that accepted.
        a: UserId,
        /// The other party.
        b: UserId,
    },

    /// `a` removed `b` from their connections.
    ConnectionRemoved {
        /// Account that removed.
        a: UserId,
        /// The removed peer.
        b: UserId,
    },
}

impl ConnectionEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ConnectionRequested { .. }
            | Self::ConnectionRejected { .. }
            | Self::RequestCancelled { .. } => EventTopic::Requests,
            Self::ConnectionAccepted { .. } | Self::ConnectionRemoved { .. } => {
                EventTopic::Membership
            }
        }
    }

    /// The two accounts involved, acting party first.
    #[must_use]
    pub fn participants(&self) -> (UserId, UserId) {
        match *self {
            Self::ConnectionRequested { proposer, target }
            | Self::RequestCancelled { proposer, target } => (proposer, target),
            Self::ConnectionRejected { target, proposer } => (target, proposer),
            Self::ConnectionAccepted { a, b } | Self::ConnectionRemoved { a, b } => (a, b),
        }
    }

    /// Whether `user` is one of the two parties.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        let (first, second) = self.participants();
        first == user || second == user
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectionRequested { .. } => "connection_requested",
            Self::ConnectionRejected { .. } => "connection_rejected",
            Self::RequestCancelled { .. } => "request_cancelled",
            Self::ConnectionAccepted { .. } => "connection_accepted",
            Self::ConnectionRemoved { .. } => "connection_removed",
        }
    }
}

/// Event topics for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Pending request lifecycle (requested, rejected, cancelled).
    Requests,
    /// Accepted connections (accepted, removed).
    Membership,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Accounts of interest. Empty means every account.
    pub users: Vec<UserId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            users: Vec::new(),
        }
    }

    /// Create a filter for events involving a single account.
    #[must_use]
    pub fn for_user(user: UserId) -> Self {
        Self {
            topics: Vec::new(),
            users: vec![user],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ConnectionEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let user_match = self.users.is_empty() || self.users.iter().any(|u| event.involves(*u));

        topic_match && user_match
    }
}
