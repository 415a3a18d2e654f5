//! # Bolha Mutual Connections
//!
//! Reciprocal, capacity-bounded relationship graph between user accounts,
//! driven by a request → accept / reject / cancel protocol.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Symmetric acceptance | `domain/transitions.rs` writes both sides; `domain/invariants.rs::check_pair` before commit |
//! | Symmetric pending | same as above |
//! | One relation per ordered pair | `UserConnectionState::forget` before every insert into `accepted` |
//! | No self-reference | `ConnectionService::check_parties` rejects `actor == peer` |
//! | At most `capacity` accepted | `domain/capacity.rs::CapacityEnforcer::check`, re-run on every attempt |
//! | Sets, not sequences | `BTreeSet` fields |
//!
//! ## Lifecycle
//!
//! ```text
//! [None] ──propose──→ [Outgoing/Incoming] ──accept──→ [Connected]
//!   ↑                         │                           │
//!   └──── reject / cancel ────┘                           │
//!   └────────────────────────── remove ───────────────────┘
//! ```
//!
//! A `propose` that crosses an earlier request from the other side resolves
//! to `Connected` under [`CollisionPolicy::AutoAccept`] (the default).
//!
//! ## Concurrency
//!
//! | Concern | Mechanism |
//! |---------|-----------|
//! | Two records change together | `ConnectionStore::commit_pair` (both CAS or neither) |
//! | Opposite-direction races | per-user locks acquired in ascending id order |
//! | Bounded waiting | `lock_timeout` → `ConnectionError::Timeout` |
//! | Lost updates | version conflict → reload, re-plan, retry with backoff |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `ConnectionStore` | Versioned per-user state |
//! | `ProfileDirectory` | Existence checks and minimal profiles |
//! | `ConnectionNotifier` | Fire-and-forget transition hook |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{
    BusNotifier, FileConnectionStore, InMemoryConnectionStore, InMemoryProfileDirectory,
    NoopNotifier,
};
pub use domain::{
    CollisionPolicy, ConnectionError, ConnectionPolicy, ErrorKind, PendingRequests,
    ProposeOutcome, RelationshipStatus, Side, StatusReport, StoreError, UserConnectionState,
    MAX_CONNECTIONS,
};
pub use ports::{ConnectionApi, ConnectionNotifier, ConnectionStore, ProfileDirectory};
pub use service::{ConnectionDependencies, ConnectionService};
