//! Domain layer: relationship state, transition rules and errors.

pub mod capacity;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod transitions;
pub mod value_objects;

pub use capacity::CapacityEnforcer;
pub use entities::{StateVersion, UserConnectionState, VersionedState, MAX_CONNECTIONS};
pub use errors::{ConnectionError, ErrorKind, Side, StoreError};
pub use invariants::{check_graph, check_pair, InvariantViolation};
pub use transitions::{
    plan_accept, plan_cancel, plan_propose, plan_reject, plan_remove, Pair, Plan,
};
pub use value_objects::{
    CollisionPolicy, ConnectionPolicy, PendingRequests, ProposeOutcome, RelationshipStatus,
    StatusReport,
};
