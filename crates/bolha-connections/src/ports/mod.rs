//! Ports layer: the API this subsystem offers and the dependencies it needs.

pub mod inbound;
pub mod outbound;

pub use inbound::ConnectionApi;
pub use outbound::{CommitRequest, ConnectionNotifier, ConnectionStore, ProfileDirectory};
