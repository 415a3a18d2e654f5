//! # Shared Types Crate
//!
//! Types shared by every Bolha crate: account identity and the minimal
//! profile shape handed to presentation layers.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-crate types are defined here only.
//! - **Valid by Construction**: a `UserId` can never hold the reserved zero value,
//!   including when deserialized from JSON.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
