//! Bolha gateway - HTTP JSON surface of the mutual connection subsystem.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       bolha-gateway                         │
//! ├────────────────────────────────────────────────────────────┤
//! │  Tracing → CORS → Auth (API key) → Timeout → Body limit     │
//! │                         │                                   │
//! │  ┌──────────────────────┴──────────────────────────┐        │
//! │  │  rest::connections  (Actor + JsonBody extractors) │        │
//! │  └──────────────────────┬──────────────────────────┘        │
//! └─────────────────────────┼───────────────────────────────────┘
//!                           │ Arc<dyn ConnectionApi>
//!                           ▼
//!                   bolha-connections ──► shared-bus (events)
//! ```
//!
//! # Routes
//!
//! | Method | Path | Body | Success |
//! |--------|------|------|---------|
//! | POST | `/connections/request` | `{targetId}` | `{status: requested \| already_requested \| reciprocal_pending \| connected}` |
//! | POST | `/connections/accept` | `{proposerId}` | `{status: "connected"}` |
//! | POST | `/connections/reject` | `{proposerId}` | `{status: "rejected"}` |
//! | POST | `/connections/cancel` | `{targetId}` | `{status: "cancelled"}` |
//! | POST | `/connections/remove` | `{peerId}` | `{status: "removed"}` |
//! | GET | `/connections` | - | `{data: [profile]}` |
//! | GET | `/connections/pending` | - | `{data: {incoming, outgoing}}` |
//! | GET | `/connections/status/:peer_id` | - | `{status, aAtCapacity, bAtCapacity}` |
//! | GET | `/health` | - | `{status: "ok"}` |
//!
//! Errors are `{error, message}`; see [`domain::error`] for the status mapping.
//!
//! # Authentication
//!
//! Sessions are terminated by a fronting proxy which forwards the account id
//! in the actor header (`x-actor-id` by default). When `auth.api_key` is set,
//! the proxy must also present it as `Authorization: Bearer` or `x-api-key`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod domain;
pub mod logging;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod service;

pub use domain::{ApiError, ConfigError, GatewayConfig, GatewayError};
pub use logging::init_logging;
pub use router::{build_router, AppState};
pub use service::{GatewayConnections, GatewayService};
