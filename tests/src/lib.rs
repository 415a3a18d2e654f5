//! # Bolha Test Suite
//!
//! Cross-crate tests that need more than one crate wired together.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # lifecycle + event bus + durable store
//!     ├── concurrency.rs  # racing requests on a multi-thread runtime
//!     └── http.rs         # gateway service end to end
//! ```
//!
//! ```bash
//! cargo test -p bolha-tests
//! cargo test -p bolha-tests integration::concurrency::
//! ```

pub mod integration;
