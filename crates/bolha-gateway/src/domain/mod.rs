//! Gateway configuration and error types.

pub mod config;
pub mod error;

pub use config::{
    AuthConfig, ConfigError, ConnectionsConfig, CorsConfig, GatewayConfig, HttpConfig,
    LoggingConfig, ProfileSeed, StorageBackend, StorageConfig,
};
pub use error::{ApiError, ErrorBody, GatewayError};
