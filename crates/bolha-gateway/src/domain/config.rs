//! Gateway configuration with validation.
//!
//! Loaded from an optional TOML file, then overridden by `BOLHA_*`
//! environment variables, then validated.

use bolha_connections::{CollisionPolicy, ConnectionPolicy};
use serde::{Deserialize, Serialize};
use shared_types::{UserId, UserProfile};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Caller identification
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Lifecycle engine tunables
    pub connections: ConnectionsConfig,
    /// Where relationship state lives
    pub storage: StorageConfig,
    /// Profiles known at startup
    pub profiles: Vec<ProfileSeed>,
    /// Log output
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Read the TOML file (if any), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `BOLHA_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BOLHA_HTTP_HOST") {
            self.http.host = parse_env("BOLHA_HTTP_HOST", &host)?;
        }
        if let Some(port) = lookup("BOLHA_HTTP_PORT") {
            self.http.port = parse_env("BOLHA_HTTP_PORT", &port)?;
        }
        if let Some(key) = lookup("BOLHA_API_KEY") {
            self.auth.api_key = if key.is_empty() { None } else { Some(key) };
        }
        if let Some(dir) = lookup("BOLHA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup("BOLHA_STORAGE") {
            self.storage.backend = match backend.trim() {
                "memory" => StorageBackend::Memory,
                "file" => StorageBackend::File,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "BOLHA_STORAGE",
                        value: backend,
                    })
                }
            };
        }
        if let Some(level) = lookup("BOLHA_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.http.max_body_bytes == 0 {
            return Err(ConfigError::InvalidLimit("max_body_bytes cannot be 0".into()));
        }
        if self.http.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("request_timeout cannot be 0".into()));
        }
        if self.auth.actor_header.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.actor_header cannot be empty".into()));
        }

        let c = &self.connections;
        if c.capacity == 0 {
            return Err(ConfigError::InvalidLimit("capacity cannot be 0".into()));
        }
        if c.max_retries == 0 {
            return Err(ConfigError::InvalidLimit("max_retries cannot be 0".into()));
        }
        if c.lock_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("lock_timeout cannot be 0".into()));
        }
        if c.max_backoff < c.retry_backoff {
            return Err(ConfigError::InvalidTimeout(
                "max_backoff must not be below retry_backoff".into(),
            ));
        }

        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.data_dir is required for the file backend".into(),
            ));
        }

        let mut seen = HashSet::new();
        for seed in &self.profiles {
            if seed.id == 0 {
                return Err(ConfigError::Invalid("profile id 0 is reserved".into()));
            }
            if !seen.insert(seed.id) {
                return Err(ConfigError::Invalid(format!(
                    "profile id {} listed twice",
                    seed.id
                )));
            }
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Lifecycle engine policy derived from the `connections` section.
    pub fn connection_policy(&self) -> ConnectionPolicy {
        let c = &self.connections;
        ConnectionPolicy {
            capacity: c.capacity,
            max_retries: c.max_retries,
            lock_timeout: c.lock_timeout,
            retry_backoff: c.retry_backoff,
            max_backoff: c.max_backoff,
            collision_policy: c.collision_policy,
        }
    }

    /// Seed profiles. Ids were checked by [`validate`](Self::validate);
    /// any invalid entry left is skipped.
    pub fn seed_profiles(&self) -> Vec<UserProfile> {
        self.profiles
            .iter()
            .filter_map(|seed| {
                let id = UserId::new(seed.id).ok()?;
                let profile = UserProfile::new(id, seed.display_name.clone());
                Some(match &seed.avatar_url {
                    Some(url) => profile.with_avatar(url.clone()),
                    None => profile,
                })
            })
            .collect()
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Whole-request deadline
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Caller identification.
///
/// Sessions are handled by the fronting auth proxy, which forwards the
/// authenticated account id in `actor_header`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying the authenticated account id
    pub actor_header: String,
    /// Shared secret the proxy must present (None = not checked)
    pub api_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            actor_header: "x-actor-id".to_string(),
            api_key: None,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins (* for any)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Headers exposed to the browser
    pub expose_headers: Vec<String>,
    /// Preflight cache duration in seconds
    pub max_age: u64,
    /// Allow credentials
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec![
                "content-type".to_string(),
                "authorization".to_string(),
                "x-api-key".to_string(),
                "x-actor-id".to_string(),
            ],
            expose_headers: vec![],
            max_age: 3600,
            allow_credentials: false,
        }
    }
}

/// Lifecycle engine tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionsConfig {
    /// Connection ceiling per account
    pub capacity: usize,
    /// Compare-and-swap attempts per operation
    pub max_retries: u32,
    /// Bound on waiting for a pair lock
    #[serde(with = "humantime_serde")]
    pub lock_timeout: Duration,
    /// First retry delay, doubled per attempt
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
    /// Cap on one retry delay
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
    /// Handling of crossed proposals
    pub collision_policy: CollisionPolicy,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        let policy = ConnectionPolicy::default();
        Self {
            capacity: policy.capacity,
            max_retries: policy.max_retries,
            lock_timeout: policy.lock_timeout,
            retry_backoff: policy.retry_backoff,
            max_backoff: policy.max_backoff,
            collision_policy: policy.collision_policy,
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Volatile, for development and tests
    #[default]
    Memory,
    /// JSON snapshot in `data_dir`
    File,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// A profile known at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSeed {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },
    /// Config file is not valid TOML for this schema
    #[error("cannot parse config: {0}")]
    Parse(String),
    /// Environment override could not be parsed
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    /// Port 0 is not a usable listen port
    #[error("http.port cannot be 0")]
    InvalidPort,
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations as `"250ms"`, `"10s"`, `"2m"` or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m": both are suffixes of it.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.auth.actor_header, "x-actor-id");
        assert_eq!(config.connection_policy(), ConnectionPolicy::default());
    }

    #[test]
    fn test_parse_durations() {
        use humantime_serde::parse_duration;
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = GatewayConfig::from_toml(
            r#"
            [http]
            port = 9000

            [connections]
            capacity = 5
            lock_timeout = "500ms"
            collision_policy = "report"

            [storage]
            backend = "file"
            data_dir = "/var/lib/bolha"

            [[profiles]]
            id = 1
            display_name = "Ana"
            avatar_url = "https://cdn.example/ana.png"

            [[profiles]]
            id = 2
            display_name = "Rui"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.max_body_bytes, 16 * 1024);
        let policy = config.connection_policy();
        assert_eq!(policy.capacity, 5);
        assert_eq!(policy.lock_timeout, Duration::from_millis(500));
        assert_eq!(policy.collision_policy, CollisionPolicy::Report);
        assert_eq!(config.storage.backend, StorageBackend::File);

        let seeds = config.seed_profiles();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].avatar_url.as_deref(), Some("https://cdn.example/ana.png"));
        assert!(seeds[1].avatar_url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BOLHA_HTTP_PORT", "9100"),
            ("BOLHA_API_KEY", "proxy-secret"),
            ("BOLHA_STORAGE", "file"),
            ("BOLHA_DATA_DIR", "/tmp/bolha"),
            ("BOLHA_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.http.port, 9100);
        assert_eq!(config.auth.api_key.as_deref(), Some("proxy-secret"));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/bolha"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = GatewayConfig::default();
        let err = config
            .apply_env(|k| (k == "BOLHA_HTTP_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "BOLHA_HTTP_PORT", .. }));
    }

    #[test]
    fn test_validation_rejects() {
        let mut config = GatewayConfig::default();
        config.connections.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = GatewayConfig::default();
        config.http.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort));

        let mut config = GatewayConfig::default();
        config.connections.lock_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout(_))));

        let mut config = GatewayConfig::default();
        config.profiles = vec![
            ProfileSeed {
                id: 3,
                display_name: "a".into(),
                avatar_url: None,
            },
            ProfileSeed {
                id: 3,
                display_name: "b".into(),
                avatar_url: None,
            },
        ];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GatewayConfig::default();
        config.storage.backend = StorageBackend::File;
        config.storage.data_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
