//! Server configuration loaded from environment variables.
//!
//! Configuration is read once at startup and handed to the store, the address
//! gateway and the customer service by reference. Nothing reads the
//! environment after [`CrmConfig::from_env`] returns.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CRM_HOST` - Bind address (default: 127.0.0.1)
//! - `CRM_PORT` - Listen port (default: 3000)
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; without either an in-memory store is used)
//! - `CRM_COLLECTION` - Customer collection name (default: customers)
//! - `CRM_LIST_LIMIT` - Retrieval cap for full-collection scans (default: 10000)
//! - `CRM_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! ## Optional (address lookups)
//! - `GOOGLE_MAPS_API_KEY` - Geocoding API key; reverse lookup is disabled without it
//! - `ZIPCLOUD_API_URL` - Zip code search endpoint
//! - `GEOCODING_API_URL` - Geocoding endpoint
//! - `ADDRESS_LOOKUP_TIMEOUT_SECS` - Per-request timeout (default: 10)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Default zip code search endpoint.
pub const DEFAULT_ZIPCLOUD_API_URL: &str = "https://zipcloud.ibsnet.co.jp/api/search";
/// Default geocoding endpoint.
pub const DEFAULT_GEOCODING_API_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
/// Default customer collection.
pub const DEFAULT_COLLECTION: &str = "customers";
/// Default retrieval cap for full-collection scans.
pub const DEFAULT_LIST_LIMIT: usize = 10_000;

const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// CRM server configuration.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document store configuration
    pub store: StoreConfig,
    /// Address lookup configuration
    pub address: AddressConfig,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Document store configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct StoreConfig {
    /// `PostgreSQL` URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// Collection holding customer documents
    pub collection: String,
    /// Maximum number of documents fetched by a full-collection scan
    pub list_limit: usize,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("collection", &self.collection)
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            collection: DEFAULT_COLLECTION.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Address lookup configuration.
///
/// Implements `Debug` manually to redact the geocoding API key.
#[derive(Clone)]
pub struct AddressConfig {
    /// Zip code search endpoint (forward lookup)
    pub zipcloud_url: String,
    /// Geocoding endpoint (reverse lookup)
    pub geocoding_url: String,
    /// Geocoding API key; `None` disables reverse lookup
    pub google_maps_api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for AddressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressConfig")
            .field("zipcloud_url", &self.zipcloud_url)
            .field("geocoding_url", &self.geocoding_url)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            zipcloud_url: DEFAULT_ZIPCLOUD_API_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_API_URL.to_string(),
            google_maps_api_key: None,
            timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

impl CrmConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// geocoding key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("CRM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CRM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRM_PORT".to_string(), e.to_string()))?;

        let store = StoreConfig::from_env()?;
        let address = AddressConfig::from_env()?;

        let log_json = get_optional_env("CRM_LOG_JSON").is_some();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            store,
            address,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_optional_env("CRM_DATABASE_URL")
            .or_else(|| get_optional_env("DATABASE_URL"))
            .map(SecretString::from);
        let collection = get_env_or_default("CRM_COLLECTION", DEFAULT_COLLECTION);
        if collection.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_COLLECTION".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let list_limit = parse_optional("CRM_LIST_LIMIT", DEFAULT_LIST_LIMIT)?;
        if list_limit == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_LIST_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            collection,
            list_limit,
        })
    }
}

impl AddressConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let google_maps_api_key = match get_optional_env("GOOGLE_MAPS_API_KEY") {
            Some(key) => {
                validate_not_placeholder(&key, "GOOGLE_MAPS_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };
        let timeout_secs =
            parse_optional("ADDRESS_LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;

        Ok(Self {
            zipcloud_url: get_env_or_default("ZIPCLOUD_API_URL", DEFAULT_ZIPCLOUD_API_URL),
            geocoding_url: get_env_or_default("GEOCODING_API_URL", DEFAULT_GEOCODING_API_URL),
            google_maps_api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Whether reverse lookup has a credential to work with.
    #[must_use]
    pub const fn reverse_lookup_enabled(&self) -> bool {
        self.google_maps_api_key.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_optional<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Reject obvious placeholder values copied from `.env.example`.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
