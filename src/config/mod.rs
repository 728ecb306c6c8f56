//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `PAIRSCORE_*` environment variables.
//! `PORT`, `PYTHON_URL`/`PYTHON_PORT`, `GOOGLE_CLOUD_PROJECT` and
//! `FIRESTORE_EMULATOR_HOST` are honoured as fallbacks.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{CURATED_COLLECTION, OPPORTUNISTIC_COLLECTION};
use crate::store::firestore::{DEFAULT_FIRESTORE_DATABASE, DEFAULT_FIRESTORE_ENDPOINT};

/// Which document-store backend serves the two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// In-process collections, optionally seeded from a file.
    #[default]
    Memory,
    /// Firestore REST API.
    Firestore,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Scoring engine endpoint. Default: `http://127.0.0.1:5000`.
    pub engine_url: String,

    /// Bound on one engine call. Default: 30 s.
    pub engine_timeout: Duration,

    /// Coalesce concurrent engine calls for the same pair. Default: `true`.
    pub single_flight: bool,

    /// Store backend. Default: [`StoreBackend::Memory`].
    pub store_backend: StoreBackend,

    /// Firestore project ID (required for the Firestore backend).
    pub firestore_project: Option<String>,

    /// Firestore database ID. Default: `(default)`.
    pub firestore_database: String,

    /// Firestore REST endpoint.
    pub firestore_endpoint: String,

    /// Fixed bearer token. When unset, tokens come from the metadata server
    /// (or no token is sent to an emulator).
    pub firestore_token: Option<String>,

    /// `true` when the endpoint came from `FIRESTORE_EMULATOR_HOST`.
    pub firestore_emulator: bool,

    /// Curated tier collection. Default: `train-pairs`.
    pub curated_collection: String,

    /// Opportunistic tier collection. Default: `new-pairs`.
    pub opportunistic_collection: String,

    /// JSON seed file for the memory backend.
    pub seed_path: Option<PathBuf>,

    /// Directory of static frontend assets served on unmatched routes.
    pub static_dir: Option<PathBuf>,
}

/// Default engine URL used when nothing else is configured.
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:5000";

/// Default engine timeout in seconds.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 30;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            engine_timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
            single_flight: true,
            store_backend: StoreBackend::default(),
            firestore_project: None,
            firestore_database: DEFAULT_FIRESTORE_DATABASE.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            firestore_token: None,
            firestore_emulator: false,
            curated_collection: CURATED_COLLECTION.to_string(),
            opportunistic_collection: OPPORTUNISTIC_COLLECTION.to_string(),
            seed_path: None,
            static_dir: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "PAIRSCORE_PORT";
    const ENV_PORT_FALLBACK: &'static str = "PORT";
    const ENV_BIND_ADDR: &'static str = "PAIRSCORE_BIND_ADDR";
    const ENV_ENGINE_URL: &'static str = "PAIRSCORE_ENGINE_URL";
    const ENV_PYTHON_URL: &'static str = "PYTHON_URL";
    const ENV_PYTHON_PORT: &'static str = "PYTHON_PORT";
    const ENV_ENGINE_TIMEOUT_SECS: &'static str = "PAIRSCORE_ENGINE_TIMEOUT_SECS";
    const ENV_SINGLE_FLIGHT: &'static str = "PAIRSCORE_SINGLE_FLIGHT";
    const ENV_STORE: &'static str = "PAIRSCORE_STORE";
    const ENV_FIRESTORE_PROJECT: &'static str = "PAIRSCORE_FIRESTORE_PROJECT";
    const ENV_GOOGLE_CLOUD_PROJECT: &'static str = "GOOGLE_CLOUD_PROJECT";
    const ENV_FIRESTORE_DATABASE: &'static str = "PAIRSCORE_FIRESTORE_DATABASE";
    const ENV_FIRESTORE_ENDPOINT: &'static str = "PAIRSCORE_FIRESTORE_ENDPOINT";
    const ENV_FIRESTORE_EMULATOR_HOST: &'static str = "FIRESTORE_EMULATOR_HOST";
    const ENV_FIRESTORE_TOKEN: &'static str = "PAIRSCORE_FIRESTORE_TOKEN";
    const ENV_CURATED_COLLECTION: &'static str = "PAIRSCORE_CURATED_COLLECTION";
    const ENV_OPPORTUNISTIC_COLLECTION: &'static str = "PAIRSCORE_OPPORTUNISTIC_COLLECTION";
    const ENV_SEED_PATH: &'static str = "PAIRSCORE_SEED_PATH";
    const ENV_STATIC_DIR: &'static str = "PAIRSCORE_STATIC_DIR";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let engine_url = Self::parse_engine_url_from_env(defaults.engine_url);
        let engine_timeout = Self::parse_optional_string_from_env(Self::ENV_ENGINE_TIMEOUT_SECS)
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| ConfigError::InvalidTimeout {
                        value: value.clone(),
                        source: e,
                    })
            })
            .transpose()?
            .unwrap_or(defaults.engine_timeout);
        let single_flight = env::var(Self::ENV_SINGLE_FLIGHT)
            .map(|s| s != "false" && s != "0")
            .unwrap_or(defaults.single_flight);
        let store_backend = match Self::parse_optional_string_from_env(Self::ENV_STORE) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidStoreBackend { value })?,
            None => defaults.store_backend,
        };

        let firestore_project = Self::parse_optional_string_from_env(Self::ENV_FIRESTORE_PROJECT)
            .or_else(|| Self::parse_optional_string_from_env(Self::ENV_GOOGLE_CLOUD_PROJECT));
        let firestore_database =
            Self::parse_string_from_env(Self::ENV_FIRESTORE_DATABASE, defaults.firestore_database);
        let emulator_host = Self::parse_optional_string_from_env(Self::ENV_FIRESTORE_EMULATOR_HOST);
        let firestore_emulator = emulator_host.is_some();
        let firestore_endpoint = Self::parse_optional_string_from_env(Self::ENV_FIRESTORE_ENDPOINT)
            .or_else(|| emulator_host.map(|host| format!("http://{}/v1", host)))
            .unwrap_or(defaults.firestore_endpoint);
        let firestore_token = Self::parse_optional_string_from_env(Self::ENV_FIRESTORE_TOKEN);

        let curated_collection =
            Self::parse_string_from_env(Self::ENV_CURATED_COLLECTION, defaults.curated_collection);
        let opportunistic_collection = Self::parse_string_from_env(
            Self::ENV_OPPORTUNISTIC_COLLECTION,
            defaults.opportunistic_collection,
        );
        let seed_path = Self::parse_optional_path_from_env(Self::ENV_SEED_PATH);
        let static_dir = Self::parse_optional_path_from_env(Self::ENV_STATIC_DIR);

        Ok(Self {
            port,
            bind_addr,
            engine_url,
            engine_timeout,
            single_flight,
            store_backend,
            firestore_project,
            firestore_database,
            firestore_endpoint,
            firestore_token,
            firestore_emulator,
            curated_collection,
            opportunistic_collection,
            seed_path,
            static_dir,
        })
    }

    /// Validates URLs, paths and basic invariants (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Self::is_http_url(&self.engine_url) {
            return Err(ConfigError::InvalidUrl {
                name: "engine_url",
                value: self.engine_url.clone(),
            });
        }

        if self.engine_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.curated_collection == self.opportunistic_collection {
            return Err(ConfigError::SameCollection {
                name: self.curated_collection.clone(),
            });
        }

        if self.store_backend == StoreBackend::Firestore {
            if self.firestore_project.is_none() {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_FIRESTORE_PROJECT,
                });
            }
            if !Self::is_http_url(&self.firestore_endpoint) {
                return Err(ConfigError::InvalidUrl {
                    name: "firestore_endpoint",
                    value: self.firestore_endpoint.clone(),
                });
            }
        }

        if let Some(ref path) = self.seed_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if let Some(ref path) = self.static_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    /// URL of this server's `/healthz` route. Unspecified bind addresses map to loopback.
    pub fn health_check_url(&self) -> String {
        let host = match self.bind_addr {
            IpAddr::V4(addr) if addr.is_unspecified() => Ipv4Addr::LOCALHOST.to_string(),
            IpAddr::V4(addr) => addr.to_string(),
            IpAddr::V6(addr) if addr.is_unspecified() => format!("[{}]", Ipv6Addr::LOCALHOST),
            IpAddr::V6(addr) => format!("[{}]", addr),
        };
        format!("http://{}:{}/healthz", host, self.port)
    }

    fn is_http_url(value: &str) -> bool {
        let rest = value
            .strip_prefix("http://")
            .or_else(|| value.strip_prefix("https://"));
        rest.is_some_and(|host| !host.is_empty())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        let value = env::var(Self::ENV_PORT).or_else(|_| env::var(Self::ENV_PORT_FALLBACK));
        match value {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_engine_url_from_env(default: String) -> String {
        if let Some(url) = Self::parse_optional_string_from_env(Self::ENV_ENGINE_URL) {
            return url;
        }
        match (
            Self::parse_optional_string_from_env(Self::ENV_PYTHON_URL),
            Self::parse_optional_string_from_env(Self::ENV_PYTHON_PORT),
        ) {
            (Some(url), Some(port)) => format!("{}:{}", url.trim_end_matches('/'), port),
            _ => default,
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }
}
