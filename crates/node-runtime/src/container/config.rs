//! # Relay Configuration
//!
//! Everything is read from the module environment; there are no CLI flags.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `EdgeHubConnectionString` | yes | - |
//! | `EdgeModuleCACertificateFile` | no (ignored on Windows) | - |
//! | `RELAY_ROLE` | no | `both` |
//! | `RELAY_STORE_BACKEND` | no | `rocksdb` (`memory` to opt out) |
//! | `RELAY_STORE_PATH` | no | `latency-store` |
//! | `RELAY_DECODE_POLICY` | no | `reject` |
//! | `RELAY_WRITE_MODE` | no | `independent` |
//!
//! The store settings apply to roles that receive. Each process owns its
//! own in-process hub, so `sender` and `receiver` only relay to each other
//! when both modules share one hub (`Role::Both`, or
//! `RelayContainer::with_transport` when embedding). A lone `sender`
//! publishes into a route with no handler and its messages are dropped.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use lr_01_producer::ProducerConfig;
use lr_02_consumer::{ConsumerConfig, DecodeFailurePolicy};
use lr_03_latency_store::{StoreConfig, WriteMode};
use relay_telemetry::TelemetryConfig;
use shared_bus::{ConnectionString, TransportError, DEFAULT_MESSAGE_TIMEOUT_MS};
use thiserror::Error;

/// Module connection string.
pub const CONNECTION_STRING_VAR: &str = "EdgeHubConnectionString";

/// PEM file with the edge CA certificate.
pub const CA_CERTIFICATE_VAR: &str = "EdgeModuleCACertificateFile";

pub const ROLE_VAR: &str = "RELAY_ROLE";
pub const STORE_BACKEND_VAR: &str = "RELAY_STORE_BACKEND";
pub const STORE_PATH_VAR: &str = "RELAY_STORE_PATH";

/// RocksDB directory used by receiving roles when none is configured.
pub const DEFAULT_STORE_PATH: &str = "latency-store";
pub const DECODE_POLICY_VAR: &str = "RELAY_DECODE_POLICY";
pub const WRITE_MODE_VAR: &str = "RELAY_WRITE_MODE";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("Environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("Invalid EdgeHubConnectionString: {0}")]
    InvalidConnectionString(#[from] TransportError),

    /// A variable is set to an unrecognized value.
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },

    /// A durable store was requested but the binary has no RocksDB backend.
    #[error("The rocksdb store backend is not compiled in; set RELAY_STORE_BACKEND=memory")]
    StoreBackendUnavailable,
}

/// Which modules this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Producer loop only.
    Sender,
    /// Consumer dispatcher and latency store only.
    Receiver,
    /// Both, routed through one hub.
    #[default]
    Both,
}

impl Role {
    pub fn sends(self) -> bool {
        matches!(self, Self::Sender | Self::Both)
    }

    pub fn receives(self) -> bool {
        matches!(self, Self::Receiver | Self::Both)
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sender" => Ok(Self::Sender),
            "receiver" => Ok(Self::Receiver),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidValue {
                var: ROLE_VAR,
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Receiver => write!(f, "receiver"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Parsed module connection string.
    pub connection: ConnectionString,
    /// CA certificate to trust, if any.
    pub ca_certificate_file: Option<PathBuf>,
    pub role: Role,
    /// RocksDB directory; in-memory store when `None`. Always `None` for
    /// a role that does not receive.
    pub store_path: Option<PathBuf>,
    /// Transport message timeout in milliseconds.
    pub message_timeout_ms: u64,
    pub producer: ProducerConfig,
    pub consumer: ConsumerConfig,
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
}

impl RelayConfig {
    /// Configuration with defaults for everything but the connection.
    ///
    /// Uses the in-memory store; set `store_path` for a durable one.
    pub fn new(connection: ConnectionString) -> Self {
        Self {
            connection,
            ca_certificate_file: None,
            role: Role::default(),
            store_path: None,
            message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
            producer: ProducerConfig::default(),
            consumer: ConsumerConfig::default(),
            store: StoreConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(CONNECTION_STRING_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(CONNECTION_STRING_VAR))?;
        let mut config = Self::new(raw.parse()?);

        // Trust material is only installed on non-Windows hosts
        if cfg!(not(windows)) {
            config.ca_certificate_file = lookup(CA_CERTIFICATE_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from);
        }

        if let Some(role) = lookup(ROLE_VAR) {
            config.role = role.parse()?;
        }

        if config.role.receives() {
            config.store_path = Self::store_path(&lookup)?;
        }

        if let Some(policy) = lookup(DECODE_POLICY_VAR) {
            config.consumer.decode_failure_policy = match policy.to_lowercase().as_str() {
                "reject" => DecodeFailurePolicy::Reject,
                "drop" => DecodeFailurePolicy::Drop,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: DECODE_POLICY_VAR,
                        value: policy,
                    })
                }
            };
        }

        if let Some(mode) = lookup(WRITE_MODE_VAR) {
            config.store.write_mode = match mode.to_lowercase().as_str() {
                "independent" => WriteMode::Independent,
                "atomic" => WriteMode::Atomic,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: WRITE_MODE_VAR,
                        value: mode,
                    })
                }
            };
        }

        config.telemetry = TelemetryConfig::from_lookup(&lookup);
        Ok(config)
    }
}

impl RelayConfig {
    /// Resolve the durable store directory. `None` selects the in-memory
    /// store, which must be asked for explicitly.
    fn store_path<F>(lookup: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup(STORE_BACKEND_VAR).unwrap_or_else(|| "rocksdb".to_string());
        match backend.trim().to_lowercase().as_str() {
            "memory" => Ok(None),
            "rocksdb" if cfg!(feature = "rocksdb") => Ok(Some(
                lookup(STORE_PATH_VAR)
                    .filter(|v| !v.is_empty())
                    .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from),
            )),
            "rocksdb" => Err(ConfigError::StoreBackendUnavailable),
            _ => Err(ConfigError::InvalidValue {
                var: STORE_BACKEND_VAR,
                value: backend,
            }),
        }
    }
}
