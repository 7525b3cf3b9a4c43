//! Configuration loading and typed config structures for the map server.
//!
//! Configuration lives in `chronomap.yaml` in the working directory (or the
//! file named by `CHRONOMAP_CONFIG`). Every field has a default, so a
//! missing `chronomap.yaml` is not an error; a missing file named by
//! `CHRONOMAP_CONFIG` is. A handful of environment variables
//! override file values so deployments can adjust paths without editing
//! the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chronomap_meta::ReloadPolicy;
use chronomap_meta::store::DEFAULT_WAYPOINT_EXTENSION;
use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "chronomap.yaml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "CHRONOMAP_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override holds an unusable value.
    #[error("invalid value for {var}: `{value}`")]
    InvalidEnv {
        /// The environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `chronomap.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChronomapConfig {
    /// Debug mode: serve static files from the API server.
    #[serde(default = "default_true")]
    pub debug: bool,

    /// Where map metadata lives and how it is reloaded.
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Block-info socket settings.
    #[serde(default)]
    pub block_info: BlockInfoConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ChronomapConfig {
    fn default() -> Self {
        Self {
            debug: true,
            metadata: MetadataConfig::default(),
            server: HttpConfig::default(),
            block_info: BlockInfoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ChronomapConfig {
    /// Load configuration from the default location, then apply
    /// environment overrides.
    ///
    /// Environment variables override file values:
    /// - `DEBUG` overrides `debug`
    /// - `METADATA_PATH` overrides `metadata.path`
    /// - `PORT` overrides `server.port`
    /// - `STATIC_PATH` overrides `server.static_path`
    /// - `ASSETS_PREFIX` overrides `server.assets_prefix`
    /// - `OPERATOR_API` overrides `server.operator_api`
    /// - `BLOCK_INFO_SOCKET_PATH` overrides `block_info.socket_path`
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = Self::read(explicit.as_deref())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Read the configuration file, without environment overrides.
    ///
    /// A file named explicitly (through `CHRONOMAP_CONFIG`) must exist.
    /// Otherwise `chronomap.yaml` is read if present and the defaults are
    /// used if not.
    pub fn read(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a YAML file at the given path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, without environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup("DEBUG") {
            let debug = parse_bool(&value);
            self.debug = debug.ok_or(ConfigError::InvalidEnv {
                var: "DEBUG",
                value,
            })?;
        }
        if let Some(value) = lookup("METADATA_PATH") {
            self.metadata.path = PathBuf::from(value);
        }
        if let Some(value) = lookup("PORT") {
            let port = value.parse().ok();
            self.server.port = port.ok_or(ConfigError::InvalidEnv {
                var: "PORT",
                value,
            })?;
        }
        if let Some(value) = lookup("STATIC_PATH") {
            self.server.static_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("ASSETS_PREFIX") {
            self.server.assets_prefix = value;
        }
        if let Some(value) = lookup("OPERATOR_API") {
            let enabled = parse_bool(&value);
            self.server.operator_api = enabled.ok_or(ConfigError::InvalidEnv {
                var: "OPERATOR_API",
                value,
            })?;
        }
        if let Some(value) = lookup("BLOCK_INFO_SOCKET_PATH") {
            self.block_info.socket_path = PathBuf::from(value);
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Metadata location and reload behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataConfig {
    /// Root of the metadata tree (`colors`, `waypoints/<dimension>/`).
    #[serde(default = "default_metadata_path")]
    pub path: PathBuf,

    /// Extension of waypoint files, without the dot.
    #[serde(default = "default_waypoint_extension")]
    pub waypoint_extension: String,

    /// What a failed reload leaves published.
    #[serde(default)]
    pub reload_policy: ReloadPolicy,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
            waypoint_extension: default_waypoint_extension(),
            reload_policy: ReloadPolicy::default(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as static files in debug mode.
    #[serde(default = "default_static_path")]
    pub static_path: PathBuf,

    /// Asset URL prefix handed to the client by `/api/initial-state`.
    #[serde(default)]
    pub assets_prefix: String,

    /// Mount the `/api/operator` status and reload endpoints.
    #[serde(default)]
    pub operator_api: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_path: default_static_path(),
            assets_prefix: String::new(),
            operator_api: false,
        }
    }
}

/// Block-info socket configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockInfoConfig {
    /// Unix socket of the block-info service.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Upper bound on one lookup exchange, in milliseconds.
    #[serde(default = "default_block_timeout_ms")]
    pub timeout_ms: u64,
}

impl BlockInfoConfig {
    /// The lookup timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BlockInfoConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            timeout_ms: default_block_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("../mapmeta")
}

fn default_waypoint_extension() -> String {
    DEFAULT_WAYPOINT_EXTENSION.to_owned()
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

fn default_static_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/mcmap.sock")
}

const fn default_block_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = ChronomapConfig::parse("{}").unwrap();
        assert!(config.debug);
        assert_eq!(config.metadata.path, PathBuf::from("../mapmeta"));
        assert_eq!(config.metadata.waypoint_extension, "txt");
        assert_eq!(config.metadata.reload_policy, ReloadPolicy::PerDimension);
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.block_info.socket_path,
            PathBuf::from("/tmp/mcmap.sock")
        );
        assert_eq!(config.block_info.timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_full_file() {
        let yaml = r"
debug: false
metadata:
  path: /srv/mapmeta
  waypoint_extension: wp
  reload_policy: all_or_nothing
server:
  host: 127.0.0.1
  port: 9000
  assets_prefix: https://cdn.example.com/tiles
block_info:
  socket_path: /run/mcmap.sock
  timeout_ms: 250
logging:
  level: debug
  json: true
";
        let config = ChronomapConfig::parse(yaml).unwrap();
        assert!(!config.debug);
        assert_eq!(config.metadata.path, PathBuf::from("/srv/mapmeta"));
        assert_eq!(config.metadata.waypoint_extension, "wp");
        assert_eq!(config.metadata.reload_policy, ReloadPolicy::AllOrNothing);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.assets_prefix, "https://cdn.example.com/tiles");
        assert_eq!(config.block_info.timeout(), Duration::from_millis(250));
        assert!(config.logging.json);
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: BTreeMap<&str, &str> = [
            ("DEBUG", "false"),
            ("METADATA_PATH", "/data/meta"),
            ("PORT", "8080"),
            ("BLOCK_INFO_SOCKET_PATH", "/run/blocks.sock"),
        ]
        .into_iter()
        .collect();

        let mut config = ChronomapConfig::parse("server:\n  port: 9000\n").unwrap();
        config
            .apply_overrides(|var| env.get(var).map(|v| (*v).to_owned()))
            .unwrap();

        assert!(!config.debug);
        assert_eq!(config.metadata.path, PathBuf::from("/data/meta"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.block_info.socket_path,
            PathBuf::from("/run/blocks.sock")
        );
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = ChronomapConfig::default();
        let err = config
            .apply_overrides(|var| (var == "PORT").then(|| "eighty".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = ChronomapConfig::read(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn explicit_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronomap.yaml");
        std::fs::write(&path, "server:\n  port: 9100\n  operator_api: true\n").unwrap();

        let config = ChronomapConfig::read(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(config.server.operator_api);
    }

    #[test]
    fn operator_api_override() {
        let mut config = ChronomapConfig::default();
        assert!(!config.server.operator_api);
        config
            .apply_overrides(|var| (var == "OPERATOR_API").then(|| "yes".to_owned()))
            .unwrap();
        assert!(config.server.operator_api);
    }

    #[test]
    fn unknown_policy_is_a_yaml_error() {
        let err = ChronomapConfig::parse("metadata:\n  reload_policy: sometimes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
