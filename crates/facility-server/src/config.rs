//! Configuration loading for the Facility Atlas service.
//!
//! The configuration lives in `facility-config.yaml` next to the binary's
//! working directory (or wherever `FACILITY_CONFIG` points). Every field
//! has a default, so a missing file or a missing section is not an error.

use std::path::{Path, PathBuf};

use facility_api::{CorsPolicy, ServerConfig};
use facility_store::{JsonFile, PersistencePolicy, UnknownPolicy};
use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "facility-config.yaml";

/// Environment variable that points at an alternative configuration file.
pub const CONFIG_PATH_VAR: &str = "FACILITY_CONFIG";

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

    /// An environment override carried an unusable value.
    #[error("invalid value for {var}: {reason}")]
    Override {
        /// The environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `facility-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Backing file settings.
    #[serde(default)]
    pub data: DataSection,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override fields from a variable lookup.
    ///
    /// Recognizes `HOST`, `PORT`, `FACILITY_DATA_FILE` and
    /// `FACILITY_PERSISTENCE`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Override`] if `PORT` is not a valid port or
    /// `FACILITY_PERSISTENCE` names an unknown policy.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::Override {
                var: "PORT",
                reason: format!("`{port}`: {e}"),
            })?;
        }
        if let Some(path) = lookup("FACILITY_DATA_FILE") {
            self.data.path = PathBuf::from(path);
        }
        if let Some(policy) = lookup("FACILITY_PERSISTENCE") {
            self.data.persistence =
                policy
                    .parse()
                    .map_err(|e: UnknownPolicy| ConfigError::Override {
                        var: "FACILITY_PERSISTENCE",
                        reason: e.to_string(),
                    })?;
        }
        Ok(())
    }

    /// Override fields from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::apply_overrides`].
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Listener settings in the form the API crate expects.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            cors: CorsPolicy {
                allowed_origins: self.server.cors_allowed_origins.clone(),
            },
        }
    }

    /// The backing file named by the data section.
    pub fn data_file(&self) -> JsonFile {
        JsonFile::new(&self.data.path)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API; empty allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Backing file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataSection {
    /// Path of the JSON facility document.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// When mutations are written back to `path`.
    #[serde(default)]
    pub persistence: PersistencePolicy,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            persistence: PersistencePolicy::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/facilities.json")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = ServiceConfig::parse("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.data.path, PathBuf::from("data/facilities.json"));
        assert_eq!(config.data.persistence, PersistencePolicy::Memory);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let yaml = "server:\n  port: 8080\ndata:\n  persistence: write_through\n";
        let config = ServiceConfig::parse(yaml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data.persistence, PersistencePolicy::WriteThrough);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn full_document_parses() {
        let yaml = r"
server:
  host: 127.0.0.1
  port: 9000
  cors_allowed_origins:
    - http://dashboard.example
data:
  path: /var/lib/facility-atlas/facilities.json
  persistence: on_shutdown
logging:
  level: debug
  format: json
";
        let config = ServiceConfig::parse(yaml).unwrap();
        let server = config.server_config();

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 9000);
        assert_eq!(server.cors.allowed_origins, ["http://dashboard.example"]);
        assert_eq!(config.data.persistence, PersistencePolicy::OnShutdown);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_policy_in_yaml_is_rejected() {
        let err = ServiceConfig::parse("data:\n  persistence: sometimes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(lookup(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "7001"),
                ("FACILITY_DATA_FILE", "/tmp/facilities.json"),
                ("FACILITY_PERSISTENCE", "write_through"),
            ]))
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7001);
        assert_eq!(config.data.path, PathBuf::from("/tmp/facilities.json"));
        assert_eq!(config.data.persistence, PersistencePolicy::WriteThrough);
    }

    #[test]
    fn bad_overrides_are_reported() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Override { var: "PORT", .. }));

        let err = config
            .apply_overrides(lookup(&[("FACILITY_PERSISTENCE", "never")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Override {
                var: "FACILITY_PERSISTENCE",
                ..
            }
        ));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "logging:\n  level: warn\n").unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "warn");

        let missing = ServiceConfig::from_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
