//! Facility Atlas service binary.
//!
//! Wires configuration, logging and the facility collection into the
//! HTTP API and runs it until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `facility-config.yaml` (or `FACILITY_CONFIG`)
//! 2. Apply environment overrides
//! 3. Initialize structured logging (tracing)
//! 4. Load the facility collection from the backing file
//! 5. Serve the API until a shutdown signal arrives
//! 6. Flush the collection if the persistence policy defers writes

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use facility_api::AppState;
use facility_store::PersistencePolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CONFIG_PATH_VAR, DEFAULT_CONFIG_FILE, LogFormat, LoggingSection, ServiceConfig};
use crate::error::ServiceError;

/// Application entry point for the Facility Atlas service.
///
/// # Errors
///
/// Returns an error if configuration, data loading, serving or the final
/// flush fails.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // 1-2. Load configuration before logging so the level can come from it.
    let (mut config, config_path) = load_config()?;
    config.apply_env_overrides()?;

    // 3. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "facility-server starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 4. Load the facility collection.
    let data_file = config.data_file();
    let state = Arc::new(AppState::load(data_file, config.data.persistence).await?);
    if config.data.persistence == PersistencePolicy::Memory {
        info!("Persistence disabled, changes are kept in memory only");
    }

    // 5. Serve until shutdown.
    let server_config = config.server_config();
    facility_api::start_server(
        &server_config,
        Arc::clone(&state),
        facility_api::shutdown_signal(),
    )
    .await?;

    // 6. Teardown.
    if state.flush().await? {
        info!("Facility data written on shutdown");
    }
    info!("facility-server stopped");
    Ok(())
}

/// Read the configuration file if one exists.
///
/// Returns the path that was read, or `None` when defaults are in use.
fn load_config() -> Result<(ServiceConfig, Option<PathBuf>), ServiceError> {
    let explicit = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    // An explicitly named file must exist; the default one is optional.
    if explicit.is_some() || path.exists() {
        let config = ServiceConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((ServiceConfig::default(), None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingSection) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| ServiceError::Logging {
            message: format!("invalid log level `{}`: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
