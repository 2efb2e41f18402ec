//! Error types for the Facility Atlas binary.

/// Top-level error for the service binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Loading or flushing the facility collection failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: facility_store::StoreError,
    },

    /// The HTTP server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: facility_api::ServerError,
    },

    /// The log filter directive could not be parsed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
