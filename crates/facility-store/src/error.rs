//! Error types for the store layer.

use std::path::PathBuf;

use facility_types::{FacilityId, TicketId, ValidationError};

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No facility has the requested id.
    #[error("facility {0} not found")]
    FacilityNotFound(FacilityId),

    /// No ticket has the requested id.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// A payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backing data holds two records with the same id.
    #[error("duplicate facility id {0} in backing data")]
    DuplicateId(FacilityId),

    /// The id counter cannot advance any further.
    #[error("identifier space exhausted")]
    IdExhausted,

    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file is not a JSON array of facilities.
    #[error("invalid facility data in {}: {source}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Serializing the collection failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
