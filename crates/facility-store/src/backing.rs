//! JSON backing file for the facility collection.
//!
//! The file is a single pretty-printed JSON array of facilities. It is
//! read once at startup; whether and when it is written back is decided
//! by the [`PersistencePolicy`]. Writes go to a sibling temp file first
//! and are renamed into place so a crash never leaves a half-written
//! document behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use facility_types::Facility;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::StoreError;

/// When mutations reach the backing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Never write; changes are lost at exit.
    #[default]
    Memory,
    /// Rewrite the file after every successful mutation.
    WriteThrough,
    /// Rewrite the file once during graceful shutdown.
    OnShutdown,
}

impl PersistencePolicy {
    /// The configuration name of this policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::WriteThrough => "write_through",
            Self::OnShutdown => "on_shutdown",
        }
    }
}

impl core::fmt::Display for PersistencePolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persistence policy name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persistence policy `{0}` (expected memory, write_through or on_shutdown)")]
pub struct UnknownPolicy(pub String);

impl FromStr for PersistencePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "write_through" => Ok(Self::WriteThrough),
            "on_shutdown" => Ok(Self::OnShutdown),
            _ => Err(UnknownPolicy(s.to_owned())),
        }
    }
}

/// Location of the JSON backing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Point at a backing file. Nothing is read until [`JsonFile::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every facility from the file.
    ///
    /// A missing file is treated as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read,
    /// or [`StoreError::Parse`] if it is not a JSON array of facilities.
    pub async fn load(&self) -> Result<Vec<Facility>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "facility data file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Atomically replace the file with `facilities`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the temp file cannot be written or
    /// renamed into place.
    pub async fn save(&self, facilities: &[Facility]) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(facilities)?;
        bytes.push(b'\n');

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: temp.clone(),
                source,
            })?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            count = facilities.len(),
            bytes = bytes.len(),
            "facility data written"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("facilities"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use facility_types::{FacilityId, FacilityPatch};
    use serde_json::json;

    use super::*;

    fn facility(id: u64, name: &str) -> Facility {
        FacilityPatch::from_json(json!({
            "name": name,
            "type": "warehouse",
            "state": "KY",
            "coordinates": [-85.7585, 38.2527],
            "equipment": ["Fire Suppression System"],
        }))
        .unwrap()
        .into_facility(FacilityId(id))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("absent.json"));
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_order_and_extras() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let records = vec![facility(9, "Louisville DC"), facility(2, "Lexington Hub")];

        file.save(&records).await.unwrap();
        let loaded = file.load().await.unwrap();

        assert_eq!(loaded, records);
        assert!(!dir.path().join("facilities.json.tmp").exists());
    }

    #[tokio::test]
    async fn non_array_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facilities.json");
        tokio::fs::write(&path, br#"{"type": "FeatureCollection"}"#)
            .await
            .unwrap();

        let err = JsonFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nope").join("facilities.json"));
        let err = file.save(&[facility(1, "Orphan")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            "write_through".parse::<PersistencePolicy>(),
            Ok(PersistencePolicy::WriteThrough)
        );
        assert_eq!(
            " On_Shutdown ".parse::<PersistencePolicy>(),
            Ok(PersistencePolicy::OnShutdown)
        );
        assert!("sometimes".parse::<PersistencePolicy>().is_err());
    }
}
