//! Shared application state for the Facility API server.
//!
//! [`AppState`] owns the facility and ticket stores plus the optional
//! backing file. It is built once at startup (either empty or via
//! [`AppState::load`]) and torn down with [`AppState::flush`]; there is
//! no module-level state anywhere in the service.

use std::sync::Arc;

use facility_store::{FacilityStore, JsonFile, PersistencePolicy, StoreError, TicketStore};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::ApiError;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState {
    /// The facility collection.
    pub facilities: Arc<RwLock<FacilityStore>>,
    /// The maintenance ticket queue (memory only).
    pub tickets: Arc<RwLock<TicketStore>>,
    /// Where the facility collection is persisted, if anywhere.
    backing: Option<JsonFile>,
    /// When the backing file is written.
    persistence: PersistencePolicy,
}

impl AppState {
    /// Create a memory-only state around an existing store.
    pub fn new(store: FacilityStore) -> Self {
        Self {
            facilities: Arc::new(RwLock::new(store)),
            tickets: Arc::new(RwLock::new(TicketStore::new())),
            backing: None,
            persistence: PersistencePolicy::Memory,
        }
    }

    /// Create a state whose facility collection is tied to `file`.
    pub fn with_backing(store: FacilityStore, file: JsonFile, policy: PersistencePolicy) -> Self {
        Self {
            backing: Some(file),
            persistence: policy,
            ..Self::new(store)
        }
    }

    /// Load the facility collection from `file`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the file cannot be read or parsed, or
    /// if it contains duplicate ids.
    pub async fn load(file: JsonFile, policy: PersistencePolicy) -> Result<Self, StoreError> {
        let records = file.load().await?;
        let store = FacilityStore::from_records(records)?;
        info!(
            path = %file.path().display(),
            count = store.len(),
            persistence = %policy,
            "facility data loaded"
        );
        Ok(Self::with_backing(store, file, policy))
    }

    /// The active persistence policy.
    pub const fn persistence(&self) -> PersistencePolicy {
        self.persistence
    }

    /// Run a mutation under the facility write lock.
    ///
    /// With [`PersistencePolicy::WriteThrough`] the updated collection is
    /// written before the lock is released; if that write fails, the
    /// collection is restored to its prior contents and the request fails
    /// with [`ApiError::Persistence`].
    pub async fn mutate_facilities<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut FacilityStore) -> Result<T, StoreError>,
    {
        let mut store = self.facilities.write().await;
        let write_through = self
            .backing
            .as_ref()
            .filter(|_| self.persistence == PersistencePolicy::WriteThrough);
        let checkpoint = write_through.map(|_| store.clone());

        let output = op(&mut *store)?;

        if let (Some(file), Some(checkpoint)) = (write_through, checkpoint)
            && let Err(e) = file.save(store.list_all()).await
        {
            error!(
                path = %file.path().display(),
                error = %e,
                "write-through failed, mutation rolled back"
            );
            *store = checkpoint;
            return Err(ApiError::Persistence(e.to_string()));
        }

        Ok(output)
    }

    /// Teardown hook: write the collection if the policy defers writes to
    /// shutdown.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns the store error if the final write fails.
    pub async fn flush(&self) -> Result<bool, StoreError> {
        let Some(file) = self
            .backing
            .as_ref()
            .filter(|_| self.persistence == PersistencePolicy::OnShutdown)
        else {
            return Ok(false);
        };

        let store = self.facilities.read().await;
        file.save(store.list_all()).await?;
        info!(
            path = %file.path().display(),
            count = store.len(),
            "facility data flushed"
        );
        Ok(true)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FacilityStore::new())
    }
}

#[cfg(test)]
mod tests {
    use facility_types::{FacilityId, FacilityPatch};
    use serde_json::json;

    use super::*;

    fn draft(name: &str) -> FacilityPatch {
        FacilityPatch::from_json(json!({
            "name": name,
            "type": "hub",
            "state": "OH",
            "coordinates": [-83.0, 40.0],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn write_through_persists_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let state = AppState::with_backing(
            FacilityStore::new(),
            file.clone(),
            PersistencePolicy::WriteThrough,
        );

        state
            .mutate_facilities(|s| s.create(draft("Alpha Hub")))
            .await
            .unwrap();
        assert_eq!(file.load().await.unwrap().len(), 1);

        state
            .mutate_facilities(|s| s.delete(FacilityId(1)))
            .await
            .unwrap();
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_write_through_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("missing-dir").join("facilities.json"));
        let state =
            AppState::with_backing(FacilityStore::new(), file, PersistencePolicy::WriteThrough);

        let err = state
            .mutate_facilities(|s| s.create(draft("Alpha Hub")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "persistence_failed");
        assert!(state.facilities.read().await.is_empty());
    }

    #[tokio::test]
    async fn failed_operation_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let state = AppState::with_backing(
            FacilityStore::new(),
            file.clone(),
            PersistencePolicy::WriteThrough,
        );

        let err = state
            .mutate_facilities(|s| s.delete(FacilityId(4)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn on_shutdown_defers_writes_until_flush() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let state = AppState::with_backing(
            FacilityStore::new(),
            file.clone(),
            PersistencePolicy::OnShutdown,
        );

        state
            .mutate_facilities(|s| s.create(draft("Alpha Hub")))
            .await
            .unwrap();
        assert!(!file.path().exists());

        assert!(state.flush().await.unwrap());
        assert_eq!(file.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_policy_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let state =
            AppState::with_backing(FacilityStore::new(), file.clone(), PersistencePolicy::Memory);

        state
            .mutate_facilities(|s| s.create(draft("Alpha Hub")))
            .await
            .unwrap();
        assert!(!state.flush().await.unwrap());
        assert!(!file.path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        const WRITERS: u64 = 32;

        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let state = Arc::new(AppState::with_backing(
            FacilityStore::new(),
            file.clone(),
            PersistencePolicy::WriteThrough,
        ));

        let handles: Vec<_> = (0..WRITERS)
            .map(|n| {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    state
                        .mutate_facilities(|s| s.create(draft(&format!("Hub {n}"))))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = std::collections::BTreeSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }

        let expected: std::collections::BTreeSet<_> = (1..=WRITERS).map(FacilityId).collect();
        assert_eq!(ids, expected);

        let store = state.facilities.read().await;
        assert_eq!(store.stats().total, 32);
        assert_eq!(file.load().await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn load_reads_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("facilities.json"));
        let seed = draft("Alpha Hub").into_facility(FacilityId(12)).unwrap();
        file.save(&[seed]).await.unwrap();

        let state = AppState::load(file, PersistencePolicy::Memory).await.unwrap();
        let created = state
            .mutate_facilities(|s| s.create(draft("Beta Hub")))
            .await
            .unwrap();
        assert_eq!(created.id, FacilityId(13));
    }
}
