//! Facility and ticket stores for the Facility Atlas service.
//!
//! The stores are plain owned values with synchronous operations; the
//! HTTP layer wraps them in a lock and decides when to persist. The
//! facility collection can be loaded from and written back to a single
//! JSON array on disk via [`JsonFile`], according to a
//! [`PersistencePolicy`].
//!
//! # Modules
//!
//! - [`facilities`] -- CRUD, search, filter and statistics over facilities
//! - [`tickets`] -- Maintenance ticket queue
//! - [`backing`] -- JSON backing file and persistence policy
//! - [`error`] -- Store error type

pub mod backing;
pub mod error;
pub mod facilities;
pub mod tickets;

pub use backing::{JsonFile, PersistencePolicy, UnknownPolicy};
pub use error::StoreError;
pub use facilities::{FacilityStore, FilterCriteria};
pub use tickets::TicketStore;
