//! Facility API server for the Facility Atlas service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Facility REST endpoints** for CRUD, search, filtering and
//!   statistics over the facility collection
//! - **Facility detail endpoints** for contact directories and emergency
//!   procedures
//! - **Ticket REST endpoints** for the maintenance ticket queue
//! - **Health payload** (`GET /`) listing the available endpoints
//!
//! # Architecture
//!
//! Handlers are stateless. The facility and ticket stores live in
//! [`AppState`] behind read-write locks; reads share the lock while every
//! mutation holds the write lock for its whole duration, including the
//! optional write-through to the backing file. Every response carries
//! permissive cross-origin headers unless an origin list is configured.
//!
//! [`AppState`]: state::AppState

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod tickets;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{CorsPolicy, ServerConfig, ServerError, shutdown_signal, start_server};
pub use state::AppState;
