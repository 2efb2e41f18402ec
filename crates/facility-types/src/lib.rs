//! Shared type definitions for the Facility Atlas service.
//!
//! This crate is the single source of truth for the entities exchanged
//! between the store, the HTTP layer, and the map client. The JSON shapes
//! defined here are the same shapes found in the bundled fallback
//! document, so a client can switch between the live API and the static
//! file without any translation.
//!
//! # Modules
//!
//! - [`facility`] -- The facility record, its identifier, and coordinates
//! - [`patch`] -- Validated create/update payloads
//! - [`stats`] -- Aggregate statistics over the facility collection
//! - [`ticket`] -- Maintenance tickets and their status state machine
//! - [`error`] -- Validation failures shared by every payload parser

pub mod error;
pub mod facility;
mod fields;
pub mod patch;
pub mod stats;
pub mod ticket;

// Re-export all public types at crate root for convenience.
pub use error::ValidationError;
pub use facility::{Coordinates, CoordinatesError, Facility, FacilityId};
pub use patch::FacilityPatch;
pub use stats::{FacilityStats, TicketStats};
pub use ticket::{
    NewTicket, Ticket, TicketFilter, TicketId, TicketIdError, TicketPriority, TicketStatus,
    TicketUpdate,
};
