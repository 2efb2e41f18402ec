//! Aggregate statistics payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ticket::{TicketPriority, TicketStatus};

/// Summary of the facility collection, recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityStats {
    /// Number of facilities.
    pub total: usize,
    /// Facility count per category.
    pub by_type: BTreeMap<String, usize>,
    /// Facility count per region code.
    pub by_state: BTreeMap<String, usize>,
    /// Sum of every numeric `size_sqft` attribute.
    pub total_sqft: u64,
    /// Sum of every numeric `employees` attribute.
    pub total_employees: u64,
    /// `total_sqft / total`, rounded down; 0 for an empty collection.
    pub avg_sqft: u64,
    /// `total_employees / total`, rounded down; 0 for an empty collection.
    pub avg_employees: u64,
}

/// Summary of the ticket queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    /// Number of tickets ever created and still held.
    pub total: usize,
    /// Ticket count per status.
    pub by_status: BTreeMap<TicketStatus, usize>,
    /// Ticket count per priority.
    pub by_priority: BTreeMap<TicketPriority, usize>,
    /// Ticket count per free-form category.
    pub by_category: BTreeMap<String, usize>,
}
