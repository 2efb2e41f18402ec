//! In-memory maintenance ticket queue.
//!
//! Tickets live only for the process lifetime. Identifiers are sequential
//! and never reused.

use chrono::{DateTime, Utc};
use facility_types::{
    NewTicket, Ticket, TicketFilter, TicketId, TicketStats, TicketStatus, TicketUpdate,
    ValidationError,
};

use crate::error::StoreError;
use crate::facilities::FacilityStore;

/// The ticket queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
    last_id: u32,
}

impl TicketStore {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            tickets: Vec::new(),
            last_id: 0,
        }
    }

    /// Tickets passing `filter`, oldest first.
    pub fn list(&self, filter: &TicketFilter) -> Vec<&Ticket> {
        self.tickets.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Look up a ticket by id.
    pub fn get(&self, id: TicketId) -> Result<&Ticket, StoreError> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .ok_or(StoreError::TicketNotFound(id))
    }

    /// Open a new ticket against an existing facility.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `facilities` has no record
    /// with the requested facility id.
    pub fn create(
        &mut self,
        facilities: &FacilityStore,
        request: NewTicket,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        if facilities.get(request.facility_id).is_err() {
            return Err(ValidationError::invalid(
                "facility_id",
                format!("no facility with id {}", request.facility_id),
            )
            .into());
        }

        let next = self.last_id.checked_add(1).ok_or(StoreError::IdExhausted)?;
        let NewTicket {
            facility_id,
            title,
            category,
            description,
            priority,
        } = request;

        let ticket = Ticket {
            id: TicketId(next),
            facility_id,
            title,
            description,
            category,
            priority,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };

        self.last_id = next;
        self.tickets.push(ticket.clone());
        Ok(ticket)
    }

    /// Apply a status change and/or field edits.
    ///
    /// The update is all-or-nothing: a rejected status transition leaves
    /// priority and description untouched too.
    pub fn update(
        &mut self,
        id: TicketId,
        update: TicketUpdate,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TicketNotFound(id))?;

        if let Some(next) = update.status
            && !ticket.status.can_transition_to(next)
        {
            return Err(ValidationError::InvalidTransition {
                from: ticket.status,
                to: next,
            }
            .into());
        }

        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(description) = update.description {
            ticket.description = description;
        }
        ticket.updated_at = now;
        Ok(ticket.clone())
    }

    /// Counts by status, priority and category.
    pub fn stats(&self) -> TicketStats {
        let mut stats = TicketStats {
            total: self.tickets.len(),
            ..TicketStats::default()
        };
        for ticket in &self.tickets {
            let status = stats.by_status.entry(ticket.status).or_insert(0);
            *status = status.saturating_add(1);
            let priority = stats.by_priority.entry(ticket.priority).or_insert(0);
            *priority = priority.saturating_add(1);
            let category = stats
                .by_category
                .entry(ticket.category.clone())
                .or_insert(0);
            *category = category.saturating_add(1);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use facility_types::{FacilityId, FacilityPatch, TicketPriority};
    use serde_json::json;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap()
    }

    fn facilities() -> FacilityStore {
        let mut store = FacilityStore::new();
        for name in ["Alpha Hub", "Beta Warehouse"] {
            store
                .create(
                    FacilityPatch::from_json(json!({
                        "name": name,
                        "type": "hub",
                        "state": "OH",
                        "coordinates": [-83.0, 40.0],
                    }))
                    .unwrap(),
                )
                .unwrap();
        }
        store
    }

    fn request(facility: u64, category: &str) -> NewTicket {
        NewTicket {
            facility_id: FacilityId(facility),
            title: String::from("Dock door stuck"),
            category: category.to_owned(),
            description: String::new(),
            priority: TicketPriority::default(),
        }
    }

    #[test]
    fn tickets_get_sequential_ids_and_start_open() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        let first = tickets.create(&facilities, request(1, "doors"), at(0)).unwrap();
        let second = tickets.create(&facilities, request(2, "hvac"), at(1)).unwrap();

        assert_eq!(first.id.to_string(), "TKT-0001");
        assert_eq!(second.id, TicketId(2));
        assert_eq!(first.status, TicketStatus::Open);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[test]
    fn ticket_requires_existing_facility() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        let err = tickets
            .create(&facilities, request(77, "doors"), at(0))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidField {
                field: "facility_id",
                ..
            })
        ));
        assert!(tickets.list(&TicketFilter::default()).is_empty());
    }

    #[test]
    fn valid_transition_updates_timestamp() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        let ticket = tickets.create(&facilities, request(1, "doors"), at(0)).unwrap();

        let update = TicketUpdate {
            status: Some(TicketStatus::InProgress),
            priority: Some(TicketPriority::High),
            description: None,
        };
        let updated = tickets.update(ticket.id, update, at(5)).unwrap();
        assert_eq!(updated.status, TicketStatus::InProgress);
        assert_eq!(updated.priority, TicketPriority::High);
        assert_eq!(updated.created_at, at(0));
        assert_eq!(updated.updated_at, at(5));
    }

    #[test]
    fn rejected_transition_changes_nothing() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        let ticket = tickets.create(&facilities, request(1, "doors"), at(0)).unwrap();

        let update = TicketUpdate {
            status: Some(TicketStatus::Resolved),
            priority: Some(TicketPriority::Critical),
            description: Some(String::from("skipped ahead")),
        };
        let err = tickets.update(ticket.id, update, at(5)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidTransition {
                from: TicketStatus::Open,
                to: TicketStatus::Resolved,
            })
        ));
        assert_eq!(tickets.get(ticket.id).unwrap(), &ticket);
    }

    #[test]
    fn list_filters_by_facility_and_status() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        tickets.create(&facilities, request(1, "doors"), at(0)).unwrap();
        let second = tickets.create(&facilities, request(2, "hvac"), at(1)).unwrap();
        tickets.create(&facilities, request(2, "hvac"), at(2)).unwrap();
        tickets
            .update(
                second.id,
                TicketUpdate {
                    status: Some(TicketStatus::Closed),
                    ..TicketUpdate::default()
                },
                at(3),
            )
            .unwrap();

        let for_beta = TicketFilter {
            facility_id: Some(FacilityId(2)),
            status: None,
        };
        assert_eq!(tickets.list(&for_beta).len(), 2);

        let open_beta = TicketFilter {
            facility_id: Some(FacilityId(2)),
            status: Some(TicketStatus::Open),
        };
        assert_eq!(tickets.list(&open_beta).len(), 1);
    }

    #[test]
    fn stats_group_by_status_priority_and_category() {
        let facilities = facilities();
        let mut tickets = TicketStore::new();
        tickets.create(&facilities, request(1, "doors"), at(0)).unwrap();
        tickets.create(&facilities, request(2, "hvac"), at(1)).unwrap();
        tickets.create(&facilities, request(2, "hvac"), at(2)).unwrap();

        let stats = tickets.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_status.get(&TicketStatus::Open), Some(&3));
        assert_eq!(stats.by_priority.get(&TicketPriority::Medium), Some(&3));
        assert_eq!(stats.by_category.get("hvac"), Some(&2));
    }

    #[test]
    fn unknown_ticket_is_not_found() {
        let mut tickets = TicketStore::new();
        assert!(matches!(
            tickets.update(TicketId(9), TicketUpdate::default(), at(0)),
            Err(StoreError::TicketNotFound(TicketId(9)))
        ));
    }
}
