//! Maintenance tickets raised against facilities.
//!
//! A ticket moves through a small status state machine:
//!
//! - `open` -> `in_progress` or `closed`
//! - `in_progress` -> `open`, `resolved` or `closed`
//! - `resolved` -> `in_progress` or `closed`
//!
//! `closed` is terminal. Re-asserting the current status is allowed and
//! changes nothing but the `updated_at` timestamp.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValidationError;
use crate::facility::FacilityId;
use crate::fields::{discard_blank, into_object, take_free_text, take_text, take_typed};

/// Prefix of the human-facing ticket identifier.
const TICKET_PREFIX: &str = "TKT-";

/// Keys a ticket update may carry.
const UPDATE_FIELDS: [&str; 3] = ["status", "priority", "description"];

/// Sequential ticket identifier, rendered as `TKT-0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketId(pub u32);

impl core::fmt::Display for TicketId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{TICKET_PREFIX}{:04}", self.0)
    }
}

/// A string that is not a `TKT-NNNN` identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ticket id `{0}`")]
pub struct TicketIdError(pub String);

impl FromStr for TicketId {
    type Err = TicketIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(TICKET_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(Self)
            .ok_or_else(|| TicketIdError(s.to_owned()))
    }
}

impl Serialize for TicketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TicketId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle position of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly reported, nobody working on it.
    Open,
    /// Assigned and being worked.
    InProgress,
    /// Work finished, awaiting confirmation.
    Resolved,
    /// Terminal.
    Closed,
}

impl TicketStatus {
    /// Whether a ticket in `self` may move to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Open | Self::InProgress | Self::Closed)
                | (Self::InProgress, _)
                | (Self::Resolved, Self::Resolved | Self::InProgress | Self::Closed)
                | (Self::Closed, Self::Closed)
        )
    }

    /// The wire name of this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl core::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a ticket.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Can wait.
    Low,
    /// Normal queue.
    #[default]
    Medium,
    /// Next in line.
    High,
    /// Drop everything.
    Critical,
}

/// A maintenance ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Identifier assigned at creation.
    pub id: TicketId,
    /// The facility the ticket was raised against.
    pub facility_id: FacilityId,
    /// Short summary.
    pub title: String,
    /// Longer free-form text.
    pub description: String,
    /// Free-form category such as `hvac` or `electrical`.
    pub category: String,
    /// Urgency.
    pub priority: TicketPriority,
    /// Lifecycle position.
    pub status: TicketStatus,
    /// When the ticket was raised.
    pub created_at: DateTime<Utc>,
    /// When the ticket last changed.
    pub updated_at: DateTime<Utc>,
}

/// A validated ticket creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Target facility.
    pub facility_id: FacilityId,
    /// Short summary.
    pub title: String,
    /// Free-form category.
    pub category: String,
    /// Longer text, empty when not supplied.
    pub description: String,
    /// Urgency, `medium` when not supplied.
    pub priority: TicketPriority,
}

impl NewTicket {
    /// Parse and validate a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] when `facility_id`,
    /// `title` or `category` is absent, and
    /// [`ValidationError::InvalidField`] for badly typed values.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = into_object(value)?;

        let facility_id = take_typed::<FacilityId>(&mut fields, "facility_id")?;
        let title = take_text(&mut fields, "title")?;
        let category = take_text(&mut fields, "category")?;
        let description = take_free_text(&mut fields, "description")?.unwrap_or_default();
        let priority = take_typed::<TicketPriority>(&mut fields, "priority")?.unwrap_or_default();

        match (facility_id, title, category) {
            (Some(facility_id), Some(title), Some(category)) => Ok(Self {
                facility_id,
                title,
                category,
                description,
                priority,
            }),
            (facility_id, title, category) => {
                let missing = [
                    ("facility_id", facility_id.is_none()),
                    ("title", title.is_none()),
                    ("category", category.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(ValidationError::MissingFields(missing))
            }
        }
    }
}

/// A validated ticket update request.
///
/// Absent fields are left unchanged. A `null` or empty-string value counts
/// as absent, so `"description": ""` keeps the current description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    /// Requested status.
    pub status: Option<TicketStatus>,
    /// Requested priority.
    pub priority: Option<TicketPriority>,
    /// Replacement description.
    pub description: Option<String>,
}

impl TicketUpdate {
    /// Parse and validate a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] for unknown status or
    /// priority names and for a non-string description.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = into_object(value)?;
        for key in UPDATE_FIELDS {
            discard_blank(&mut fields, key);
        }
        Ok(Self {
            status: take_typed(&mut fields, "status")?,
            priority: take_typed(&mut fields, "priority")?,
            description: take_free_text(&mut fields, "description")?,
        })
    }
}

/// Optional filters for listing tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TicketFilter {
    /// Only tickets raised against this facility.
    pub facility_id: Option<FacilityId>,
    /// Only tickets in this status.
    pub status: Option<TicketStatus>,
}

impl TicketFilter {
    /// Whether `ticket` passes every set filter.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.facility_id.is_none_or(|id| ticket.facility_id == id)
            && self.status.is_none_or(|status| ticket.status == status)
    }
}
