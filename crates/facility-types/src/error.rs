//! Validation failures for client-supplied payloads.

use crate::ticket::TicketStatus;

/// A create or update payload that cannot be accepted.
///
/// Every variant maps to the same `validation_error` code at the HTTP
/// boundary; the message tells the client which field to fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body was valid JSON but not an object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// One or more required fields were absent.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field was present but had the wrong type or an unusable value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// The offending JSON key.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A ticket status change the state machine does not allow.
    #[error("ticket cannot move from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: TicketStatus,
        /// The requested status.
        to: TicketStatus,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidField`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
