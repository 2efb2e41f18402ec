//! Ticket REST API handlers for facility maintenance requests.
//!
//! Tickets are kept in memory for the process lifetime and reference
//! facilities by id. Status changes go through the ticket state machine;
//! illegal transitions are rejected with `validation_error`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/tickets` | List tickets (`?facility_id=`, `?status=`) |
//! | `POST` | `/api/tickets` | Open a ticket |
//! | `GET` | `/api/tickets/stats` | Counts by status, priority, category |
//! | `GET` | `/api/tickets/{id}` | Single ticket |
//! | `PUT` | `/api/tickets/{id}` | Change status, priority or description |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use facility_types::{NewTicket, Ticket, TicketFilter, TicketId, TicketStats, TicketUpdate};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// List response for `GET /api/tickets`.
#[derive(Debug, serde::Serialize)]
struct TicketList {
    /// Number of tickets returned.
    count: usize,
    /// The matching tickets, oldest first.
    tickets: Vec<Ticket>,
}

// ---------------------------------------------------------------------------
// GET /api/tickets
// ---------------------------------------------------------------------------

/// List tickets, optionally filtered by facility and status.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TicketFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(filter) = query?;
    let tickets: Vec<Ticket> = state
        .tickets
        .read()
        .await
        .list(&filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(TicketList {
        count: tickets.len(),
        tickets,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/tickets
// ---------------------------------------------------------------------------

/// Open a ticket against an existing facility.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let request = NewTicket::from_json(body)?;

    let facilities = state.facilities.read().await;
    let ticket = state
        .tickets
        .write()
        .await
        .create(&facilities, request, Utc::now())?;
    drop(facilities);

    info!(
        id = %ticket.id,
        facility_id = %ticket.facility_id,
        category = %ticket.category,
        "ticket opened"
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

// ---------------------------------------------------------------------------
// GET /api/tickets/stats
// ---------------------------------------------------------------------------

/// Return ticket counts by status, priority and category.
pub async fn ticket_stats(State(state): State<Arc<AppState>>) -> Json<TicketStats> {
    Json(state.tickets.read().await.stats())
}

// ---------------------------------------------------------------------------
// GET /api/tickets/{id}
// ---------------------------------------------------------------------------

/// Return a single ticket.
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Ticket>, ApiError> {
    let Path(id_str) = path?;
    let id = parse_ticket_id(&id_str)?;
    let tickets = state.tickets.read().await;
    Ok(Json(tickets.get(id)?.clone()))
}

// ---------------------------------------------------------------------------
// PUT /api/tickets/{id}
// ---------------------------------------------------------------------------

/// Move a ticket through its lifecycle or edit its priority/description.
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Ticket>, ApiError> {
    let Path(id_str) = path?;
    let id = parse_ticket_id(&id_str)?;
    let Json(body) = payload?;
    let update = TicketUpdate::from_json(body)?;

    let ticket = state.tickets.write().await.update(id, update, Utc::now())?;
    info!(id = %ticket.id, status = %ticket.status, "ticket updated");

    Ok(Json(ticket))
}

/// Parse a `TKT-NNNN` ticket id from a path segment.
fn parse_ticket_id(s: &str) -> Result<TicketId, ApiError> {
    s.parse::<TicketId>()
        .map_err(|e| ApiError::MalformedRequest(e.to_string()))
}
