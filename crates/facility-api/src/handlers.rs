//! REST API endpoint handlers for facilities.
//!
//! Every handler reads from or mutates the [`FacilityStore`] held in the
//! shared [`AppState`]. List-shaped endpoints return a bare JSON array of
//! facilities, the same shape as the bundled fallback document.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health payload |
//! | `GET` | `/api/facilities` | List, or filter when query params are present |
//! | `GET` | `/api/facilities/filter` | Filter by exact field values |
//! | `GET` | `/api/facilities/stats` | Aggregate statistics |
//! | `GET` | `/api/facilities/search?q=` | Case-insensitive search |
//! | `GET` | `/api/facilities/{id}` | Single facility |
//! | `POST` | `/api/facilities` | Create |
//! | `PUT` | `/api/facilities/{id}` | Partial update |
//! | `DELETE` | `/api/facilities/{id}` | Delete |
//! | `GET` | `/api/contacts/{id}` | Contact directory of a facility |
//! | `GET` | `/api/emergency/{id}` | Emergency procedures of a facility |
//!
//! [`FacilityStore`]: facility_store::FacilityStore

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use facility_store::FilterCriteria;
use facility_types::{Facility, FacilityId, FacilityPatch, FacilityStats};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter that truncates list results instead of filtering.
const LIMIT_PARAM: &str = "limit";

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/facilities/search` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct SearchQuery {
    /// Substring to look for. Absent or blank matches everything.
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- health payload
// ---------------------------------------------------------------------------

/// Report service health and the endpoint table.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let facility_count = state.facilities.read().await.len();

    Json(serde_json::json!({
        "service": "Facility Atlas API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
        "facilities": facility_count,
        "persistence": state.persistence().as_str(),
        "endpoints": {
            "GET /api/facilities": "List all facilities (query params filter, ?limit=N truncates)",
            "GET /api/facilities/{id}": "Get single facility",
            "GET /api/facilities/stats": "Get statistics",
            "GET /api/facilities/search?q=<query>": "Search facilities",
            "GET /api/facilities/filter?type=<type>&state=<state>": "Filter facilities",
            "POST /api/facilities": "Create new facility",
            "PUT /api/facilities/{id}": "Update facility",
            "DELETE /api/facilities/{id}": "Delete facility",
            "GET /api/contacts/{id}": "Get facility contacts",
            "GET /api/emergency/{id}": "Get facility emergency procedures",
            "GET /api/tickets": "List maintenance tickets",
            "POST /api/tickets": "Create maintenance ticket",
            "GET /api/tickets/stats": "Get ticket statistics",
            "GET /api/tickets/{id}": "Get single ticket",
            "PUT /api/tickets/{id}": "Update ticket status or details"
        }
    }))
}

// ---------------------------------------------------------------------------
// GET /api/facilities and /api/facilities/filter
// ---------------------------------------------------------------------------

/// List facilities, filtering by exact field values when any query
/// parameters other than `limit` are present.
///
/// # Query Parameters
///
/// - any facility field (`type`, `state`, `name`, `id`, or an opaque
///   scalar attribute): exact match, combined with AND
/// - `limit`: maximum number of facilities to return
pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<Facility>>, ApiError> {
    let Query(mut params) = query?;
    let limit = params
        .remove(LIMIT_PARAM)
        .map(|raw| parse_limit(&raw))
        .transpose()?
        .unwrap_or(usize::MAX);
    let criteria = FilterCriteria::from(params);

    let store = state.facilities.read().await;
    let facilities: Vec<Facility> = if criteria.is_empty() {
        store.list_all().iter().take(limit).cloned().collect()
    } else {
        store
            .filter(&criteria)
            .into_iter()
            .take(limit)
            .cloned()
            .collect()
    };

    Ok(Json(facilities))
}

// ---------------------------------------------------------------------------
// GET /api/facilities/stats
// ---------------------------------------------------------------------------

/// Return counts by type and state plus size and headcount totals.
pub async fn facility_stats(State(state): State<Arc<AppState>>) -> Json<FacilityStats> {
    Json(state.facilities.read().await.stats())
}

// ---------------------------------------------------------------------------
// GET /api/facilities/search
// ---------------------------------------------------------------------------

/// Case-insensitive substring search over name, type and state.
pub async fn search_facilities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Facility>>, ApiError> {
    let Query(params) = query?;
    let needle = params.q.unwrap_or_default();

    let store = state.facilities.read().await;
    let results = store.search(&needle).into_iter().cloned().collect();
    Ok(Json(results))
}

// ---------------------------------------------------------------------------
// GET /api/facilities/{id}
// ---------------------------------------------------------------------------

/// Return a single facility.
pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Facility>, ApiError> {
    let Path(id_str) = path?;
    let id = parse_facility_id(&id_str)?;
    let store = state.facilities.read().await;
    Ok(Json(store.get(id)?.clone()))
}

// ---------------------------------------------------------------------------
// POST /api/facilities
// ---------------------------------------------------------------------------

/// Create a facility. The store assigns the id.
pub async fn create_facility(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let patch = FacilityPatch::from_json(body)?;

    let facility = state.mutate_facilities(|store| store.create(patch)).await?;
    info!(id = %facility.id, name = %facility.name, "facility created");

    Ok((StatusCode::CREATED, Json(facility)))
}

// ---------------------------------------------------------------------------
// PUT /api/facilities/{id}
// ---------------------------------------------------------------------------

/// Replace the supplied fields of an existing facility.
pub async fn update_facility(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Facility>, ApiError> {
    let Path(id_str) = path?;
    let id = parse_facility_id(&id_str)?;
    let Json(body) = payload?;
    let patch = FacilityPatch::from_json(body)?;

    let facility = state
        .mutate_facilities(|store| store.update(id, patch))
        .await?;
    info!(id = %facility.id, "facility updated");

    Ok(Json(facility))
}

// ---------------------------------------------------------------------------
// DELETE /api/facilities/{id}
// ---------------------------------------------------------------------------

/// Delete a facility and return the removed record.
pub async fn delete_facility(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Facility>, ApiError> {
    let Path(id_str) = path?;
    let id = parse_facility_id(&id_str)?;

    let facility = state.mutate_facilities(|store| store.delete(id)).await?;
    info!(id = %facility.id, name = %facility.name, "facility deleted");

    Ok(Json(facility))
}

// ---------------------------------------------------------------------------
// GET /api/contacts/{id} and /api/emergency/{id}
// ---------------------------------------------------------------------------

/// Return the contact directory of a facility.
pub async fn get_contacts(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id_str) = path?;
    let id = parse_facility_id(&id_str)?;
    let contacts = state.facilities.read().await.contacts(id)?;

    Ok(Json(serde_json::json!({
        "facility_id": id,
        "contacts": contacts,
    })))
}

/// Return the emergency procedures of a facility.
pub async fn get_emergency_procedures(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id_str) = path?;
    let id = parse_facility_id(&id_str)?;
    let procedures = state.facilities.read().await.emergency_procedures(id)?;

    Ok(Json(serde_json::json!({
        "facility_id": id,
        "emergency_procedures": procedures,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a facility id from a path segment.
fn parse_facility_id(s: &str) -> Result<FacilityId, ApiError> {
    s.parse::<FacilityId>()
        .map_err(|e| ApiError::MalformedRequest(format!("invalid facility id `{s}`: {e}")))
}

/// Parse the `limit` query parameter.
fn parse_limit(s: &str) -> Result<usize, ApiError> {
    s.parse::<usize>()
        .map_err(|e| ApiError::MalformedRequest(format!("invalid limit `{s}`: {e}")))
}
