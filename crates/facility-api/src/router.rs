//! Axum router construction for the Facility API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! and HTTP request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::server::CorsPolicy;
use crate::state::AppState;
use crate::tickets;

/// Build the complete Axum router for the Facility API.
///
/// Literal segments under `/api/facilities/` (`stats`, `search`,
/// `filter`) are their own routes. The matcher always prefers a static
/// segment over the `{id}` capture, so `/api/facilities/stats` can never
/// reach an id lookup. The same holds for `/api/tickets/stats`.
pub fn build_router(state: Arc<AppState>, cors: &CorsPolicy) -> Router {
    Router::new()
        // Health
        .route("/", get(handlers::index))
        // Facilities: literal segments
        .route(
            "/api/facilities",
            get(handlers::list_facilities).post(handlers::create_facility),
        )
        .route("/api/facilities/stats", get(handlers::facility_stats))
        .route("/api/facilities/search", get(handlers::search_facilities))
        .route("/api/facilities/filter", get(handlers::list_facilities))
        // Facilities: by id
        .route(
            "/api/facilities/{id}",
            get(handlers::get_facility)
                .put(handlers::update_facility)
                .delete(handlers::delete_facility),
        )
        .route("/api/contacts/{id}", get(handlers::get_contacts))
        .route("/api/emergency/{id}", get(handlers::get_emergency_procedures))
        // Tickets
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/api/tickets/stats", get(tickets::ticket_stats))
        .route(
            "/api/tickets/{id}",
            get(tickets::get_ticket).put(tickets::update_ticket),
        )
        .layer(cors.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
