//! Room Routes
//!
//! One route per user-facing transition plus list/detail/stream. Role
//! gating lives in the transition layer, not in route middleware: every
//! authenticated staff member may read, and a disallowed write comes back
//! as 403 from the capability check.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/rooms", get(handler::list))
        .route("/api/rooms/stream", get(handler::stream))
        .route("/api/rooms/{id}", get(handler::get_by_id))
        .route("/api/rooms/{id}/status", put(handler::set_status))
        .route("/api/rooms/{id}/block", post(handler::toggle_block))
        .route("/api/rooms/{id}/problems", post(handler::report_problem))
        .route(
            "/api/rooms/{id}/problems/{problem_id}/resolve",
            put(handler::resolve_problem),
        )
        .route("/api/rooms/{id}/reclean", post(handler::mark_for_reclean))
        .route("/api/rooms/{id}/check", post(handler::mark_for_check))
}
