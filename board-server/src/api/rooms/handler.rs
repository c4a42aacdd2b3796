//! Room API Handlers
//!
//! Each mutation loads the room, runs the pure transition, and persists
//! the returned minimal patch. Broadcasting is not done here: the live
//! watcher picks the write up from its LIVE query and republishes, so
//! every client (including the one that made the change) sees the same
//! derived state through the same path.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Room;
use crate::db::repository::{RoomRepository, StaffRepository};
use crate::rooms::watcher::staff_names;
use crate::rooms::{FilterMode, RoomSummary, select_and_order, transitions};
use crate::utils::{AppError, AppResult};
use shared::models::{BaseStatus, BedConfiguration, RoomAction};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter mode; defaults per the caller's role when absent
    pub filter: Option<FilterMode>,
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub filter: FilterMode,
    /// Transitions the caller's role may perform, so the client can
    /// render controls without a second request.
    pub permitted_actions: Vec<RoomAction>,
    pub rooms: Vec<RoomSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BaseStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReportProblemRequest {
    pub description: String,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecleanRequest {
    pub reason: String,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub bed_configuration: BedConfiguration,
}

/// GET /api/rooms?filter= - filtered, ordered room list
///
/// Reads the watcher's latest derived snapshot; no database round-trip.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RoomListResponse>> {
    let filter = query
        .filter
        .unwrap_or_else(|| FilterMode::default_for_role(user.role));
    let rooms = state.subscribe_rooms().borrow().clone();
    Ok(Json(RoomListResponse {
        filter,
        permitted_actions: user.role.permitted_actions(),
        rooms: select_and_order(&rooms, filter),
    }))
}

/// GET /api/rooms/stream - SSE stream of derived room lists
///
/// Emits the current list immediately, then one event per change. The
/// subscription dies with the connection; dropping the receiver is the
/// entire teardown.
pub async fn stream(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_rooms();

    let stream = futures::stream::unfold((rx, true), |(mut rx, initial)| async move {
        if !initial && rx.changed().await.is_err() {
            // Sender gone (shutdown); end the stream.
            return None;
        }
        let rooms = rx.borrow_and_update().clone();
        let event = Event::default().event("rooms").json_data(&rooms).ok()?;
        Some((Ok(event), (rx, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/rooms/{id} - single room detail
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let names = name_map(&state).await?;
    Ok(Json(RoomSummary::from_room(&room, &names)))
}

/// PUT /api/rooms/{id}/status - set base status
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) = transitions::set_base_status(&room, req.status, &user.actor())?;
    persist(&state, &id, patch).await
}

/// POST /api/rooms/{id}/block - toggle the block overlay
pub async fn toggle_block(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) = transitions::toggle_block(&room, &user.actor())?;
    persist(&state, &id, patch).await
}

/// POST /api/rooms/{id}/problems - report a problem
pub async fn report_problem(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ReportProblemRequest>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) =
        transitions::report_problem(&room, &req.description, req.evidence, &user.actor())?;
    persist(&state, &id, patch).await
}

/// PUT /api/rooms/{id}/problems/{problem_id}/resolve - resolve a problem
pub async fn resolve_problem(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, problem_id)): Path<(String, String)>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) = transitions::resolve_problem(&room, &problem_id, &user.actor())?;
    persist(&state, &id, patch).await
}

/// POST /api/rooms/{id}/reclean - send back to housekeeping with context
pub async fn mark_for_reclean(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<RecleanRequest>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) =
        transitions::mark_for_reclean(&room, &req.reason, req.evidence, &user.actor())?;
    persist(&state, &id, patch).await
}

/// POST /api/rooms/{id}/check - flag a checkout for bed-specific servicing
pub async fn mark_for_check(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CheckRequest>,
) -> AppResult<Json<RoomSummary>> {
    let room = load_room(&state, &id).await?;
    let (_, patch) = transitions::mark_for_check(&room, req.bed_configuration, &user.actor())?;
    persist(&state, &id, patch).await
}

async fn load_room(state: &ServerState, number: &str) -> AppResult<Room> {
    RoomRepository::new(state.get_db())
        .find_by_number(number)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Room {} not found", number)))
}

async fn name_map(state: &ServerState) -> AppResult<HashMap<String, String>> {
    staff_names(&StaffRepository::new(state.get_db())).await
}

/// Persist the patch and return the projected result to the caller.
async fn persist(
    state: &ServerState,
    number: &str,
    patch: transitions::RoomPatch,
) -> AppResult<Json<RoomSummary>> {
    let updated = RoomRepository::new(state.get_db())
        .apply_patch(number, patch)
        .await?;
    let names = name_map(state).await?;
    Ok(Json(RoomSummary::from_room(&updated, &names)))
}
