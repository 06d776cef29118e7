use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::QuickNote;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::NoteRequest;

pub async fn handle_note_create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<NoteRequest>,
) -> PlanResult<(StatusCode, Json<QuickNote>)> {
    let note = state
        .transact(move |conn, _| super::create_note(conn, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn handle_note_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Vec<QuickNote>>> {
    state
        .query(move |conn| super::list_notes(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_note_get(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<QuickNote>> {
    state
        .query(move |conn| super::get_note(conn, &actor, id))
        .await
        .map(Json)
}

pub async fn handle_note_update(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<NoteRequest>,
) -> PlanResult<Json<QuickNote>> {
    state
        .transact(move |conn, _| super::update_note(conn, &actor, id, &body, now()))
        .await
        .map(Json)
}

pub async fn handle_note_delete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<StatusCode> {
    state
        .transact(move |conn, _| super::delete_note(conn, &actor, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
