use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::Notification;
use crate::core::shared::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

pub async fn handle_notification_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<ListQuery>,
) -> PlanResult<Json<Vec<Notification>>> {
    state
        .query(move |conn| super::list(conn, actor.id, query.unread_only))
        .await
        .map(Json)
}

pub async fn handle_unread_count(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<UnreadCount>> {
    let count = state
        .query(move |conn| super::unread_count(conn, actor.id))
        .await?;
    Ok(Json(UnreadCount { count }))
}

pub async fn handle_mark_read(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<Notification>> {
    state
        .transact(move |conn, outbox| super::mark_read(conn, outbox, actor.id, id))
        .await
        .map(Json)
}

pub async fn handle_mark_all_read(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<MarkedRead>> {
    let updated = state
        .transact(move |conn, outbox| super::mark_all_read(conn, outbox, actor.id))
        .await?;
    Ok(Json(MarkedRead { updated }))
}
