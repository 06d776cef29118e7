use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::{ActivityLog, DaySession, PendingItem};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;
use crate::planner::handlers::DateQuery;

use super::day_session::{self, DaySummary};
use super::pending::{self, PendingFilters, ReplanRequest};
use super::{StopOutcome, StopRequest};

pub async fn handle_log_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<DateQuery>,
) -> PlanResult<Json<Vec<ActivityLog>>> {
    let date = query.resolve();
    state
        .query(move |conn| super::list_logs(conn, &actor, date))
        .await
        .map(Json)
}

pub async fn handle_log_active(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Option<ActivityLog>>> {
    state
        .query(move |conn| super::active_log(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_log_start(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(plan_id): Path<i32>,
) -> PlanResult<(StatusCode, Json<ActivityLog>)> {
    let log = state
        .transact(move |conn, _| super::move_to_activity_log(conn, &actor, plan_id, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn handle_log_stop(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(log_id): Path<i32>,
    Json(body): Json<StopRequest>,
) -> PlanResult<Json<StopOutcome>> {
    state
        .transact(move |conn, _| super::stop(conn, &actor, log_id, &body, now()))
        .await
        .map(Json)
}

pub async fn handle_pending_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(filters): Query<PendingFilters>,
) -> PlanResult<Json<Vec<PendingItem>>> {
    state
        .query(move |conn| pending::list_pending(conn, &actor, filters.status))
        .await
        .map(Json)
}

pub async fn handle_pending_replan(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<ReplanRequest>,
) -> PlanResult<Json<PendingItem>> {
    state
        .transact(move |conn, _| pending::replan(conn, &actor, id, body.replanned_date, now()))
        .await
        .map(Json)
}

pub async fn handle_pending_cancel(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<PendingItem>> {
    state
        .transact(move |conn, _| pending::cancel(conn, &actor, id, now()))
        .await
        .map(Json)
}

pub async fn handle_session_current(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Option<DaySession>>> {
    state
        .query(move |conn| day_session::current_session(conn, &actor, now()))
        .await
        .map(Json)
}

pub async fn handle_session_start(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<DaySession>> {
    state
        .transact(move |conn, _| day_session::start_day(conn, &actor, now()))
        .await
        .map(Json)
}

pub async fn handle_session_end(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<DaySummary>> {
    state
        .transact(move |conn, _| day_session::end_day(conn, &actor, now()))
        .await
        .map(Json)
}
