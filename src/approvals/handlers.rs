use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::ApprovalRequest;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::{
    ApprovalFilters, ApprovalRequestDetail, ApprovalResolution, ModificationRequest,
    RespondRequest,
};

pub async fn handle_approval_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(filters): Query<ApprovalFilters>,
) -> PlanResult<Json<Vec<ApprovalRequest>>> {
    state
        .query(move |conn| super::list_requests(conn, &actor, &filters))
        .await
        .map(Json)
}

pub async fn handle_approval_get(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<ApprovalRequestDetail>> {
    state
        .query(move |conn| super::get_request(conn, &actor, id))
        .await
        .map(Json)
}

pub async fn handle_approval_respond(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<RespondRequest>,
) -> PlanResult<Json<ApprovalResolution>> {
    state
        .transact(move |conn, outbox| {
            super::respond(
                conn,
                outbox,
                &actor,
                id,
                body.action,
                body.rejection_reason,
                now(),
            )
        })
        .await
        .map(Json)
}

pub async fn handle_modification_submit(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<ModificationRequest>,
) -> PlanResult<Json<ApprovalRequest>> {
    state
        .transact(move |conn, outbox| super::submit_modification(conn, outbox, &actor, &body, now()))
        .await
        .map(Json)
}
