use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::state::AppState;

use super::types::{ProjectWorkStats, UsersForStats, WorkStatsQuery};

pub async fn handle_users_for_stats(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<UsersForStats>> {
    state
        .query(move |conn| super::users_for_stats(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_project_work_stats(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<WorkStatsQuery>,
) -> PlanResult<Json<ProjectWorkStats>> {
    state
        .query(move |conn| super::project_work_stats(conn, &actor, query.user_id))
        .await
        .map(Json)
}
