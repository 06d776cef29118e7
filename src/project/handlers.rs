use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::Project;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::{
    CreateProjectRequest, ProjectCompletion, ProjectCreated, ProjectDetail, ProjectStatusRequest,
    ProjectSummary,
};

pub async fn handle_project_create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<CreateProjectRequest>,
) -> PlanResult<(StatusCode, Json<ProjectCreated>)> {
    let created = state
        .transact(move |conn, outbox| super::create_project(conn, outbox, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_project_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Vec<ProjectSummary>>> {
    state
        .query(move |conn| super::list_projects(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_project_get(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<ProjectDetail>> {
    state
        .query(move |conn| super::get_project(conn, &actor, id))
        .await
        .map(Json)
}

pub async fn handle_project_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<ProjectStatusRequest>,
) -> PlanResult<Json<Project>> {
    state
        .transact(move |conn, _| super::update_project_status(conn, &actor, id, body.status))
        .await
        .map(Json)
}

pub async fn handle_project_complete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<ProjectCompletion>> {
    state
        .transact(move |conn, outbox| {
            super::request_project_completion(conn, outbox, &actor, id, now())
        })
        .await
        .map(Json)
}
