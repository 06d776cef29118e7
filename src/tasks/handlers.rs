//! HTTP handlers for tasks, assignees and subtasks

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::{Subtask, Task, TaskAssignee};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::types::{
    AssigneeInput, CompletionOutcome, CreateSubtaskRequest, CreateTaskRequest,
    SubtaskStatusRequest, TaskCreated, TaskDetail, TaskFilters, TaskUpdate,
};

pub async fn handle_task_create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<CreateTaskRequest>,
) -> PlanResult<(StatusCode, Json<TaskCreated>)> {
    let created = state
        .transact(move |conn, outbox| super::create_task(conn, outbox, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_task_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(filters): Query<TaskFilters>,
) -> PlanResult<Json<Vec<Task>>> {
    state
        .query(move |conn| super::list_tasks(conn, &actor, &filters))
        .await
        .map(Json)
}

pub async fn handle_task_get(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<TaskDetail>> {
    state
        .query(move |conn| super::get_task(conn, &actor, id))
        .await
        .map(Json)
}

pub async fn handle_task_update(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<TaskUpdate>,
) -> PlanResult<Json<Task>> {
    state
        .transact(move |conn, outbox| super::update_task(conn, outbox, &actor, id, &body, now()))
        .await
        .map(Json)
}

pub async fn handle_task_delete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<StatusCode> {
    state
        .transact(move |conn, _| super::delete_task(conn, &actor, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_task_complete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<CompletionOutcome>> {
    state
        .transact(move |conn, outbox| {
            super::request_task_completion(conn, outbox, &actor, id, now())
        })
        .await
        .map(Json)
}

pub async fn handle_task_assign(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<AssigneeInput>,
) -> PlanResult<(StatusCode, Json<TaskAssignee>)> {
    let assignee = state
        .transact(move |conn, outbox| {
            super::assign_user(conn, outbox, &actor, id, body.user_id, body.role, now())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(assignee)))
}

pub async fn handle_task_unassign(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path((id, user_id)): Path<(i32, i32)>,
) -> PlanResult<StatusCode> {
    state
        .transact(move |conn, _| super::unassign_user(conn, &actor, id, user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_subtask_create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<CreateSubtaskRequest>,
) -> PlanResult<(StatusCode, Json<Subtask>)> {
    let subtask = state
        .transact(move |conn, _| super::create_subtask(conn, &actor, id, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

pub async fn handle_subtask_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<Vec<Subtask>>> {
    state
        .query(move |conn| {
            let task = super::load_visible_task(conn, &actor, id)?;
            super::list_subtasks(conn, task.id)
        })
        .await
        .map(Json)
}

pub async fn handle_subtask_delete(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<StatusCode> {
    state
        .transact(move |conn, _| super::delete_subtask(conn, &actor, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_subtask_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<SubtaskStatusRequest>,
) -> PlanResult<Json<Subtask>> {
    state
        .transact(move |conn, outbox| {
            super::set_subtask_status(conn, outbox, &actor, id, body.status, now())
        })
        .await
        .map(Json)
}
