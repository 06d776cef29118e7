use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::{Department, User};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::{CreateDepartmentRequest, CreateUserRequest};

#[derive(Debug, Deserialize)]
pub struct UserActiveRequest {
    pub is_active: bool,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<CreateUserRequest>,
) -> PlanResult<(StatusCode, Json<User>)> {
    let user = state
        .transact(move |conn, _| super::create_user(conn, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
) -> PlanResult<Json<Vec<User>>> {
    state.query(super::list_users).await.map(Json)
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Path(user_id): Path<i32>,
) -> PlanResult<Json<User>> {
    state
        .query(move |conn| super::get_user(conn, user_id))
        .await
        .map(Json)
}

pub async fn set_user_active(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(user_id): Path<i32>,
    Json(body): Json<UserActiveRequest>,
) -> PlanResult<Json<User>> {
    state
        .transact(move |conn, _| super::set_user_active(conn, &actor, user_id, body.is_active))
        .await
        .map(Json)
}

pub async fn create_department(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<CreateDepartmentRequest>,
) -> PlanResult<(StatusCode, Json<Department>)> {
    let department = state
        .transact(move |conn, _| super::create_department(conn, &actor, &body.name, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
) -> PlanResult<Json<Vec<Department>>> {
    state.query(super::list_departments).await.map(Json)
}
