use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::{CatalogItem, TodayPlan};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::{
    AddPlanRequest, CalendarView, CatalogProgressRequest, CreateCatalogRequest, QuadrantRequest,
    QuadrantView, ReorderEntry,
};

/// `?date=YYYY-MM-DD`, defaulting to today.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    pub fn resolve(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| now().date())
    }
}

pub async fn handle_catalog_create(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<CreateCatalogRequest>,
) -> PlanResult<(StatusCode, Json<CatalogItem>)> {
    let item = state
        .transact(move |conn, _| super::create_catalog_item(conn, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn handle_catalog_list(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Vec<CatalogItem>>> {
    state
        .query(move |conn| super::list_catalog(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_catalog_deactivate(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<CatalogItem>> {
    state
        .transact(move |conn, _| super::deactivate_catalog_item(conn, &actor, id, now()))
        .await
        .map(Json)
}

pub async fn handle_catalog_progress(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<CatalogProgressRequest>,
) -> PlanResult<Json<CatalogItem>> {
    state
        .transact(move |conn, _| {
            super::set_catalog_progress(conn, &actor, id, &body.progress_percentage, now())
        })
        .await
        .map(Json)
}

pub async fn handle_catalog_refresh(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
) -> PlanResult<Json<CatalogItem>> {
    state
        .transact(move |conn, _| super::refresh_catalog_progress(conn, &actor, id, now()))
        .await
        .map(Json)
}

pub async fn handle_plan_add(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<AddPlanRequest>,
) -> PlanResult<(StatusCode, Json<TodayPlan>)> {
    let plan = state
        .transact(move |conn, _| super::add_from_catalog(conn, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn handle_plan_day(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<DateQuery>,
) -> PlanResult<Json<Vec<TodayPlan>>> {
    let date = query.resolve();
    state
        .query(move |conn| super::list_day(conn, &actor, date))
        .await
        .map(Json)
}

pub async fn handle_plan_reorder(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<Vec<ReorderEntry>>,
) -> PlanResult<Json<Vec<TodayPlan>>> {
    state
        .transact(move |conn, _| super::reorder(conn, &actor, &body, now()))
        .await
        .map(Json)
}

pub async fn handle_plan_quadrant(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<i32>,
    Json(body): Json<QuadrantRequest>,
) -> PlanResult<Json<TodayPlan>> {
    state
        .transact(move |conn, _| super::update_quadrant(conn, &actor, id, &body.quadrant, now()))
        .await
        .map(Json)
}

pub async fn handle_view_quadrants(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<DateQuery>,
) -> PlanResult<Json<QuadrantView>> {
    let date = query.resolve();
    state
        .query(move |conn| super::by_quadrant(conn, &actor, date))
        .await
        .map(Json)
}

pub async fn handle_view_week(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<DateQuery>,
) -> PlanResult<Json<CalendarView>> {
    let date = query.resolve();
    state
        .query(move |conn| super::week_view(conn, &actor, date))
        .await
        .map(Json)
}

pub async fn handle_view_month(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Query(query): Query<DateQuery>,
) -> PlanResult<Json<CalendarView>> {
    let date = query.resolve();
    state
        .query(move |conn| super::month_view(conn, &actor, date))
        .await
        .map(Json)
}
