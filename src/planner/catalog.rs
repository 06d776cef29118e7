//! Catalog of schedulable work items.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::Deserialize;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{CatalogType, Role};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{CatalogItem, NewCatalogItem};
use crate::core::shared::schema::catalog_items;
use crate::project::load_visible_project;
use crate::tasks::load_visible_task;
use crate::tasks::progress::catalog_progress;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCatalogRequest {
    pub name: String,
    pub description: Option<String>,
    pub catalog_type: CatalogType,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,
    /// Shared items have no owner and show up in everyone's catalog.
    #[serde(default)]
    pub shared: bool,
}

fn default_estimated_hours() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProgressRequest {
    pub progress_percentage: serde_json::Value,
}

/// Accepts only JSON integers in 0..=100.
pub fn parse_progress(value: &serde_json::Value) -> PlanResult<i32> {
    let n = value
        .as_i64()
        .ok_or_else(|| PlanError::validation(format!("progress must be an integer, got {value}")))?;
    if !(0..=100).contains(&n) {
        return Err(PlanError::validation(format!(
            "progress must be between 0 and 100, got {n}"
        )));
    }
    Ok(n as i32)
}

/// Active items the user owns plus shared ones. Anything else reads as missing.
pub(crate) fn load_visible_item(
    conn: &mut SqliteConnection,
    actor: &Actor,
    catalog_id: i32,
) -> PlanResult<CatalogItem> {
    catalog_items::table
        .find(catalog_id)
        .select(CatalogItem::as_select())
        .first(conn)
        .optional()?
        .filter(|item| item.user_id.is_none() || item.user_id == Some(actor.id))
        .ok_or_else(|| PlanError::not_found(format!("catalog item {catalog_id}")))
}

/// Owners edit their own items; shared items belong to admins.
fn load_writable_item(
    conn: &mut SqliteConnection,
    actor: &Actor,
    catalog_id: i32,
) -> PlanResult<CatalogItem> {
    let item = load_visible_item(conn, actor, catalog_id)?;
    if item.user_id.is_none() && !actor.is_admin() {
        return Err(PlanError::forbidden(format!(
            "catalog item {catalog_id} is shared"
        )));
    }
    Ok(item)
}

pub fn create_catalog_item(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request: &CreateCatalogRequest,
    now: NaiveDateTime,
) -> PlanResult<CatalogItem> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(PlanError::validation("catalog name is required"));
    }
    if !request.estimated_hours.is_finite() || request.estimated_hours < 0.0 {
        return Err(PlanError::validation("estimated_hours cannot be negative"));
    }
    match request.catalog_type {
        CatalogType::Project if request.project_id.is_none() => {
            return Err(PlanError::validation("PROJECT items need a project_id"));
        }
        CatalogType::Task if request.task_id.is_none() => {
            return Err(PlanError::validation("TASK items need a task_id"));
        }
        _ => {}
    }
    if request.shared {
        actor.require(Role::TeamLead)?;
    }

    conn.transaction(|conn| {
        // Links only to work the actor can already see.
        if let Some(project_id) = request.project_id {
            load_visible_project(conn, actor, project_id)?;
        }
        if let Some(task_id) = request.task_id {
            load_visible_task(conn, actor, task_id)?;
        }

        let item: CatalogItem = diesel::insert_into(catalog_items::table)
            .values(&NewCatalogItem {
                user_id: if request.shared { None } else { Some(actor.id) },
                name: name.to_string(),
                description: request.description.clone(),
                catalog_type: request.catalog_type,
                project_id: request.project_id,
                task_id: request.task_id,
                estimated_hours: request.estimated_hours,
                progress_percentage: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .get_result(conn)?;
        info!(
            "[CATALOG] User {} created {} item {} '{}'",
            actor.id, item.catalog_type, item.id, item.name
        );
        Ok(item)
    })
}

pub fn list_catalog(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<Vec<CatalogItem>> {
    Ok(catalog_items::table
        .filter(catalog_items::is_active.eq(true))
        .filter(
            catalog_items::user_id
                .eq(actor.id)
                .or(catalog_items::user_id.is_null()),
        )
        .order((catalog_items::name.asc(), catalog_items::id.asc()))
        .select(CatalogItem::as_select())
        .load(conn)?)
}

pub fn set_catalog_progress(
    conn: &mut SqliteConnection,
    actor: &Actor,
    catalog_id: i32,
    value: &serde_json::Value,
    now: NaiveDateTime,
) -> PlanResult<CatalogItem> {
    let progress = parse_progress(value)?;
    conn.transaction(|conn| {
        let item = load_writable_item(conn, actor, catalog_id)?;
        Ok(diesel::update(catalog_items::table.find(item.id))
            .set((
                catalog_items::progress_percentage.eq(progress),
                catalog_items::updated_at.eq(now),
            ))
            .get_result(conn)?)
    })
}

/// Recomputes progress from the linked task or project and returns the stored row.
pub fn refresh_catalog_progress(
    conn: &mut SqliteConnection,
    actor: &Actor,
    catalog_id: i32,
    now: NaiveDateTime,
) -> PlanResult<CatalogItem> {
    conn.transaction(|conn| {
        let item = load_visible_item(conn, actor, catalog_id)?;
        catalog_progress(conn, item.id, now)?;
        Ok(catalog_items::table
            .find(item.id)
            .select(CatalogItem::as_select())
            .first(conn)?)
    })
}

pub fn deactivate_catalog_item(
    conn: &mut SqliteConnection,
    actor: &Actor,
    catalog_id: i32,
    now: NaiveDateTime,
) -> PlanResult<CatalogItem> {
    conn.transaction(|conn| {
        let item = load_writable_item(conn, actor, catalog_id)?;
        let item: CatalogItem = diesel::update(catalog_items::table.find(item.id))
            .set((
                catalog_items::is_active.eq(false),
                catalog_items::updated_at.eq(now),
            ))
            .get_result(conn)?;
        info!("[CATALOG] Deactivated item {}", item.id);
        Ok(item)
    })
}
