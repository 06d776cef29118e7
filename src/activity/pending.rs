//! Pending re-plan list
//!
//! Replanning only records the new date. Putting the work back on a day is
//! a separate call to the scheduler.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::Deserialize;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::PendingStatus;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::PendingItem;
use crate::core::shared::schema::pending_items;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplanRequest {
    pub replanned_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingFilters {
    pub status: Option<PendingStatus>,
}

fn load_open_item(
    conn: &mut SqliteConnection,
    actor: &Actor,
    pending_id: i32,
) -> PlanResult<PendingItem> {
    let item: PendingItem = pending_items::table
        .find(pending_id)
        .filter(pending_items::user_id.eq(actor.id))
        .select(PendingItem::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("pending item {pending_id}")))?;
    if item.status != PendingStatus::Pending {
        return Err(PlanError::conflict(format!(
            "pending item {} is {}",
            item.id, item.status
        )));
    }
    Ok(item)
}

pub fn replan(
    conn: &mut SqliteConnection,
    actor: &Actor,
    pending_id: i32,
    new_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> PlanResult<PendingItem> {
    let new_date = new_date.ok_or_else(|| PlanError::validation("replanned_date is required"))?;
    conn.transaction(|conn| {
        let item = load_open_item(conn, actor, pending_id)?;
        let item: PendingItem = diesel::update(pending_items::table.find(item.id))
            .set((
                pending_items::replanned_date.eq(Some(new_date)),
                pending_items::status.eq(PendingStatus::Replanned),
                pending_items::updated_at.eq(now),
            ))
            .get_result(conn)?;
        info!(
            "[PENDING] User {} replanned item {} to {}",
            actor.id, item.id, new_date
        );
        Ok(item)
    })
}

pub fn cancel(
    conn: &mut SqliteConnection,
    actor: &Actor,
    pending_id: i32,
    now: NaiveDateTime,
) -> PlanResult<PendingItem> {
    conn.transaction(|conn| {
        let item = load_open_item(conn, actor, pending_id)?;
        Ok(diesel::update(pending_items::table.find(item.id))
            .set((
                pending_items::status.eq(PendingStatus::Cancelled),
                pending_items::updated_at.eq(now),
            ))
            .get_result(conn)?)
    })
}

pub fn list_pending(
    conn: &mut SqliteConnection,
    actor: &Actor,
    status: Option<PendingStatus>,
) -> PlanResult<Vec<PendingItem>> {
    let mut query = pending_items::table
        .filter(pending_items::user_id.eq(actor.id))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(pending_items::status.eq(status));
    }
    Ok(query
        .order((pending_items::created_at.desc(), pending_items::id.desc()))
        .select(PendingItem::as_select())
        .load(conn)?)
}
