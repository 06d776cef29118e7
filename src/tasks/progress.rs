//! Weighted progress rollup: subtasks into tasks, tasks into projects,
//! and either of them into linked catalog items.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::core::shared::enums::TaskStatus;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::CatalogItem;
use crate::core::shared::schema::{catalog_items, subtasks, tasks};
use crate::core::shared::utils::round_percent;

/// Integer shares of 100 for `n` siblings; the first `100 % n` get one extra point.
pub fn distribute_weights(n: usize) -> Vec<i32> {
    if n == 0 {
        return Vec::new();
    }
    let base = 100 / n as i32;
    let remainder = 100 % n as i32;
    (0..n as i32)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// `round(100 * done / total)` over `(weight, is_done)` pairs, 0 when nothing carries weight.
pub fn weighted_progress(weights: &[(i32, bool)]) -> i32 {
    let total: i64 = weights.iter().map(|(w, _)| i64::from(*w)).sum();
    let done: i64 = weights
        .iter()
        .filter(|(_, done)| *done)
        .map(|(w, _)| i64::from(*w))
        .sum();
    round_percent(done as f64, total as f64)
}

/// Renormalizes sibling weights to sum to exactly 100, in creation order.
pub fn recalculate_subtask_weights(
    conn: &mut SqliteConnection,
    task_id: i32,
) -> PlanResult<Vec<i32>> {
    conn.transaction(|conn| {
        let ids: Vec<i32> = subtasks::table
            .filter(subtasks::task_id.eq(task_id))
            .order((subtasks::created_at.asc(), subtasks::id.asc()))
            .select(subtasks::id)
            .load(conn)?;

        let weights = distribute_weights(ids.len());
        for (id, weight) in ids.iter().zip(&weights) {
            diesel::update(subtasks::table.find(id))
                .set(subtasks::progress_weight.eq(weight))
                .execute(conn)?;
        }
        Ok(weights)
    })
}

pub fn task_progress(conn: &mut SqliteConnection, task_id: i32) -> PlanResult<i32> {
    let rows: Vec<(i32, TaskStatus)> = subtasks::table
        .filter(subtasks::task_id.eq(task_id))
        .select((subtasks::progress_weight, subtasks::status))
        .load(conn)?;
    let pairs: Vec<(i32, bool)> = rows
        .into_iter()
        .map(|(w, status)| (w, status == TaskStatus::Done))
        .collect();
    Ok(weighted_progress(&pairs))
}

/// Unweighted mean of task progress; each task counts once regardless of size.
pub fn project_progress(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<i32> {
    let task_ids: Vec<i32> = tasks::table
        .filter(tasks::project_id.eq(project_id))
        .select(tasks::id)
        .load(conn)?;
    if task_ids.is_empty() {
        return Ok(0);
    }
    let mut sum = 0i64;
    for id in &task_ids {
        sum += i64::from(task_progress(conn, *id)?);
    }
    Ok((sum as f64 / task_ids.len() as f64).round() as i32)
}

fn floor_percent(part: i64, whole: i64) -> i32 {
    if whole <= 0 {
        0
    } else {
        (100 * part / whole) as i32
    }
}

fn linked_task_progress(conn: &mut SqliteConnection, task_id: i32) -> PlanResult<Option<i32>> {
    let status: Option<TaskStatus> = tasks::table
        .find(task_id)
        .select(tasks::status)
        .first(conn)
        .optional()?;
    let Some(status) = status else {
        return Ok(None);
    };
    let value = match status {
        TaskStatus::Done => 100,
        TaskStatus::InProgress => {
            let statuses: Vec<TaskStatus> = subtasks::table
                .filter(subtasks::task_id.eq(task_id))
                .select(subtasks::status)
                .load(conn)?;
            if statuses.is_empty() {
                50
            } else {
                let done = statuses.iter().filter(|s| **s == TaskStatus::Done).count();
                floor_percent(done as i64, statuses.len() as i64)
            }
        }
        TaskStatus::Pending => 0,
    };
    Ok(Some(value))
}

fn linked_project_progress(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<i32> {
    let statuses: Vec<TaskStatus> = tasks::table
        .filter(tasks::project_id.eq(project_id))
        .select(tasks::status)
        .load(conn)?;
    let done = statuses.iter().filter(|s| **s == TaskStatus::Done).count();
    Ok(floor_percent(done as i64, statuses.len() as i64))
}

/// Derives a catalog item's progress from whatever it links to and stores it.
pub fn catalog_progress(
    conn: &mut SqliteConnection,
    catalog_id: i32,
    now: NaiveDateTime,
) -> PlanResult<i32> {
    conn.transaction(|conn| {
        let item: CatalogItem = catalog_items::table
            .find(catalog_id)
            .select(CatalogItem::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| PlanError::not_found(format!("catalog item {catalog_id}")))?;

        let computed = if let Some(task_id) = item.task_id {
            linked_task_progress(conn, task_id)?.unwrap_or(item.progress_percentage)
        } else if let Some(project_id) = item.project_id {
            linked_project_progress(conn, project_id)?
        } else {
            item.progress_percentage
        };

        if computed != item.progress_percentage {
            diesel::update(catalog_items::table.find(catalog_id))
                .set((
                    catalog_items::progress_percentage.eq(computed),
                    catalog_items::updated_at.eq(now),
                ))
                .execute(conn)?;
        }
        Ok(computed)
    })
}

/// Maintenance sweep over every task that has subtasks. Returns tasks touched.
pub fn recalculate_all_weights(conn: &mut SqliteConnection) -> PlanResult<usize> {
    conn.transaction(|conn| {
        let task_ids: Vec<i32> = subtasks::table
            .select(subtasks::task_id)
            .distinct()
            .order(subtasks::task_id.asc())
            .load(conn)?;
        for task_id in &task_ids {
            recalculate_subtask_weights(conn, *task_id)?;
        }
        info!("[PROGRESS] Renormalized weights for {} tasks", task_ids.len());
        Ok(task_ids.len())
    })
}
