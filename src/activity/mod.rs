//! Activity tracking
//!
//! A plan slot moves PLANNED -> IN_ACTIVITY when its session starts, then to
//! COMPLETED or MOVED_TO_PENDING when the session stops. A user has at most
//! one running session at a time; starting another one is refused rather
//! than stopping the first.

pub mod day_session;
pub mod handlers;
pub mod pending;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Days, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{ActivityStatus, PendingStatus, PlanStatus};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    ActivityLog, NewActivityLog, NewPendingItem, PendingItem, TodayPlan,
};
use crate::core::shared::schema::{activity_logs, pending_items, today_plans};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::round2;
use crate::core::urls::ApiUrls;
use crate::planner::scheduler::load_owned_plan;

pub const DEFAULT_PENDING_REASON: &str = "Not completed";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopRequest {
    #[serde(default)]
    pub is_completed: bool,
    pub work_notes: Option<String>,
    pub minutes_left: Option<i32>,
    pub reason: Option<String>,
    pub user_start_time: Option<NaiveDateTime>,
    pub user_end_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopOutcome {
    pub log: ActivityLog,
    pub plan: TodayPlan,
    pub pending: Option<PendingItem>,
}

/// Time actually worked, from the log's start to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkedTime {
    pub minutes: i32,
    pub hours: f64,
    pub extra_hours: f64,
}

impl WorkedTime {
    pub fn between(start: NaiveDateTime, end: NaiveDateTime, planned_minutes: i32) -> Self {
        let minutes = (end - start).num_minutes().max(0) as i32;
        let extra = (minutes - planned_minutes).max(0);
        Self {
            minutes,
            hours: round2(f64::from(minutes) / 60.0),
            extra_hours: round2(f64::from(extra) / 60.0),
        }
    }
}

fn running_log(conn: &mut SqliteConnection, user_id: i32) -> PlanResult<Option<ActivityLog>> {
    Ok(activity_logs::table
        .filter(activity_logs::user_id.eq(user_id))
        .filter(activity_logs::status.eq(ActivityStatus::InProgress))
        .select(ActivityLog::as_select())
        .first(conn)
        .optional()?)
}

pub(crate) fn has_running_log(conn: &mut SqliteConnection, user_id: i32) -> PlanResult<bool> {
    Ok(running_log(conn, user_id)?.is_some())
}

/// Starts the session for a plan slot.
pub fn move_to_activity_log(
    conn: &mut SqliteConnection,
    actor: &Actor,
    plan_id: i32,
    now: NaiveDateTime,
) -> PlanResult<ActivityLog> {
    conn.transaction(|conn| {
        let plan = load_owned_plan(conn, actor.id, plan_id)?;
        if let Some(running) = running_log(conn, actor.id)? {
            return Err(PlanError::conflict(format!(
                "activity {} is still in progress; stop it first",
                running.id
            )));
        }
        if plan.status.is_terminal() {
            return Err(PlanError::conflict(format!(
                "plan {} is already {}",
                plan.id, plan.status
            )));
        }

        let log: ActivityLog = diesel::insert_into(activity_logs::table)
            .values(&NewActivityLog {
                today_plan_id: plan.id,
                user_id: actor.id,
                actual_start_time: now,
                status: ActivityStatus::InProgress,
                is_task_completed: false,
                created_at: now,
                updated_at: now,
            })
            .get_result(conn)?;
        diesel::update(today_plans::table.find(plan.id))
            .set((
                today_plans::status.eq(PlanStatus::InActivity),
                today_plans::updated_at.eq(now),
            ))
            .execute(conn)?;

        info!(
            "[ACTIVITY] User {} started activity {} for plan {}",
            actor.id, log.id, plan.id
        );
        Ok(log)
    })
}

/// Ends a running session. An unfinished one sends its slot to the pending list.
pub fn stop(
    conn: &mut SqliteConnection,
    actor: &Actor,
    log_id: i32,
    request: &StopRequest,
    now: NaiveDateTime,
) -> PlanResult<StopOutcome> {
    if matches!(request.minutes_left, Some(m) if m < 0) {
        return Err(PlanError::validation("minutes_left cannot be negative"));
    }
    if let (Some(start), Some(end)) = (request.user_start_time, request.user_end_time) {
        if end < start {
            return Err(PlanError::validation(
                "user_end_time cannot be before user_start_time",
            ));
        }
    }

    conn.transaction(|conn| {
        let log: ActivityLog = activity_logs::table
            .find(log_id)
            .filter(activity_logs::user_id.eq(actor.id))
            .select(ActivityLog::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| PlanError::not_found(format!("activity {log_id}")))?;
        if log.status != ActivityStatus::InProgress {
            return Err(PlanError::conflict(format!(
                "activity {} is {}",
                log.id, log.status
            )));
        }
        let plan = load_owned_plan(conn, actor.id, log.today_plan_id)?;
        let worked = WorkedTime::between(log.actual_start_time, now, plan.planned_duration_minutes);

        let (log_status, plan_status) = if request.is_completed {
            (ActivityStatus::Completed, PlanStatus::Completed)
        } else {
            (ActivityStatus::Stopped, PlanStatus::MovedToPending)
        };

        let log: ActivityLog = diesel::update(activity_logs::table.find(log.id))
            .set((
                activity_logs::actual_end_time.eq(Some(now)),
                activity_logs::minutes_worked.eq(worked.minutes),
                activity_logs::hours_worked.eq(worked.hours),
                activity_logs::extra_hours.eq(worked.extra_hours),
                activity_logs::status.eq(log_status),
                activity_logs::work_notes.eq(request.work_notes.clone()),
                activity_logs::is_task_completed.eq(request.is_completed),
                activity_logs::user_start_time.eq(request.user_start_time),
                activity_logs::user_end_time.eq(request.user_end_time),
                activity_logs::updated_at.eq(now),
            ))
            .get_result(conn)?;
        let plan: TodayPlan = diesel::update(today_plans::table.find(plan.id))
            .set((
                today_plans::status.eq(plan_status),
                today_plans::updated_at.eq(now),
            ))
            .get_result(conn)?;

        let pending = if request.is_completed {
            None
        } else {
            let minutes_left = request
                .minutes_left
                .unwrap_or_else(|| (plan.planned_duration_minutes - worked.minutes).max(0));
            let reason = request
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_PENDING_REASON)
                .to_string();
            let item: PendingItem = diesel::insert_into(pending_items::table)
                .values(&NewPendingItem {
                    user_id: actor.id,
                    today_plan_id: plan.id,
                    activity_log_id: Some(log.id),
                    original_plan_date: plan.plan_date,
                    minutes_left,
                    reason: Some(reason),
                    status: PendingStatus::Pending,
                    created_at: now,
                    updated_at: now,
                })
                .get_result(conn)?;
            Some(item)
        };

        info!(
            "[ACTIVITY] User {} stopped activity {} after {} min ({})",
            actor.id, log.id, worked.minutes, log.status
        );
        Ok(StopOutcome { log, plan, pending })
    })
}

/// Logs started on `date`.
pub fn list_logs(
    conn: &mut SqliteConnection,
    actor: &Actor,
    date: NaiveDate,
) -> PlanResult<Vec<ActivityLog>> {
    let (from, to) = day_range(date)?;
    Ok(activity_logs::table
        .filter(activity_logs::user_id.eq(actor.id))
        .filter(activity_logs::actual_start_time.ge(from))
        .filter(activity_logs::actual_start_time.lt(to))
        .order((activity_logs::actual_start_time.asc(), activity_logs::id.asc()))
        .select(ActivityLog::as_select())
        .load(conn)?)
}

pub fn active_log(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<Option<ActivityLog>> {
    running_log(conn, actor.id)
}

/// Half-open `[date 00:00, next day 00:00)`.
pub(crate) fn day_range(date: NaiveDate) -> PlanResult<(NaiveDateTime, NaiveDateTime)> {
    let next = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| PlanError::validation(format!("date out of range: {date}")))?;
    Ok((
        date.and_time(chrono::NaiveTime::MIN),
        next.and_time(chrono::NaiveTime::MIN),
    ))
}

pub fn configure_activity_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::ACTIVITY_LOGS, get(handlers::handle_log_list))
        .route(ApiUrls::ACTIVITY_ACTIVE, get(handlers::handle_log_active))
        .route(ApiUrls::ACTIVITY_START, post(handlers::handle_log_start))
        .route(ApiUrls::ACTIVITY_STOP, post(handlers::handle_log_stop))
        .route(ApiUrls::PENDING, get(handlers::handle_pending_list))
        .route(ApiUrls::PENDING_REPLAN, post(handlers::handle_pending_replan))
        .route(ApiUrls::PENDING_CANCEL, post(handlers::handle_pending_cancel))
        .route(ApiUrls::DAY_SESSION, get(handlers::handle_session_current))
        .route(ApiUrls::DAY_SESSION_START, post(handlers::handle_session_start))
        .route(ApiUrls::DAY_SESSION_END, post(handlers::handle_session_end))
}
