use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{
    ActivityStatus, CatalogType, PendingStatus, PlanStatus, Quadrant,
};
use crate::core::shared::schema::{
    activity_logs, catalog_items, day_sessions, pending_items, quick_notes, today_plans,
};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = catalog_items)]
pub struct CatalogItem {
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub catalog_type: CatalogType,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
    pub estimated_hours: f64,
    pub progress_percentage: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = catalog_items)]
pub struct NewCatalogItem {
    pub user_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub catalog_type: CatalogType,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
    pub estimated_hours: f64,
    pub progress_percentage: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = today_plans)]
pub struct TodayPlan {
    pub id: i32,
    pub user_id: i32,
    pub catalog_id: i32,
    pub plan_date: NaiveDate,
    pub scheduled_start_time: NaiveTime,
    pub scheduled_end_time: NaiveTime,
    pub planned_duration_minutes: i32,
    pub quadrant: Quadrant,
    pub order_index: i32,
    pub status: PlanStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = today_plans)]
pub struct NewTodayPlan {
    pub user_id: i32,
    pub catalog_id: i32,
    pub plan_date: NaiveDate,
    pub scheduled_start_time: NaiveTime,
    pub scheduled_end_time: NaiveTime,
    pub planned_duration_minutes: i32,
    pub quadrant: Quadrant,
    pub order_index: i32,
    pub status: PlanStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = activity_logs)]
pub struct ActivityLog {
    pub id: i32,
    pub today_plan_id: i32,
    pub user_id: i32,
    pub actual_start_time: NaiveDateTime,
    pub actual_end_time: Option<NaiveDateTime>,
    pub hours_worked: f64,
    pub minutes_worked: i32,
    pub extra_hours: f64,
    pub status: ActivityStatus,
    pub work_notes: Option<String>,
    pub is_task_completed: bool,
    pub user_start_time: Option<NaiveDateTime>,
    pub user_end_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityLog {
    pub today_plan_id: i32,
    pub user_id: i32,
    pub actual_start_time: NaiveDateTime,
    pub status: ActivityStatus,
    pub is_task_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = pending_items)]
pub struct PendingItem {
    pub id: i32,
    pub user_id: i32,
    pub today_plan_id: i32,
    pub activity_log_id: Option<i32>,
    pub original_plan_date: NaiveDate,
    pub replanned_date: Option<NaiveDate>,
    pub minutes_left: i32,
    pub reason: Option<String>,
    pub status: PendingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pending_items)]
pub struct NewPendingItem {
    pub user_id: i32,
    pub today_plan_id: i32,
    pub activity_log_id: Option<i32>,
    pub original_plan_date: NaiveDate,
    pub minutes_left: i32,
    pub reason: Option<String>,
    pub status: PendingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = day_sessions)]
pub struct DaySession {
    pub id: i32,
    pub user_id: i32,
    pub session_date: NaiveDate,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = day_sessions)]
pub struct NewDaySession {
    pub user_id: i32,
    pub session_date: NaiveDate,
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = quick_notes)]
pub struct QuickNote {
    pub id: i32,
    pub user_id: i32,
    pub note_text: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = quick_notes)]
pub struct NewQuickNote {
    pub user_id: i32,
    pub note_text: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
