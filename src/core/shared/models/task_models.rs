use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{
    AssigneeRole, RecurrencePattern, TaskPriority, TaskStatus, TaskType,
};
use crate::core::shared::schema::{subtasks, task_assignees, tasks};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = tasks)]
pub struct Task {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub project_lead: Option<i32>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub next_occurrence: Option<NaiveDate>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub github_link: Option<String>,
    pub figma_link: Option<String>,
    pub completed_at: Option<NaiveDate>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub project_id: i32,
    pub title: String,
    pub project_lead: Option<i32>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub next_occurrence: Option<NaiveDate>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub github_link: Option<String>,
    pub figma_link: Option<String>,
    pub completed_at: Option<NaiveDate>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = subtasks)]
pub struct Subtask {
    pub id: i32,
    pub task_id: i32,
    pub title: String,
    pub status: TaskStatus,
    pub progress_weight: i32,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subtasks)]
pub struct NewSubtask {
    pub task_id: i32,
    pub title: String,
    pub status: TaskStatus,
    pub progress_weight: i32,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = task_assignees)]
pub struct TaskAssignee {
    pub id: i32,
    pub task_id: i32,
    pub user_id: i32,
    pub role: AssigneeRole,
    pub assigned_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_assignees)]
pub struct NewTaskAssignee {
    pub task_id: i32,
    pub user_id: i32,
    pub role: AssigneeRole,
    pub assigned_at: NaiveDateTime,
}
