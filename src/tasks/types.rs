//! Types for the tasks module
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{
    AssigneeRole, RecurrencePattern, TaskPriority, TaskStatus, TaskType,
};
use crate::core::shared::models::{ApprovalRequest, Subtask, Task, TaskAssignee};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeInput {
    pub user_id: i32,
    #[serde(default = "default_assignee_role")]
    pub role: AssigneeRole,
}

fn default_assignee_role() -> AssigneeRole {
    AssigneeRole::Dev
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub project_id: i32,
    pub title: String,
    pub project_lead: Option<i32>,
    #[serde(default = "default_task_type")]
    pub task_type: TaskType,
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,
    pub start_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub next_occurrence: Option<NaiveDate>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub github_link: Option<String>,
    pub figma_link: Option<String>,
    #[serde(default)]
    pub assignees: Vec<AssigneeInput>,
}

fn default_task_type() -> TaskType {
    TaskType::Standard
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub github_link: Option<String>,
    pub figma_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilters {
    pub project_id: Option<i32>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubtaskRequest {
    pub title: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskCreated {
    pub task: Task,
    pub approval_request: Option<ApprovalRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub progress: i32,
    pub subtasks: Vec<Subtask>,
    pub assignees: Vec<TaskAssignee>,
}

/// Result of asking for a task to be completed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed {
        task: Task,
        successor: Option<Task>,
    },
    Requested {
        task: Task,
        approval_request: ApprovalRequest,
    },
}
