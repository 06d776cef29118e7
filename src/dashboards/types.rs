use serde::{Deserialize, Serialize};

use crate::core::shared::enums::ProjectStatus;
use crate::core::shared::models::User;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkStatsQuery {
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersForStats {
    pub count: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub project_id: i32,
    pub project_name: String,
    pub status: ProjectStatus,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_percentage: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectWorkStats {
    pub user: User,
    pub total_projects: usize,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overall_completion_percentage: i32,
    pub projects: Vec<ProjectStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
