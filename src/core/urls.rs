//! Route paths for every HTTP endpoint, kept in one place so routers and
//! clients agree on them.

#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    pub const HEALTH: &'static str = "/health";

    // Directory
    pub const USERS: &'static str = "/api/users";
    pub const USER_BY_ID: &'static str = "/api/users/{id}";
    pub const USER_ACTIVE: &'static str = "/api/users/{id}/active";
    pub const DEPARTMENTS: &'static str = "/api/departments";

    // Notifications
    pub const NOTIFICATIONS: &'static str = "/api/notifications";
    pub const NOTIFICATIONS_UNREAD_COUNT: &'static str = "/api/notifications/unread-count";
    pub const NOTIFICATION_READ: &'static str = "/api/notifications/{id}/read";
    pub const NOTIFICATIONS_READ_ALL: &'static str = "/api/notifications/read-all";

    // Projects
    pub const PROJECTS: &'static str = "/api/projects";
    pub const PROJECT_BY_ID: &'static str = "/api/projects/{id}";
    pub const PROJECT_STATUS: &'static str = "/api/projects/{id}/status";
    pub const PROJECT_COMPLETE: &'static str = "/api/projects/{id}/complete";

    // Tasks
    pub const TASKS: &'static str = "/api/tasks";
    pub const TASK_BY_ID: &'static str = "/api/tasks/{id}";
    pub const TASK_COMPLETE: &'static str = "/api/tasks/{id}/complete";
    pub const TASK_ASSIGNEES: &'static str = "/api/tasks/{id}/assignees";
    pub const TASK_ASSIGNEE: &'static str = "/api/tasks/{id}/assignees/{user_id}";
    pub const TASK_SUBTASKS: &'static str = "/api/tasks/{id}/subtasks";
    pub const SUBTASK_BY_ID: &'static str = "/api/subtasks/{id}";
    pub const SUBTASK_STATUS: &'static str = "/api/subtasks/{id}/status";

    // Approvals
    pub const APPROVALS: &'static str = "/api/approvals";
    pub const APPROVAL_BY_ID: &'static str = "/api/approvals/{id}";
    pub const APPROVAL_RESPOND: &'static str = "/api/approvals/{id}/respond";
    pub const APPROVAL_MODIFICATIONS: &'static str = "/api/approvals/modifications";

    // Catalog
    pub const CATALOG: &'static str = "/api/catalog";
    pub const CATALOG_BY_ID: &'static str = "/api/catalog/{id}";
    pub const CATALOG_PROGRESS: &'static str = "/api/catalog/{id}/progress";

    // Today plan
    pub const TODAY_PLAN: &'static str = "/api/today-plan";
    pub const TODAY_PLAN_REORDER: &'static str = "/api/today-plan/reorder";
    pub const TODAY_PLAN_QUADRANT: &'static str = "/api/today-plan/{id}/quadrant";
    pub const TODAY_PLAN_BY_QUADRANT: &'static str = "/api/today-plan/quadrants";
    pub const TODAY_PLAN_WEEK: &'static str = "/api/today-plan/week";
    pub const TODAY_PLAN_MONTH: &'static str = "/api/today-plan/month";

    // Activity
    pub const ACTIVITY_LOGS: &'static str = "/api/activity-logs";
    pub const ACTIVITY_ACTIVE: &'static str = "/api/activity-logs/active";
    pub const ACTIVITY_START: &'static str = "/api/today-plan/{id}/start";
    pub const ACTIVITY_STOP: &'static str = "/api/activity-logs/{id}/stop";

    pub const PENDING: &'static str = "/api/pending";
    pub const PENDING_REPLAN: &'static str = "/api/pending/{id}/replan";
    pub const PENDING_CANCEL: &'static str = "/api/pending/{id}/cancel";

    pub const DAY_SESSION: &'static str = "/api/day-session";
    pub const DAY_SESSION_START: &'static str = "/api/day-session/start";
    pub const DAY_SESSION_END: &'static str = "/api/day-session/end";

    // Team instructions
    pub const INSTRUCTIONS: &'static str = "/api/instructions";
    pub const INSTRUCTIONS_RECEIVED: &'static str = "/api/instructions/received";
    pub const INSTRUCTIONS_SENT: &'static str = "/api/instructions/sent";

    // Quick notes
    pub const NOTES: &'static str = "/api/quick-notes";
    pub const NOTE_BY_ID: &'static str = "/api/quick-notes/{id}";

    // Dashboard
    pub const DASHBOARD_USERS: &'static str = "/api/dashboard/users";
    pub const DASHBOARD_PROJECT_STATS: &'static str = "/api/dashboard/project-stats";
}

impl ApiUrls {
    /// Fills `{name}` placeholders, e.g. for building client links.
    pub fn with_params(url: &str, params: &[(&str, &str)]) -> String {
        let mut result = url.to_string();
        for (key, value) in params {
            result = result.replace(&format!("{{{key}}}"), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_params_fills_placeholders() {
        assert_eq!(
            ApiUrls::with_params(ApiUrls::TASK_ASSIGNEE, &[("id", "4"), ("user_id", "9")]),
            "/api/tasks/4/assignees/9"
        );
        assert_eq!(ApiUrls::with_params(ApiUrls::TASKS, &[]), "/api/tasks");
    }
}
