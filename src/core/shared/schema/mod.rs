pub mod directory_tables;
pub use self::directory_tables::*;

pub mod project_tables;
pub use self::project_tables::*;

pub mod task_tables;
pub use self::task_tables::*;

pub mod planning_tables;
pub use self::planning_tables::*;

diesel::joinable!(users -> departments (department_id));
diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(subtasks -> tasks (task_id));
diesel::joinable!(task_assignees -> tasks (task_id));
diesel::joinable!(task_assignees -> users (user_id));
diesel::joinable!(approval_responses -> approval_requests (approval_request_id));
diesel::joinable!(today_plans -> catalog_items (catalog_id));
diesel::joinable!(activity_logs -> today_plans (today_plan_id));
diesel::joinable!(pending_items -> today_plans (today_plan_id));
diesel::joinable!(team_instructions -> projects (project_id));
diesel::joinable!(instruction_recipients -> team_instructions (instruction_id));
diesel::joinable!(quick_notes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    departments,
    users,
    notifications,
    team_instructions,
    instruction_recipients,
    projects,
    approval_requests,
    approval_responses,
    tasks,
    subtasks,
    task_assignees,
    catalog_items,
    today_plans,
    activity_logs,
    pending_items,
    day_sessions,
    quick_notes,
);
