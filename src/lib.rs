pub mod activity;
pub mod api_router;
pub mod approvals;
pub mod core;
pub mod dashboards;
pub mod directory;
pub mod instructions;
pub mod main_module;
pub mod notes;
pub mod notifications;
pub mod planner;
pub mod project;
pub mod tasks;
