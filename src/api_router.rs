//! API Router
//!
//! Combines the endpoints of every domain module into one router. Layers and
//! state are attached by the server.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::main_module::health_check;

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::HEALTH, get(health_check))
        // ===== Users & departments =====
        .merge(crate::directory::router::configure_directory_routes())
        // ===== Notifications =====
        .merge(crate::notifications::configure_notification_routes())
        // ===== Projects, tasks & approvals =====
        .merge(crate::project::configure_project_routes())
        .merge(crate::tasks::configure_task_routes())
        .merge(crate::approvals::configure_approval_routes())
        // ===== Catalog & daily planning =====
        .merge(crate::planner::configure_planner_routes())
        .merge(crate::activity::configure_activity_routes())
        // ===== Team communication & stats =====
        .merge(crate::instructions::configure_instruction_routes())
        .merge(crate::dashboards::configure_dashboard_routes())
        // ===== Quick notes =====
        .merge(crate::notes::configure_notes_routes())
}
