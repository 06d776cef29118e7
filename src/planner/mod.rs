//! Daily planning: the catalog of work items, plan slots and their views.

pub mod catalog;
pub mod handlers;
pub mod scheduler;
pub mod views;

pub use catalog::{
    create_catalog_item, deactivate_catalog_item, list_catalog, refresh_catalog_progress,
    set_catalog_progress, CatalogProgressRequest, CreateCatalogRequest,
};
pub use scheduler::{
    add_from_catalog, list_day, reorder, update_quadrant, AddPlanRequest, QuadrantRequest,
    ReorderEntry,
};
pub use views::{by_quadrant, month_view, week_view, CalendarView, QuadrantView};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub fn configure_planner_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::CATALOG,
            post(handlers::handle_catalog_create).get(handlers::handle_catalog_list),
        )
        .route(
            ApiUrls::CATALOG_BY_ID,
            delete(handlers::handle_catalog_deactivate),
        )
        .route(
            ApiUrls::CATALOG_PROGRESS,
            put(handlers::handle_catalog_progress).post(handlers::handle_catalog_refresh),
        )
        .route(
            ApiUrls::TODAY_PLAN,
            post(handlers::handle_plan_add).get(handlers::handle_plan_day),
        )
        .route(ApiUrls::TODAY_PLAN_REORDER, post(handlers::handle_plan_reorder))
        .route(ApiUrls::TODAY_PLAN_QUADRANT, put(handlers::handle_plan_quadrant))
        .route(ApiUrls::TODAY_PLAN_BY_QUADRANT, get(handlers::handle_view_quadrants))
        .route(ApiUrls::TODAY_PLAN_WEEK, get(handlers::handle_view_week))
        .route(ApiUrls::TODAY_PLAN_MONTH, get(handlers::handle_view_month))
}
