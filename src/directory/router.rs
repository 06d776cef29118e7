use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

use super::handlers;

pub fn configure_directory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::USERS,
            post(handlers::create_user).get(handlers::list_users),
        )
        .route(ApiUrls::USER_BY_ID, get(handlers::get_user))
        .route(ApiUrls::USER_ACTIVE, put(handlers::set_user_active))
        .route(
            ApiUrls::DEPARTMENTS,
            post(handlers::create_department).get(handlers::list_departments),
        )
}
