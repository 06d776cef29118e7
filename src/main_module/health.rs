//! Liveness plus a round trip to the database.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::RunQueryDsl;
use log::warn;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let ping = state
        .query(|conn| Ok(diesel::sql_query("SELECT 1").execute(conn)?))
        .await;

    let (code, status, database) = match ping {
        Ok(_) => (StatusCode::OK, "healthy", "ok"),
        Err(e) => {
            warn!("[HEALTH] Database check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": "planserver",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}
