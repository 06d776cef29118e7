use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::PlanResult;
use crate::core::shared::models::TeamInstruction;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::now;

use super::{SendInstructionRequest, SentInstruction};

pub async fn handle_instruction_send(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(body): Json<SendInstructionRequest>,
) -> PlanResult<(StatusCode, Json<SentInstruction>)> {
    let sent = state
        .transact(move |conn, outbox| super::send_instruction(conn, outbox, &actor, &body, now()))
        .await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

pub async fn handle_instruction_received(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Vec<TeamInstruction>>> {
    state
        .query(move |conn| super::list_received(conn, &actor))
        .await
        .map(Json)
}

pub async fn handle_instruction_sent(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> PlanResult<Json<Vec<SentInstruction>>> {
    state
        .query(move |conn| super::list_sent(conn, &actor))
        .await
        .map(Json)
}
