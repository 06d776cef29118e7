//! Team instructions: a project-scoped message from a lead to chosen recipients.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{NotificationType, Role};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    NewInstructionRecipient, NewTeamInstruction, NotificationRef, TeamInstruction,
};
use crate::core::shared::schema::{instruction_recipients, projects, team_instructions};
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::directory::ensure_users_exist;
use crate::notifications::{notify_each, NotificationDraft, Outbox};

#[derive(Debug, Clone, Deserialize)]
pub struct SendInstructionRequest {
    pub project_id: i32,
    pub subject: String,
    #[serde(default)]
    pub instructions: String,
    pub recipients: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentInstruction {
    #[serde(flatten)]
    pub instruction: TeamInstruction,
    pub recipients: Vec<i32>,
}

fn recipients_of(conn: &mut SqliteConnection, instruction_id: i32) -> PlanResult<Vec<i32>> {
    Ok(instruction_recipients::table
        .filter(instruction_recipients::instruction_id.eq(instruction_id))
        .order(instruction_recipients::user_id.asc())
        .select(instruction_recipients::user_id)
        .load(conn)?)
}

pub fn send_instruction(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    request: &SendInstructionRequest,
    now: NaiveDateTime,
) -> PlanResult<SentInstruction> {
    actor.require(Role::TeamLead)?;
    let subject = request.subject.trim();
    if subject.is_empty() {
        return Err(PlanError::validation("subject is required"));
    }
    let mut recipients = request.recipients.clone();
    recipients.sort_unstable();
    recipients.dedup();
    if recipients.is_empty() {
        return Err(PlanError::validation("at least one recipient is required"));
    }

    conn.transaction(|conn| {
        projects::table
            .find(request.project_id)
            .select(projects::id)
            .first::<i32>(conn)
            .optional()?
            .ok_or_else(|| PlanError::not_found(format!("project {}", request.project_id)))?;
        ensure_users_exist(conn, &recipients)?;

        let instruction: TeamInstruction = diesel::insert_into(team_instructions::table)
            .values(&NewTeamInstruction {
                project_id: request.project_id,
                subject: subject.to_string(),
                instructions: request.instructions.clone(),
                sent_by: actor.id,
                sent_at: now,
            })
            .get_result(conn)?;
        let rows: Vec<NewInstructionRecipient> = recipients
            .iter()
            .map(|&user_id| NewInstructionRecipient {
                instruction_id: instruction.id,
                user_id,
            })
            .collect();
        diesel::insert_into(instruction_recipients::table)
            .values(&rows)
            .execute(conn)?;

        let draft = NotificationDraft::new(
            NotificationType::InstructionReceived,
            "New Team Instruction",
            format!("Subject: {}", instruction.subject),
            Some(NotificationRef::Instruction(instruction.id)),
        );
        notify_each(conn, outbox, &recipients, &draft, now)?;

        info!(
            "[INSTRUCTION] User {} sent instruction {} to {} recipients",
            actor.id,
            instruction.id,
            recipients.len()
        );
        Ok(SentInstruction {
            instruction,
            recipients,
        })
    })
}

pub fn list_received(
    conn: &mut SqliteConnection,
    actor: &Actor,
) -> PlanResult<Vec<TeamInstruction>> {
    Ok(team_instructions::table
        .inner_join(instruction_recipients::table)
        .filter(instruction_recipients::user_id.eq(actor.id))
        .order((team_instructions::sent_at.desc(), team_instructions::id.desc()))
        .select(TeamInstruction::as_select())
        .load::<TeamInstruction>(conn)?)
}

pub fn list_sent(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<Vec<SentInstruction>> {
    let sent: Vec<TeamInstruction> = team_instructions::table
        .filter(team_instructions::sent_by.eq(actor.id))
        .order((team_instructions::sent_at.desc(), team_instructions::id.desc()))
        .select(TeamInstruction::as_select())
        .load(conn)?;
    sent.into_iter()
        .map(|instruction| {
            let recipients = recipients_of(conn, instruction.id)?;
            Ok(SentInstruction {
                instruction,
                recipients,
            })
        })
        .collect()
}

pub fn configure_instruction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::INSTRUCTIONS, post(handlers::handle_instruction_send))
        .route(
            ApiUrls::INSTRUCTIONS_RECEIVED,
            get(handlers::handle_instruction_received),
        )
        .route(ApiUrls::INSTRUCTIONS_SENT, get(handlers::handle_instruction_sent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::schema::notifications;
    use crate::tests::test_util::{seed_project, seed_user, setup, test_conn, ts};
    use crate::{assert_err, assert_ok};

    fn request(project_id: i32, recipients: Vec<i32>) -> SendInstructionRequest {
        SendInstructionRequest {
            project_id,
            subject: "Release freeze".into(),
            instructions: "No merges after Thursday.".into(),
            recipients,
        }
    }

    #[test]
    fn test_each_recipient_notified_once() {
        setup();
        let mut conn = test_conn();
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let a = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let b = seed_user(&mut conn, "b@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &lead, "Apollo");
        let mut outbox = Outbox::default();

        let sent = assert_ok!(send_instruction(
            &mut conn,
            &mut outbox,
            &lead,
            &request(project.id, vec![b.id, a.id, b.id]),
            ts(2026, 1, 5, 9, 0)
        ));
        assert_eq!(sent.recipients, vec![a.id, b.id]);
        assert_eq!(outbox.len(), 2);

        let notes: Vec<(i32, String)> = notifications::table
            .filter(notifications::notification_type.eq(NotificationType::InstructionReceived))
            .order(notifications::user_id.asc())
            .select((notifications::user_id, notifications::message))
            .load(&mut conn)
            .unwrap();
        assert_eq!(
            notes,
            vec![
                (a.id, "Subject: Release freeze".to_string()),
                (b.id, "Subject: Release freeze".to_string())
            ]
        );

        assert_eq!(assert_ok!(list_received(&mut conn, &a)).len(), 1);
        assert_eq!(assert_ok!(list_sent(&mut conn, &lead))[0].recipients, vec![a.id, b.id]);
        assert!(assert_ok!(list_received(&mut conn, &lead)).is_empty());
    }

    #[test]
    fn test_send_validates() {
        setup();
        let mut conn = test_conn();
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &lead, "Apollo");
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);

        let err = assert_err!(send_instruction(&mut conn, &mut outbox, &dev, &request(project.id, vec![lead.id]), now));
        assert!(matches!(err, PlanError::Forbidden(_)));
        let err = assert_err!(send_instruction(&mut conn, &mut outbox, &lead, &request(project.id, vec![]), now));
        assert!(matches!(err, PlanError::Validation(_)));
        let mut blank = request(project.id, vec![dev.id]);
        blank.subject = "   ".into();
        let err = assert_err!(send_instruction(&mut conn, &mut outbox, &lead, &blank, now));
        assert!(matches!(err, PlanError::Validation(_)));
        let err = assert_err!(send_instruction(&mut conn, &mut outbox, &lead, &request(999, vec![dev.id]), now));
        assert!(matches!(err, PlanError::NotFound(_)));
        let err = assert_err!(send_instruction(&mut conn, &mut outbox, &lead, &request(project.id, vec![dev.id, 999]), now));
        assert!(matches!(err, PlanError::NotFound(_)));
        assert!(outbox.is_empty());
    }
}
