//! Quick notes: short free-text jottings owned by one user.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{NewQuickNote, QuickNote};
use crate::core::shared::schema::quick_notes;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

#[derive(Debug, Clone, Deserialize)]
pub struct NoteRequest {
    pub note_text: String,
}

fn note_text(request: &NoteRequest) -> PlanResult<String> {
    let text = request.note_text.trim();
    if text.is_empty() {
        return Err(PlanError::validation("note_text is required"));
    }
    Ok(text.to_string())
}

/// Owners and admins see a note; for anyone else it does not exist.
fn load_visible_note(
    conn: &mut SqliteConnection,
    actor: &Actor,
    note_id: i32,
) -> PlanResult<QuickNote> {
    quick_notes::table
        .find(note_id)
        .select(QuickNote::as_select())
        .first(conn)
        .optional()?
        .filter(|note| actor.is_admin() || note.user_id == actor.id)
        .ok_or_else(|| PlanError::not_found(format!("note {note_id}")))
}

pub fn create_note(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request: &NoteRequest,
    now: NaiveDateTime,
) -> PlanResult<QuickNote> {
    let note_text = note_text(request)?;
    let note: QuickNote = diesel::insert_into(quick_notes::table)
        .values(&NewQuickNote {
            user_id: actor.id,
            note_text,
            created_at: now,
            updated_at: now,
        })
        .get_result(conn)?;
    info!("[NOTES] User {} wrote note {}", actor.id, note.id);
    Ok(note)
}

/// Newest first. Admins get every user's notes.
pub fn list_notes(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<Vec<QuickNote>> {
    let mut query = quick_notes::table
        .order((quick_notes::created_at.desc(), quick_notes::id.desc()))
        .select(QuickNote::as_select())
        .into_boxed();
    if !actor.is_admin() {
        query = query.filter(quick_notes::user_id.eq(actor.id));
    }
    Ok(query.load(conn)?)
}

pub fn get_note(conn: &mut SqliteConnection, actor: &Actor, note_id: i32) -> PlanResult<QuickNote> {
    load_visible_note(conn, actor, note_id)
}

pub fn update_note(
    conn: &mut SqliteConnection,
    actor: &Actor,
    note_id: i32,
    request: &NoteRequest,
    now: NaiveDateTime,
) -> PlanResult<QuickNote> {
    let note_text = note_text(request)?;
    conn.transaction(|conn| {
        let note = load_visible_note(conn, actor, note_id)?;
        Ok(diesel::update(quick_notes::table.find(note.id))
            .set((
                quick_notes::note_text.eq(note_text),
                quick_notes::updated_at.eq(now),
            ))
            .get_result(conn)?)
    })
}

pub fn delete_note(conn: &mut SqliteConnection, actor: &Actor, note_id: i32) -> PlanResult<()> {
    conn.transaction(|conn| {
        let note = load_visible_note(conn, actor, note_id)?;
        diesel::delete(quick_notes::table.find(note.id)).execute(conn)?;
        info!("[NOTES] User {} deleted note {}", actor.id, note.id);
        Ok(())
    })
}

pub fn configure_notes_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::NOTES,
            post(handlers::handle_note_create).get(handlers::handle_note_list),
        )
        .route(
            ApiUrls::NOTE_BY_ID,
            get(handlers::handle_note_get)
                .put(handlers::handle_note_update)
                .delete(handlers::handle_note_delete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::Role;
    use crate::tests::test_util::{seed_user, setup, test_conn, ts};
    use crate::{assert_err, assert_ok};

    fn text(value: &str) -> NoteRequest {
        NoteRequest {
            note_text: value.into(),
        }
    }

    #[test]
    fn test_notes_are_scoped_to_their_owner() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let a = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let b = seed_user(&mut conn, "b@example.com", Role::Manager, None);

        let first = assert_ok!(create_note(&mut conn, &a, &text("call the vendor"), ts(2026, 1, 5, 9, 0)));
        let second = assert_ok!(create_note(&mut conn, &a, &text(" ship notes "), ts(2026, 1, 5, 10, 0)));
        let theirs = assert_ok!(create_note(&mut conn, &b, &text("budget"), ts(2026, 1, 5, 11, 0)));
        assert_eq!(second.note_text, "ship notes");

        let mine: Vec<i32> = assert_ok!(list_notes(&mut conn, &a)).into_iter().map(|n| n.id).collect();
        assert_eq!(mine, vec![second.id, first.id]);
        assert_eq!(assert_ok!(list_notes(&mut conn, &admin)).len(), 3);

        let err = assert_err!(get_note(&mut conn, &a, theirs.id));
        assert!(matches!(err, PlanError::NotFound(_)));
        assert_eq!(assert_ok!(get_note(&mut conn, &admin, theirs.id)).user_id, b.id);
    }

    #[test]
    fn test_only_visible_notes_change() {
        setup();
        let mut conn = test_conn();
        let a = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let b = seed_user(&mut conn, "b@example.com", Role::Employee, None);
        let note = assert_ok!(create_note(&mut conn, &a, &text("draft"), ts(2026, 1, 5, 9, 0)));

        let err = assert_err!(update_note(&mut conn, &b, note.id, &text("hijack"), ts(2026, 1, 5, 9, 5)));
        assert!(matches!(err, PlanError::NotFound(_)));
        let err = assert_err!(delete_note(&mut conn, &b, note.id));
        assert!(matches!(err, PlanError::NotFound(_)));

        let err = assert_err!(update_note(&mut conn, &a, note.id, &text("   "), ts(2026, 1, 5, 9, 5)));
        assert!(matches!(err, PlanError::Validation(_)));

        let updated = assert_ok!(update_note(&mut conn, &a, note.id, &text("final"), ts(2026, 1, 5, 9, 10)));
        assert_eq!(updated.note_text, "final");
        assert_eq!(updated.created_at, note.created_at);
        assert_eq!(updated.updated_at, ts(2026, 1, 5, 9, 10));

        assert_ok!(delete_note(&mut conn, &a, note.id));
        assert!(assert_ok!(list_notes(&mut conn, &a)).is_empty());
    }
}
