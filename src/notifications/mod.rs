//! Notification center
//!
//! Rows are written inside the caller's transaction and queued on the [`Outbox`];
//! the sink only sees them after commit.

pub mod handlers;
pub mod sink;

pub use sink::{BroadcastSink, Delivery, LogSink, MemorySink, NotificationSink, Outbox, SinkError, SinkEvent};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;

use crate::core::shared::enums::{NotificationType, Role};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{NewNotification, Notification, NotificationRef};
use crate::core::shared::schema::{notifications, users};
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use std::sync::Arc;

/// Content of one notification, independent of its recipient.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub reference: Option<NotificationRef>,
}

impl NotificationDraft {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        reference: Option<NotificationRef>,
    ) -> Self {
        Self {
            notification_type,
            title: title.into(),
            message: message.into(),
            reference,
        }
    }
}

pub fn notify(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    user_id: i32,
    draft: &NotificationDraft,
    now: NaiveDateTime,
) -> PlanResult<Notification> {
    let row = NewNotification {
        user_id,
        notification_type: draft.notification_type,
        title: draft.title.clone(),
        message: draft.message.clone(),
        reference_type: draft.reference.map(|r| r.kind()),
        reference_id: draft.reference.map(|r| r.id()),
        is_read: false,
        created_at: now,
    };

    let saved: Notification = diesel::insert_into(notifications::table)
        .values(&row)
        .get_result(conn)?;

    debug!(
        "[NOTIFY] Queued {} for user {}",
        saved.notification_type, user_id
    );
    outbox.push(user_id, SinkEvent::Notification(saved.clone()));
    Ok(saved)
}

/// One notification per distinct recipient.
pub fn notify_each(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    recipients: &[i32],
    draft: &NotificationDraft,
    now: NaiveDateTime,
) -> PlanResult<Vec<Notification>> {
    let mut seen = std::collections::HashSet::new();
    let mut sent = Vec::new();
    for &user_id in recipients {
        if seen.insert(user_id) {
            sent.push(notify(conn, outbox, user_id, draft, now)?);
        }
    }
    Ok(sent)
}

/// Explicit fan-out to every active ADMIN.
pub fn notify_admins(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    draft: &NotificationDraft,
    now: NaiveDateTime,
) -> PlanResult<Vec<Notification>> {
    let admins: Vec<i32> = users::table
        .filter(users::role.eq(Role::Admin))
        .filter(users::is_active.eq(true))
        .order(users::id.asc())
        .select(users::id)
        .load(conn)?;
    notify_each(conn, outbox, &admins, draft, now)
}

pub fn list(
    conn: &mut SqliteConnection,
    user_id: i32,
    unread_only: bool,
) -> PlanResult<Vec<Notification>> {
    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .into_boxed();
    if unread_only {
        query = query.filter(notifications::is_read.eq(false));
    }
    Ok(query
        .order((notifications::created_at.desc(), notifications::id.desc()))
        .select(Notification::as_select())
        .load(conn)?)
}

pub fn unread_count(conn: &mut SqliteConnection, user_id: i32) -> PlanResult<i64> {
    Ok(notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(false))
        .count()
        .get_result(conn)?)
}

pub fn mark_read(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    user_id: i32,
    notification_id: i32,
) -> PlanResult<Notification> {
    conn.transaction(|conn| {
        let updated: Notification = diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .get_result(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("notification {notification_id}")))?;

        let count = unread_count(conn, user_id)?;
        outbox.push(user_id, SinkEvent::UnreadCount { count });
        Ok(updated)
    })
}

/// Returns how many rows flipped.
pub fn mark_all_read(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    user_id: i32,
) -> PlanResult<usize> {
    conn.transaction(|conn| {
        let changed = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(conn)?;

        outbox.push(user_id, SinkEvent::UnreadCount { count: 0 });
        Ok(changed)
    })
}

pub fn configure_notification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::NOTIFICATIONS, get(handlers::handle_notification_list))
        .route(
            ApiUrls::NOTIFICATIONS_UNREAD_COUNT,
            get(handlers::handle_unread_count),
        )
        .route(ApiUrls::NOTIFICATION_READ, post(handlers::handle_mark_read))
        .route(
            ApiUrls::NOTIFICATIONS_READ_ALL,
            post(handlers::handle_mark_all_read),
        )
}
