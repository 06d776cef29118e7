//! Work-day bracket. A day can only start once something is planned for it.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::Serialize;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::PlanStatus;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{DaySession, NewDaySession};
use crate::core::shared::schema::{activity_logs, day_sessions, today_plans};
use crate::core::shared::utils::round2;

use super::{day_range, has_running_log};

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub session: DaySession,
    pub completed_count: i64,
    pub pending_count: i64,
    pub total_hours: f64,
}

fn session_for(
    conn: &mut SqliteConnection,
    user_id: i32,
    date: NaiveDate,
) -> PlanResult<Option<DaySession>> {
    Ok(day_sessions::table
        .filter(day_sessions::user_id.eq(user_id))
        .filter(day_sessions::session_date.eq(date))
        .select(DaySession::as_select())
        .first(conn)
        .optional()?)
}

fn latest_active(conn: &mut SqliteConnection, user_id: i32) -> PlanResult<Option<DaySession>> {
    Ok(day_sessions::table
        .filter(day_sessions::user_id.eq(user_id))
        .filter(day_sessions::is_active.eq(true))
        .order(day_sessions::session_date.desc())
        .select(DaySession::as_select())
        .first(conn)
        .optional()?)
}

fn count_plans(
    conn: &mut SqliteConnection,
    user_id: i32,
    date: NaiveDate,
    status: Option<PlanStatus>,
) -> PlanResult<i64> {
    let mut query = today_plans::table
        .filter(today_plans::user_id.eq(user_id))
        .filter(today_plans::plan_date.eq(date))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(today_plans::status.eq(status));
    }
    Ok(query.count().get_result(conn)?)
}

pub fn start_day(
    conn: &mut SqliteConnection,
    actor: &Actor,
    now: NaiveDateTime,
) -> PlanResult<DaySession> {
    let today = now.date();
    conn.transaction(|conn| {
        let existing = session_for(conn, actor.id, today)?;
        if existing.as_ref().is_some_and(|s| s.is_active) {
            return Err(PlanError::conflict(format!(
                "day {today} is already started"
            )));
        }
        if count_plans(conn, actor.id, today, None)? == 0 {
            return Err(PlanError::validation(format!(
                "nothing is planned for {today}; plan before you start"
            )));
        }

        let session: DaySession = match existing {
            Some(session) => diesel::update(day_sessions::table.find(session.id))
                .set((
                    day_sessions::started_at.eq(Some(now)),
                    day_sessions::ended_at.eq(None::<NaiveDateTime>),
                    day_sessions::is_active.eq(true),
                    day_sessions::updated_at.eq(now),
                ))
                .get_result(conn)?,
            None => diesel::insert_into(day_sessions::table)
                .values(&NewDaySession {
                    user_id: actor.id,
                    session_date: today,
                    started_at: Some(now),
                    ended_at: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                })
                .get_result(conn)?,
        };
        info!("[DAY] User {} started {}", actor.id, today);
        Ok(session)
    })
}

pub fn end_day(
    conn: &mut SqliteConnection,
    actor: &Actor,
    now: NaiveDateTime,
) -> PlanResult<DaySummary> {
    conn.transaction(|conn| {
        let session = latest_active(conn, actor.id)?
            .ok_or_else(|| PlanError::not_found("no active day session"))?;
        if has_running_log(conn, actor.id)? {
            return Err(PlanError::conflict(
                "an activity is still in progress; stop it before ending the day",
            ));
        }

        let session: DaySession = diesel::update(day_sessions::table.find(session.id))
            .set((
                day_sessions::ended_at.eq(Some(now)),
                day_sessions::is_active.eq(false),
                day_sessions::updated_at.eq(now),
            ))
            .get_result(conn)?;

        let date = session.session_date;
        let completed_count = count_plans(conn, actor.id, date, Some(PlanStatus::Completed))?;
        let pending_count = count_plans(conn, actor.id, date, Some(PlanStatus::MovedToPending))?;
        let (from, to) = day_range(date)?;
        let hours: Option<f64> = activity_logs::table
            .filter(activity_logs::user_id.eq(actor.id))
            .filter(activity_logs::actual_start_time.ge(from))
            .filter(activity_logs::actual_start_time.lt(to))
            .select(sum(activity_logs::hours_worked))
            .first(conn)?;
        let total_hours = round2(hours.unwrap_or(0.0));

        info!(
            "[DAY] User {} ended {}: {} completed, {} pending, {}h",
            actor.id, date, completed_count, pending_count, total_hours
        );
        Ok(DaySummary {
            session,
            completed_count,
            pending_count,
            total_hours,
        })
    })
}

/// The running session if any, otherwise today's.
pub fn current_session(
    conn: &mut SqliteConnection,
    actor: &Actor,
    now: NaiveDateTime,
) -> PlanResult<Option<DaySession>> {
    match latest_active(conn, actor.id)? {
        Some(session) => Ok(Some(session)),
        None => session_for(conn, actor.id, now.date()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{move_to_activity_log, stop, StopRequest};
    use crate::core::shared::enums::Role;
    use crate::tests::test_util::{date, seed_plan, seed_user, setup, test_conn, ts};
    use crate::{assert_err, assert_ok};

    #[test]
    fn test_plan_before_you_start() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let morning = ts(2026, 1, 5, 8, 0);

        let err = assert_err!(start_day(&mut conn, &user, morning));
        assert!(matches!(err, PlanError::Validation(_)));

        seed_plan(&mut conn, user.id, date(2026, 1, 5), 60);
        let session = assert_ok!(start_day(&mut conn, &user, morning));
        assert!(session.is_active);
        assert_eq!(session.started_at, Some(morning));

        let err = assert_err!(start_day(&mut conn, &user, ts(2026, 1, 5, 8, 5)));
        assert!(matches!(err, PlanError::Conflict(_)));
    }

    #[test]
    fn test_end_day_summarises() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let day = date(2026, 1, 5);
        let done = seed_plan(&mut conn, user.id, day, 60);
        let unfinished = seed_plan(&mut conn, user.id, day, 60);
        seed_plan(&mut conn, user.id, day, 30);

        let err = assert_err!(end_day(&mut conn, &user, ts(2026, 1, 5, 8, 0)));
        assert!(matches!(err, PlanError::NotFound(_)));
        assert_ok!(start_day(&mut conn, &user, ts(2026, 1, 5, 8, 0)));

        let log = assert_ok!(move_to_activity_log(&mut conn, &user, done.id, ts(2026, 1, 5, 9, 0)));
        let err = assert_err!(end_day(&mut conn, &user, ts(2026, 1, 5, 9, 30)));
        assert!(matches!(err, PlanError::Conflict(_)));
        assert_ok!(stop(
            &mut conn,
            &user,
            log.id,
            &StopRequest { is_completed: true, ..Default::default() },
            ts(2026, 1, 5, 10, 30)
        ));
        let log = assert_ok!(move_to_activity_log(&mut conn, &user, unfinished.id, ts(2026, 1, 5, 11, 0)));
        assert_ok!(stop(&mut conn, &user, log.id, &StopRequest::default(), ts(2026, 1, 5, 11, 45)));

        let summary = assert_ok!(end_day(&mut conn, &user, ts(2026, 1, 5, 18, 0)));
        assert_eq!(summary.completed_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.total_hours, 2.25);
        assert!(!summary.session.is_active);
        assert_eq!(summary.session.ended_at, Some(ts(2026, 1, 5, 18, 0)));
    }

    #[test]
    fn test_restart_reactivates_same_row() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        seed_plan(&mut conn, user.id, date(2026, 1, 5), 60);
        let first = assert_ok!(start_day(&mut conn, &user, ts(2026, 1, 5, 8, 0)));
        assert_ok!(end_day(&mut conn, &user, ts(2026, 1, 5, 12, 0)));

        let again = assert_ok!(start_day(&mut conn, &user, ts(2026, 1, 5, 13, 0)));
        assert_eq!(again.id, first.id);
        assert!(again.is_active);
        assert_eq!(again.ended_at, None);
        assert_eq!(
            assert_ok!(current_session(&mut conn, &user, ts(2026, 1, 5, 14, 0))).map(|s| s.id),
            Some(first.id)
        );
    }
}
