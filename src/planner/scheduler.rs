//! Catalog-to-plan scheduling
//!
//! A plan slot places one catalog item on a user's day with a time box, a
//! quadrant and a position. Positions are unique per (user, day) and only
//! ever grow when slots are added; gaps left by deletions are not reused.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{PlanStatus, Quadrant};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{NewTodayPlan, TodayPlan};
use crate::core::shared::schema::today_plans;

use super::catalog::load_visible_item;

#[derive(Debug, Clone, Deserialize)]
pub struct AddPlanRequest {
    pub catalog_id: i32,
    pub plan_date: NaiveDate,
    pub scheduled_start_time: Option<NaiveTime>,
    pub scheduled_end_time: Option<NaiveTime>,
    pub planned_duration_minutes: Option<i32>,
    pub quadrant: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderEntry {
    pub plan_id: i32,
    pub order_index: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuadrantRequest {
    pub quadrant: String,
}

pub fn parse_quadrant(raw: &str) -> PlanResult<Quadrant> {
    raw.parse::<Quadrant>().map_err(PlanError::Validation)
}

/// Same-day wall-clock difference. Slots that wrap past midnight are rejected.
pub fn derive_duration(start: NaiveTime, end: NaiveTime) -> PlanResult<i32> {
    if end <= start {
        return Err(PlanError::validation(format!(
            "end time {end} must be after start time {start}"
        )));
    }
    Ok((end - start).num_minutes() as i32)
}

pub(crate) fn load_owned_plan(
    conn: &mut SqliteConnection,
    user_id: i32,
    plan_id: i32,
) -> PlanResult<TodayPlan> {
    today_plans::table
        .find(plan_id)
        .filter(today_plans::user_id.eq(user_id))
        .select(TodayPlan::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("plan {plan_id}")))
}

fn next_order_index(conn: &mut SqliteConnection, user_id: i32, date: NaiveDate) -> PlanResult<i32> {
    let current: Option<i32> = today_plans::table
        .filter(today_plans::user_id.eq(user_id))
        .filter(today_plans::plan_date.eq(date))
        .select(max(today_plans::order_index))
        .first(conn)?;
    Ok(current.map_or(1, |m| m.max(0) + 1))
}

pub fn add_from_catalog(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request: &AddPlanRequest,
    now: NaiveDateTime,
) -> PlanResult<TodayPlan> {
    let (start, end) = match (request.scheduled_start_time, request.scheduled_end_time) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(PlanError::validation(
                "scheduled_start_time and scheduled_end_time are required",
            ))
        }
    };
    let duration = match request.planned_duration_minutes {
        Some(minutes) if minutes <= 0 => {
            return Err(PlanError::validation("planned_duration_minutes must be positive"));
        }
        Some(minutes) => minutes,
        None => derive_duration(start, end)?,
    };
    let quadrant = match request.quadrant.as_deref() {
        Some(raw) => parse_quadrant(raw)?,
        None => Quadrant::default(),
    };

    conn.transaction(|conn| {
        let item = load_visible_item(conn, actor, request.catalog_id)?;
        if !item.is_active {
            return Err(PlanError::not_found(format!("catalog item {}", item.id)));
        }
        let order_index = next_order_index(conn, actor.id, request.plan_date)?;

        let plan: TodayPlan = diesel::insert_into(today_plans::table)
            .values(&NewTodayPlan {
                user_id: actor.id,
                catalog_id: item.id,
                plan_date: request.plan_date,
                scheduled_start_time: start,
                scheduled_end_time: end,
                planned_duration_minutes: duration,
                quadrant,
                order_index,
                status: PlanStatus::Planned,
                notes: request.notes.clone(),
                created_at: now,
                updated_at: now,
            })
            .get_result(conn)?;
        info!(
            "[PLAN] User {} planned '{}' on {} at #{} ({} min)",
            actor.id, item.name, plan.plan_date, plan.order_index, duration
        );
        Ok(plan)
    })
}

/// Applies a batch of position changes atomically.
///
/// Entries are folded in order so the last one for a plan wins. Plans the
/// caller does not own are skipped. Moved rows are parked on negative
/// positions before being written back, which lets two rows swap places.
pub fn reorder(
    conn: &mut SqliteConnection,
    actor: &Actor,
    entries: &[ReorderEntry],
    now: NaiveDateTime,
) -> PlanResult<Vec<TodayPlan>> {
    if let Some(bad) = entries.iter().find(|e| e.order_index < 0) {
        return Err(PlanError::validation(format!(
            "order_index cannot be negative (plan {})",
            bad.plan_id
        )));
    }
    let mut targets: BTreeMap<i32, i32> = BTreeMap::new();
    for entry in entries {
        targets.insert(entry.plan_id, entry.order_index);
    }
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    conn.transaction(|conn| {
        let ids: Vec<i32> = targets.keys().copied().collect();
        let owned: Vec<TodayPlan> = today_plans::table
            .filter(today_plans::id.eq_any(&ids))
            .filter(today_plans::user_id.eq(actor.id))
            .select(TodayPlan::as_select())
            .load(conn)?;
        if owned.len() < ids.len() {
            debug!(
                "[PLAN] Reorder by user {} skipped {} foreign or missing plans",
                actor.id,
                ids.len() - owned.len()
            );
        }
        if owned.is_empty() {
            return Ok(Vec::new());
        }

        let moved: HashSet<i32> = owned.iter().map(|p| p.id).collect();
        let dates: HashSet<NaiveDate> = owned.iter().map(|p| p.plan_date).collect();
        let mut layout: HashMap<(NaiveDate, i32), i32> = HashMap::new();

        let untouched: Vec<(i32, NaiveDate, i32)> = today_plans::table
            .filter(today_plans::user_id.eq(actor.id))
            .filter(today_plans::plan_date.eq_any(dates.iter().copied().collect::<Vec<_>>()))
            .select((today_plans::id, today_plans::plan_date, today_plans::order_index))
            .load(conn)?;
        for (id, date, index) in untouched.into_iter().filter(|(id, _, _)| !moved.contains(id)) {
            layout.insert((date, index), id);
        }
        for plan in &owned {
            let index = targets[&plan.id];
            if let Some(other) = layout.insert((plan.plan_date, index), plan.id) {
                return Err(PlanError::conflict(format!(
                    "plans {} and {} would share position {} on {}",
                    other, plan.id, index, plan.plan_date
                )));
            }
        }

        for plan in &owned {
            diesel::update(today_plans::table.find(plan.id))
                .set(today_plans::order_index.eq(-plan.id))
                .execute(conn)?;
        }
        let mut updated = Vec::with_capacity(owned.len());
        for plan in &owned {
            let row: TodayPlan = diesel::update(today_plans::table.find(plan.id))
                .set((
                    today_plans::order_index.eq(targets[&plan.id]),
                    today_plans::updated_at.eq(now),
                ))
                .get_result(conn)?;
            updated.push(row);
        }
        info!("[PLAN] User {} reordered {} plans", actor.id, updated.len());
        Ok(updated)
    })
}

pub fn update_quadrant(
    conn: &mut SqliteConnection,
    actor: &Actor,
    plan_id: i32,
    quadrant: &str,
    now: NaiveDateTime,
) -> PlanResult<TodayPlan> {
    let quadrant = parse_quadrant(quadrant)?;
    conn.transaction(|conn| {
        let plan = load_owned_plan(conn, actor.id, plan_id)?;
        Ok(diesel::update(today_plans::table.find(plan.id))
            .set((
                today_plans::quadrant.eq(quadrant),
                today_plans::updated_at.eq(now),
            ))
            .get_result(conn)?)
    })
}

pub fn list_day(
    conn: &mut SqliteConnection,
    actor: &Actor,
    date: NaiveDate,
) -> PlanResult<Vec<TodayPlan>> {
    list_range(conn, actor.id, date, date)
}

pub(crate) fn list_range(
    conn: &mut SqliteConnection,
    user_id: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> PlanResult<Vec<TodayPlan>> {
    Ok(today_plans::table
        .filter(today_plans::user_id.eq(user_id))
        .filter(today_plans::plan_date.between(from, to))
        .order((today_plans::plan_date.asc(), today_plans::order_index.asc()))
        .select(TodayPlan::as_select())
        .load(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::Role;
    use crate::tests::test_util::{date, seed_catalog, seed_user, setup, test_conn, time, ts};
    use crate::{assert_err, assert_ok};

    fn slot(catalog_id: i32, day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> AddPlanRequest {
        AddPlanRequest {
            catalog_id,
            plan_date: day,
            scheduled_start_time: Some(time(start.0, start.1)),
            scheduled_end_time: Some(time(end.0, end.1)),
            planned_duration_minutes: None,
            quadrant: None,
            notes: None,
        }
    }

    fn indexes(conn: &mut SqliteConnection, user_id: i32, day: NaiveDate) -> Vec<(i32, i32)> {
        list_range(conn, user_id, day, day)
            .unwrap()
            .into_iter()
            .map(|p| (p.id, p.order_index))
            .collect()
    }

    #[test]
    fn test_duration_is_derived_from_times() {
        assert_eq!(assert_ok!(derive_duration(time(9, 0), time(10, 30))), 90);
        let err = assert_err!(derive_duration(time(22, 0), time(1, 0)));
        assert!(matches!(err, PlanError::Validation(_)));
        let err = assert_err!(derive_duration(time(9, 0), time(9, 0)));
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn test_add_assigns_growing_positions() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);

        let first = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (9, 0), (10, 0)), now));
        let second = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (10, 0), (10, 45)), now));
        assert_eq!((first.order_index, second.order_index), (1, 2));
        assert_eq!(second.planned_duration_minutes, 45);
        assert_eq!(first.quadrant, Quadrant::Q2);
        assert_eq!(first.status, PlanStatus::Planned);

        // Gaps are not reclaimed.
        diesel::delete(today_plans::table.find(first.id)).execute(&mut conn).unwrap();
        let third = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (11, 0), (12, 0)), now));
        assert_eq!(third.order_index, 3);

        let other_day = assert_ok!(add_from_catalog(
            &mut conn,
            &user,
            &slot(item.id, date(2026, 1, 6), (9, 0), (10, 0)),
            now
        ));
        assert_eq!(other_day.order_index, 1);
    }

    #[test]
    fn test_add_validates_input() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);

        let err = assert_err!(add_from_catalog(&mut conn, &user, &slot(999, day, (9, 0), (10, 0)), now));
        assert!(matches!(err, PlanError::NotFound(_)));

        let mut missing = slot(item.id, day, (9, 0), (10, 0));
        missing.scheduled_end_time = None;
        let err = assert_err!(add_from_catalog(&mut conn, &user, &missing, now));
        assert!(matches!(err, PlanError::Validation(_)));

        let mut bad_quadrant = slot(item.id, day, (9, 0), (10, 0));
        bad_quadrant.quadrant = Some("Q5".into());
        let err = assert_err!(add_from_catalog(&mut conn, &user, &bad_quadrant, now));
        assert!(matches!(err, PlanError::Validation(_)));

        let mut explicit = slot(item.id, day, (22, 0), (1, 0));
        explicit.planned_duration_minutes = Some(180);
        let plan = assert_ok!(add_from_catalog(&mut conn, &user, &explicit, now));
        assert_eq!(plan.planned_duration_minutes, 180);
    }

    #[test]
    fn test_reorder_swaps_and_skips_foreign_rows() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let other = seed_user(&mut conn, "b@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, None, "shared", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);
        let a = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (9, 0), (10, 0)), now));
        let b = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (10, 0), (11, 0)), now));
        let foreign = assert_ok!(add_from_catalog(&mut conn, &other, &slot(item.id, day, (9, 0), (10, 0)), now));

        let updated = assert_ok!(reorder(
            &mut conn,
            &user,
            &[
                ReorderEntry { plan_id: a.id, order_index: 2 },
                ReorderEntry { plan_id: b.id, order_index: 1 },
                ReorderEntry { plan_id: foreign.id, order_index: 7 },
            ],
            now
        ));
        assert_eq!(updated.len(), 2);
        assert_eq!(indexes(&mut conn, user.id, day), vec![(b.id, 1), (a.id, 2)]);
        assert_eq!(indexes(&mut conn, other.id, day), vec![(foreign.id, 1)]);
    }

    #[test]
    fn test_reorder_last_write_wins() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);
        let a = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (9, 0), (10, 0)), now));

        assert_ok!(reorder(
            &mut conn,
            &user,
            &[
                ReorderEntry { plan_id: a.id, order_index: 5 },
                ReorderEntry { plan_id: a.id, order_index: 9 },
            ],
            now
        ));
        assert_eq!(indexes(&mut conn, user.id, day), vec![(a.id, 9)]);
    }

    #[test]
    fn test_reorder_collision_changes_nothing() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);
        let a = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (9, 0), (10, 0)), now));
        let b = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (10, 0), (11, 0)), now));
        let c = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (11, 0), (12, 0)), now));

        let err = assert_err!(reorder(
            &mut conn,
            &user,
            &[
                ReorderEntry { plan_id: a.id, order_index: 4 },
                ReorderEntry { plan_id: b.id, order_index: 3 },
            ],
            now
        ));
        assert!(matches!(err, PlanError::Conflict(_)));
        assert_eq!(
            indexes(&mut conn, user.id, day),
            vec![(a.id, 1), (b.id, 2), (c.id, 3)]
        );

        let err = assert_err!(reorder(&mut conn, &user, &[ReorderEntry { plan_id: a.id, order_index: -1 }], now));
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn test_positions_stay_unique_across_mixed_operations() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let day = date(2026, 1, 5);
        let now = ts(2026, 1, 5, 8, 0);

        let mut ids = Vec::new();
        for hour in 8..12 {
            let plan = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (hour, 0), (hour, 30)), now));
            ids.push(plan.id);
        }
        assert_ok!(reorder(
            &mut conn,
            &user,
            &[
                ReorderEntry { plan_id: ids[0], order_index: 4 },
                ReorderEntry { plan_id: ids[3], order_index: 1 },
            ],
            now
        ));
        let fifth = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, day, (13, 0), (14, 0)), now));
        assert_eq!(fifth.order_index, 5);

        let mut seen: Vec<i32> = indexes(&mut conn, user.id, day).into_iter().map(|(_, i)| i).collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_update_quadrant() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let other = seed_user(&mut conn, "b@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let now = ts(2026, 1, 5, 8, 0);
        let plan = assert_ok!(add_from_catalog(&mut conn, &user, &slot(item.id, date(2026, 1, 5), (9, 0), (10, 0)), now));

        let moved = assert_ok!(update_quadrant(&mut conn, &user, plan.id, "q1", now));
        assert_eq!(moved.quadrant, Quadrant::Q1);
        let err = assert_err!(update_quadrant(&mut conn, &user, plan.id, "urgent", now));
        assert!(matches!(err, PlanError::Validation(_)));
        let err = assert_err!(update_quadrant(&mut conn, &other, plan.id, "Q3", now));
        assert!(matches!(err, PlanError::NotFound(_)));
    }
}
