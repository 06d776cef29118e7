//! Read-only groupings of plan slots.

use chrono::{Datelike, Days, NaiveDate};
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::Quadrant;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::TodayPlan;

use super::scheduler::list_range;

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantBucket {
    pub quadrant: Quadrant,
    pub label: &'static str,
    pub items: Vec<TodayPlan>,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub items: Vec<TodayPlan>,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantView {
    pub date: NaiveDate,
    pub quadrants: Vec<QuadrantBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayBucket>,
    pub total_minutes: i64,
}

fn total_minutes(items: &[TodayPlan]) -> i64 {
    items
        .iter()
        .map(|p| i64::from(p.planned_duration_minutes))
        .sum()
}

/// Always four buckets, Q1 first.
pub fn group_by_quadrant(plans: Vec<TodayPlan>) -> Vec<QuadrantBucket> {
    let mut buckets: Vec<QuadrantBucket> = Quadrant::ALL
        .iter()
        .map(|q| QuadrantBucket {
            quadrant: *q,
            label: q.label(),
            items: Vec::new(),
            total_minutes: 0,
        })
        .collect();
    for plan in plans {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.quadrant == plan.quadrant) {
            bucket.items.push(plan);
        }
    }
    for bucket in &mut buckets {
        bucket.total_minutes = total_minutes(&bucket.items);
    }
    buckets
}

/// One bucket per day in `start..=end`, empty days included.
pub fn group_by_day(start: NaiveDate, end: NaiveDate, plans: Vec<TodayPlan>) -> Vec<DayBucket> {
    let mut days: Vec<DayBucket> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DayBucket {
            date,
            items: Vec::new(),
            total_minutes: 0,
        })
        .collect();
    for plan in plans {
        if let Some(day) = days.iter_mut().find(|d| d.date == plan.plan_date) {
            day.items.push(plan);
        }
    }
    for day in &mut days {
        day.total_minutes = total_minutes(&day.items);
    }
    days
}

pub fn week_bounds(date: NaiveDate) -> PlanResult<(NaiveDate, NaiveDate)> {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let monday = date
        .checked_sub_days(Days::new(offset))
        .ok_or_else(|| PlanError::validation(format!("no week for {date}")))?;
    let sunday = monday
        .checked_add_days(Days::new(6))
        .ok_or_else(|| PlanError::validation(format!("no week for {date}")))?;
    Ok((monday, sunday))
}

pub fn month_bounds(date: NaiveDate) -> PlanResult<(NaiveDate, NaiveDate)> {
    let first = date
        .with_day(1)
        .ok_or_else(|| PlanError::validation(format!("no month for {date}")))?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| PlanError::validation(format!("no month for {date}")))?;
    Ok((first, last))
}

pub fn by_quadrant(
    conn: &mut SqliteConnection,
    actor: &Actor,
    date: NaiveDate,
) -> PlanResult<QuadrantView> {
    let plans = list_range(conn, actor.id, date, date)?;
    Ok(QuadrantView {
        date,
        quadrants: group_by_quadrant(plans),
    })
}

fn calendar(
    conn: &mut SqliteConnection,
    actor: &Actor,
    (start, end): (NaiveDate, NaiveDate),
) -> PlanResult<CalendarView> {
    let plans = list_range(conn, actor.id, start, end)?;
    let days = group_by_day(start, end, plans);
    let total_minutes = days.iter().map(|d| d.total_minutes).sum();
    Ok(CalendarView {
        start,
        end,
        days,
        total_minutes,
    })
}

pub fn week_view(
    conn: &mut SqliteConnection,
    actor: &Actor,
    date: NaiveDate,
) -> PlanResult<CalendarView> {
    calendar(conn, actor, week_bounds(date)?)
}

pub fn month_view(
    conn: &mut SqliteConnection,
    actor: &Actor,
    date: NaiveDate,
) -> PlanResult<CalendarView> {
    calendar(conn, actor, month_bounds(date)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::Role;
    use crate::planner::scheduler::{add_from_catalog, update_quadrant, AddPlanRequest};
    use crate::tests::test_util::{date, seed_catalog, seed_user, setup, test_conn, time, ts};
    use crate::assert_ok;

    #[test]
    fn test_week_runs_monday_to_sunday() {
        // 2026-01-07 is a Wednesday.
        assert_eq!(
            assert_ok!(week_bounds(date(2026, 1, 7))),
            (date(2026, 1, 5), date(2026, 1, 11))
        );
        assert_eq!(
            assert_ok!(week_bounds(date(2026, 1, 5))),
            (date(2026, 1, 5), date(2026, 1, 11))
        );
        assert_eq!(
            assert_ok!(week_bounds(date(2027, 1, 1))),
            (date(2026, 12, 28), date(2027, 1, 3))
        );
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            assert_ok!(month_bounds(date(2028, 2, 14))),
            (date(2028, 2, 1), date(2028, 2, 29))
        );
        assert_eq!(
            assert_ok!(month_bounds(date(2026, 12, 31))),
            (date(2026, 12, 1), date(2026, 12, 31))
        );
    }

    #[test]
    fn test_views_bucket_and_total() {
        setup();
        let mut conn = test_conn();
        let user = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let item = seed_catalog(&mut conn, Some(user.id), "focus", None, None);
        let now = ts(2026, 1, 5, 8, 0);
        let add = |conn: &mut SqliteConnection, day: NaiveDate, start: u32, minutes: i32| {
            add_from_catalog(
                conn,
                &user,
                &AddPlanRequest {
                    catalog_id: item.id,
                    plan_date: day,
                    scheduled_start_time: Some(time(start, 0)),
                    scheduled_end_time: Some(time(start + 1, 0)),
                    planned_duration_minutes: Some(minutes),
                    quadrant: None,
                    notes: None,
                },
                now,
            )
            .unwrap()
        };
        let urgent = add(&mut conn, date(2026, 1, 5), 9, 30);
        add(&mut conn, date(2026, 1, 5), 10, 45);
        add(&mut conn, date(2026, 1, 7), 9, 60);
        add(&mut conn, date(2026, 1, 20), 9, 15);
        assert_ok!(update_quadrant(&mut conn, &user, urgent.id, "Q1", now));

        let quadrants = assert_ok!(by_quadrant(&mut conn, &user, date(2026, 1, 5))).quadrants;
        assert_eq!(quadrants.len(), 4);
        assert_eq!(quadrants[0].total_minutes, 30);
        assert_eq!(quadrants[1].total_minutes, 45);
        assert!(quadrants[2].items.is_empty() && quadrants[3].items.is_empty());

        let week = assert_ok!(week_view(&mut conn, &user, date(2026, 1, 8)));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].total_minutes, 75);
        assert_eq!(week.days[2].total_minutes, 60);
        assert_eq!(week.total_minutes, 135);

        let month = assert_ok!(month_view(&mut conn, &user, date(2026, 1, 8)));
        assert_eq!(month.days.len(), 31);
        assert_eq!(month.total_minutes, 150);
    }
}
