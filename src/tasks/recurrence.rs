use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;

use crate::core::shared::enums::{NotificationType, RecurrencePattern, TaskStatus, TaskType};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    NewSubtask, NewTask, NewTaskAssignee, NotificationRef, Subtask, Task, TaskAssignee,
};
use crate::core::shared::schema::{subtasks, task_assignees, tasks};
use crate::notifications::{notify, NotificationDraft, Outbox};

/// Next date in the series. Month and year steps clamp to the last valid day.
pub fn advance(date: NaiveDate, pattern: RecurrencePattern) -> Option<NaiveDate> {
    match pattern {
        RecurrencePattern::Daily => date.checked_add_days(Days::new(1)),
        RecurrencePattern::Weekly => date.checked_add_days(Days::new(7)),
        RecurrencePattern::Monthly => date.checked_add_months(Months::new(1)),
        RecurrencePattern::Yearly => date.checked_add_months(Months::new(12)),
    }
}

/// Creates the next occurrence of a completed RECURRING task together with
/// copies of its assignees and subtasks. Returns `None` for other task types.
pub fn spawn_successor(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    task: &Task,
    now: NaiveDateTime,
) -> PlanResult<Option<Task>> {
    let pattern = match (task.task_type, task.recurrence_pattern) {
        (TaskType::Recurring, Some(pattern)) => pattern,
        _ => return Ok(None),
    };
    let base = task.next_occurrence.unwrap_or(task.due_date);
    let next = advance(base, pattern)
        .ok_or_else(|| PlanError::validation(format!("cannot advance {base} by {pattern}")))?;

    conn.transaction(|conn| {
        let successor: Task = diesel::insert_into(tasks::table)
            .values(&NewTask {
                project_id: task.project_id,
                title: task.title.clone(),
                project_lead: task.project_lead,
                task_type: TaskType::Recurring,
                priority: task.priority,
                status: TaskStatus::Pending,
                start_date: Some(next),
                due_date: next,
                next_occurrence: Some(next),
                recurrence_pattern: Some(pattern),
                github_link: task.github_link.clone(),
                figma_link: task.figma_link.clone(),
                completed_at: None,
                created_by: task.created_by,
                created_at: now,
            })
            .get_result(conn)?;

        let assignees: Vec<TaskAssignee> = task_assignees::table
            .filter(task_assignees::task_id.eq(task.id))
            .order(task_assignees::id.asc())
            .select(TaskAssignee::as_select())
            .load(conn)?;
        for assignee in &assignees {
            diesel::insert_into(task_assignees::table)
                .values(&NewTaskAssignee {
                    task_id: successor.id,
                    user_id: assignee.user_id,
                    role: assignee.role,
                    assigned_at: now,
                })
                .execute(conn)?;
        }

        let milestones: Vec<Subtask> = subtasks::table
            .filter(subtasks::task_id.eq(task.id))
            .order((subtasks::created_at.asc(), subtasks::id.asc()))
            .select(Subtask::as_select())
            .load(conn)?;
        for subtask in &milestones {
            diesel::insert_into(subtasks::table)
                .values(&NewSubtask {
                    task_id: successor.id,
                    title: subtask.title.clone(),
                    status: TaskStatus::Pending,
                    progress_weight: subtask.progress_weight,
                    due_date: next,
                    completed_at: None,
                    created_at: now,
                })
                .execute(conn)?;
        }

        super::notify_task_created(conn, outbox, &successor, now)?;
        for assignee in &assignees {
            let draft = NotificationDraft::new(
                NotificationType::TaskAssigned,
                "Task Assigned",
                format!("You have been assigned to task: {}", successor.title),
                Some(NotificationRef::Task(successor.id)),
            );
            notify(conn, outbox, assignee.user_id, &draft, now)?;
        }

        info!(
            "[TASK] Recurring task {} spawned successor {} due {}",
            task.id, successor.id, next
        );
        Ok(Some(successor))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_advance_by_pattern() {
        assert_eq!(advance(d(2026, 1, 5), RecurrencePattern::Daily), Some(d(2026, 1, 6)));
        assert_eq!(advance(d(2026, 1, 5), RecurrencePattern::Weekly), Some(d(2026, 1, 12)));
        assert_eq!(advance(d(2026, 1, 5), RecurrencePattern::Monthly), Some(d(2026, 2, 5)));
        assert_eq!(advance(d(2026, 1, 5), RecurrencePattern::Yearly), Some(d(2027, 1, 5)));
    }

    #[test]
    fn test_month_end_clamps() {
        assert_eq!(advance(d(2026, 1, 31), RecurrencePattern::Monthly), Some(d(2026, 2, 28)));
        assert_eq!(advance(d(2028, 1, 31), RecurrencePattern::Monthly), Some(d(2028, 2, 29)));
        assert_eq!(advance(d(2028, 2, 29), RecurrencePattern::Yearly), Some(d(2029, 2, 28)));
    }

    #[test]
    fn test_week_crosses_year() {
        assert_eq!(advance(d(2026, 12, 29), RecurrencePattern::Weekly), Some(d(2027, 1, 5)));
    }
}
