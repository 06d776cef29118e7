//! Work stats dashboard
//!
//! Who may look at whom: admins see everyone, managers and team leads see
//! their department, employees see only themselves.

pub mod handlers;
pub mod types;

pub use types::*;

use axum::{routing::get, Router};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{Role, TaskStatus};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{Project, User};
use crate::core::shared::schema::{projects, tasks};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::round_percent;
use crate::core::urls::ApiUrls;
use crate::directory::{department_members, get_user, list_users};

pub const NO_PROJECTS_MESSAGE: &str = "No projects handled by this user.";

/// Department of the caller as recorded in the directory.
fn caller_department(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<Option<i32>> {
    Ok(get_user(conn, actor.id)?.department_id)
}

pub fn users_for_stats(conn: &mut SqliteConnection, actor: &Actor) -> PlanResult<UsersForStats> {
    let users: Vec<User> = match actor.role {
        Role::Admin => list_users(conn)?,
        Role::Manager | Role::TeamLead => match caller_department(conn, actor)? {
            Some(dept) => department_members(conn, dept)?,
            None => vec![get_user(conn, actor.id)?],
        },
        Role::Employee => vec![get_user(conn, actor.id)?],
    };
    Ok(UsersForStats {
        count: users.len(),
        users,
    })
}

fn ensure_can_view(conn: &mut SqliteConnection, actor: &Actor, target: &User) -> PlanResult<()> {
    if actor.is_admin() || target.id == actor.id {
        return Ok(());
    }
    let allowed = match actor.role {
        Role::Manager | Role::TeamLead => {
            let dept = caller_department(conn, actor)?;
            dept.is_some() && dept == target.department_id
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(PlanError::forbidden(format!(
            "not allowed to view stats for user {}",
            target.id
        )))
    }
}

pub fn project_work_stats(
    conn: &mut SqliteConnection,
    actor: &Actor,
    user_id: Option<i32>,
) -> PlanResult<ProjectWorkStats> {
    let target_id = user_id.unwrap_or(actor.id);
    if target_id != actor.id && actor.role == Role::Employee {
        return Err(PlanError::forbidden("employees can only view their own stats"));
    }
    let target = get_user(conn, target_id)?;
    ensure_can_view(conn, actor, &target)?;

    let handled: Vec<Project> = projects::table
        .filter(projects::handled_by.eq(target.id))
        .order(projects::id.asc())
        .select(Project::as_select())
        .load(conn)?;

    let mut entries = Vec::with_capacity(handled.len());
    for project in handled {
        let statuses: Vec<TaskStatus> = tasks::table
            .filter(tasks::project_id.eq(project.id))
            .select(tasks::status)
            .load(conn)?;
        let total = statuses.len() as i64;
        let done = statuses.iter().filter(|s| **s == TaskStatus::Done).count() as i64;
        entries.push(ProjectStats {
            project_id: project.id,
            project_name: project.name,
            status: project.status,
            total_tasks: total,
            completed_tasks: done,
            completion_percentage: round_percent(done as f64, total as f64),
        });
    }

    let total_tasks: i64 = entries.iter().map(|p| p.total_tasks).sum();
    let completed_tasks: i64 = entries.iter().map(|p| p.completed_tasks).sum();
    Ok(ProjectWorkStats {
        user: target,
        total_projects: entries.len(),
        total_tasks,
        completed_tasks,
        overall_completion_percentage: round_percent(completed_tasks as f64, total_tasks as f64),
        message: entries.is_empty().then(|| NO_PROJECTS_MESSAGE.to_string()),
        projects: entries,
    })
}

pub fn configure_dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::DASHBOARD_USERS, get(handlers::handle_users_for_stats))
        .route(
            ApiUrls::DASHBOARD_PROJECT_STATS,
            get(handlers::handle_project_work_stats),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_util::{
        seed_department, seed_project, seed_task, seed_user, set_task_status, setup, test_conn,
    };
    use crate::{assert_err, assert_ok};

    #[test]
    fn test_visible_users_follow_role() {
        setup();
        let mut conn = test_conn();
        let eng = seed_department(&mut conn, "Engineering");
        let ops = seed_department(&mut conn, "Operations");
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let manager = seed_user(&mut conn, "boss@example.com", Role::Manager, Some(eng));
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, Some(eng));
        seed_user(&mut conn, "ops@example.com", Role::Employee, Some(ops));
        let loner = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);

        assert_eq!(assert_ok!(users_for_stats(&mut conn, &admin)).count, 5);
        let ids: Vec<i32> = assert_ok!(users_for_stats(&mut conn, &manager))
            .users
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![manager.id, dev.id]);
        let own = assert_ok!(users_for_stats(&mut conn, &dev));
        assert_eq!(own.count, 1);
        assert_eq!(own.users[0].id, dev.id);
        assert_eq!(assert_ok!(users_for_stats(&mut conn, &loner)).users[0].id, loner.id);
    }

    #[test]
    fn test_stats_visibility_is_enforced() {
        setup();
        let mut conn = test_conn();
        let eng = seed_department(&mut conn, "Engineering");
        let ops = seed_department(&mut conn, "Operations");
        let manager = seed_user(&mut conn, "boss@example.com", Role::Manager, Some(eng));
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, Some(eng));
        let outsider = seed_user(&mut conn, "ops@example.com", Role::Employee, Some(ops));

        let err = assert_err!(project_work_stats(&mut conn, &dev, Some(manager.id)));
        assert!(matches!(err, PlanError::Forbidden(_)));
        let err = assert_err!(project_work_stats(&mut conn, &manager, Some(outsider.id)));
        assert!(matches!(err, PlanError::Forbidden(_)));
        assert_ok!(project_work_stats(&mut conn, &manager, Some(dev.id)));

        let own = assert_ok!(project_work_stats(&mut conn, &dev, None));
        assert_eq!(own.total_projects, 0);
        assert_eq!(own.overall_completion_percentage, 0);
        assert_eq!(own.message.as_deref(), Some(NO_PROJECTS_MESSAGE));
    }

    #[test]
    fn test_completion_percentages() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let big = seed_project(&mut conn, &lead, "Big");
        for i in 0..10 {
            let task = seed_task(&mut conn, big.id, &format!("task {i}"));
            if i < 4 {
                set_task_status(&mut conn, task.id, TaskStatus::Done);
            }
        }
        let small = seed_project(&mut conn, &lead, "Small");
        let only = seed_task(&mut conn, small.id, "only");
        set_task_status(&mut conn, only.id, TaskStatus::Done);
        seed_task(&mut conn, small.id, "other");
        seed_project(&mut conn, &lead, "Empty");

        let stats = assert_ok!(project_work_stats(&mut conn, &admin, Some(lead.id)));
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.projects[0].completion_percentage, 40);
        assert_eq!(stats.projects[1].completion_percentage, 50);
        assert_eq!(stats.projects[2].completion_percentage, 0);
        assert_eq!((stats.completed_tasks, stats.total_tasks), (5, 12));
        assert_eq!(stats.overall_completion_percentage, 42);
        assert!(stats.message.is_none());
    }
}
