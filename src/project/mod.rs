pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::approvals::{self, ApprovalSnapshot};
use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{ApprovalType, NotificationType, ProjectStatus};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    ApprovalReference, ApprovalRequest, NewProject, NotificationRef, Project, Task,
};
use crate::core::shared::schema::{projects, tasks};
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::directory::ensure_users_exist;
use crate::notifications::{notify, NotificationDraft, Outbox};
use crate::tasks::progress::project_progress;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub project_lead: Option<i32>,
    /// Defaults to the caller.
    pub handled_by: Option<i32>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub working_hours: i32,
    #[serde(default)]
    pub duration: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectStatusRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCreated {
    pub project: Project,
    pub approval_request: Option<ApprovalRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectCompletion {
    pub project: Project,
    pub approval_request: Option<ApprovalRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub progress: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub progress: i32,
    pub tasks: Vec<Task>,
}

pub(crate) fn load_project(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<Project> {
    projects::table
        .find(project_id)
        .select(Project::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("project {project_id}")))
}

fn is_project_visible(actor: &Actor, project: &Project) -> bool {
    actor.is_admin()
        || project.created_by == Some(actor.id)
        || project.handled_by == actor.id
        || project.project_lead == Some(actor.id)
}

pub fn load_visible_project(
    conn: &mut SqliteConnection,
    actor: &Actor,
    project_id: i32,
) -> PlanResult<Project> {
    let project = load_project(conn, project_id)?;
    if is_project_visible(actor, &project) {
        Ok(project)
    } else {
        Err(PlanError::not_found(format!("project {project_id}")))
    }
}

/// Admin-created projects are live at once. Anyone else gets an unapproved
/// project plus a CREATION request for the admins.
pub fn create_project(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    request: &CreateProjectRequest,
    now: NaiveDateTime,
) -> PlanResult<ProjectCreated> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(PlanError::validation("project name is required"));
    }
    if request.due_date < request.start_date {
        return Err(PlanError::validation("due_date is before start_date"));
    }
    if request.working_hours < 0 || request.duration < 0 {
        return Err(PlanError::validation(
            "working_hours and duration cannot be negative",
        ));
    }
    let handled_by = request.handled_by.unwrap_or(actor.id);

    conn.transaction(|conn| {
        let mut referenced = vec![handled_by];
        referenced.extend(request.project_lead);
        ensure_users_exist(conn, &referenced)?;

        let project: Project = diesel::insert_into(projects::table)
            .values(&NewProject {
                name: name.to_string(),
                description: request.description.clone(),
                status: ProjectStatus::Active,
                is_approved: actor.is_admin(),
                project_lead: request.project_lead,
                handled_by,
                created_by: Some(actor.id),
                start_date: request.start_date,
                due_date: request.due_date,
                working_hours: request.working_hours,
                duration: request.duration,
                completed_date: None,
                created_at: now,
            })
            .get_result(conn)?;

        if let Some(lead) = project.project_lead {
            let draft = NotificationDraft::new(
                NotificationType::ProjectCreated,
                "New Project Assigned",
                format!("You have been assigned as project lead for: {}", project.name),
                Some(NotificationRef::Project(project.id)),
            );
            notify(conn, outbox, lead, &draft, now)?;
        }

        let approval_request = if actor.is_admin() {
            None
        } else {
            Some(approvals::open_request(
                conn,
                outbox,
                actor,
                ApprovalReference::Project(project.id),
                ApprovalType::Creation,
                ApprovalSnapshot::of_project(&project),
                now,
            )?)
        };

        info!(
            "[PROJECT] Created project {} '{}' by user {} (approved: {})",
            project.id, project.name, actor.id, project.is_approved
        );
        Ok(ProjectCreated {
            project,
            approval_request,
        })
    })
}

/// Marks the project COMPLETED. Returns `None` when it no longer exists.
pub fn finalize_project_completion(
    conn: &mut SqliteConnection,
    project_id: i32,
    today: NaiveDate,
) -> PlanResult<Option<Project>> {
    let updated = diesel::update(projects::table.find(project_id))
        .set((
            projects::status.eq(ProjectStatus::Completed),
            projects::completed_date.eq(Some(today)),
        ))
        .get_result::<Project>(conn)
        .optional()?;
    if let Some(project) = &updated {
        info!("[PROJECT] Project {} completed on {}", project.id, today);
    }
    Ok(updated)
}

pub fn request_project_completion(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    project_id: i32,
    now: NaiveDateTime,
) -> PlanResult<ProjectCompletion> {
    conn.transaction(|conn| {
        let project = load_visible_project(conn, actor, project_id)?;
        if project.status == ProjectStatus::Completed {
            return Err(PlanError::conflict(format!(
                "project {project_id} is already completed"
            )));
        }

        if actor.is_admin() {
            let project = finalize_project_completion(conn, project_id, now.date())?
                .ok_or_else(|| PlanError::not_found(format!("project {project_id}")))?;
            return Ok(ProjectCompletion {
                project,
                approval_request: None,
            });
        }

        let approval_request = approvals::open_request(
            conn,
            outbox,
            actor,
            ApprovalReference::Project(project.id),
            ApprovalType::Completion,
            ApprovalSnapshot::of_project(&project),
            now,
        )?;
        Ok(ProjectCompletion {
            project,
            approval_request: Some(approval_request),
        })
    })
}

/// Hard delete. Tasks, subtasks and catalog links go with it.
pub(crate) fn remove_project(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<usize> {
    let removed = diesel::delete(projects::table.find(project_id)).execute(conn)?;
    if removed > 0 {
        info!("[PROJECT] Deleted project {}", project_id);
    }
    Ok(removed)
}

/// Toggles between ACTIVE and ON_HOLD. COMPLETED is reached only through
/// the completion path.
pub fn update_project_status(
    conn: &mut SqliteConnection,
    actor: &Actor,
    project_id: i32,
    status: ProjectStatus,
) -> PlanResult<Project> {
    if status == ProjectStatus::Completed {
        return Err(PlanError::validation(
            "use the completion endpoint to complete a project",
        ));
    }
    conn.transaction(|conn| {
        let project = load_visible_project(conn, actor, project_id)?;
        if project.status == ProjectStatus::Completed {
            return Err(PlanError::conflict(format!(
                "project {project_id} is already completed"
            )));
        }
        Ok(diesel::update(projects::table.find(project.id))
            .set(projects::status.eq(status))
            .get_result(conn)?)
    })
}

pub fn list_projects(
    conn: &mut SqliteConnection,
    actor: &Actor,
) -> PlanResult<Vec<ProjectSummary>> {
    let mut query = projects::table.into_boxed();
    if !actor.is_admin() {
        query = query.filter(
            projects::created_by
                .eq(actor.id)
                .or(projects::handled_by.eq(actor.id))
                .or(projects::project_lead.eq(actor.id)),
        );
    }
    let rows: Vec<Project> = query
        .order(projects::id.asc())
        .select(Project::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|project| {
            let progress = project_progress(conn, project.id)?;
            Ok(ProjectSummary { project, progress })
        })
        .collect()
}

pub fn get_project(
    conn: &mut SqliteConnection,
    actor: &Actor,
    project_id: i32,
) -> PlanResult<ProjectDetail> {
    let project = load_visible_project(conn, actor, project_id)?;
    let progress = project_progress(conn, project.id)?;
    let tasks: Vec<Task> = tasks::table
        .filter(tasks::project_id.eq(project.id))
        .order(tasks::id.asc())
        .select(Task::as_select())
        .load(conn)?;
    Ok(ProjectDetail {
        project,
        progress,
        tasks,
    })
}

/// Configure project routes
pub fn configure_project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::PROJECTS,
            post(handlers::handle_project_create).get(handlers::handle_project_list),
        )
        .route(ApiUrls::PROJECT_BY_ID, get(handlers::handle_project_get))
        .route(ApiUrls::PROJECT_STATUS, put(handlers::handle_project_status))
        .route(
            ApiUrls::PROJECT_COMPLETE,
            post(handlers::handle_project_complete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::{ApprovalStatus, ReferenceType, Role, TaskStatus};
    use crate::core::shared::schema::{approval_requests, notifications};
    use crate::tests::test_util::{
        date, seed_project, seed_task, seed_user, set_task_status, setup, test_conn, ts,
    };
    use crate::{assert_err, assert_ok};

    fn request(name: &str, lead: Option<i32>) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.into(),
            description: "internal tooling".into(),
            project_lead: lead,
            handled_by: None,
            start_date: date(2026, 1, 1),
            due_date: date(2026, 6, 30),
            working_hours: 120,
            duration: 180,
        }
    }

    #[test]
    fn test_admin_creation_skips_gate() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let mut outbox = Outbox::default();

        let created = assert_ok!(create_project(
            &mut conn,
            &mut outbox,
            &admin,
            &request("Apollo", None),
            ts(2026, 1, 1, 9, 0)
        ));
        assert!(created.project.is_approved);
        assert!(created.approval_request.is_none());
        assert_eq!(created.project.handled_by, admin.id);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_non_admin_creation_opens_request_and_fans_out() {
        setup();
        let mut conn = test_conn();
        let first = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let second = seed_user(&mut conn, "root2@example.com", Role::Admin, None);
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();

        let created = assert_ok!(create_project(
            &mut conn,
            &mut outbox,
            &dev,
            &request("Side quest", Some(lead.id)),
            ts(2026, 1, 1, 9, 0)
        ));
        assert!(!created.project.is_approved);
        let pending: Vec<ApprovalRequest> = approval_requests::table
            .filter(approval_requests::reference_type.eq(ReferenceType::Project))
            .filter(approval_requests::reference_id.eq(created.project.id))
            .select(ApprovalRequest::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].approval_type, ApprovalType::Creation);
        assert_eq!(pending[0].status, ApprovalStatus::Pending);

        let fanned: Vec<i32> = notifications::table
            .filter(notifications::notification_type.eq(NotificationType::ApprovalRequested))
            .order(notifications::user_id.asc())
            .select(notifications::user_id)
            .load(&mut conn)
            .unwrap();
        assert_eq!(fanned, vec![first.id, second.id]);

        let lead_notes: i64 = notifications::table
            .filter(notifications::user_id.eq(lead.id))
            .filter(notifications::notification_type.eq(NotificationType::ProjectCreated))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(lead_notes, 1);
        assert_eq!(outbox.len(), 3);
    }

    #[test]
    fn test_creation_validates_input() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 1, 9, 0);

        let err = assert_err!(create_project(&mut conn, &mut outbox, &admin, &request("  ", None), now));
        assert!(matches!(err, PlanError::Validation(_)));

        let mut backwards = request("Backwards", None);
        backwards.due_date = date(2025, 12, 1);
        let err = assert_err!(create_project(&mut conn, &mut outbox, &admin, &backwards, now));
        assert!(matches!(err, PlanError::Validation(_)));

        let err = assert_err!(create_project(&mut conn, &mut outbox, &admin, &request("Ghost lead", Some(999)), now));
        assert!(matches!(err, PlanError::NotFound(_)));
    }

    #[test]
    fn test_admin_completes_immediately() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let project = seed_project(&mut conn, &admin, "Apollo");
        let mut outbox = Outbox::default();

        let done = assert_ok!(request_project_completion(
            &mut conn,
            &mut outbox,
            &admin,
            project.id,
            ts(2026, 3, 2, 17, 0)
        ));
        assert!(done.approval_request.is_none());
        assert_eq!(done.project.status, ProjectStatus::Completed);
        assert_eq!(done.project.completed_date, Some(date(2026, 3, 2)));

        let err = assert_err!(request_project_completion(
            &mut conn,
            &mut outbox,
            &admin,
            project.id,
            ts(2026, 3, 3, 9, 0)
        ));
        assert!(matches!(err, PlanError::Conflict(_)));
    }

    #[test]
    fn test_duplicate_completion_request_conflicts() {
        setup();
        let mut conn = test_conn();
        seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let project = seed_project(&mut conn, &lead, "Apollo");
        let mut outbox = Outbox::default();
        let now = ts(2026, 3, 2, 17, 0);

        assert_ok!(request_project_completion(&mut conn, &mut outbox, &lead, project.id, now));
        let err = assert_err!(request_project_completion(&mut conn, &mut outbox, &lead, project.id, now));
        assert!(matches!(err, PlanError::Conflict(_)));
    }

    #[test]
    fn test_outsiders_cannot_see_project() {
        setup();
        let mut conn = test_conn();
        let owner = seed_user(&mut conn, "owner@example.com", Role::TeamLead, None);
        let stranger = seed_user(&mut conn, "stranger@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &owner, "Apollo");

        let err = assert_err!(get_project(&mut conn, &stranger, project.id));
        assert!(matches!(err, PlanError::NotFound(_)));
        assert!(assert_ok!(list_projects(&mut conn, &stranger)).is_empty());
        assert_eq!(assert_ok!(list_projects(&mut conn, &owner)).len(), 1);
    }

    #[test]
    fn test_detail_reports_unweighted_progress() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let project = seed_project(&mut conn, &admin, "Apollo");
        let done = seed_task(&mut conn, project.id, "one");
        seed_task(&mut conn, project.id, "two");
        seed_task(&mut conn, project.id, "three");
        set_task_status(&mut conn, done.id, TaskStatus::Done);

        let detail = assert_ok!(get_project(&mut conn, &admin, project.id));
        assert_eq!(detail.tasks.len(), 3);
        // Tasks without subtasks count as 0 regardless of status.
        assert_eq!(detail.progress, 0);
    }

    #[test]
    fn test_status_toggle_rejects_completed() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let project = seed_project(&mut conn, &admin, "Apollo");

        let held = assert_ok!(update_project_status(&mut conn, &admin, project.id, ProjectStatus::OnHold));
        assert_eq!(held.status, ProjectStatus::OnHold);
        let err = assert_err!(update_project_status(&mut conn, &admin, project.id, ProjectStatus::Completed));
        assert!(matches!(err, PlanError::Validation(_)));
    }
}
