//! Approval gate
//!
//! Non-admin creation and completion of projects and tasks open a request here.
//! An admin response is written together with the request's status flip and
//! the terminal effect on the referenced entity, all in one transaction.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{
    ApprovalAction, ApprovalStatus, ApprovalType, NotificationType, ReferenceType, Role,
};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    ApprovalReference, ApprovalRequest, ApprovalResponse, NewApprovalRequest,
    NewApprovalResponse, NotificationRef, Project, Task,
};
use crate::core::shared::schema::{approval_requests, approval_responses, projects, tasks};
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::notifications::{notify, notify_admins, NotificationDraft, Outbox};

/// Frozen copy of the entity at request time, stored as `request_data`.
#[derive(Debug, Clone)]
pub struct ApprovalSnapshot(serde_json::Value);

impl ApprovalSnapshot {
    pub fn of_task(task: &Task) -> Self {
        Self(serde_json::json!({
            "title": task.title,
            "project_id": task.project_id,
            "task_type": task.task_type,
            "priority": task.priority,
            "status": task.status,
            "due_date": task.due_date,
        }))
    }

    pub fn of_project(project: &Project) -> Self {
        Self(serde_json::json!({
            "name": project.name,
            "status": project.status,
            "handled_by": project.handled_by,
            "project_lead": project.project_lead,
            "due_date": project.due_date,
        }))
    }

    pub fn custom(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// What a resolved request did to the referenced entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ApprovalEffect {
    ProjectApproved,
    ProjectDeleted,
    ProjectCompleted,
    TaskDeleted,
    TaskCompleted { successor_id: Option<i32> },
    NoChange,
    ReferenceMissing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalResolution {
    pub request: ApprovalRequest,
    pub response: ApprovalResponse,
    #[serde(flatten)]
    pub effect: ApprovalEffect,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalRequestDetail {
    #[serde(flatten)]
    pub request: ApprovalRequest,
    pub response: Option<ApprovalResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub action: ApprovalAction,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModificationRequest {
    pub reference: ApprovalReference,
    pub changes: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalFilters {
    pub status: Option<ApprovalStatus>,
}

fn describe(reference: ApprovalReference) -> String {
    match reference {
        ApprovalReference::Project(id) => format!("project {id}"),
        ApprovalReference::Task(id) => format!("task {id}"),
    }
}

fn reference_exists(conn: &mut SqliteConnection, reference: ApprovalReference) -> PlanResult<bool> {
    let count: i64 = match reference {
        ApprovalReference::Project(id) => projects::table
            .filter(projects::id.eq(id))
            .count()
            .get_result(conn)?,
        ApprovalReference::Task(id) => tasks::table
            .filter(tasks::id.eq(id))
            .count()
            .get_result(conn)?,
    };
    Ok(count > 0)
}

/// Opens a PENDING request and fans APPROVAL_REQUESTED out to every admin.
/// Fails with Conflict if the same reference already has a pending request of this type.
pub fn open_request(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    reference: ApprovalReference,
    approval_type: ApprovalType,
    snapshot: ApprovalSnapshot,
    now: NaiveDateTime,
) -> PlanResult<ApprovalRequest> {
    conn.transaction(|conn| {
        let pending: i64 = approval_requests::table
            .filter(approval_requests::reference_type.eq(reference.reference_type()))
            .filter(approval_requests::reference_id.eq(reference.id()))
            .filter(approval_requests::approval_type.eq(approval_type))
            .filter(approval_requests::status.eq(ApprovalStatus::Pending))
            .count()
            .get_result(conn)?;
        if pending > 0 {
            return Err(PlanError::conflict(format!(
                "a pending {} request already exists for {}",
                approval_type,
                describe(reference)
            )));
        }

        let request: ApprovalRequest = diesel::insert_into(approval_requests::table)
            .values(&NewApprovalRequest {
                reference_type: reference.reference_type(),
                reference_id: reference.id(),
                approval_type,
                requested_by: actor.id,
                status: ApprovalStatus::Pending,
                request_data: Some(snapshot.0.to_string()),
                created_at: now,
            })
            .get_result(conn)?;

        let title = match (reference.reference_type(), approval_type) {
            (ReferenceType::Project, ApprovalType::Creation) => "New Project Needs Approval",
            (ReferenceType::Task, ApprovalType::Creation) => "New Task Needs Approval",
            (_, ApprovalType::Completion) => "Completion Needs Approval",
            (_, ApprovalType::Modification) => "Modification Needs Approval",
        };
        let draft = NotificationDraft::new(
            NotificationType::ApprovalRequested,
            title,
            format!(
                "User {} requested {} of {}",
                actor.id,
                approval_type.as_str().to_lowercase(),
                describe(reference)
            ),
            Some(NotificationRef::Approval(request.id)),
        );
        let fanned = notify_admins(conn, outbox, &draft, now)?;

        info!(
            "[APPROVAL] Request {} opened: {} {} by user {} ({} admins notified)",
            request.id,
            approval_type,
            describe(reference),
            actor.id,
            fanned.len()
        );
        Ok(request)
    })
}

/// A non-admin proposes changes to an entity. The payload is kept on the
/// request for the reviewing admin.
pub fn submit_modification(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    request: &ModificationRequest,
    now: NaiveDateTime,
) -> PlanResult<ApprovalRequest> {
    if !request.changes.is_object() {
        return Err(PlanError::validation("changes must be a JSON object"));
    }
    conn.transaction(|conn| {
        if !reference_exists(conn, request.reference)? {
            return Err(PlanError::not_found(describe(request.reference)));
        }
        open_request(
            conn,
            outbox,
            actor,
            request.reference,
            ApprovalType::Modification,
            ApprovalSnapshot::custom(request.changes.clone()),
            now,
        )
    })
}

/// Writes the single response row and flips the request's status with it.
fn record_response(
    conn: &mut SqliteConnection,
    request: &ApprovalRequest,
    reviewer: &Actor,
    action: ApprovalAction,
    rejection_reason: Option<String>,
    now: NaiveDateTime,
) -> PlanResult<(ApprovalRequest, ApprovalResponse)> {
    let response: ApprovalResponse = diesel::insert_into(approval_responses::table)
        .values(&NewApprovalResponse {
            approval_request_id: request.id,
            action,
            reviewed_by: reviewer.id,
            reviewed_at: now,
            rejection_reason,
        })
        .get_result(conn)
        .map_err(|e| match PlanError::from(e) {
            PlanError::Conflict(_) => {
                PlanError::conflict(format!("request {} already has a response", request.id))
            }
            other => other,
        })?;

    let flipped: ApprovalRequest = diesel::update(approval_requests::table.find(request.id))
        .set(approval_requests::status.eq(ApprovalStatus::from(action)))
        .get_result(conn)?;
    Ok((flipped, response))
}

fn apply_effect(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    request: &ApprovalRequest,
    action: ApprovalAction,
    now: NaiveDateTime,
) -> PlanResult<ApprovalEffect> {
    let reference = request.reference();
    if !reference_exists(conn, reference)? {
        warn!(
            "[APPROVAL] Request {} resolved but {} no longer exists",
            request.id,
            describe(reference)
        );
        return Ok(ApprovalEffect::ReferenceMissing);
    }

    let effect = match (reference, request.approval_type, action) {
        (ApprovalReference::Project(id), ApprovalType::Creation, ApprovalAction::Approved) => {
            diesel::update(projects::table.find(id))
                .set(projects::is_approved.eq(true))
                .execute(conn)?;
            ApprovalEffect::ProjectApproved
        }
        (ApprovalReference::Project(id), ApprovalType::Creation, ApprovalAction::Rejected) => {
            crate::project::remove_project(conn, id)?;
            ApprovalEffect::ProjectDeleted
        }
        (ApprovalReference::Project(id), ApprovalType::Completion, ApprovalAction::Approved) => {
            crate::project::finalize_project_completion(conn, id, now.date())?;
            ApprovalEffect::ProjectCompleted
        }
        (ApprovalReference::Task(id), ApprovalType::Creation, ApprovalAction::Rejected) => {
            crate::tasks::remove_task(conn, id)?;
            ApprovalEffect::TaskDeleted
        }
        (ApprovalReference::Task(id), ApprovalType::Completion, ApprovalAction::Approved) => {
            match crate::tasks::finalize_completion(conn, outbox, id, now)? {
                Some((_, successor)) => ApprovalEffect::TaskCompleted {
                    successor_id: successor.map(|t| t.id),
                },
                None => ApprovalEffect::ReferenceMissing,
            }
        }
        _ => ApprovalEffect::NoChange,
    };
    Ok(effect)
}

/// Admin decision on a pending request.
///
/// Checks run in a fixed order: privilege, existence, then state. The
/// response row, the status flip and the entity effect commit together.
pub fn respond(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    request_id: i32,
    action: ApprovalAction,
    rejection_reason: Option<String>,
    now: NaiveDateTime,
) -> PlanResult<ApprovalResolution> {
    actor.require(Role::Admin)?;

    conn.transaction(|conn| {
        let request: ApprovalRequest = approval_requests::table
            .find(request_id)
            .select(ApprovalRequest::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| PlanError::not_found(format!("approval request {request_id}")))?;

        let responded: i64 = approval_responses::table
            .filter(approval_responses::approval_request_id.eq(request_id))
            .count()
            .get_result(conn)?;
        if responded > 0 {
            return Err(PlanError::conflict(format!(
                "request {request_id} already has a response"
            )));
        }
        if request.status != ApprovalStatus::Pending {
            return Err(PlanError::conflict(format!(
                "request {request_id} is {}",
                request.status
            )));
        }

        let reason = rejection_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let (request, response) =
            record_response(conn, &request, actor, action, reason.clone(), now)?;
        let effect = apply_effect(conn, outbox, &request, action, now)?;

        let (kind, title) = match action {
            ApprovalAction::Approved => {
                (NotificationType::ApprovalApproved, "Approval Request Approved")
            }
            ApprovalAction::Rejected => {
                (NotificationType::ApprovalRejected, "Approval Request Rejected")
            }
        };
        let draft = NotificationDraft::new(
            kind,
            title,
            format!(
                "Your approval request has been {}. Comments: {}",
                action.as_str().to_lowercase(),
                reason.as_deref().unwrap_or("None")
            ),
            Some(NotificationRef::Approval(request.id)),
        );
        notify(conn, outbox, request.requested_by, &draft, now)?;

        info!(
            "[APPROVAL] Request {} {} by admin {}: {:?}",
            request.id, action, actor.id, effect
        );
        Ok(ApprovalResolution {
            request,
            response,
            effect,
        })
    })
}

/// Admins see every request; everyone else only their own.
pub fn list_requests(
    conn: &mut SqliteConnection,
    actor: &Actor,
    filters: &ApprovalFilters,
) -> PlanResult<Vec<ApprovalRequest>> {
    let mut query = approval_requests::table.into_boxed();
    if !actor.is_admin() {
        query = query.filter(approval_requests::requested_by.eq(actor.id));
    }
    if let Some(status) = filters.status {
        query = query.filter(approval_requests::status.eq(status));
    }
    Ok(query
        .order((approval_requests::created_at.desc(), approval_requests::id.desc()))
        .select(ApprovalRequest::as_select())
        .load(conn)?)
}

pub fn get_request(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request_id: i32,
) -> PlanResult<ApprovalRequestDetail> {
    let request: ApprovalRequest = approval_requests::table
        .find(request_id)
        .select(ApprovalRequest::as_select())
        .first(conn)
        .optional()?
        .filter(|r| actor.is_admin() || r.requested_by == actor.id)
        .ok_or_else(|| PlanError::not_found(format!("approval request {request_id}")))?;

    let response: Option<ApprovalResponse> = approval_responses::table
        .filter(approval_responses::approval_request_id.eq(request_id))
        .select(ApprovalResponse::as_select())
        .first(conn)
        .optional()?;
    Ok(ApprovalRequestDetail { request, response })
}

/// Configure approval routes
pub fn configure_approval_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::APPROVALS, get(handlers::handle_approval_list))
        .route(ApiUrls::APPROVAL_BY_ID, get(handlers::handle_approval_get))
        .route(ApiUrls::APPROVAL_RESPOND, post(handlers::handle_approval_respond))
        .route(
            ApiUrls::APPROVAL_MODIFICATIONS,
            post(handlers::handle_modification_submit),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::enums::{AssigneeRole, ProjectStatus, RecurrencePattern, TaskStatus, TaskType};
    use crate::core::shared::models::{Notification, Subtask, TaskAssignee};
    use crate::core::shared::schema::{notifications, subtasks, task_assignees};
    use crate::project::{create_project, request_project_completion, CreateProjectRequest};
    use crate::tasks::{assign_user, request_task_completion, CompletionOutcome};
    use crate::tests::test_util::{
        date, insert_subtask, seed_project, seed_task, seed_user, setup, test_conn, ts,
    };
    use crate::{assert_err, assert_ok};

    fn project_request(name: &str, handled_by: i32) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.into(),
            description: String::new(),
            project_lead: None,
            handled_by: Some(handled_by),
            start_date: date(2026, 1, 1),
            due_date: date(2026, 3, 1),
            working_hours: 40,
            duration: 60,
        }
    }

    #[test]
    fn test_rejected_project_creation_deletes_project_and_tasks() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);

        let created = assert_ok!(create_project(
            &mut conn,
            &mut outbox,
            &dev,
            &project_request("Side quest", dev.id),
            now
        ));
        assert!(!created.project.is_approved);
        let request = created.approval_request.unwrap();
        let task = seed_task(&mut conn, created.project.id, "orphan soon");

        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            request.id,
            ApprovalAction::Rejected,
            Some("out of scope".into()),
            now
        ));
        assert_eq!(resolution.effect, ApprovalEffect::ProjectDeleted);
        assert_eq!(resolution.request.status, ApprovalStatus::Rejected);

        let projects_left: i64 = projects::table
            .filter(projects::id.eq(created.project.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(projects_left, 0);
        let tasks_left: i64 = tasks::table
            .filter(tasks::id.eq(task.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(tasks_left, 0);
    }

    #[test]
    fn test_approved_project_creation_flips_flag_and_notifies_requester() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);
        let created = assert_ok!(create_project(
            &mut conn,
            &mut outbox,
            &dev,
            &project_request("Side quest", dev.id),
            now
        ));
        let request = created.approval_request.unwrap();

        let mut outbox = Outbox::default();
        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            request.id,
            ApprovalAction::Approved,
            None,
            now
        ));
        assert_eq!(resolution.effect, ApprovalEffect::ProjectApproved);
        let approved: bool = projects::table
            .find(created.project.id)
            .select(projects::is_approved)
            .first(&mut conn)
            .unwrap();
        assert!(approved);

        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.deliveries()[0].user_id, dev.id);
    }

    #[test]
    fn test_respond_checks_in_order_and_only_once() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let manager = seed_user(&mut conn, "boss@example.com", Role::Manager, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);

        // Forbidden wins even for a request that does not exist.
        let err = assert_err!(respond(&mut conn, &mut outbox, &manager, 404, ApprovalAction::Approved, None, now));
        assert!(matches!(err, PlanError::Forbidden(_)));
        let err = assert_err!(respond(&mut conn, &mut outbox, &admin, 404, ApprovalAction::Approved, None, now));
        assert!(matches!(err, PlanError::NotFound(_)));

        let created = assert_ok!(create_project(
            &mut conn,
            &mut outbox,
            &dev,
            &project_request("Side quest", dev.id),
            now
        ));
        let request = created.approval_request.unwrap();
        assert_ok!(respond(&mut conn, &mut outbox, &admin, request.id, ApprovalAction::Approved, None, now));

        for action in [ApprovalAction::Approved, ApprovalAction::Rejected] {
            let err = assert_err!(respond(&mut conn, &mut outbox, &admin, request.id, action, None, now));
            assert!(matches!(err, PlanError::Conflict(_)));
        }
        let responses: i64 = approval_responses::table
            .filter(approval_responses::approval_request_id.eq(request.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(responses, 1);
    }

    #[test]
    fn test_project_completion_request_then_approval() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let lead = seed_user(&mut conn, "lead@example.com", Role::TeamLead, None);
        let project = seed_project(&mut conn, &lead, "Apollo");
        let mut outbox = Outbox::default();

        let requested = assert_ok!(request_project_completion(
            &mut conn,
            &mut outbox,
            &lead,
            project.id,
            ts(2026, 2, 1, 9, 0)
        ));
        assert_eq!(requested.project.status, ProjectStatus::Active);
        let request = requested.approval_request.unwrap();

        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            request.id,
            ApprovalAction::Approved,
            None,
            ts(2026, 2, 3, 9, 0)
        ));
        assert_eq!(resolution.effect, ApprovalEffect::ProjectCompleted);
        let (status, completed): (ProjectStatus, Option<chrono::NaiveDate>) = projects::table
            .find(project.id)
            .select((projects::status, projects::completed_date))
            .first(&mut conn)
            .unwrap();
        assert_eq!(status, ProjectStatus::Completed);
        assert_eq!(completed, Some(date(2026, 2, 3)));
    }

    #[test]
    fn test_rejected_completion_leaves_task_unchanged() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &admin, "Apollo");
        let task = seed_task(&mut conn, project.id, "Build");
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);
        assert_ok!(assign_user(&mut conn, &mut outbox, &admin, task.id, dev.id, AssigneeRole::Dev, now));

        let request = match assert_ok!(request_task_completion(&mut conn, &mut outbox, &dev, task.id, now)) {
            CompletionOutcome::Requested { approval_request, .. } => approval_request,
            other => panic!("unexpected {other:?}"),
        };
        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            request.id,
            ApprovalAction::Rejected,
            None,
            now
        ));
        assert_eq!(resolution.effect, ApprovalEffect::NoChange);
        let status: TaskStatus = tasks::table
            .find(task.id)
            .select(tasks::status)
            .first(&mut conn)
            .unwrap();
        assert_eq!(status, TaskStatus::Pending);

        // A fresh request may be opened once the previous one is resolved.
        assert_ok!(request_task_completion(&mut conn, &mut outbox, &dev, task.id, now));
    }

    #[test]
    fn test_approved_recurring_completion_spawns_successor() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &admin, "Ops");
        let task = seed_task(&mut conn, project.id, "Weekly report");
        diesel::update(tasks::table.find(task.id))
            .set((
                tasks::task_type.eq(TaskType::Recurring),
                tasks::recurrence_pattern.eq(Some(RecurrencePattern::Weekly)),
                tasks::next_occurrence.eq(Some(date(2026, 1, 5))),
            ))
            .execute(&mut conn)
            .unwrap();
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);
        assert_ok!(assign_user(&mut conn, &mut outbox, &admin, task.id, dev.id, AssigneeRole::Lead, now));
        insert_subtask(&mut conn, task.id, "collect", ts(2026, 1, 1, 9, 0));
        insert_subtask(&mut conn, task.id, "write", ts(2026, 1, 1, 9, 1));
        crate::tasks::progress::recalculate_subtask_weights(&mut conn, task.id).unwrap();

        let request = match assert_ok!(request_task_completion(&mut conn, &mut outbox, &dev, task.id, now)) {
            CompletionOutcome::Requested { approval_request, .. } => approval_request,
            other => panic!("unexpected {other:?}"),
        };
        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            request.id,
            ApprovalAction::Approved,
            None,
            now
        ));
        let successor_id = match resolution.effect {
            ApprovalEffect::TaskCompleted { successor_id: Some(id) } => id,
            other => panic!("unexpected effect {other:?}"),
        };

        let original: Task = tasks::table
            .find(task.id)
            .select(Task::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(original.status, TaskStatus::Done);

        let successor: Task = tasks::table
            .find(successor_id)
            .select(Task::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(successor.due_date, date(2026, 1, 12));
        assert_eq!(successor.start_date, Some(date(2026, 1, 12)));
        assert_eq!(successor.next_occurrence, Some(date(2026, 1, 12)));
        assert_eq!(successor.status, TaskStatus::Pending);
        assert_eq!(successor.title, "Weekly report");

        let copied: Vec<TaskAssignee> = task_assignees::table
            .filter(task_assignees::task_id.eq(successor_id))
            .select(TaskAssignee::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].user_id, dev.id);
        assert_eq!(copied[0].role, AssigneeRole::Lead);

        let milestones: Vec<Subtask> = subtasks::table
            .filter(subtasks::task_id.eq(successor_id))
            .order(subtasks::id.asc())
            .select(Subtask::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(milestones.len(), 2);
        assert!(milestones.iter().all(|s| s.status == TaskStatus::Pending));
        assert!(milestones.iter().all(|s| s.due_date == date(2026, 1, 12)));
        assert_eq!(milestones.iter().map(|s| s.progress_weight).sum::<i32>(), 100);
    }

    #[test]
    fn test_resolution_on_deleted_reference_is_noop() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &admin, "Apollo");
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);
        let created = assert_ok!(crate::tasks::create_task(
            &mut conn,
            &mut outbox,
            &dev,
            &crate::tasks::CreateTaskRequest {
                project_id: project.id,
                title: "temp".into(),
                project_lead: None,
                task_type: TaskType::Standard,
                priority: crate::core::shared::enums::TaskPriority::Low,
                start_date: None,
                due_date: date(2026, 2, 1),
                next_occurrence: None,
                recurrence_pattern: None,
                github_link: None,
                figma_link: None,
                assignees: Vec::new(),
            },
            now
        ));
        assert_ok!(crate::tasks::delete_task(&mut conn, &admin, created.task.id));

        let resolution = assert_ok!(respond(
            &mut conn,
            &mut outbox,
            &admin,
            created.approval_request.unwrap().id,
            ApprovalAction::Approved,
            None,
            now
        ));
        assert_eq!(resolution.effect, ApprovalEffect::ReferenceMissing);
        assert_eq!(resolution.request.status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_listing_is_scoped_to_requester() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let a = seed_user(&mut conn, "a@example.com", Role::Employee, None);
        let b = seed_user(&mut conn, "b@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);
        let mine = assert_ok!(create_project(&mut conn, &mut outbox, &a, &project_request("A", a.id), now));
        assert_ok!(create_project(&mut conn, &mut outbox, &b, &project_request("B", b.id), now));

        assert_eq!(assert_ok!(list_requests(&mut conn, &admin, &ApprovalFilters::default())).len(), 2);
        let own = assert_ok!(list_requests(&mut conn, &a, &ApprovalFilters::default()));
        assert_eq!(own.len(), 1);

        let id = mine.approval_request.unwrap().id;
        assert_ok!(get_request(&mut conn, &a, id));
        let err = assert_err!(get_request(&mut conn, &b, id));
        assert!(matches!(err, PlanError::NotFound(_)));

        let admin_notes: i64 = notifications::table
            .filter(notifications::user_id.eq(admin.id))
            .filter(notifications::notification_type.eq(NotificationType::ApprovalRequested))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(admin_notes, 2);
    }

    #[test]
    fn test_approval_notification_references_the_request() {
        setup();
        let mut conn = test_conn();
        let admin = seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);

        let created = assert_ok!(create_project(&mut conn, &mut outbox, &dev, &project_request("Hermes", dev.id), now));
        let request_id = created.approval_request.unwrap().id;

        let saved: Notification = notifications::table
            .filter(notifications::user_id.eq(admin.id))
            .filter(notifications::notification_type.eq(NotificationType::ApprovalRequested))
            .select(Notification::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(saved.reference(), Some(NotificationRef::Approval(request_id)));
    }

    #[test]
    fn test_modification_request_requires_existing_reference() {
        setup();
        let mut conn = test_conn();
        seed_user(&mut conn, "root@example.com", Role::Admin, None);
        let dev = seed_user(&mut conn, "dev@example.com", Role::Employee, None);
        let project = seed_project(&mut conn, &dev, "Apollo");
        let mut outbox = Outbox::default();
        let now = ts(2026, 1, 5, 9, 0);

        let err = assert_err!(submit_modification(
            &mut conn,
            &mut outbox,
            &dev,
            &ModificationRequest {
                reference: ApprovalReference::Task(777),
                changes: serde_json::json!({"title": "x"}),
            },
            now
        ));
        assert!(matches!(err, PlanError::NotFound(_)));

        let request = assert_ok!(submit_modification(
            &mut conn,
            &mut outbox,
            &dev,
            &ModificationRequest {
                reference: ApprovalReference::Project(project.id),
                changes: serde_json::json!({"due_date": "2026-04-01"}),
            },
            now
        ));
        assert_eq!(request.approval_type, ApprovalType::Modification);
        assert!(request.request_data.unwrap().contains("2026-04-01"));
    }
}
