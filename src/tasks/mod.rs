pub mod handlers;
pub mod progress;
pub mod recurrence;
pub mod types;

pub use types::*;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use std::sync::Arc;

use crate::approvals::{self, ApprovalSnapshot};
use crate::core::shared::actor::Actor;
use crate::core::shared::enums::{ApprovalType, AssigneeRole, NotificationType, Role, TaskStatus, TaskType};
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{
    ApprovalReference, NewSubtask, NewTask, NewTaskAssignee, NotificationRef, Project, Subtask,
    Task, TaskAssignee,
};
use crate::core::shared::schema::{projects, subtasks, task_assignees, tasks};
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::notifications::{notify, notify_each, NotificationDraft, Outbox};

pub(crate) fn load_task(conn: &mut SqliteConnection, task_id: i32) -> PlanResult<Task> {
    tasks::table
        .find(task_id)
        .select(Task::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("task {task_id}")))
}

fn load_project(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<Project> {
    projects::table
        .find(project_id)
        .select(Project::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("project {project_id}")))
}

/// Admins see everything; others see tasks assigned to them, tasks they
/// created, and tasks in projects they created.
pub fn is_task_visible(conn: &mut SqliteConnection, actor: &Actor, task: &Task) -> PlanResult<bool> {
    if actor.is_admin() || task.created_by == Some(actor.id) {
        return Ok(true);
    }
    let assigned: i64 = task_assignees::table
        .filter(task_assignees::task_id.eq(task.id))
        .filter(task_assignees::user_id.eq(actor.id))
        .count()
        .get_result(conn)?;
    if assigned > 0 {
        return Ok(true);
    }
    let project_owner: Option<i32> = projects::table
        .find(task.project_id)
        .select(projects::created_by)
        .first::<Option<i32>>(conn)
        .optional()?
        .flatten();
    Ok(project_owner == Some(actor.id))
}

/// Invisible tasks are reported as missing.
pub fn load_visible_task(
    conn: &mut SqliteConnection,
    actor: &Actor,
    task_id: i32,
) -> PlanResult<Task> {
    let task = load_task(conn, task_id)?;
    if is_task_visible(conn, actor, &task)? {
        Ok(task)
    } else {
        Err(PlanError::not_found(format!("task {task_id}")))
    }
}

fn project_lead_of(conn: &mut SqliteConnection, project_id: i32) -> PlanResult<Option<i32>> {
    Ok(projects::table
        .find(project_id)
        .select(projects::project_lead)
        .first::<Option<i32>>(conn)
        .optional()?
        .flatten())
}

pub(crate) fn notify_task_created(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    task: &Task,
    now: NaiveDateTime,
) -> PlanResult<()> {
    let project = load_project(conn, task.project_id)?;
    if let Some(lead) = project.project_lead {
        let draft = NotificationDraft::new(
            NotificationType::TaskCreated,
            "New Task Created",
            format!("Task \"{}\" created for project: {}", task.title, project.name),
            Some(NotificationRef::Task(task.id)),
        );
        notify(conn, outbox, lead, &draft, now)?;
    }
    Ok(())
}

fn notify_task_completed(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    task: &Task,
    now: NaiveDateTime,
) -> PlanResult<()> {
    if let Some(lead) = project_lead_of(conn, task.project_id)? {
        let draft = NotificationDraft::new(
            NotificationType::TaskCompleted,
            "Task Completed",
            format!("Task \"{}\" has been completed", task.title),
            Some(NotificationRef::Task(task.id)),
        );
        notify(conn, outbox, lead, &draft, now)?;
    }
    Ok(())
}

pub fn create_task(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    request: &CreateTaskRequest,
    now: NaiveDateTime,
) -> PlanResult<TaskCreated> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(PlanError::validation("task title is required"));
    }
    if request.task_type == TaskType::Recurring && request.recurrence_pattern.is_none() {
        return Err(PlanError::validation(
            "recurring tasks need a recurrence_pattern",
        ));
    }

    conn.transaction(|conn| {
        let project = load_project(conn, request.project_id)?;

        let task: Task = diesel::insert_into(tasks::table)
            .values(&NewTask {
                project_id: project.id,
                title: title.to_string(),
                project_lead: request.project_lead,
                task_type: request.task_type,
                priority: request.priority,
                status: TaskStatus::Pending,
                start_date: request.start_date,
                due_date: request.due_date,
                next_occurrence: request.next_occurrence,
                recurrence_pattern: request.recurrence_pattern,
                github_link: request.github_link.clone(),
                figma_link: request.figma_link.clone(),
                completed_at: None,
                created_by: Some(actor.id),
                created_at: now,
            })
            .get_result(conn)?;

        notify_task_created(conn, outbox, &task, now)?;

        for assignee in &request.assignees {
            assign_user(conn, outbox, actor, task.id, assignee.user_id, assignee.role, now)?;
        }

        let approval_request = if actor.is_admin() {
            None
        } else {
            Some(approvals::open_request(
                conn,
                outbox,
                actor,
                ApprovalReference::Task(task.id),
                ApprovalType::Creation,
                ApprovalSnapshot::of_task(&task),
                now,
            )?)
        };

        info!(
            "[TASK] Created task {} in project {} (pending approval: {})",
            task.id,
            project.id,
            approval_request.is_some()
        );
        Ok(TaskCreated {
            task,
            approval_request,
        })
    })
}

/// Marks a task DONE, notifies the project lead and spawns the next occurrence
/// of a recurring task. A missing task is a no-op.
pub fn finalize_completion(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    task_id: i32,
    now: NaiveDateTime,
) -> PlanResult<Option<(Task, Option<Task>)>> {
    conn.transaction(|conn| {
        let Some(task) = tasks::table
            .find(task_id)
            .select(Task::as_select())
            .first(conn)
            .optional()?
        else {
            return Ok(None);
        };
        if task.status == TaskStatus::Done {
            return Ok(Some((task, None)));
        }

        let completed_at = task.completed_at.unwrap_or(now.date());
        let done: Task = diesel::update(tasks::table.find(task_id))
            .set((
                tasks::status.eq(TaskStatus::Done),
                tasks::completed_at.eq(Some(completed_at)),
            ))
            .get_result(conn)?;

        notify_task_completed(conn, outbox, &done, now)?;
        let successor = recurrence::spawn_successor(conn, outbox, &done, now)?;
        Ok(Some((done, successor)))
    })
}

/// Admins complete immediately. Everyone else stamps `completed_at` and opens
/// a COMPLETION request; the status stays as it is until an admin approves.
pub fn request_task_completion(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    task_id: i32,
    now: NaiveDateTime,
) -> PlanResult<CompletionOutcome> {
    conn.transaction(|conn| {
        let task = load_visible_task(conn, actor, task_id)?;
        if task.status == TaskStatus::Done {
            return Err(PlanError::conflict(format!("task {task_id} is already done")));
        }

        if actor.is_admin() {
            let (task, successor) = finalize_completion(conn, outbox, task_id, now)?
                .ok_or_else(|| PlanError::not_found(format!("task {task_id}")))?;
            info!("[TASK] Admin {} completed task {}", actor.id, task_id);
            return Ok(CompletionOutcome::Completed { task, successor });
        }

        let approval_request = approvals::open_request(
            conn,
            outbox,
            actor,
            ApprovalReference::Task(task_id),
            ApprovalType::Completion,
            ApprovalSnapshot::of_task(&task),
            now,
        )?;
        let task: Task = diesel::update(tasks::table.find(task_id))
            .set(tasks::completed_at.eq(Some(now.date())))
            .get_result(conn)?;

        info!(
            "[TASK] User {} requested completion of task {} (request {})",
            actor.id, task_id, approval_request.id
        );
        Ok(CompletionOutcome::Requested {
            task,
            approval_request,
        })
    })
}

/// Hard delete; cascades to subtasks, assignees and linked catalog items.
pub(crate) fn remove_task(conn: &mut SqliteConnection, task_id: i32) -> PlanResult<usize> {
    Ok(diesel::delete(tasks::table.find(task_id)).execute(conn)?)
}

pub fn delete_task(conn: &mut SqliteConnection, actor: &Actor, task_id: i32) -> PlanResult<()> {
    actor.require(Role::Admin)?;
    if remove_task(conn, task_id)? == 0 {
        return Err(PlanError::not_found(format!("task {task_id}")));
    }
    info!("[TASK] Admin {} deleted task {}", actor.id, task_id);
    Ok(())
}

pub fn update_task(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    task_id: i32,
    update: &TaskUpdate,
    now: NaiveDateTime,
) -> PlanResult<Task> {
    conn.transaction(|conn| {
        let current = load_visible_task(conn, actor, task_id)?;

        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(PlanError::validation("task title cannot be empty"));
            }
            diesel::update(tasks::table.find(task_id))
                .set(tasks::title.eq(title.trim()))
                .execute(conn)?;
        }
        if let Some(priority) = update.priority {
            diesel::update(tasks::table.find(task_id))
                .set(tasks::priority.eq(priority))
                .execute(conn)?;
        }
        if let Some(start) = update.start_date {
            diesel::update(tasks::table.find(task_id))
                .set(tasks::start_date.eq(Some(start)))
                .execute(conn)?;
        }
        if let Some(due) = update.due_date {
            diesel::update(tasks::table.find(task_id))
                .set(tasks::due_date.eq(due))
                .execute(conn)?;
        }
        if let Some(link) = &update.github_link {
            diesel::update(tasks::table.find(task_id))
                .set(tasks::github_link.eq(Some(link.as_str())))
                .execute(conn)?;
        }
        if let Some(link) = &update.figma_link {
            diesel::update(tasks::table.find(task_id))
                .set(tasks::figma_link.eq(Some(link.as_str())))
                .execute(conn)?;
        }

        match update.status {
            // Completion always goes through the gate.
            Some(TaskStatus::Done) if current.status != TaskStatus::Done => {
                request_task_completion(conn, outbox, actor, task_id, now)?;
            }
            Some(status) if status != current.status => {
                let changed: Task = diesel::update(tasks::table.find(task_id))
                    .set(tasks::status.eq(status))
                    .get_result(conn)?;
                if let Some(lead) = project_lead_of(conn, changed.project_id)? {
                    let draft = NotificationDraft::new(
                        NotificationType::TaskUpdated,
                        "Task Updated",
                        format!("Task \"{}\" moved to {}", changed.title, status),
                        Some(NotificationRef::Task(task_id)),
                    );
                    notify(conn, outbox, lead, &draft, now)?;
                }
            }
            _ => {}
        }

        load_task(conn, task_id)
    })
}

pub fn get_task(conn: &mut SqliteConnection, actor: &Actor, task_id: i32) -> PlanResult<TaskDetail> {
    let task = load_visible_task(conn, actor, task_id)?;
    let subtasks = list_subtasks(conn, task_id)?;
    let assignees: Vec<TaskAssignee> = task_assignees::table
        .filter(task_assignees::task_id.eq(task_id))
        .order(task_assignees::id.asc())
        .select(TaskAssignee::as_select())
        .load(conn)?;
    let progress = progress::task_progress(conn, task_id)?;
    Ok(TaskDetail {
        task,
        progress,
        subtasks,
        assignees,
    })
}

pub fn list_tasks(
    conn: &mut SqliteConnection,
    actor: &Actor,
    filters: &TaskFilters,
) -> PlanResult<Vec<Task>> {
    let mut query = tasks::table.into_boxed();
    if !actor.is_admin() {
        let assigned = task_assignees::table
            .filter(task_assignees::user_id.eq(actor.id))
            .select(task_assignees::task_id);
        let owned_projects = projects::table
            .filter(projects::created_by.eq(actor.id))
            .select(projects::id);
        query = query.filter(
            tasks::id
                .eq_any(assigned)
                .or(tasks::project_id.eq_any(owned_projects))
                .or(tasks::created_by.eq(actor.id)),
        );
    }
    if let Some(project_id) = filters.project_id {
        query = query.filter(tasks::project_id.eq(project_id));
    }
    if let Some(status) = filters.status {
        query = query.filter(tasks::status.eq(status));
    }
    Ok(query
        .order((tasks::due_date.asc(), tasks::id.asc()))
        .select(Task::as_select())
        .load(conn)?)
}

// ============================================================================
// ASSIGNEES
// ============================================================================

pub fn assign_user(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    task_id: i32,
    user_id: i32,
    role: AssigneeRole,
    now: NaiveDateTime,
) -> PlanResult<TaskAssignee> {
    actor.require(Role::TeamLead)?;
    conn.transaction(|conn| {
        let task = load_task(conn, task_id)?;
        crate::directory::get_user(conn, user_id)?;

        let assignee: TaskAssignee = diesel::insert_into(task_assignees::table)
            .values(&NewTaskAssignee {
                task_id,
                user_id,
                role,
                assigned_at: now,
            })
            .get_result(conn)
            .map_err(|e| match PlanError::from(e) {
                PlanError::Conflict(_) => PlanError::conflict(format!(
                    "user {user_id} is already assigned to task {task_id}"
                )),
                other => other,
            })?;

        let draft = NotificationDraft::new(
            NotificationType::TaskAssigned,
            "Task Assigned",
            format!("You have been assigned to task: {}", task.title),
            Some(NotificationRef::Task(task_id)),
        );
        notify(conn, outbox, user_id, &draft, now)?;
        info!("[TASK] Assigned user {} to task {} as {}", user_id, task_id, role);
        Ok(assignee)
    })
}

pub fn unassign_user(
    conn: &mut SqliteConnection,
    actor: &Actor,
    task_id: i32,
    user_id: i32,
) -> PlanResult<()> {
    actor.require(Role::TeamLead)?;
    let removed = diesel::delete(
        task_assignees::table
            .filter(task_assignees::task_id.eq(task_id))
            .filter(task_assignees::user_id.eq(user_id)),
    )
    .execute(conn)?;
    if removed == 0 {
        return Err(PlanError::not_found(format!(
            "user {user_id} is not assigned to task {task_id}"
        )));
    }
    Ok(())
}

// ============================================================================
// SUBTASKS
// ============================================================================

pub fn list_subtasks(conn: &mut SqliteConnection, task_id: i32) -> PlanResult<Vec<Subtask>> {
    Ok(subtasks::table
        .filter(subtasks::task_id.eq(task_id))
        .order((subtasks::created_at.asc(), subtasks::id.asc()))
        .select(Subtask::as_select())
        .load(conn)?)
}

fn load_subtask(conn: &mut SqliteConnection, subtask_id: i32) -> PlanResult<Subtask> {
    subtasks::table
        .find(subtask_id)
        .select(Subtask::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("subtask {subtask_id}")))
}

/// Inserting a subtask renormalizes every sibling weight in the same transaction.
pub fn create_subtask(
    conn: &mut SqliteConnection,
    actor: &Actor,
    task_id: i32,
    request: &CreateSubtaskRequest,
    now: NaiveDateTime,
) -> PlanResult<Subtask> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(PlanError::validation("subtask title is required"));
    }
    conn.transaction(|conn| {
        load_visible_task(conn, actor, task_id)?;
        let created: Subtask = diesel::insert_into(subtasks::table)
            .values(&NewSubtask {
                task_id,
                title: title.to_string(),
                status: TaskStatus::Pending,
                progress_weight: 0,
                due_date: request.due_date,
                completed_at: None,
                created_at: now,
            })
            .get_result(conn)?;
        progress::recalculate_subtask_weights(conn, task_id)?;
        load_subtask(conn, created.id)
    })
}

pub fn delete_subtask(
    conn: &mut SqliteConnection,
    actor: &Actor,
    subtask_id: i32,
) -> PlanResult<()> {
    conn.transaction(|conn| {
        let subtask = load_subtask(conn, subtask_id)?;
        load_visible_task(conn, actor, subtask.task_id)?;
        diesel::delete(subtasks::table.find(subtask_id)).execute(conn)?;
        progress::recalculate_subtask_weights(conn, subtask.task_id)?;
        Ok(())
    })
}

/// DONE stamps `completed_at` and tells every assignee; leaving DONE clears it.
pub fn set_subtask_status(
    conn: &mut SqliteConnection,
    outbox: &mut Outbox,
    actor: &Actor,
    subtask_id: i32,
    status: TaskStatus,
    now: NaiveDateTime,
) -> PlanResult<Subtask> {
    conn.transaction(|conn| {
        let current = load_subtask(conn, subtask_id)?;
        let task = load_visible_task(conn, actor, current.task_id)?;
        if current.status == status {
            return Ok(current);
        }

        let completed_at = (status == TaskStatus::Done).then(|| now.date());
        let updated: Subtask = diesel::update(subtasks::table.find(subtask_id))
            .set((
                subtasks::status.eq(status),
                subtasks::completed_at.eq(completed_at),
            ))
            .get_result(conn)?;

        if status == TaskStatus::Done {
            let assignees: Vec<i32> = task_assignees::table
                .filter(task_assignees::task_id.eq(task.id))
                .order(task_assignees::id.asc())
                .select(task_assignees::user_id)
                .load(conn)?;
            let draft = NotificationDraft::new(
                NotificationType::SubtaskCompleted,
                "SubTask Completed",
                format!(
                    "SubTask \"{}\" for task \"{}\" has been completed",
                    updated.title, task.title
                ),
                Some(NotificationRef::Subtask(subtask_id)),
            );
            notify_each(conn, outbox, &assignees, &draft, now)?;
        }
        Ok(updated)
    })
}

/// Configure task routes
pub fn configure_task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::TASKS,
            post(handlers::handle_task_create).get(handlers::handle_task_list),
        )
        .route(
            ApiUrls::TASK_BY_ID,
            get(handlers::handle_task_get)
                .patch(handlers::handle_task_update)
                .delete(handlers::handle_task_delete),
        )
        .route(ApiUrls::TASK_COMPLETE, post(handlers::handle_task_complete))
        .route(ApiUrls::TASK_ASSIGNEES, post(handlers::handle_task_assign))
        .route(ApiUrls::TASK_ASSIGNEE, delete(handlers::handle_task_unassign))
        .route(
            ApiUrls::TASK_SUBTASKS,
            post(handlers::handle_subtask_create).get(handlers::handle_subtask_list),
        )
        .route(ApiUrls::SUBTASK_BY_ID, delete(handlers::handle_subtask_delete))
        .route(ApiUrls::SUBTASK_STATUS, put(handlers::handle_subtask_status))
}
