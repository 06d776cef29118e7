//! User and department records.
//!
//! Identity lives with the external provider; these rows carry only what the
//! planner needs for role lookups, admin fan-out and department scoping.

pub mod router;
pub mod handlers;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::info;
use serde::Deserialize;

use crate::core::shared::actor::Actor;
use crate::core::shared::enums::Role;
use crate::core::shared::error::{PlanError, PlanResult};
use crate::core::shared::models::{Department, NewDepartment, NewUser, User};
use crate::core::shared::schema::{departments, users};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
}

pub fn create_department(
    conn: &mut SqliteConnection,
    actor: &Actor,
    name: &str,
    now: NaiveDateTime,
) -> PlanResult<Department> {
    actor.require(Role::Admin)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PlanError::validation("department name is required"));
    }
    let dept: Department = diesel::insert_into(departments::table)
        .values(&NewDepartment {
            name: name.to_string(),
            created_at: now,
        })
        .get_result(conn)?;
    info!("[DIRECTORY] Created department {} ({})", dept.name, dept.id);
    Ok(dept)
}

pub fn list_departments(conn: &mut SqliteConnection) -> PlanResult<Vec<Department>> {
    Ok(departments::table
        .order(departments::name.asc())
        .select(Department::as_select())
        .load(conn)?)
}

/// Unchecked insert; callers decide who may create users.
pub fn insert_user(
    conn: &mut SqliteConnection,
    request: &CreateUserRequest,
    now: NaiveDateTime,
) -> PlanResult<User> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(PlanError::validation(format!("invalid email: {}", request.email)));
    }
    if let Some(dept) = request.department_id {
        departments::table
            .find(dept)
            .select(departments::id)
            .first::<i32>(conn)
            .optional()?
            .ok_or_else(|| PlanError::not_found(format!("department {dept}")))?;
    }

    let user: User = diesel::insert_into(users::table)
        .values(&NewUser {
            email,
            role: request.role,
            department_id: request.department_id,
            is_active: true,
            created_at: now,
        })
        .get_result(conn)?;
    info!("[DIRECTORY] Created user {} as {}", user.id, user.role);
    Ok(user)
}

pub fn create_user(
    conn: &mut SqliteConnection,
    actor: &Actor,
    request: &CreateUserRequest,
    now: NaiveDateTime,
) -> PlanResult<User> {
    actor.require(Role::Admin)?;
    insert_user(conn, request, now)
}

pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> PlanResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("user {user_id}")))
}

pub fn list_users(conn: &mut SqliteConnection) -> PlanResult<Vec<User>> {
    Ok(users::table
        .filter(users::is_active.eq(true))
        .order(users::id.asc())
        .select(User::as_select())
        .load(conn)?)
}

pub fn department_members(
    conn: &mut SqliteConnection,
    department_id: i32,
) -> PlanResult<Vec<User>> {
    Ok(users::table
        .filter(users::department_id.eq(department_id))
        .filter(users::is_active.eq(true))
        .order(users::id.asc())
        .select(User::as_select())
        .load(conn)?)
}

/// Fails with NotFound unless every id names an existing user.
pub fn ensure_users_exist(conn: &mut SqliteConnection, ids: &[i32]) -> PlanResult<()> {
    let found: Vec<i32> = users::table
        .filter(users::id.eq_any(ids))
        .select(users::id)
        .load(conn)?;
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(PlanError::not_found(format!("user {missing}"))),
        None => Ok(()),
    }
}

pub fn set_user_active(
    conn: &mut SqliteConnection,
    actor: &Actor,
    user_id: i32,
    is_active: bool,
) -> PlanResult<User> {
    actor.require(Role::Admin)?;
    diesel::update(users::table.find(user_id))
        .set(users::is_active.eq(is_active))
        .get_result(conn)
        .optional()?
        .ok_or_else(|| PlanError::not_found(format!("user {user_id}")))
}
