//! Authenticated caller supplied by the identity provider.
//!
//! The server trusts these headers; credential checks happen upstream.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use super::enums::Role;
use super::error::PlanError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_DEPARTMENT_HEADER: &str = "x-user-department";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
    pub department_id: Option<i32>,
}

impl Actor {
    pub fn new(id: i32, role: Role, department_id: Option<i32>) -> Self {
        Self {
            id,
            role,
            department_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Single ordered privilege check used by every gated operation.
    pub fn require(&self, required: Role) -> Result<(), PlanError> {
        if self.role.at_least(required) {
            Ok(())
        } else {
            Err(PlanError::Forbidden(format!(
                "{} privilege required, caller is {}",
                required, self.role
            )))
        }
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = PlanError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_str(parts, USER_ID_HEADER)
            .ok_or_else(|| PlanError::Unauthenticated(format!("missing {USER_ID_HEADER} header")))?
            .parse::<i32>()
            .map_err(|_| PlanError::Unauthenticated(format!("invalid {USER_ID_HEADER} header")))?;

        let role = header_str(parts, USER_ROLE_HEADER)
            .ok_or_else(|| {
                PlanError::Unauthenticated(format!("missing {USER_ROLE_HEADER} header"))
            })?
            .parse::<Role>()
            .map_err(PlanError::Unauthenticated)?;

        let department_id = match header_str(parts, USER_DEPARTMENT_HEADER) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                PlanError::Unauthenticated(format!("invalid {USER_DEPARTMENT_HEADER} header"))
            })?),
            None => None,
        };

        Ok(Actor::new(id, role, department_id))
    }
}
