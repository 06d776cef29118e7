use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{
    ApprovalAction, ApprovalStatus, ApprovalType, ProjectStatus, ReferenceType,
};
use crate::core::shared::schema::{approval_requests, approval_responses, projects};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = projects)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub is_approved: bool,
    pub project_lead: Option<i32>,
    pub handled_by: i32,
    pub created_by: Option<i32>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub working_hours: i32,
    pub duration: i32,
    pub completed_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub is_approved: bool,
    pub project_lead: Option<i32>,
    pub handled_by: i32,
    pub created_by: Option<i32>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub working_hours: i32,
    pub duration: i32,
    pub completed_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

/// What an approval request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "UPPERCASE")]
pub enum ApprovalReference {
    Project(i32),
    Task(i32),
}

impl ApprovalReference {
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            Self::Project(_) => ReferenceType::Project,
            Self::Task(_) => ReferenceType::Task,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::Project(id) | Self::Task(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = approval_requests)]
pub struct ApprovalRequest {
    pub id: i32,
    pub reference_type: ReferenceType,
    pub reference_id: i32,
    pub approval_type: ApprovalType,
    pub requested_by: i32,
    pub status: ApprovalStatus,
    pub request_data: Option<String>,
    pub created_at: NaiveDateTime,
}

impl ApprovalRequest {
    pub fn reference(&self) -> ApprovalReference {
        match self.reference_type {
            ReferenceType::Project => ApprovalReference::Project(self.reference_id),
            ReferenceType::Task => ApprovalReference::Task(self.reference_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = approval_requests)]
pub struct NewApprovalRequest {
    pub reference_type: ReferenceType,
    pub reference_id: i32,
    pub approval_type: ApprovalType,
    pub requested_by: i32,
    pub status: ApprovalStatus,
    pub request_data: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = approval_responses)]
pub struct ApprovalResponse {
    pub id: i32,
    pub approval_request_id: i32,
    pub action: ApprovalAction,
    pub reviewed_by: i32,
    pub reviewed_at: NaiveDateTime,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = approval_responses)]
pub struct NewApprovalResponse {
    pub approval_request_id: i32,
    pub action: ApprovalAction,
    pub reviewed_by: i32,
    pub reviewed_at: NaiveDateTime,
    pub rejection_reason: Option<String>,
}
