use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::enums::{NotificationRefKind, NotificationType, Role};
use crate::core::shared::schema::{
    departments, instruction_recipients, notifications, team_instructions, users,
};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = departments)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment {
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Entity a notification points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum NotificationRef {
    Project(i32),
    Task(i32),
    Instruction(i32),
    Subtask(i32),
    Approval(i32),
}

impl NotificationRef {
    pub fn kind(&self) -> NotificationRefKind {
        match self {
            Self::Project(_) => NotificationRefKind::Project,
            Self::Task(_) => NotificationRefKind::Task,
            Self::Instruction(_) => NotificationRefKind::Instruction,
            Self::Subtask(_) => NotificationRefKind::Subtask,
            Self::Approval(_) => NotificationRefKind::Approval,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::Project(id)
            | Self::Task(id)
            | Self::Instruction(id)
            | Self::Subtask(id)
            | Self::Approval(id) => *id,
        }
    }

    pub fn from_parts(kind: NotificationRefKind, id: i32) -> Self {
        match kind {
            NotificationRefKind::Project => Self::Project(id),
            NotificationRefKind::Task => Self::Task(id),
            NotificationRefKind::Instruction => Self::Instruction(id),
            NotificationRefKind::Subtask => Self::Subtask(id),
            NotificationRefKind::Approval => Self::Approval(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub reference_type: Option<NotificationRefKind>,
    pub reference_id: Option<i32>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl Notification {
    pub fn reference(&self) -> Option<NotificationRef> {
        match (self.reference_type, self.reference_id) {
            (Some(kind), Some(id)) => Some(NotificationRef::from_parts(kind, id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub reference_type: Option<NotificationRefKind>,
    pub reference_id: Option<i32>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = team_instructions)]
pub struct TeamInstruction {
    pub id: i32,
    pub project_id: i32,
    pub subject: String,
    pub instructions: String,
    pub sent_by: i32,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = team_instructions)]
pub struct NewTeamInstruction {
    pub project_id: i32,
    pub subject: String,
    pub instructions: String,
    pub sent_by: i32,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = instruction_recipients)]
pub struct NewInstructionRecipient {
    pub instruction_id: i32,
    pub user_id: i32,
}
