//! Database enum types
//!
//! Every enum here is stored as its upper-case wire name in a TEXT column and
//! serialized to JSON with the same name, so clients and the store agree on a
//! single spelling. Parsing is case-insensitive.

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(format!("Unknown {}: {}", stringify!($name), s))
            }
        }

        impl ToSql<Text, Sqlite> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.as_str());
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Sqlite> for $name {
            fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
                value.parse().map_err(|e: String| e.into())
            }
        }
    };
}

// ============================================================================
// USERS
// ============================================================================

text_enum! {
    /// Organisational role. Privilege order is ADMIN > MANAGER > TEAMLEAD > EMPLOYEE.
    Role {
        Admin => "ADMIN",
        Manager => "MANAGER",
        TeamLead => "TEAMLEAD",
        Employee => "EMPLOYEE",
    }
}

impl Role {
    pub fn privilege(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Manager => 2,
            Self::TeamLead => 1,
            Self::Employee => 0,
        }
    }

    pub fn at_least(&self, required: Role) -> bool {
        self.privilege() >= required.privilege()
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Employee
    }
}

// ============================================================================
// PROJECTS AND TASKS
// ============================================================================

text_enum! {
    ProjectStatus {
        Active => "ACTIVE",
        OnHold => "ON_HOLD",
        Completed => "COMPLETED",
    }
}

text_enum! {
    TaskType {
        Standard => "STANDARD",
        Recurring => "RECURRING",
        Routine => "ROUTINE",
    }
}

text_enum! {
    /// Shared by tasks and subtasks.
    TaskStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Done => "DONE",
    }
}

text_enum! {
    TaskPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

text_enum! {
    RecurrencePattern {
        Daily => "DAILY",
        Weekly => "WEEKLY",
        Monthly => "MONTHLY",
        Yearly => "YEARLY",
    }
}

text_enum! {
    AssigneeRole {
        Lead => "LEAD",
        Dev => "DEV",
        Backend => "BACKEND",
    }
}

// ============================================================================
// APPROVALS
// ============================================================================

text_enum! {
    ReferenceType {
        Project => "PROJECT",
        Task => "TASK",
    }
}

text_enum! {
    ApprovalType {
        Creation => "CREATION",
        Completion => "COMPLETION",
        Modification => "MODIFICATION",
    }
}

text_enum! {
    ApprovalStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

text_enum! {
    ApprovalAction {
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

impl From<ApprovalAction> for ApprovalStatus {
    fn from(action: ApprovalAction) -> Self {
        match action {
            ApprovalAction::Approved => Self::Approved,
            ApprovalAction::Rejected => Self::Rejected,
        }
    }
}

// ============================================================================
// PLANNING
// ============================================================================

text_enum! {
    CatalogType {
        Project => "PROJECT",
        Task => "TASK",
        Course => "COURSE",
        Routine => "ROUTINE",
        Custom => "CUSTOM",
    }
}

text_enum! {
    /// Eisenhower matrix bucket.
    Quadrant {
        Q1 => "Q1",
        Q2 => "Q2",
        Q3 => "Q3",
        Q4 => "Q4",
    }
}

impl Quadrant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Q1 => "Do First (Urgent & Important)",
            Self::Q2 => "Schedule (Important, Not Urgent)",
            Self::Q3 => "Delegate (Urgent, Not Important)",
            Self::Q4 => "Eliminate (Not Urgent, Not Important)",
        }
    }
}

impl Default for Quadrant {
    fn default() -> Self {
        Self::Q2
    }
}

text_enum! {
    PlanStatus {
        Planned => "PLANNED",
        Started => "STARTED",
        InActivity => "IN_ACTIVITY",
        Completed => "COMPLETED",
        MovedToPending => "MOVED_TO_PENDING",
    }
}

impl PlanStatus {
    /// No further activity may be started once a slot reaches one of these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::MovedToPending)
    }
}

text_enum! {
    ActivityStatus {
        InProgress => "IN_PROGRESS",
        Stopped => "STOPPED",
        Completed => "COMPLETED",
    }
}

text_enum! {
    PendingStatus {
        Pending => "PENDING",
        Replanned => "REPLANNED",
        Cancelled => "CANCELLED",
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

text_enum! {
    NotificationType {
        ProjectCreated => "PROJECT_CREATED",
        ProjectApproved => "PROJECT_APPROVED",
        ProjectRejected => "PROJECT_REJECTED",
        TaskCreated => "TASK_CREATED",
        TaskAssigned => "TASK_ASSIGNED",
        TaskCompleted => "TASK_COMPLETED",
        TaskUpdated => "TASK_UPDATED",
        ApprovalRequested => "APPROVAL_REQUESTED",
        ApprovalApproved => "APPROVAL_APPROVED",
        ApprovalRejected => "APPROVAL_REJECTED",
        InstructionReceived => "INSTRUCTION_RECEIVED",
        SubtaskCompleted => "SUBTASK_COMPLETED",
    }
}

text_enum! {
    /// Kind of entity a notification points back to.
    NotificationRefKind {
        Project => "project",
        Task => "task",
        Instruction => "instruction",
        Subtask => "subtask",
        Approval => "approval",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_privilege_order() {
        assert!(Role::Admin.at_least(Role::Manager));
        assert!(Role::Manager.at_least(Role::TeamLead));
        assert!(Role::TeamLead.at_least(Role::Employee));
        assert!(!Role::Employee.at_least(Role::TeamLead));
        assert!(Role::TeamLead.at_least(Role::TeamLead));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("q3".parse::<Quadrant>().unwrap(), Quadrant::Q3);
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Project".parse::<NotificationRefKind>().unwrap(), NotificationRefKind::Project);
        assert!("Q5".parse::<Quadrant>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&PlanStatus::MovedToPending).unwrap();
        assert_eq!(json, "\"MOVED_TO_PENDING\"");
        let parsed: ApprovalType = serde_json::from_str("\"COMPLETION\"").unwrap();
        assert_eq!(parsed, ApprovalType::Completion);
    }

    #[test]
    fn test_terminal_plan_states() {
        assert!(PlanStatus::Completed.is_terminal());
        assert!(PlanStatus::MovedToPending.is_terminal());
        assert!(!PlanStatus::InActivity.is_terminal());
    }
}
