diesel::table! {
    tasks (id) {
        id -> Integer,
        project_id -> Integer,
        title -> Text,
        project_lead -> Nullable<Integer>,
        task_type -> Text,
        priority -> Text,
        status -> Text,
        start_date -> Nullable<Date>,
        due_date -> Date,
        next_occurrence -> Nullable<Date>,
        recurrence_pattern -> Nullable<Text>,
        github_link -> Nullable<Text>,
        figma_link -> Nullable<Text>,
        completed_at -> Nullable<Date>,
        created_by -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    subtasks (id) {
        id -> Integer,
        task_id -> Integer,
        title -> Text,
        status -> Text,
        progress_weight -> Integer,
        due_date -> Date,
        completed_at -> Nullable<Date>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    task_assignees (id) {
        id -> Integer,
        task_id -> Integer,
        user_id -> Integer,
        role -> Text,
        assigned_at -> Timestamp,
    }
}
