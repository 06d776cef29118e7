diesel::table! {
    departments (id) {
        id -> Integer,
        name -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Text,
        role -> Text,
        department_id -> Nullable<Integer>,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    notifications (id) {
        id -> Integer,
        user_id -> Integer,
        notification_type -> Text,
        title -> Text,
        message -> Text,
        reference_type -> Nullable<Text>,
        reference_id -> Nullable<Integer>,
        is_read -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    team_instructions (id) {
        id -> Integer,
        project_id -> Integer,
        subject -> Text,
        instructions -> Text,
        sent_by -> Integer,
        sent_at -> Timestamp,
    }
}

diesel::table! {
    instruction_recipients (instruction_id, user_id) {
        instruction_id -> Integer,
        user_id -> Integer,
    }
}
