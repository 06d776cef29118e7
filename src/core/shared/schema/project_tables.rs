diesel::table! {
    projects (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
        status -> Text,
        is_approved -> Bool,
        project_lead -> Nullable<Integer>,
        handled_by -> Integer,
        created_by -> Nullable<Integer>,
        start_date -> Date,
        due_date -> Date,
        working_hours -> Integer,
        duration -> Integer,
        completed_date -> Nullable<Date>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    approval_requests (id) {
        id -> Integer,
        reference_type -> Text,
        reference_id -> Integer,
        approval_type -> Text,
        requested_by -> Integer,
        status -> Text,
        request_data -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    approval_responses (id) {
        id -> Integer,
        approval_request_id -> Integer,
        action -> Text,
        reviewed_by -> Integer,
        reviewed_at -> Timestamp,
        rejection_reason -> Nullable<Text>,
    }
}
