diesel::table! {
    catalog_items (id) {
        id -> Integer,
        user_id -> Nullable<Integer>,
        name -> Text,
        description -> Nullable<Text>,
        catalog_type -> Text,
        project_id -> Nullable<Integer>,
        task_id -> Nullable<Integer>,
        estimated_hours -> Double,
        progress_percentage -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    today_plans (id) {
        id -> Integer,
        user_id -> Integer,
        catalog_id -> Integer,
        plan_date -> Date,
        scheduled_start_time -> Time,
        scheduled_end_time -> Time,
        planned_duration_minutes -> Integer,
        quadrant -> Text,
        order_index -> Integer,
        status -> Text,
        notes -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    activity_logs (id) {
        id -> Integer,
        today_plan_id -> Integer,
        user_id -> Integer,
        actual_start_time -> Timestamp,
        actual_end_time -> Nullable<Timestamp>,
        hours_worked -> Double,
        minutes_worked -> Integer,
        extra_hours -> Double,
        status -> Text,
        work_notes -> Nullable<Text>,
        is_task_completed -> Bool,
        user_start_time -> Nullable<Timestamp>,
        user_end_time -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    pending_items (id) {
        id -> Integer,
        user_id -> Integer,
        today_plan_id -> Integer,
        activity_log_id -> Nullable<Integer>,
        original_plan_date -> Date,
        replanned_date -> Nullable<Date>,
        minutes_left -> Integer,
        reason -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    day_sessions (id) {
        id -> Integer,
        user_id -> Integer,
        session_date -> Date,
        started_at -> Nullable<Timestamp>,
        ended_at -> Nullable<Timestamp>,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    quick_notes (id) {
        id -> Integer,
        user_id -> Integer,
        note_text -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
