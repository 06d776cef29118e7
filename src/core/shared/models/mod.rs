pub use super::schema;

pub mod directory_models;
pub use self::directory_models::*;

pub mod project_models;
pub use self::project_models::*;

pub mod task_models;
pub use self::task_models::*;

pub mod planning_models;
pub use self::planning_models::*;
