pub mod application_entity;
pub mod submission_entity;
pub mod task_entity;
