pub mod auth_service;
pub mod quest_service;
pub mod task_service;
pub mod user_service;
