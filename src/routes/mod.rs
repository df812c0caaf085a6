pub mod auth_routes;
pub mod profile_routes;
pub mod task_routes;
pub mod waitlist_routes;
