pub mod task;
pub mod user_auth;
pub mod waitlist;
