pub mod bearer_auth;
pub mod ctx;
pub mod error;
pub mod mw_ctx;
pub mod utils;
