pub mod email_sender;
pub mod eth;
pub mod generate;
pub mod hash;
pub mod jwt;
pub mod validate_utils;
