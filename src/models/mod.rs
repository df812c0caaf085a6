pub mod email;
pub mod view;
