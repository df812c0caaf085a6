pub mod follow_entity;
pub mod local_user_entity;
pub mod verification_code_entity;
pub mod wallet_nonce_entity;
