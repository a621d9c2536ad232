//! SeaORM entities for the tables owned by this crate

pub mod oauth_state;
pub mod permission_request;
pub mod user;
