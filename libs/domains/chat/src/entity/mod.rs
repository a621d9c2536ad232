//! SeaORM entities for the chat tables

pub mod conversation;
pub mod message;
