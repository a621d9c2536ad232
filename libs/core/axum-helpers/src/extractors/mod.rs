//! Request extractors shared by the domain handlers.

pub mod validated_json;

pub use validated_json::ValidatedJson;
