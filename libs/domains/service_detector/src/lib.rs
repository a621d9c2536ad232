//! Service detector
//!
//! Keyword classifier that maps a free-text request to the Google services
//! (Gmail, Calendar, Tasks, Keep) it needs, so the caller can ask for the matching
//! OAuth consent before acting on it.
//!
//! ```text
//! text ─► normalize ─► split on conjunctions ─► blank exclusions ─► keyword match ─► union
//! ```

pub mod detector;
pub mod error;
pub mod handlers;
pub mod keywords;
pub mod models;

pub use detector::detect_services;
pub use error::DetectorError;
pub use handlers::ApiDoc;
pub use models::{DetectedServices, GoogleService, ServiceFlags};
