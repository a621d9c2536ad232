//! Google OAuth scopes for base login and per-service consent.

use domain_service_detector::{GoogleService, ServiceFlags};
use strum::IntoEnumIterator;

/// Requested at login: identity and contacts
pub const BASE_SCOPES: &[&str] = &[
    "openid",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/contacts.readonly",
];

pub const EMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
];

pub const CALENDAR_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

pub const TASKS_SCOPES: &[&str] = &["https://www.googleapis.com/auth/tasks"];

pub const KEEP_SCOPES: &[&str] = &["https://www.googleapis.com/auth/keep.readonly"];

pub fn service_scopes(service: GoogleService) -> &'static [&'static str] {
    match service {
        GoogleService::Email => EMAIL_SCOPES,
        GoogleService::Calendar => CALENDAR_SCOPES,
        GoogleService::Tasks => TASKS_SCOPES,
        GoogleService::Keep => KEEP_SCOPES,
    }
}

pub fn base_scopes() -> Vec<String> {
    BASE_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Base scopes followed by each requested service's scopes, without duplicates.
pub fn scopes_for(services: &ServiceFlags) -> Vec<String> {
    let mut scopes = base_scopes();
    for service in services.services() {
        for scope in service_scopes(service) {
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.to_string());
            }
        }
    }
    scopes
}

/// A service counts as granted only when every one of its scopes was granted.
pub fn granted_services(granted_scopes: &[String]) -> ServiceFlags {
    GoogleService::iter()
        .filter(|service| {
            service_scopes(*service)
                .iter()
                .all(|scope| granted_scopes.iter().any(|g| g == scope))
        })
        .collect()
}
