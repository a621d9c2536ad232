//! Keyword tables for the detector.
//!
//! Single words match on word boundaries with an optional plural suffix; phrases match
//! on word boundaries as written.

use crate::models::GoogleService;

pub const EMAIL_KEYWORDS: &[&str] = &[
    "email",
    "mail",
    "e-mail",
    "gmail",
    "send",
    "reply",
    "forward",
    "compose",
    "draft",
    "message",
    "inbox",
    "outbox",
    "send a message",
    "check email",
    "check mail",
    "reply to",
    "respond to",
];

pub const CALENDAR_KEYWORDS: &[&str] = &[
    "calendar",
    "event",
    "meeting",
    "appointment",
    "schedule",
    "reschedule",
    "book",
    "reserve",
    "set up a meeting",
    "schedule a call",
    "calendar invite",
    "add to calendar",
    "check my calendar",
    "check calendar",
];

pub const TASKS_KEYWORDS: &[&str] = &[
    "task",
    "todo",
    "to-do",
    "to do",
    "checklist",
    "action item",
    "create a task",
    "add task",
    "task list",
    "mark as done",
    "complete task",
];

pub const KEEP_KEYWORDS: &[&str] = &[
    "note",
    "keep",
    "memo",
    "reminder",
    "jot down",
    "write down",
    "take note",
    "make a note",
    "add a note",
    "google keep",
    "create note",
    "save note",
];

/// Clause separators, matched as whole words (`&` anywhere)
pub const CONJUNCTIONS: &[&str] = &["and", "plus", "also", "then"];

/// Usages of ambiguous keywords that do not refer to a service.
///
/// Each pattern is blanked out of a clause before keywords are tested.
pub const EXCLUSIONS: &[&str] = &[
    // "keep working", "keep in mind", "keep track of", "keep up", "keep an eye on"
    r"\bkeep\s+(?:[a-z]+ing\b|in\s+mind\b|track\b|up\b|an\s+eye\b)",
    // "note that ..." opening a clause, "please note that"; "make a note that" still counts
    r"(?:^|[^a-z\s]\s*|\b(?:please|just|i|we)\s+)note\s+that\b",
    // "a book", "my book"; "book a flight" still counts
    r"\b(?:a|an|the|my|your|this|that)\s+books?\b",
];

pub fn keywords_for(service: GoogleService) -> &'static [&'static str] {
    match service {
        GoogleService::Email => EMAIL_KEYWORDS,
        GoogleService::Calendar => CALENDAR_KEYWORDS,
        GoogleService::Tasks => TASKS_KEYWORDS,
        GoogleService::Keep => KEEP_KEYWORDS,
    }
}
