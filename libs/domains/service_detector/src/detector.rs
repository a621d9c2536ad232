use regex::Regex;
use std::sync::LazyLock;
use strum::IntoEnumIterator;

use crate::keywords::{CONJUNCTIONS, EXCLUSIONS, keywords_for};
use crate::models::{DetectedServices, GoogleService};

static CLAUSE_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    let words = CONJUNCTIONS
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b|&", words)).expect("conjunction pattern")
});

static EXCLUSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&EXCLUSIONS.join("|")).expect("exclusion pattern"));

static SERVICE_PATTERNS: LazyLock<Vec<(GoogleService, Regex)>> = LazyLock::new(|| {
    GoogleService::iter()
        .map(|service| (service, keyword_pattern(keywords_for(service))))
        .collect()
});

/// `\b(?:phrase|...|(?:word|...)(?:s|es)?)\b`
fn keyword_pattern(keywords: &[&str]) -> Regex {
    let (phrases, words): (Vec<&str>, Vec<&str>) =
        keywords.iter().copied().partition(|k| k.contains(' '));

    let mut alternatives: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
    if !words.is_empty() {
        let words = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        alternatives.push(format!("(?:{})(?:s|es)?", words));
    }

    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).expect("keyword pattern")
}

/// Lowercase, trim and collapse whitespace runs.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_clauses(text: &str) -> Vec<&str> {
    let clauses: Vec<&str> = CLAUSE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if clauses.is_empty() { vec![text] } else { clauses }
}

fn detect_in_clause(clause: &str) -> DetectedServices {
    let clause = EXCLUSION.replace_all(clause, " ");

    SERVICE_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&clause))
        .map(|(service, _)| *service)
        .collect()
}

/// Guess which Google services a free-text request refers to.
///
/// The text is split into clauses on conjunctions and each clause is matched against the
/// keyword tables; the result is the union. Matching is case-insensitive and
/// deterministic.
///
/// ```
/// use domain_service_detector::detect_services;
///
/// let services = detect_services("Draft an email to Alice and create a task");
/// assert!(services.email && services.tasks);
/// assert!(!services.calendar && !services.keep);
/// ```
pub fn detect_services(text: &str) -> DetectedServices {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return DetectedServices::default();
    }

    split_clauses(&normalized)
        .into_iter()
        .map(detect_in_clause)
        .fold(DetectedServices::default(), DetectedServices::union)
}
