//! Email sanitization
//!
//! Two passes: values that spell one of the known "no email" placeholders are
//! collapsed to the [`NULL_MARKER`], then anything that is not a plausible
//! address (the marker included) is redacted to null.

use regex::Regex;
use std::sync::OnceLock;

/// Literal written over placeholder emails before validation
pub const NULL_MARKER: &str = "NULL";

/// Known spellings of "no email", matched case-sensitively anywhere in the value
pub const PLACEHOLDER_SPELLINGS: &[&str] = &[
    "noemai", "nomai", "noemia", "nomea", "noemal", "noeami", "nomei", "noma", "noemil", "noeai",
    "NOEMAIL",
];

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        let pattern = PLACEHOLDER_SPELLINGS.join("|");
        Regex::new(&format!("(?:{})", pattern)).expect("Failed to compile placeholder regex")
    })
}

fn get_email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("Failed to compile email regex")
    })
}

/// Whether `email` contains a placeholder spelling
pub fn is_placeholder(email: &str) -> bool {
    get_placeholder_regex().is_match(email)
}

/// Whether `email` has the shape `local@domain.tld`
pub fn is_valid_format(email: &str) -> bool {
    get_email_regex().is_match(email)
}

/// Replace placeholder emails with [`NULL_MARKER`]; other values pass through
pub fn replace_placeholder(email: Option<String>) -> Option<String> {
    match email {
        Some(value) if is_placeholder(&value) => Some(NULL_MARKER.to_string()),
        other => other,
    }
}

/// Keep well-formed emails, null out everything else including the marker
pub fn validate(email: Option<String>) -> Option<String> {
    email.filter(|value| value != NULL_MARKER && is_valid_format(value))
}
