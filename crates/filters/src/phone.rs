//! Phone number normalization

use regex::Regex;
use std::sync::OnceLock;

static NON_DIGIT_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_non_digit_regex() -> &'static Regex {
    NON_DIGIT_REGEX.get_or_init(|| Regex::new(r"\D").expect("Failed to compile non-digit regex"))
}

/// Strip every character that is not a decimal digit
///
/// An input with no digits yields an empty string, not null.
pub fn digits_only(phone: &str) -> String {
    get_non_digit_regex().replace_all(phone, "").into_owned()
}

/// Normalize an optional phone value; null stays null
pub fn normalize(phone: Option<String>) -> Option<String> {
    phone.map(|p| digits_only(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+86 138-0013-8000"), "8613800138000");
        assert_eq!(digits_only("(010) 6552 9988 ext. 12"), "0106552998812");
        assert_eq!(digits_only("13800138000"), "13800138000");
    }

    #[test]
    fn test_no_digits_gives_empty_string() {
        assert_eq!(normalize(Some("n/a".to_string())), Some(String::new()));
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn test_result_is_all_digits() {
        let cleaned = digits_only("电话：138 0013 8000！");
        assert!(cleaned.chars().all(|c| c.is_numeric()));
        assert_eq!(cleaned, "13800138000");
    }
}
