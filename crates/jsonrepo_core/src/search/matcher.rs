//! Wildcard pattern matching against record field values.
//!
//! # Responsibility
//! - Translate `*` wildcard patterns into anchored case-insensitive regexes.
//! - Define the string form of a JSON value used for matching.
//!
//! # Invariants
//! - Every pattern character except `*` matches literally.
//! - Null and absent values never match, not even `*`.

use log::warn;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Upper bound on the compiled size of one pattern.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardMatcher {
    regex: Option<Regex>,
}

impl WildcardMatcher {
    /// Compiles `pattern`.
    ///
    /// A pattern the regex engine rejects (e.g. beyond
    /// [`PATTERN_SIZE_LIMIT`]) yields a matcher that matches nothing.
    pub fn new(pattern: &str) -> Self {
        let regex = match build_regex(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(
                    "event=pattern_compile module=search status=error pattern_len={} error={}",
                    pattern.len(),
                    err
                );
                None
            }
        };
        Self { regex }
    }

    /// Whether the field value matches; `None` means the field is absent.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let (Some(regex), Some(text)) = (self.regex.as_ref(), value.and_then(stringify_value))
        else {
            return false;
        };
        regex.is_match(&text)
    }
}

fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&format!("^(?s:{body})$"))
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
}

/// Returns the matchable string form of a field value.
///
/// Strings are used verbatim, integral numbers print without a fraction,
/// arrays join their elements with `,`, objects print as compact JSON.
/// Returns `None` for `null`.
pub fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        }),
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| stringify_value(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
