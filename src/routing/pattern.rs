//! Glob patterns for function-name include/exclude lists.
//!
//! A pattern may carry a `*` wildcard in the leading and/or trailing
//! position only:
//!
//! | Pattern | Matches                         |
//! |---------|---------------------------------|
//! | `foo`   | exactly `foo`                   |
//! | `foo*`  | names starting with `foo`       |
//! | `*foo`  | names ending with `foo`         |
//! | `*foo*` | names containing `foo`          |
//!
//! A `*` anywhere else is a literal character. Matching is case-sensitive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A function-name pattern compiled once at configuration load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NamePattern {
    /// The candidate must equal the text.
    Exact(String),
    /// The candidate must start with the text (`foo*`).
    Prefix(String),
    /// The candidate must end with the text (`*foo`).
    Suffix(String),
    /// The candidate must contain the text (`*foo*`, or `*` alone).
    Contains(String),
}

impl NamePattern {
    /// Compile a raw pattern string.
    pub fn compile(raw: &str) -> Self {
        if raw == "*" {
            return NamePattern::Contains(String::new());
        }

        let leading = raw.starts_with('*');
        let trailing = raw.len() > 1 && raw.ends_with('*');
        let start = usize::from(leading);
        let end = raw.len() - usize::from(trailing);
        let text = raw[start..end].to_string();

        match (leading, trailing) {
            (true, true) => NamePattern::Contains(text),
            (true, false) => NamePattern::Suffix(text),
            (false, true) => NamePattern::Prefix(text),
            (false, false) => NamePattern::Exact(text),
        }
    }

    /// Check whether `candidate` satisfies this pattern.
    ///
    /// An empty candidate only matches an exact empty pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return matches!(self, NamePattern::Exact(text) if text.is_empty());
        }

        match self {
            NamePattern::Exact(text) => candidate == text,
            NamePattern::Prefix(text) => candidate.starts_with(text.as_str()),
            NamePattern::Suffix(text) => candidate.ends_with(text.as_str()),
            NamePattern::Contains(text) => candidate.contains(text.as_str()),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(raw: &str) -> Self {
        NamePattern::compile(raw)
    }
}

impl From<String> for NamePattern {
    fn from(raw: String) -> Self {
        NamePattern::compile(&raw)
    }
}

impl From<NamePattern> for String {
    fn from(pattern: NamePattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Exact(text) => write!(f, "{}", text),
            NamePattern::Prefix(text) => write!(f, "{}*", text),
            NamePattern::Suffix(text) => write!(f, "*{}", text),
            NamePattern::Contains(text) if text.is_empty() => write!(f, "*"),
            NamePattern::Contains(text) => write!(f, "*{}*", text),
        }
    }
}

/// Match `candidate` against a raw, uncompiled glob.
pub fn matches_glob(candidate: &str, pattern: &str) -> bool {
    NamePattern::compile(pattern).matches(candidate)
}
