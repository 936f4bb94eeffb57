use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity attached to a vulnerability by the model.
///
/// The model is asked for one of the four named levels. Anything else it
/// produces is preserved verbatim in `Unrecognized` instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unrecognized(String),
}

impl Severity {
    /// Maps a raw severity label onto the closed set where possible.
    ///
    /// Surrounding brackets, markdown emphasis and trailing words are ignored,
    /// so `"[HIGH]"`, `"**Critical**"` and `"High risk"` all normalize.
    pub fn normalize(raw: &str) -> Self {
        let cleaned = raw.trim().trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | '*' | '_' | '`' | '.' | ':')
        });

        let first_word = cleaned
            .split(|c: char| !c.is_alphanumeric())
            .find(|word| !word.is_empty())
            .unwrap_or_default()
            .to_lowercase();

        match first_word.as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unrecognized(cleaned.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Ordering weight used when grouping findings for display.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unrecognized(_) => 0,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::High => "🟠",
            Self::Medium => "🟡",
            Self::Low => "🟢",
            Self::Unrecognized(_) => "⚪",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<&str> for Severity {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}
