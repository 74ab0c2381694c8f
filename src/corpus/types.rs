//! Core data types: priority tiers and training examples.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::keywords::extract_keywords;
use crate::error::{Result, UrgencyError};

/// Urgency tier of a complaint.
///
/// Serialized as its integer code (1, 2 or 3); any other code is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    /// Needs immediate attention.
    High = 1,
    /// Default tier.
    Medium = 2,
    /// Can wait.
    Low = 3,
}

impl Priority {
    /// All tiers, most urgent first.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Integer code of the tier.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Zero-based index, usable for per-class arrays.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Inverse of [`Priority::index`].
    pub fn from_index(index: usize) -> Option<Priority> {
        Priority::ALL.get(index).copied()
    }

    /// Lowercase English label.
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = UrgencyError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(UrgencyError::validation(format!(
                "priority must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.code()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// A labeled example in the training corpus. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Complaint text.
    pub text: String,
    /// Optional complaint category.
    #[serde(default)]
    pub category: Option<String>,
    /// Labeled urgency tier.
    pub priority: Priority,
    /// Most frequent tokens of `text`.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// When the example entered the corpus.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TrainingExample {
    /// Build an example, deriving its top-`keyword_count` keywords.
    ///
    /// Rejects blank text.
    pub fn new(
        text: impl Into<String>,
        category: Option<String>,
        priority: Priority,
        keyword_count: usize,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(UrgencyError::validation("training text must not be empty"));
        }

        let keywords = extract_keywords(&text, keyword_count);
        Ok(TrainingExample {
            text,
            category,
            priority,
            keywords,
            created_at: Utc::now(),
        })
    }

    /// Check an example that arrived without going through [`TrainingExample::new`],
    /// deriving its keywords if it has none.
    pub fn prepared(mut self, keyword_count: usize) -> Result<Self> {
        if self.text.trim().is_empty() {
            return Err(UrgencyError::validation("training text must not be empty"));
        }
        if self.keywords.is_empty() {
            self.keywords = extract_keywords(&self.text, keyword_count);
        }
        Ok(self)
    }

    /// Text fed to the vectorizer: the source text followed by its keywords.
    pub fn document(&self) -> String {
        if self.keywords.is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.text, self.keywords.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_codes() {
        for priority in Priority::ALL {
            assert_eq!(Priority::try_from(priority.code()).unwrap(), priority);
            assert_eq!(Priority::from_index(priority.index()), Some(priority));
        }
        assert!(Priority::try_from(0).is_err());
        assert!(Priority::try_from(4).is_err());
        assert_eq!(Priority::from_index(3), None);
    }

    #[test]
    fn test_priority_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "3");
        let parsed: Priority = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Priority::High);
        assert!(serde_json::from_str::<Priority>("5").is_err());
    }

    #[test]
    fn test_example_keywords_and_document() {
        let example = TrainingExample::new(
            "Fuite de gaz, odeur de gaz dans l'immeuble",
            Some("Sécurité".to_string()),
            Priority::High,
            2,
        )
        .unwrap();

        assert_eq!(example.keywords, vec!["gaz", "fuite"]);
        assert_eq!(
            example.document(),
            "Fuite de gaz, odeur de gaz dans l'immeuble gaz fuite"
        );
    }

    #[test]
    fn test_example_rejects_blank_text() {
        let err = TrainingExample::new("   ", None, Priority::Low, 5).unwrap_err();
        assert!(matches!(err, UrgencyError::Validation(_)));
    }

    #[test]
    fn test_example_deserializes_without_optional_fields() {
        let example: TrainingExample =
            serde_json::from_str(r#"{"text":"bruit nocturne","priority":2}"#).unwrap();
        assert_eq!(example.priority, Priority::Medium);
        assert!(example.category.is_none());
        assert!(example.keywords.is_empty());

        let example = example.prepared(5).unwrap();
        assert_eq!(example.keywords, vec!["bruit", "nocturne"]);
    }
}
