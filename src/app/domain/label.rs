use std::fmt;

use serde::Serialize;

use crate::app::infrastructure::error::{AppError, Result};

/// Unique, non-empty name of an entry in the store. Equality is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LabelName(String);

impl LabelName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::InvalidLabel(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for case-insensitive filtering and collation.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for LabelName {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for LabelName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// Content of a label as returned by the store.
///
/// Binary content is never materialized beyond its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelContent {
    Text { text: String, size_bytes: u64 },
    Binary { size_bytes: u64 },
}

impl LabelContent {
    /// Text content; the size is always the UTF-8 byte length of `text`.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let size_bytes = text.len() as u64;
        LabelContent::Text { text, size_bytes }
    }

    pub fn binary(size_bytes: u64) -> Self {
        LabelContent::Binary { size_bytes }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, LabelContent::Text { .. })
    }

    pub fn size_bytes(&self) -> u64 {
        match self {
            LabelContent::Text { size_bytes, .. } | LabelContent::Binary { size_bytes } => {
                *size_bytes
            }
        }
    }
}

/// What the status display shows about the active label's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInfo {
    pub is_text: bool,
    pub size_bytes: u64,
    pub syntax_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_rejected() {
        assert!(matches!(LabelName::new(""), Err(AppError::InvalidLabel(_))));
        assert!(LabelName::new(" ").is_ok());
    }

    #[test]
    fn test_label_equality_is_case_sensitive() {
        let lower = LabelName::new("readme.md").unwrap();
        let upper = LabelName::new("README.md").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(lower.folded(), upper.folded());
    }

    #[test]
    fn test_text_size_is_utf8_length() {
        let content = LabelContent::text("h\u{e9}llo");
        assert!(content.is_text());
        assert_eq!(content.size_bytes(), 6);
    }

    #[test]
    fn test_binary_content() {
        let content = LabelContent::binary(2048);
        assert!(!content.is_text());
        assert_eq!(content.size_bytes(), 2048);
    }

    #[test]
    fn test_label_serializes_as_plain_string() {
        let name = LabelName::new("a.txt").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"a.txt\"");
    }
}
