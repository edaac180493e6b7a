//! Source classification
//!
//! Decides which external content source a view link belongs to by matching
//! it against a fixed set of provider URL prefixes. Records whose source does
//! not match the manifest's source are invisible to reconciliation.

use serde::{Deserialize, Serialize};

/// Tag assigned to Google Drive links
pub const GOOGLE_DRIVE: &str = "googleDrive";

const GOOGLE_DRIVE_PREFIXES: &[&str] = &[
    "https://drive.google",
    "https://drive.google.com/file/d/",
    "https://docs.google.com/spreadsheets/d/",
    "https://docs.google.com/document/d/",
    "https://docs.google.com/presentation/d/",
];

/// A source tag and the link prefixes that identify it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRule {
    pub tag: String,
    pub prefixes: Vec<String>,
}

impl SourceRule {
    pub fn new(tag: impl Into<String>, prefixes: &[&str]) -> Self {
        Self {
            tag: tag.into(),
            prefixes: prefixes.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    fn matches(&self, link: &str) -> bool {
        self.prefixes.iter().any(|p| link.starts_with(p.as_str()))
    }
}

/// Ordered set of [`SourceRule`]s; the first matching rule wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceClassifier {
    rules: Vec<SourceRule>,
}

impl SourceClassifier {
    pub fn new(rules: Vec<SourceRule>) -> Self {
        Self { rules }
    }

    /// Classifies a view link, returning `None` for unclassified links
    pub fn classify(&self, link: &str) -> Option<&str> {
        if link.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(link))
            .map(|rule| rule.tag.as_str())
    }

    pub fn rules(&self) -> &[SourceRule] {
        &self.rules
    }
}

impl Default for SourceClassifier {
    fn default() -> Self {
        Self::new(vec![SourceRule::new(GOOGLE_DRIVE, GOOGLE_DRIVE_PREFIXES)])
    }
}
