//! Case-insensitive topic identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A topic, stored in its normalized (trimmed, lower-cased) form.
///
/// Two topics compare equal iff their normalized forms match, so
/// `Topic::new(" Health ") == Topic::new("health")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a label, compared case-insensitively after trimming, names this topic.
    pub fn matches(&self, label: &str) -> bool {
        normalize(label) == self.0
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(raw: &str) -> Self {
        Topic::new(raw)
    }
}

impl From<String> for Topic {
    fn from(raw: String) -> Self {
        Topic::new(raw)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_equality_ignores_case_and_whitespace() {
        assert_eq!(Topic::new("  Health "), Topic::new("HEALTH"));
        assert_ne!(Topic::new("Health"), Topic::new("Healthcare"));
    }

    #[test]
    fn test_topic_matches_label() {
        let topic = Topic::new("health");
        assert!(topic.matches(" Health"));
        assert!(!topic.matches("Crime"));
    }

    #[test]
    fn test_blank_topic() {
        assert!(Topic::new("   ").is_blank());
        assert_eq!(Topic::new("Crime").to_string(), "crime");
    }

    #[test]
    fn test_deserialized_topic_is_normalized() -> Result<(), serde_json::Error> {
        let topic: Topic = serde_json::from_str(r#"" Health ""#)?;
        assert_eq!(topic, Topic::new("health"));
        assert_eq!(topic.as_str(), "health");
        assert_eq!(serde_json::to_string(&topic)?, r#""health""#);
        Ok(())
    }
}
