use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique key of a question category (e.g. `"part1"`).
///
/// Keys are free-form strings chosen by the question bank, but never blank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Creates a new `CategoryId` from a non-blank key.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the key is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ParseIdError {
                kind: "CategoryId".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─── Parsing ───────────────────────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CategoryId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryId::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_id_display() {
        let id = CategoryId::new("part1").unwrap();
        assert_eq!(id.to_string(), "part1");
    }

    #[test]
    fn test_category_id_from_str() {
        let id: CategoryId = "part2".parse().unwrap();
        assert_eq!(id.as_str(), "part2");
    }

    #[test]
    fn test_category_id_rejects_blank() {
        assert!("".parse::<CategoryId>().is_err());
        assert!("   ".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_category_id_serializes_as_plain_string() {
        let id = CategoryId::new("part1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"part1\"");
    }
}
