use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level screen of the quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Category selection (or the start page in single-category mode).
    #[default]
    Home,
    /// Answering questions.
    Quiz,
    /// Score and per-question review.
    Results,
}

impl Screen {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Quiz => "quiz",
            Screen::Results => "results",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Screen::Results).unwrap(), "\"results\"");
        let parsed: Screen = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(parsed, Screen::Quiz);
    }

    #[test]
    fn defaults_to_home() {
        assert_eq!(Screen::default(), Screen::Home);
    }
}
