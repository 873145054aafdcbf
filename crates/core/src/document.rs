//! Persisted document codec.
//!
//! Encoding is plain serde. Decoding is tolerant: an unparseable document
//! yields the defaults, and each field of a partial or damaged document falls
//! back to its own default independently. Recovery is logged, never returned
//! as an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{AnswerRecord, CategoryId, Screen, Session};

/// Storage key of the multi-category document.
pub const DOCUMENT_KEY: &str = "quiz.state.v1";

/// Storage key of the single-category document.
pub const SINGLE_DOCUMENT_KEY: &str = "quiz.single.v1";

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub current_question: usize,
    pub user_answers: AnswerRecord,
    pub selected_option: Option<String>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            current_question: session.current_question(),
            user_answers: session.answers().clone(),
            selected_option: session.selected_option().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn into_session(self) -> Session {
        Session::from_persisted(self.current_question, self.user_answers, self.selected_option)
    }
}

/// Which screen is open and for which category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub screen: Screen,
    pub selected_category: Option<CategoryId>,
}

/// Multi-category document stored under [`DOCUMENT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub current_view: CurrentView,
    pub categories: BTreeMap<CategoryId, SessionRecord>,
}

impl PersistedDocument {
    /// Serialize to JSON. Output is deterministic for equal documents.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored document, recovering from any damage.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let Some(root) = parse_root(raw, DOCUMENT_KEY) else {
            return Self::default();
        };

        let current_view = match root.get("currentView") {
            Some(Value::Object(view)) => CurrentView {
                screen: decode_screen(view.get("screen")),
                selected_category: decode_category_ref(view.get("selectedCategory")),
            },
            None => CurrentView::default(),
            Some(other) => {
                tracing::warn!(found = %kind(other), "currentView is not an object; using defaults");
                CurrentView::default()
            }
        };

        let categories = match root.get("categories") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(key, value)| {
                    let Ok(id) = CategoryId::new(key.as_str()) else {
                        tracing::warn!("dropping session stored under a blank category id");
                        return None;
                    };
                    let Value::Object(fields) = value else {
                        tracing::warn!(category = %id, found = %kind(value), "dropping malformed session");
                        return None;
                    };
                    Some((id, decode_session(fields)))
                })
                .collect(),
            None => BTreeMap::new(),
            Some(other) => {
                tracing::warn!(found = %kind(other), "categories is not an object; starting empty");
                BTreeMap::new()
            }
        };

        Self {
            current_view,
            categories,
        }
    }
}

/// Single-category document stored under [`SINGLE_DOCUMENT_KEY`].
///
/// The session fields sit at the root next to `screen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDocument {
    pub screen: Screen,
    #[serde(flatten)]
    pub session: SessionRecord,
}

impl SingleDocument {
    /// Serialize to JSON. Output is deterministic for equal documents.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored document, recovering from any damage.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let Some(root) = parse_root(raw, SINGLE_DOCUMENT_KEY) else {
            return Self::default();
        };
        Self {
            screen: decode_screen(root.get("screen")),
            session: decode_session(&root),
        }
    }
}

//
// ─── FIELD DECODERS ────────────────────────────────────────────────────────────
//

fn parse_root(raw: &str, key: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(root)) => Some(root),
        Ok(other) => {
            tracing::warn!(key, found = %kind(&other), "stored document is not an object; using defaults");
            None
        }
        Err(error) => {
            tracing::warn!(key, %error, "stored document is unparseable; using defaults");
            None
        }
    }
}

fn decode_screen(value: Option<&Value>) -> Screen {
    match value {
        None | Some(Value::Null) => Screen::default(),
        Some(value) => Screen::deserialize(value).unwrap_or_else(|error| {
            tracing::warn!(%error, "invalid screen; defaulting to home");
            Screen::default()
        }),
    }
}

fn decode_category_ref(value: Option<&Value>) -> Option<CategoryId> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => CategoryId::new(id.as_str()).ok(),
        Some(other) => {
            tracing::warn!(found = %kind(other), "invalid selectedCategory; clearing it");
            None
        }
    }
}

fn decode_session(fields: &Map<String, Value>) -> SessionRecord {
    let current_question = match fields.get("currentQuestion") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_else(|| {
                tracing::warn!(found = %value, "invalid currentQuestion; defaulting to 0");
                0
            }),
    };

    let user_answers = match fields.get("userAnswers") {
        None | Some(Value::Null) => AnswerRecord::new(),
        Some(Value::Object(answers)) => answers
            .iter()
            .filter_map(|(index, option)| {
                let index = index.parse::<usize>().ok();
                match (index, option) {
                    (Some(index), Value::String(option)) => Some((index, option.clone())),
                    _ => {
                        tracing::warn!("dropping malformed answer entry");
                        None
                    }
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!(found = %kind(other), "userAnswers is not an object; starting empty");
            AnswerRecord::new()
        }
    };

    let selected_option = match fields.get("selectedOption") {
        None | Some(Value::Null) => None,
        Some(Value::String(option)) => Some(option.clone()),
        Some(other) => {
            tracing::warn!(found = %kind(other), "invalid selectedOption; clearing it");
            None
        }
    };

    SessionRecord {
        current_question,
        user_answers,
        selected_option,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> CategoryId {
        CategoryId::new(s).unwrap()
    }

    fn sample() -> PersistedDocument {
        let mut categories = BTreeMap::new();
        categories.insert(
            id("part1"),
            SessionRecord {
                current_question: 2,
                user_answers: AnswerRecord::from([(0, "A".into()), (1, "X".into())]),
                selected_option: Some("C".into()),
            },
        );
        categories.insert(id("part2"), SessionRecord::default());
        PersistedDocument {
            current_view: CurrentView {
                screen: Screen::Quiz,
                selected_category: Some(id("part1")),
            },
            categories,
        }
    }

    #[test]
    fn encodes_wire_format() {
        let json: Value = serde_json::from_str(&sample().encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currentView": { "screen": "quiz", "selectedCategory": "part1" },
                "categories": {
                    "part1": {
                        "currentQuestion": 2,
                        "userAnswers": { "0": "A", "1": "X" },
                        "selectedOption": "C"
                    },
                    "part2": {
                        "currentQuestion": 0,
                        "userAnswers": {},
                        "selectedOption": null
                    }
                }
            })
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let doc = sample();
        assert_eq!(PersistedDocument::decode(&doc.encode().unwrap()), doc);
    }

    #[test]
    fn encoding_is_stable() {
        let doc = sample();
        assert_eq!(doc.encode().unwrap(), doc.clone().encode().unwrap());
    }

    #[test]
    fn garbage_decodes_to_defaults() {
        assert_eq!(PersistedDocument::decode("not json"), PersistedDocument::default());
        assert_eq!(PersistedDocument::decode("[1,2]"), PersistedDocument::default());
        assert_eq!(PersistedDocument::decode(""), PersistedDocument::default());
    }

    #[test]
    fn missing_fields_default_independently() {
        let doc = PersistedDocument::decode(r#"{"currentView":{"screen":"results"}}"#);
        assert_eq!(doc.current_view.screen, Screen::Results);
        assert_eq!(doc.current_view.selected_category, None);
        assert!(doc.categories.is_empty());

        let doc = PersistedDocument::decode(
            r#"{"categories":{"part1":{"userAnswers":{"1":"B"}}}}"#,
        );
        assert_eq!(doc.current_view, CurrentView::default());
        let session = &doc.categories[&id("part1")];
        assert_eq!(session.current_question, 0);
        assert_eq!(session.user_answers, AnswerRecord::from([(1, "B".into())]));
        assert_eq!(session.selected_option, None);
    }

    #[test]
    fn damaged_fields_fall_back_without_losing_the_rest() {
        let raw = r#"{
            "currentView": { "screen": "lobby", "selectedCategory": 7 },
            "categories": {
                "part1": { "currentQuestion": -3, "userAnswers": { "0": "A", "x": "B", "2": 5 }, "selectedOption": true },
                "part2": "oops"
            }
        }"#;
        let doc = PersistedDocument::decode(raw);
        assert_eq!(doc.current_view, CurrentView::default());
        assert_eq!(doc.categories.len(), 1);
        let session = &doc.categories[&id("part1")];
        assert_eq!(session.current_question, 0);
        assert_eq!(session.user_answers, AnswerRecord::from([(0, "A".into())]));
        assert_eq!(session.selected_option, None);
    }

    #[test]
    fn single_document_is_flat() {
        let doc = SingleDocument {
            screen: Screen::Results,
            session: SessionRecord {
                current_question: 1,
                user_answers: AnswerRecord::from([(0, "A".into()), (1, "B".into())]),
                selected_option: Some("B".into()),
            },
        };
        let json: Value = serde_json::from_str(&doc.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "screen": "results",
                "currentQuestion": 1,
                "userAnswers": { "0": "A", "1": "B" },
                "selectedOption": "B"
            })
        );
        assert_eq!(SingleDocument::decode(&doc.encode().unwrap()), doc);
    }

    #[test]
    fn single_document_tolerates_partial_input() {
        let doc = SingleDocument::decode(r#"{"currentQuestion":3}"#);
        assert_eq!(doc.screen, Screen::Home);
        assert_eq!(doc.session.current_question, 3);
        assert!(doc.session.user_answers.is_empty());
    }

    #[test]
    fn record_converts_to_session_and_back() {
        let record = SessionRecord {
            current_question: 1,
            user_answers: AnswerRecord::from([(0, "A".into())]),
            selected_option: None,
        };
        let session = record.clone().into_session();
        assert_eq!(SessionRecord::from_session(&session), record);
    }
}
