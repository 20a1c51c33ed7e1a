use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const ID_MAX_LEN: usize = 128;

/// Stable card identifier; the dedupe and scroll-anchor key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("card_id must not be empty".to_string()));
        }
        if s.len() > ID_MAX_LEN {
            return Err(ValidationError(format!(
                "card_id exceeds max length {ID_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError(
                "card_id must not contain control characters".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CardId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardId> for String {
    fn from(value: CardId) -> Self {
        value.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog record. Everything except `card_id` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub card_id: CardId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Card {
    #[must_use]
    pub fn new(card_id: CardId, attributes: Map<String, Value>) -> Self {
        Self {
            card_id,
            attributes,
        }
    }

    /// Builds a card from a JSON object carrying a `card_id` member.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut map) = value else {
            return Err(ValidationError("card must be a JSON object".to_string()));
        };
        let id = match map.remove("card_id") {
            Some(Value::String(s)) => CardId::parse(&s)?,
            Some(_) => return Err(ValidationError("card_id must be a string".to_string())),
            None => return Err(ValidationError("card_id is required".to_string())),
        };
        Ok(Self::new(id, map))
    }

    #[must_use]
    pub fn attribute(&self, field: &str) -> Option<&Value> {
        if field == "card_id" {
            return None;
        }
        self.attributes.get(field).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = self.attributes.clone();
        map.insert(
            "card_id".to_string(),
            Value::String(self.card_id.as_str().to_string()),
        );
        Value::Object(map)
    }
}

/// One window of results plus the count of all matching records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Page {
    pub items: Vec<Card>,
    pub total: u64,
}
