use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decoded page properties, in the order Notion lists them.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// A person referenced by a `people` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A property value flattened to what a renderer needs.
///
/// Serialized untagged, so a page reads as `{"Date": "2024-01-01",
/// "Tags": ["a", "b"], ...}`. `Raw` keeps the provider's type-keyed value
/// for property types without a dedicated rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Number(serde_json::Number),
    Text(String),
    Names(Vec<String>),
    People(Vec<Person>),
    Raw(Value),
}

impl PropertyValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text if present and non-empty, `Null` otherwise.
    pub fn non_empty_text(value: Option<String>) -> Self {
        match value {
            Some(text) if !text.is_empty() => Self::Text(text),
            _ => Self::Null,
        }
    }

    /// A people list. An empty one is the same value as an empty name
    /// list, which is how it reads back from JSON.
    pub fn people(people: Vec<Person>) -> Self {
        if people.is_empty() {
            Self::Names(Vec::new())
        } else {
            Self::People(people)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Classifies a JSON value read back from the cache.
    ///
    /// Person arrays are recognized by their exact key set so that cached
    /// pages serialize to the same bytes they were stored as.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::Text(text),
            Value::Array(items) if items.iter().all(Value::is_string) => Self::Names(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Array(items) if !items.is_empty() && items.iter().all(is_person_shaped) => {
                match serde_json::from_value(Value::Array(items.clone())) {
                    Ok(people) => Self::People(people),
                    Err(_) => Self::Raw(Value::Array(items)),
                }
            }
            other => Self::Raw(other),
        }
    }
}

fn is_person_shaped(value: &Value) -> bool {
    value.as_object().is_some_and(|object| {
        object.len() == 3
            && object.get("id").is_some_and(Value::is_string)
            && object.contains_key("name")
            && object.contains_key("avatar_url")
    })
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}
