//! Form schema types and the reply normalizer.
//!
//! [`FormSchema`] is what callers receive. It wraps a JSON object rather than
//! a strict struct because objects the model returns with a `fields` key are
//! passed through untouched, extra keys and odd value types included.
//! [`FieldDescriptor`] is a lenient, typed read-only view over `fields`.

pub mod normalize;

pub use normalize::{Normalizer, ReplyShape, classify, normalize, strip_code_fences};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title used whenever the model's reply did not supply a usable object.
pub const DEFAULT_TITLE: &str = "Generated Form";

/// Canonical `{title, fields}` output. Always a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema(Map<String, Value>);

impl FormSchema {
    /// `{"title": "Generated Form", "fields": []}`.
    pub fn fallback() -> Self {
        Self::wrap(Vec::new())
    }

    /// `{"title": "Generated Form", "fields": <fields>}` with `fields` kept as-is.
    pub fn wrap(fields: Vec<Value>) -> Self {
        let mut map = Map::with_capacity(2);
        map.insert("title".to_string(), Value::String(DEFAULT_TITLE.to_string()));
        map.insert("fields".to_string(), Value::Array(fields));
        Self(map)
    }

    /// Use an object exactly as the model produced it.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// The `title` value, if it is a string.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Title suitable for display: the string `title`, or [`DEFAULT_TITLE`].
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or(DEFAULT_TITLE)
    }

    /// The raw `fields` value. Usually an array, but not guaranteed for
    /// pass-through objects.
    pub fn fields(&self) -> Option<&Value> {
        self.0.get("fields")
    }

    /// Whether this is exactly the fallback schema.
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Read `fields` as typed descriptors, skipping entries that are not
    /// objects. Returns an empty list when `fields` is not an array.
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        match self.fields() {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(FieldDescriptor::from_object)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::fallback()
    }
}

impl From<FormSchema> for Value {
    fn from(schema: FormSchema) -> Self {
        schema.into_value()
    }
}

/// Input kinds the model is asked to choose from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Email,
    Textarea,
}

impl FieldType {
    /// Parse a `type` string. Unknown values read as [`FieldType::Text`],
    /// which is how a browser treats an unknown `<input type>`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "textarea" => FieldType::Textarea,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Textarea => "textarea",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input in a generated form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub meta: Vec<String>,
}

impl FieldDescriptor {
    /// Build a descriptor from whatever keys the model supplied.
    ///
    /// Missing or mistyped keys fall back to their defaults; non-string
    /// `meta` entries are dropped.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            label: text("label"),
            name: text("name"),
            field_type: object
                .get("type")
                .and_then(Value::as_str)
                .map(FieldType::parse_lenient)
                .unwrap_or_default(),
            required: object
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            meta: object
                .get("meta")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
