//! Shape triage for raw model replies.
//!
//! The model is asked for `{title, fields}` but is free to ignore that. A
//! reply is parsed once and sorted into a [`ReplyShape`]; each shape maps to
//! exactly one [`FormSchema`]:
//!
//! | Shape | Result |
//! |-------|--------|
//! | `Array` | `{"title": "Generated Form", "fields": <array>}` |
//! | `FormObject` (object with a `fields` key) | the object, unmodified |
//! | `ObjectWithoutFields` | fallback |
//! | `Scalar` (string, number, bool, null) | fallback |
//! | `Unparseable` | fallback |
//!
//! Nothing inside `fields` is inspected. Normalization never fails.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::FormSchema;

/// Classification of a raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape {
    /// Top-level JSON array, used verbatim as the field list.
    Array(Vec<Value>),
    /// JSON object containing a `fields` key (of any type).
    FormObject(Map<String, Value>),
    /// JSON object with no `fields` key.
    ObjectWithoutFields,
    /// String, number, boolean or null.
    Scalar,
    /// Not valid JSON.
    Unparseable,
}

impl ReplyShape {
    /// Classify an already-parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => ReplyShape::Array(items),
            Value::Object(object) if object.contains_key("fields") => {
                ReplyShape::FormObject(object)
            }
            Value::Object(_) => ReplyShape::ObjectWithoutFields,
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                ReplyShape::Scalar
            }
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyShape::Array(_) => "array",
            ReplyShape::FormObject(_) => "form_object",
            ReplyShape::ObjectWithoutFields => "object_without_fields",
            ReplyShape::Scalar => "scalar",
            ReplyShape::Unparseable => "unparseable",
        }
    }

    /// Whether this shape collapses to [`FormSchema::fallback`].
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            ReplyShape::ObjectWithoutFields | ReplyShape::Scalar | ReplyShape::Unparseable
        )
    }

    pub fn into_schema(self) -> FormSchema {
        match self {
            ReplyShape::Array(items) => FormSchema::wrap(items),
            ReplyShape::FormObject(object) => FormSchema::from_object(object),
            ReplyShape::ObjectWithoutFields | ReplyShape::Scalar | ReplyShape::Unparseable => {
                FormSchema::fallback()
            }
        }
    }
}

/// Parse `raw` and classify it. No preprocessing is applied.
pub fn classify(raw: &str) -> ReplyShape {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => ReplyShape::from_value(value),
        Err(e) => {
            debug!("model reply is not JSON: {e}");
            ReplyShape::Unparseable
        }
    }
}

/// Normalize `raw` with default settings (no fence stripping).
pub fn normalize(raw: &str) -> FormSchema {
    Normalizer::default().normalize(raw)
}

/// Remove one markdown code fence wrapping the whole reply.
///
/// Accepts ```` ```json\n...\n``` ```` and bare ```` ```\n...\n``` ````. Input
/// that is not entirely enclosed by a single fence is returned unchanged.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return raw;
    };
    if body.contains("```") {
        return raw;
    }
    match body.split_once('\n') {
        Some((tag, inner)) if is_fence_tag(tag) => inner.trim(),
        _ => body.trim(),
    }
}

/// Info string after an opening fence, e.g. `json` or empty.
fn is_fence_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reply normalizer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Strip a surrounding markdown code fence before parsing. Default: `false`.
    pub strip_code_fences: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fence_stripping(mut self, enabled: bool) -> Self {
        self.strip_code_fences = enabled;
        self
    }

    /// Classify `raw`, applying fence stripping if enabled.
    pub fn classify(&self, raw: &str) -> ReplyShape {
        if self.strip_code_fences {
            let inner = strip_code_fences(raw);
            if inner.len() != raw.len() {
                debug!("stripped markdown fence from model reply");
            }
            classify(inner)
        } else {
            classify(raw)
        }
    }

    /// Map any reply text onto a [`FormSchema`]. Never fails.
    pub fn normalize(&self, raw: &str) -> FormSchema {
        let shape = self.classify(raw);
        if shape.is_fallback() {
            warn!(
                shape = shape.kind(),
                reply_len = raw.len(),
                "model reply unusable, returning fallback form"
            );
        } else {
            debug!(shape = shape.kind(), "model reply normalized");
        }
        shape.into_schema()
    }
}
