use chrono::{DateTime, Utc};
use contentstack_types::FieldError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ContentModel;

/// Key carrying the content type UID of a reference or embedded item.
pub(crate) const CONTENT_TYPE_UID_KEY: &str = "_content_type_uid";

/// The untyped fields of an entry, asset or other resource.
///
/// Accessors return `None` (or a [`FieldError`] for the `required_*`
/// family) when a key is missing or holds a different JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBag(Map<String, Value>);

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a bag from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Parses an RFC 3339 timestamp field.
    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get_str(key)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Follows a JSON pointer, e.g. `/publish_details/locale`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = path.split_once('/').unwrap_or((path, ""));
        let value = self.0.get(head)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(&format!("/{rest}"))
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.get_str("uid")
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// Locale the server actually returned, which may differ from the
    /// requested one when fallback was requested.
    pub fn locale(&self) -> Option<&str> {
        self.get_str("locale")
    }

    pub fn content_type_uid(&self) -> Option<&str> {
        self.get_str(CONTENT_TYPE_UID_KEY)
    }

    // ── Required accessors ───────────────────────────────────────

    fn required(&self, key: &str) -> Result<&Value, FieldError> {
        self.0.get(key).ok_or_else(|| FieldError::Missing {
            key: key.to_string(),
        })
    }

    pub fn required_str(&self, key: &str) -> Result<&str, FieldError> {
        self.required(key)?
            .as_str()
            .ok_or_else(|| mismatch(key, "string"))
    }

    pub fn required_i64(&self, key: &str) -> Result<i64, FieldError> {
        self.required(key)?
            .as_i64()
            .ok_or_else(|| mismatch(key, "integer"))
    }

    pub fn required_f64(&self, key: &str) -> Result<f64, FieldError> {
        self.required(key)?
            .as_f64()
            .ok_or_else(|| mismatch(key, "number"))
    }

    pub fn required_bool(&self, key: &str) -> Result<bool, FieldError> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| mismatch(key, "boolean"))
    }

    /// Deserializes a field with serde.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T, FieldError> {
        T::deserialize(self.required(key)?).map_err(|e| FieldError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Like [`FieldBag::decode`] but returns `Ok(None)` for a missing or null field.
    pub fn decode_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FieldError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.decode(key).map(Some),
        }
    }

    // ── References ───────────────────────────────────────────────

    /// Reads a reference field as a list of stubs or resolved objects.
    ///
    /// A single object is treated as a one-element list. Missing fields
    /// yield an empty list.
    pub fn references(&self, key: &str) -> Vec<ReferenceValue> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(ReferenceValue::from_json).collect(),
            Some(value @ Value::Object(_)) => ReferenceValue::from_json(value).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Decodes every resolved reference in `key` as `T`.
    ///
    /// An unresolved stub is an error: the reference was not included in
    /// the request, or the server did not return it.
    pub fn reference_models<T: ContentModel>(&self, key: &str) -> Result<Vec<T>, FieldError> {
        self.references(key)
            .into_iter()
            .map(|reference| match reference {
                ReferenceValue::Resolved(bag) => T::from_fields(&bag.project(T::FIELD_KEYS)),
                ReferenceValue::Stub { uid, .. } => Err(FieldError::Invalid {
                    key: key.to_string(),
                    message: format!("reference {uid} was not resolved"),
                }),
            })
            .collect()
    }

    /// Keeps only `keys`. An empty key list keeps everything.
    pub fn project(&self, keys: &[&str]) -> FieldBag {
        if keys.is_empty() {
            return self.clone();
        }
        FieldBag(
            self.0
                .iter()
                .filter(|(k, _)| keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

fn mismatch(key: &str, expected: &'static str) -> FieldError {
    FieldError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl From<Map<String, Value>> for FieldBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One element of a reference field.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceValue {
    /// A link the server did not expand.
    Stub {
        uid: String,
        content_type_uid: String,
    },
    /// The referenced object itself.
    Resolved(FieldBag),
}

impl ReferenceValue {
    /// Classifies a JSON object as a stub or a resolved reference.
    ///
    /// A stub carries nothing but `uid` and `_content_type_uid`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if let Some((uid, content_type_uid)) = stub_parts(map) {
            return Some(ReferenceValue::Stub {
                uid: uid.to_string(),
                content_type_uid: content_type_uid.to_string(),
            });
        }
        Some(ReferenceValue::Resolved(FieldBag(map.clone())))
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            ReferenceValue::Stub { uid, .. } => Some(uid),
            ReferenceValue::Resolved(bag) => bag.uid(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ReferenceValue::Resolved(_))
    }
}

/// Returns `(uid, content_type_uid)` if `map` addresses another object,
/// whatever else it carries.
pub(crate) fn link_parts(map: &Map<String, Value>) -> Option<(&str, &str)> {
    let uid = map.get("uid")?.as_str()?;
    let content_type_uid = map.get(CONTENT_TYPE_UID_KEY)?.as_str()?;
    Some((uid, content_type_uid))
}

/// Returns `(uid, content_type_uid)` if `map` is a bare link stub.
pub(crate) fn stub_parts(map: &Map<String, Value>) -> Option<(&str, &str)> {
    if map.len() != 2 {
        return None;
    }
    link_parts(map)
}
