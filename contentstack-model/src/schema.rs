//! Content type schemas and the registry consulted during reference
//! resolution.

use contentstack_types::{DecodeError, FieldError};
use serde_json::Value;
use std::collections::HashMap;

use crate::fields::FieldBag;
use crate::model::ContentModel;

type Validator = fn(&FieldBag) -> Result<(), FieldError>;

fn validate_as<T: ContentModel>(fields: &FieldBag) -> Result<(), FieldError> {
    T::from_fields(&fields.project(T::FIELD_KEYS)).map(|_| ())
}

/// One field descriptor from a content type's `schema` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub uid: String,
    pub data_type: String,
    /// Target content types of a reference, or the global field UID.
    pub reference_to: Vec<String>,
    pub multiple: bool,
    /// Nested fields of groups and global fields.
    pub schema: Vec<SchemaField>,
}

impl SchemaField {
    fn from_json(value: &Value) -> Option<Self> {
        let uid = value.get("uid")?.as_str()?.to_string();
        let data_type = value.get("data_type")?.as_str()?.to_string();
        let reference_to = match value.get("reference_to") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        let multiple = value.get("multiple").and_then(Value::as_bool).unwrap_or(false);
        let schema = parse_fields(value.get("schema"));
        Some(Self {
            uid,
            data_type,
            reference_to,
            multiple,
            schema,
        })
    }

    pub fn is_reference(&self) -> bool {
        self.data_type == "reference"
    }

    pub fn is_global_field(&self) -> bool {
        self.data_type == "global_field"
    }
}

fn parse_fields(value: Option<&Value>) -> Vec<SchemaField> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(SchemaField::from_json).collect())
        .unwrap_or_default()
}

/// What the materializer knows about one content type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub content_type_uid: String,
    /// Keys a resolved reference is projected to. Empty keeps every key.
    pub field_keys: Vec<String>,
    /// Field descriptors, when built from a content type definition.
    pub fields: Vec<SchemaField>,
    validator: Option<Validator>,
}

impl ModelSchema {
    /// A schema that only projects to `field_keys`.
    pub fn new<S: Into<String>>(
        content_type_uid: impl Into<String>,
        field_keys: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            content_type_uid: content_type_uid.into(),
            field_keys: field_keys.into_iter().map(Into::into).collect(),
            fields: Vec::new(),
            validator: None,
        }
    }

    /// A schema derived from a caller model: its keys, and a check that
    /// every resolved reference decodes as `T`.
    pub fn for_model<T: ContentModel>(content_type_uid: impl Into<String>) -> Self {
        Self {
            content_type_uid: content_type_uid.into(),
            field_keys: T::FIELD_KEYS.iter().map(|k| k.to_string()).collect(),
            fields: Vec::new(),
            validator: Some(validate_as::<T>),
        }
    }

    /// Reads a content type definition (`{"uid": .., "schema": [..]}`).
    pub fn from_content_type(content_type: &Value) -> Result<Self, DecodeError> {
        let uid = content_type
            .get("uid")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::missing("content_type.uid"))?;
        if !content_type.get("schema").is_some_and(Value::is_array) {
            return Err(DecodeError::missing("content_type.schema"));
        }
        let fields = parse_fields(content_type.get("schema"));
        Ok(Self {
            content_type_uid: uid.to_string(),
            field_keys: fields.iter().map(|f| f.uid.clone()).collect(),
            fields,
            validator: None,
        })
    }

    /// UIDs of global fields embedded in this content type.
    pub fn global_field_uids(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_global_field())
            .flat_map(|f| f.reference_to.iter().map(String::as_str))
            .collect()
    }

    /// Reference fields at the top level of the schema.
    pub fn reference_fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Projects a resolved reference and runs the model check, if any.
    pub(crate) fn apply(&self, bag: FieldBag) -> Result<FieldBag, FieldError> {
        let bag = if self.field_keys.is_empty() {
            bag
        } else {
            let mut keys: Vec<&str> = self.field_keys.iter().map(String::as_str).collect();
            keys.extend(["uid", crate::fields::CONTENT_TYPE_UID_KEY]);
            bag.project(&keys)
        };
        if let Some(validate) = self.validator {
            validate(&bag)?;
        }
        Ok(bag)
    }
}

/// Content type UID → schema, supplied by the caller before decoding.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ModelSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` as the model for `content_type_uid`.
    pub fn register<T: ContentModel>(&mut self, content_type_uid: impl Into<String>) -> &mut Self {
        self.register_schema(ModelSchema::for_model::<T>(content_type_uid))
    }

    /// Registers a schema, replacing any previous one for the same UID.
    pub fn register_schema(&mut self, schema: ModelSchema) -> &mut Self {
        self.schemas.insert(schema.content_type_uid.clone(), schema);
        self
    }

    pub fn get(&self, content_type_uid: &str) -> Option<&ModelSchema> {
        self.schemas.get(content_type_uid)
    }

    pub fn contains(&self, content_type_uid: &str) -> bool {
        self.schemas.contains_key(content_type_uid)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
