//! Envelope decoding and local reference resolution.
//!
//! # Locale fallback
//!
//! When a request carries `include_fallback`, the server may answer with an
//! item in a different locale than the one asked for. The materializer does
//! not know or care: it decodes whatever locale-tagged item arrived and the
//! effective locale is readable from [`FieldBag::locale`]. Choosing the
//! fallback chain is entirely server-side.

use contentstack_types::{DecodeError, FieldError, ResourceKind};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::fields::{link_parts, stub_parts, FieldBag, CONTENT_TYPE_UID_KEY};
use crate::model::ContentModel;
use crate::response::ContentstackResponse;
use crate::schema::SchemaRegistry;

/// Envelope key of the sibling section holding referenced objects, keyed by
/// content type UID: `{"included": {"track": [{"uid": "t1", ..}]}}`.
pub const INCLUDED_KEY: &str = "included";

const COUNT_KEY: &str = "count";

/// What to do when one item of a page fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// The first bad item fails the whole page.
    #[default]
    FailFast,
    /// Bad items are dropped and reported in `ContentstackResponse::failures`.
    Partial,
}

/// Per-request decode settings, derived from the query that produced the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub kind: ResourceKind,
    /// The body is a single-resource envelope (`entry`, `asset`, ..).
    pub singular: bool,
    /// Dotted paths of reference fields the request asked the server to include.
    pub included_references: Vec<String>,
    /// Read the `count` member.
    pub include_count: bool,
    /// Locale the request asked for. Informational only.
    pub locale: Option<String>,
    pub policy: DecodePolicy,
}

impl DecodeOptions {
    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            kind,
            singular: false,
            included_references: Vec::new(),
            include_count: false,
            locale: None,
            policy: DecodePolicy::default(),
        }
    }

    pub fn single(kind: ResourceKind) -> Self {
        Self {
            singular: true,
            ..Self::collection(kind)
        }
    }

    pub fn with_references<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.included_references = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_count(mut self, include_count: bool) -> Self {
        self.include_count = include_count;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn items_key(&self) -> &'static str {
        if self.singular {
            self.kind.single_key()
        } else {
            self.kind.collection_key()
        }
    }
}

/// Objects from the `included` section, keyed by `(content_type_uid, uid)`.
type IncludedIndex = HashMap<(String, String), Map<String, Value>>;

/// Turns raw response bodies into typed pages.
///
/// Resolution is a tree substitution against what one response carried.
/// A stub whose target is absent stays a stub; no follow-up request is made.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Materializer<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Decodes `body` as a page of `T`.
    pub fn materialize<T: ContentModel>(
        &self,
        body: &[u8],
        options: &DecodeOptions,
    ) -> Result<ContentstackResponse<T>, DecodeError> {
        let envelope: Value =
            serde_json::from_slice(body).map_err(|e| DecodeError::unparseable(&e, body))?;
        let Value::Object(mut envelope) = envelope else {
            return Err(DecodeError::missing("a JSON object envelope"));
        };

        let items_key = options.items_key();
        let raw_items = match envelope.remove(items_key) {
            Some(Value::Array(items)) if !options.singular => items,
            Some(item) if options.singular => vec![item],
            _ => return Err(DecodeError::missing(format!("`{items_key}` in {} response", options.kind))),
        };

        let count = if options.include_count {
            envelope.get(COUNT_KEY).and_then(Value::as_u64)
        } else {
            None
        };
        envelope.remove(COUNT_KEY);

        let index = envelope
            .remove(INCLUDED_KEY)
            .map(build_index)
            .unwrap_or_default();

        let mut items = Vec::with_capacity(raw_items.len());
        let mut failures = Vec::new();
        for (position, raw) in raw_items.into_iter().enumerate() {
            match self.decode_item::<T>(raw, &index, options) {
                Ok(item) => items.push(item),
                Err(source) => {
                    let err = DecodeError::InvalidItem { index: position, source };
                    match options.policy {
                        DecodePolicy::FailFast => return Err(err),
                        DecodePolicy::Partial => {
                            warn!("skipping {} {position}: {err}", options.kind.noun());
                            failures.push(err);
                        }
                    }
                }
            }
        }

        debug!(
            "materialized {} {} ({} failed)",
            items.len(),
            options.kind,
            failures.len()
        );

        Ok(ContentstackResponse {
            items,
            count,
            fields: (!envelope.is_empty()).then_some(envelope),
            failures,
        })
    }

    fn decode_item<T: ContentModel>(
        &self,
        raw: Value,
        index: &IncludedIndex,
        options: &DecodeOptions,
    ) -> Result<T, FieldError> {
        let Value::Object(mut item) = raw else {
            return Err(FieldError::TypeMismatch {
                key: options.items_key().to_string(),
                expected: "object",
            });
        };

        for path in &options.included_references {
            let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            self.resolve_path(&mut item, &segments, path, index)?;
        }

        let bag = FieldBag::from_map(item);
        T::from_fields(&bag.project(T::FIELD_KEYS))
    }

    /// Substitutes stubs along `segments`, innermost first, then applies the
    /// target's registered schema on the way back out.
    fn resolve_path(
        &self,
        object: &mut Map<String, Value>,
        segments: &[&str],
        path: &str,
        index: &IncludedIndex,
    ) -> Result<(), FieldError> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        match object.get_mut(*head) {
            Some(Value::Array(elements)) => {
                for element in elements.iter_mut() {
                    self.resolve_element(element, rest, path, index)?;
                }
            }
            Some(element @ Value::Object(_)) => self.resolve_element(element, rest, path, index)?,
            _ => {}
        }
        Ok(())
    }

    fn resolve_element(
        &self,
        element: &mut Value,
        rest: &[&str],
        path: &str,
        index: &IncludedIndex,
    ) -> Result<(), FieldError> {
        let Value::Object(map) = element else {
            return Ok(());
        };

        // A link may carry more than `uid` and `_content_type_uid` (locale,
        // version). The included object wins on shared keys.
        if let Some((uid, content_type_uid)) = link_parts(map) {
            let key = (content_type_uid.to_string(), uid.to_string());
            match index.get(&key) {
                Some(target) => {
                    let mut resolved = target.clone();
                    for (field, value) in std::mem::take(map) {
                        resolved.entry(field).or_insert(value);
                    }
                    *map = resolved;
                }
                None if stub_parts(map).is_some() => {
                    debug!("reference {} ({}) in `{path}` was not returned", key.1, key.0);
                    return Ok(());
                }
                // Hydrated inline by the server.
                None => {}
            }
        }

        self.resolve_path(map, rest, path, index)?;

        let Some(schema) = map
            .get(CONTENT_TYPE_UID_KEY)
            .and_then(Value::as_str)
            .and_then(|uid| self.registry.get(uid))
        else {
            return Ok(());
        };
        let applied = schema
            .apply(FieldBag::from_map(std::mem::take(map)))
            .map_err(|source| FieldError::Invalid {
                key: path.to_string(),
                message: source.to_string(),
            })?;
        *map = applied.into_map();
        Ok(())
    }
}

fn build_index(section: Value) -> IncludedIndex {
    let mut index = IncludedIndex::new();
    let Value::Object(by_type) = section else {
        return index;
    };
    for (content_type_uid, objects) in by_type {
        let Value::Array(objects) = objects else {
            continue;
        };
        for object in objects {
            let Value::Object(map) = object else {
                continue;
            };
            let Some(uid) = map.get("uid").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            index.insert((content_type_uid.clone(), uid), map);
        }
    }
    index
}
