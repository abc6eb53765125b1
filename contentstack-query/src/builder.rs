//! The fluent query builder.
//!
//! A [`Query`] keeps two maps: URI parameters (rendered with [`encode`])
//! and filter parameters (rendered as the JSON `query` parameter). Builder
//! methods consume and return the query, so a chain reads top to bottom and
//! no two callers can mutate the same instance.
//!
//! Merge rules:
//! - filters: one entry per field+operator; the same pair overwrites, a
//!   different operator on the same field is added alongside.
//! - `include_reference`, `only`, `except` and per-reference projections are
//!   unions that keep first-appearance order.
//! - ordering, locale, skip, limit and raw parameters are last-write-wins.
//!
//! A value with no wire form (a NaN or infinite float) does not break the
//! chain. The query remembers the first such value and [`Query::validate`]
//! reports it; the SDK validates before sending anything.

use crate::encoder::{encode, encode_filter_string, FilterFormat};
use crate::include::{Include, IncludeSet};
use crate::operation::{Operation, QueryOperator, Reference, SortOrder};
use crate::value::ParamValue;
use contentstack_types::{ConfigurationError, ResourceKind};
use std::collections::BTreeMap;
use tracing::debug;

/// Largest page size the server accepts.
pub const MAX_LIMIT: u32 = 1000;

/// Projection bucket for the queried resource's own fields.
pub const BASE_PROJECTION: &str = "BASE";

#[derive(Debug, Clone, Default, PartialEq)]
struct Projection {
    base: Vec<String>,
    references: BTreeMap<String, Vec<String>>,
}

/// A query against one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    kind: ResourceKind,
    path: String,
    uri_parameters: BTreeMap<String, ParamValue>,
    filter_parameters: BTreeMap<String, ParamValue>,
    include_flags: IncludeSet,
    included_references: Vec<String>,
    only: Projection,
    except: Projection,
    invalid: Option<ConfigurationError>,
}

impl Query {
    /// Creates an empty query for `kind` served at `path`.
    pub fn new(kind: ResourceKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            uri_parameters: BTreeMap::new(),
            filter_parameters: BTreeMap::new(),
            include_flags: IncludeSet::empty(),
            included_references: Vec::new(),
            only: Projection::default(),
            except: Projection::default(),
            invalid: None,
        }
    }

    // ── Filters ──────────────────────────────────────────────────

    /// Installs a filter constraint on `field`.
    ///
    /// `Equals` stores the bare value and replaces whatever constraint the
    /// field had. Any other operation is stored under its operator key; an
    /// existing constraint for the same operator is overwritten, constraints
    /// for other operators on the field are kept.
    #[must_use]
    pub fn where_field(mut self, field: impl Into<String>, operation: Operation) -> Self {
        let field = field.into();
        let key = operation.operator_key();
        let value = operation.into_value();
        self.admit(&field, &value);
        match key {
            None => {
                self.filter_parameters.insert(field, value);
            }
            Some(key) => self.set_operator(field, key, value),
        }
        self
    }

    fn set_operator(&mut self, field: String, key: &'static str, value: ParamValue) {
        match self.filter_parameters.get_mut(&field) {
            Some(ParamValue::Map(ops)) if ops.keys().all(|k| k.starts_with('$')) => {
                ops.insert(key.to_string(), value);
            }
            _ => {
                let mut ops = BTreeMap::new();
                ops.insert(key.to_string(), value);
                self.filter_parameters.insert(field, ParamValue::Map(ops));
            }
        }
    }

    /// Combines the filters of `queries` under a top-level `$and`/`$or`.
    ///
    /// Only filter parameters are taken from the sub-queries; their URI
    /// parameters are ignored.
    #[must_use]
    pub fn operator(mut self, operator: QueryOperator) -> Self {
        let key = operator.key();
        let (QueryOperator::And(queries) | QueryOperator::Or(queries)) = operator;
        let mut clauses = Vec::with_capacity(queries.len());
        for query in queries {
            self.inherit(query.invalid);
            clauses.push(ParamValue::Map(query.filter_parameters));
        }
        self.filter_parameters
            .insert(key.to_string(), ParamValue::Seq(clauses));
        self
    }

    /// Filters `field` by membership in the result set of a sub-query.
    #[must_use]
    pub fn reference_operator(mut self, field: impl Into<String>, reference: Reference) -> Self {
        let key = reference.key();
        let (Reference::Include(sub) | Reference::NotInclude(sub)) = reference;
        self.inherit(sub.invalid);
        self.set_operator(field.into(), key, ParamValue::Map(sub.filter_parameters));
        self
    }

    /// Merges a raw filter constraint. Later calls win on key collision.
    #[must_use]
    pub fn add_query(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.admit(&key, &value);
        self.filter_parameters.insert(key, value);
        self
    }

    /// Merges raw filter constraints from a JSON object.
    pub fn add_query_json(mut self, raw: serde_json::Value) -> Result<Self, ConfigurationError> {
        for (key, value) in json_object(raw)? {
            let value = ParamValue::try_from_json(&key, value)?;
            self.filter_parameters.insert(key, value);
        }
        Ok(self)
    }

    /// Removes every constraint on `field`.
    #[must_use]
    pub fn remove_query(mut self, field: &str) -> Self {
        self.filter_parameters.remove(field);
        self
    }

    // ── URI parameters ───────────────────────────────────────────

    /// Merges a raw URI parameter. Later calls win on key collision.
    #[must_use]
    pub fn add_uri_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.admit(&key, &value);
        self.uri_parameters.insert(key, value);
        self
    }

    /// Merges raw URI parameters from a JSON object.
    pub fn add_uri_params_json(mut self, raw: serde_json::Value) -> Result<Self, ConfigurationError> {
        for (key, value) in json_object(raw)? {
            let value = ParamValue::try_from_json(&key, value)?;
            self.uri_parameters.insert(key, value);
        }
        Ok(self)
    }

    #[must_use]
    pub fn remove_uri_param(mut self, key: &str) -> Self {
        self.uri_parameters.remove(key);
        self
    }

    /// Expands the given reference fields in the response.
    #[must_use]
    pub fn include_reference<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        union_into(&mut self.included_references, fields);
        self.sync_included_references();
        self
    }

    /// Expands `field` and projects the referenced objects to `fields`.
    #[must_use]
    pub fn include_reference_only<S: Into<String>>(
        mut self,
        field: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        let field = field.into();
        union_into(self.only.references.entry(field.clone()).or_default(), fields);
        self.sync_projection_only();
        self.include_reference([field])
    }

    /// Expands `field` and drops `fields` from the referenced objects.
    #[must_use]
    pub fn include_reference_except<S: Into<String>>(
        mut self,
        field: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        let field = field.into();
        union_into(self.except.references.entry(field.clone()).or_default(), fields);
        self.sync_projection_except();
        self.include_reference([field])
    }

    /// Restricts the returned fields. The resource's mandatory fields are
    /// always kept so responses stay decodable.
    #[must_use]
    pub fn only<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        union_into(&mut self.only.base, fields);
        self.sync_projection_only();
        self
    }

    /// Drops the given fields from the response.
    #[must_use]
    pub fn except<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        union_into(&mut self.except.base, fields);
        self.sync_projection_except();
        self
    }

    #[must_use]
    pub fn order_by_ascending(self, key: impl Into<String>) -> Self {
        self.order_by(key, SortOrder::Ascending)
    }

    #[must_use]
    pub fn order_by_descending(self, key: impl Into<String>) -> Self {
        self.order_by(key, SortOrder::Descending)
    }

    /// Sets the single active sort key, replacing any previous one.
    #[must_use]
    pub fn order_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.uri_parameters.remove(SortOrder::Ascending.key());
        self.uri_parameters.remove(SortOrder::Descending.key());
        self.uri_parameters
            .insert(order.key().to_string(), ParamValue::String(key.into()));
        self
    }

    #[must_use]
    pub fn skip(mut self, count: u32) -> Self {
        self.uri_parameters
            .insert("skip".to_string(), ParamValue::from(count));
        self
    }

    /// Sets the page size. Values above [`MAX_LIMIT`] are rejected.
    pub fn limit(mut self, count: u32) -> Result<Self, ConfigurationError> {
        if count > MAX_LIMIT {
            return Err(ConfigurationError::LimitExceeded {
                requested: count,
                max: MAX_LIMIT,
            });
        }
        self.uri_parameters
            .insert("limit".to_string(), ParamValue::from(count));
        Ok(self)
    }

    #[must_use]
    pub fn locale(mut self, code: impl Into<String>) -> Self {
        self.uri_parameters
            .insert("locale".to_string(), ParamValue::String(code.into()));
        self
    }

    /// Full-text typeahead search.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.uri_parameters
            .insert("typeahead".to_string(), ParamValue::String(text.into()));
        self
    }

    #[must_use]
    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        let tags = tags
            .into_iter()
            .map(|t| ParamValue::String(t.into()))
            .collect();
        self.uri_parameters
            .insert("tags".to_string(), ParamValue::Seq(tags));
        self
    }

    /// ORs `flags` into the include set and writes their wire parameters.
    ///
    /// Flags with no meaning for this resource kind are rejected.
    pub fn include(mut self, flags: impl Into<IncludeSet>) -> Result<Self, ConfigurationError> {
        let flags = flags.into();
        if let Some(flag) = flags.iter().find(|f| !f.supported_by(self.kind)) {
            return Err(ConfigurationError::UnsupportedInclude {
                flag: flag.name(),
                kind: self.kind,
            });
        }
        self.apply_flags(flags);
        Ok(self)
    }

    /// Sets every include flag valid for this resource kind.
    #[must_use]
    pub fn include_all(mut self) -> Self {
        self.apply_flags(IncludeSet::all_for(self.kind));
        self
    }

    fn apply_flags(&mut self, flags: IncludeSet) {
        for flag in flags.iter() {
            for (key, value) in flag.wire_params(self.kind) {
                self.uri_parameters.insert(key.to_string(), value);
            }
        }
        self.include_flags = self.include_flags.union(flags);
    }

    // ── Rendering ────────────────────────────────────────────────

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Endpoint path relative to the API base, e.g. `/content_types/blog/entries`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn uri_parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.uri_parameters
    }

    pub fn uri_parameter(&self, key: &str) -> Option<&ParamValue> {
        self.uri_parameters.get(key)
    }

    pub fn filter_parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.filter_parameters
    }

    pub fn include_flags(&self) -> IncludeSet {
        self.include_flags
    }

    pub fn includes(&self, flag: Include) -> bool {
        self.include_flags.contains(flag)
    }

    pub fn included_references(&self) -> &[String] {
        &self.included_references
    }

    /// The requested locale, if one was set.
    pub fn locale_code(&self) -> Option<&str> {
        match self.uri_parameters.get("locale") {
            Some(ParamValue::String(code)) => Some(code),
            _ => None,
        }
    }

    /// Base `only` fields as sent: caller fields followed by mandatory ones.
    pub fn only_fields(&self) -> Vec<String> {
        if self.only.base.is_empty() {
            return Vec::new();
        }
        let mut fields = self.only.base.clone();
        union_into(&mut fields, self.kind.mandatory_fields().iter().copied());
        fields
    }

    pub fn except_fields(&self) -> &[String] {
        &self.except.base
    }

    pub fn reference_only(&self, field: &str) -> Option<&[String]> {
        self.only.references.get(field).map(Vec::as_slice)
    }

    pub fn reference_except(&self, field: &str) -> Option<&[String]> {
        self.except.references.get(field).map(Vec::as_slice)
    }

    /// Fails with the first value that has no wire form, if any was given.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match &self.invalid {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// [`Query::url_query`] after [`Query::validate`].
    pub fn try_url_query(&self) -> Result<String, ConfigurationError> {
        self.validate()?;
        Ok(self.url_query())
    }

    /// The filter object as compact JSON text.
    pub fn filter_json(&self) -> String {
        encode_filter_string(&self.filter_parameters, FilterFormat::Compact)
    }

    /// The full query string: encoded URI parameters, then the
    /// percent-encoded filter JSON as `query` when any filter is set.
    pub fn url_query(&self) -> String {
        let mut out = encode(&self.uri_parameters);
        if !self.filter_parameters.is_empty() {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str("query=");
            out.push_str(&urlencoding::encode(&self.filter_json()));
        }
        debug!(path = %self.path, "rendered query: {out}");
        out
    }

    fn admit(&mut self, key: &str, value: &ParamValue) {
        if self.invalid.is_some() {
            return;
        }
        if let Err(err) = value.check(key) {
            debug!(path = %self.path, "rejected value: {err}");
            self.invalid = Some(err);
        }
    }

    fn inherit(&mut self, invalid: Option<ConfigurationError>) {
        if self.invalid.is_none() {
            self.invalid = invalid;
        }
    }

    // ── Internal sync of derived URI parameters ──────────────────

    fn sync_included_references(&mut self) {
        let values = self
            .included_references
            .iter()
            .map(|f| ParamValue::String(f.clone()))
            .collect();
        self.uri_parameters
            .insert("include".to_string(), ParamValue::Seq(values));
    }

    fn sync_projection_only(&mut self) {
        let base = self.only_fields();
        let rendered = render_projection(&base, &self.only);
        self.uri_parameters.insert("only".to_string(), rendered);
    }

    fn sync_projection_except(&mut self) {
        let base = self.except.base.clone();
        let rendered = render_projection(&base, &self.except);
        self.uri_parameters.insert("except".to_string(), rendered);
    }
}

fn render_projection(base: &[String], projection: &Projection) -> ParamValue {
    let mut map = BTreeMap::new();
    if !base.is_empty() {
        map.insert(BASE_PROJECTION.to_string(), strings(base));
    }
    for (field, fields) in &projection.references {
        map.insert(field.clone(), strings(fields));
    }
    ParamValue::Map(map)
}

fn strings(values: &[String]) -> ParamValue {
    ParamValue::Seq(values.iter().map(ParamValue::from).collect())
}

fn union_into<S: Into<String>>(target: &mut Vec<String>, fields: impl IntoIterator<Item = S>) {
    for field in fields {
        let field = field.into();
        if !target.contains(&field) {
            target.push(field);
        }
    }
}

fn json_object(
    raw: serde_json::Value,
) -> Result<serde_json::Map<String, serde_json::Value>, ConfigurationError> {
    match raw {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(ConfigurationError::InvalidArgument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
