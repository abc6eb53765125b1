//! Canonical encoding of parameter maps.
//!
//! [`encode`] produces the URL query string: keys in sorted order, sequences
//! as `key[]=v` repetitions, nested maps as `key[sub]=v` to any depth.
//! [`encode_filter`] renders the same value model as a JSON object for the
//! `query` URI parameter.

use crate::value::ParamValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Structural keys that never belong in the query string.
pub const SKIPPED_KEYS: [&str; 3] = ["query", "uid", "content_type"];

/// Output style for [`encode_filter_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterFormat {
    #[default]
    Compact,
    Pretty,
}

/// Encodes URI parameters into a deterministic query string.
///
/// An empty map encodes to an empty string.
pub fn encode(params: &BTreeMap<String, ParamValue>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        if SKIPPED_KEYS.contains(&key.as_str()) {
            continue;
        }
        push_pairs(&urlencoding::encode(key), value, &mut pairs);
    }
    pairs.join("&")
}

fn push_pairs(prefix: &str, value: &ParamValue, out: &mut Vec<String>) {
    match value {
        ParamValue::Seq(items) => {
            let key = format!("{prefix}[]");
            for item in items {
                push_pairs(&key, item, out);
            }
        }
        ParamValue::Map(map) => {
            for (sub, nested) in map {
                let key = format!("{prefix}[{}]", urlencoding::encode(sub));
                push_pairs(&key, nested, out);
            }
        }
        scalar => {
            // Every other variant is a scalar.
            let text = scalar.scalar_text().unwrap_or_default();
            out.push(format!("{prefix}={}", urlencoding::encode(&text)));
        }
    }
}

/// Renders a filter map as a JSON object.
pub fn encode_filter(params: &BTreeMap<String, ParamValue>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<Map<String, Value>>(),
    )
}

/// Renders a filter map as JSON text.
pub fn encode_filter_string(params: &BTreeMap<String, ParamValue>, format: FilterFormat) -> String {
    let json = encode_filter(params);
    match format {
        FilterFormat::Compact => json.to_string(),
        FilterFormat::Pretty => format!("{json:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: Vec<(&str, ParamValue)>) -> BTreeMap<String, ParamValue> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn nested_sequence_inside_map() {
        let mut inner = BTreeMap::new();
        inner.insert("BASE".to_string(), ParamValue::from(vec!["title", "url"]));
        let p = params(vec![("only", ParamValue::Map(inner))]);
        assert_eq!(encode(&p), "only[BASE][]=title&only[BASE][]=url");
    }

    #[test]
    fn empty_sequence_emits_nothing() {
        let p = params(vec![("tags", ParamValue::Seq(Vec::new())), ("limit", 5.into())]);
        assert_eq!(encode(&p), "limit=5");
    }
}
