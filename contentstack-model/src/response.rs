use contentstack_types::DecodeError;
use serde_json::{Map, Value};

/// A materialized page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentstackResponse<T> {
    /// Decoded items, in server order.
    pub items: Vec<T>,
    /// Total match count. Only present when the count flag was requested.
    pub count: Option<u64>,
    /// Other top-level envelope members, e.g. the `content_type` object
    /// returned alongside entries when it was included.
    pub fields: Option<Map<String, Value>>,
    /// Items that failed to decode. Always empty under `DecodePolicy::FailFast`.
    pub failures: Vec<DecodeError>,
}

impl<T> ContentstackResponse<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// A top-level envelope member other than the items.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(key))
    }
}

impl<T> IntoIterator for ContentstackResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ContentstackResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
