use chrono::{DateTime, SecondsFormat, Utc};
use contentstack_types::ConfigurationError;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A value that can appear in URI parameters or in the filter object.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Rendered as ISO-8601 truncated to whole seconds, e.g. `2020-03-01T17:25:20Z`.
    Date(DateTime<Utc>),
    Seq(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// A float parameter. NaN and infinities have no wire form and are
    /// rejected.
    pub fn float(value: f64) -> Result<Self, ConfigurationError> {
        let value = ParamValue::Float(value);
        value.check("float")?;
        Ok(value)
    }

    /// Fails on the first value nested anywhere in `self` that has no wire
    /// form, naming it by its dotted path under `key`.
    pub fn check(&self, key: &str) -> Result<(), ConfigurationError> {
        match self {
            ParamValue::Float(f) if !f.is_finite() => {
                Err(ConfigurationError::UnsupportedValue(key.to_string()))
            }
            ParamValue::Seq(items) => items.iter().try_for_each(|item| item.check(key)),
            ParamValue::Map(map) => map
                .iter()
                .try_for_each(|(k, v)| v.check(&format!("{key}.{k}"))),
            _ => Ok(()),
        }
    }

    /// Text form of a scalar, or `None` for sequences and maps.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ParamValue::String(s) => Some(s.clone()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Float(f) => Some(f.to_string()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::Date(d) => Some(format_date(d)),
            ParamValue::Seq(_) | ParamValue::Map(_) => None,
        }
    }

    /// Renders this value as JSON. Non-finite floats become `null`; run
    /// [`ParamValue::check`] first where that matters.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Int(i) => Value::Number((*i).into()),
            ParamValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Date(d) => Value::String(format_date(d)),
            ParamValue::Seq(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            ParamValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Converts raw JSON into a parameter value.
    ///
    /// `null` has no wire representation and is rejected, naming `key`.
    pub fn try_from_json(key: &str, value: Value) -> Result<Self, ConfigurationError> {
        Ok(match value {
            Value::Null => return Err(ConfigurationError::UnsupportedValue(key.to_string())),
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(ParamValue::Float)
                    .ok_or_else(|| ConfigurationError::UnsupportedValue(key.to_string()))?,
            },
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => ParamValue::Seq(
                items
                    .into_iter()
                    .map(|item| Self::try_from_json(key, item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => ParamValue::Map(
                map.into_iter()
                    .map(|(k, v)| {
                        let nested = format!("{key}.{k}");
                        Self::try_from_json(&nested, v).map(|v| (k, v))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::String(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        ParamValue::Date(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<BTreeMap<String, T>> for ParamValue {
    fn from(value: BTreeMap<String, T>) -> Self {
        ParamValue::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
