use crate::builder::Query;
use crate::value::ParamValue;

/// A single filter constraint on a field.
///
/// Each variant maps to exactly one operator key. `Equals` has none: it is
/// stored as the bare value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Equals(ParamValue),
    NotEquals(ParamValue),
    Includes(Vec<ParamValue>),
    Excludes(Vec<ParamValue>),
    IsLessThan(ParamValue),
    IsLessThanOrEqual(ParamValue),
    IsGreaterThan(ParamValue),
    IsGreaterThanOrEqual(ParamValue),
    Exists(bool),
    Matches(String),
    /// Taxonomy terms strictly below the given term.
    Below(String),
    /// Taxonomy terms at or below the given term.
    EqBelow(String),
    /// Taxonomy terms strictly above the given term.
    Above(String),
    /// Taxonomy terms at or above the given term.
    EqAbove(String),
}

impl Operation {
    pub fn equals(value: impl Into<ParamValue>) -> Self {
        Operation::Equals(value.into())
    }

    pub fn not_equals(value: impl Into<ParamValue>) -> Self {
        Operation::NotEquals(value.into())
    }

    pub fn includes<T: Into<ParamValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Operation::Includes(values.into_iter().map(Into::into).collect())
    }

    pub fn excludes<T: Into<ParamValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Operation::Excludes(values.into_iter().map(Into::into).collect())
    }

    pub fn is_less_than(value: impl Into<ParamValue>) -> Self {
        Operation::IsLessThan(value.into())
    }

    pub fn is_less_than_or_equal(value: impl Into<ParamValue>) -> Self {
        Operation::IsLessThanOrEqual(value.into())
    }

    pub fn is_greater_than(value: impl Into<ParamValue>) -> Self {
        Operation::IsGreaterThan(value.into())
    }

    pub fn is_greater_than_or_equal(value: impl Into<ParamValue>) -> Self {
        Operation::IsGreaterThanOrEqual(value.into())
    }

    pub fn exists(present: bool) -> Self {
        Operation::Exists(present)
    }

    pub fn matches(pattern: impl Into<String>) -> Self {
        Operation::Matches(pattern.into())
    }

    pub fn below(term: impl Into<String>) -> Self {
        Operation::Below(term.into())
    }

    pub fn eq_below(term: impl Into<String>) -> Self {
        Operation::EqBelow(term.into())
    }

    pub fn above(term: impl Into<String>) -> Self {
        Operation::Above(term.into())
    }

    pub fn eq_above(term: impl Into<String>) -> Self {
        Operation::EqAbove(term.into())
    }

    /// The operator key this variant is stored under, or `None` for `Equals`.
    pub const fn operator_key(&self) -> Option<&'static str> {
        match self {
            Operation::Equals(_) => None,
            Operation::NotEquals(_) => Some("$ne"),
            Operation::Includes(_) => Some("$in"),
            Operation::Excludes(_) => Some("$nin"),
            Operation::IsLessThan(_) => Some("$lt"),
            Operation::IsLessThanOrEqual(_) => Some("$lte"),
            Operation::IsGreaterThan(_) => Some("$gt"),
            Operation::IsGreaterThanOrEqual(_) => Some("$gte"),
            Operation::Exists(_) => Some("$exists"),
            Operation::Matches(_) => Some("$regex"),
            Operation::Below(_) => Some("$below"),
            Operation::EqBelow(_) => Some("$eq_below"),
            Operation::Above(_) => Some("$above"),
            Operation::EqAbove(_) => Some("$eq_above"),
        }
    }

    /// The payload as it appears on the wire.
    pub fn into_value(self) -> ParamValue {
        match self {
            Operation::Equals(v)
            | Operation::NotEquals(v)
            | Operation::IsLessThan(v)
            | Operation::IsLessThanOrEqual(v)
            | Operation::IsGreaterThan(v)
            | Operation::IsGreaterThanOrEqual(v) => v,
            Operation::Includes(vs) | Operation::Excludes(vs) => ParamValue::Seq(vs),
            Operation::Exists(b) => ParamValue::Bool(b),
            Operation::Matches(s)
            | Operation::Below(s)
            | Operation::EqBelow(s)
            | Operation::Above(s)
            | Operation::EqAbove(s) => ParamValue::String(s),
        }
    }
}

/// Logical combination of sub-query filters.
#[derive(Debug, Clone)]
pub enum QueryOperator {
    And(Vec<Query>),
    Or(Vec<Query>),
}

impl QueryOperator {
    pub const fn key(&self) -> &'static str {
        match self {
            QueryOperator::And(_) => "$and",
            QueryOperator::Or(_) => "$or",
        }
    }
}

/// Reference filter by membership in a sub-query's result set.
#[derive(Debug, Clone)]
pub enum Reference {
    Include(Query),
    NotInclude(Query),
}

impl Reference {
    pub const fn key(&self) -> &'static str {
        match self {
            Reference::Include(_) => "$in",
            Reference::NotInclude(_) => "$nin",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn key(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}
