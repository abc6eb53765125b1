//! Named inclusion flags and their per-resource wire mapping.

use crate::value::ParamValue;
use contentstack_types::ResourceKind;
use std::fmt;
use std::ops::BitOr;

/// A named inclusion option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Include {
    Count,
    ContentType,
    GlobalField,
    Fallback,
    EmbeddedItems,
    Metadata,
    ReferenceContentTypeUid,
    Unpublished,
    RelativeUrl,
    Dimension,
}

impl Include {
    pub const ALL: [Include; 10] = [
        Include::Count,
        Include::ContentType,
        Include::GlobalField,
        Include::Fallback,
        Include::EmbeddedItems,
        Include::Metadata,
        Include::ReferenceContentTypeUid,
        Include::Unpublished,
        Include::RelativeUrl,
        Include::Dimension,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }

    pub const fn name(self) -> &'static str {
        match self {
            Include::Count => "count",
            Include::ContentType => "content_type",
            Include::GlobalField => "global_field",
            Include::Fallback => "fallback",
            Include::EmbeddedItems => "embedded_items",
            Include::Metadata => "metadata",
            Include::ReferenceContentTypeUid => "reference_content_type_uid",
            Include::Unpublished => "unpublished",
            Include::RelativeUrl => "relative_url",
            Include::Dimension => "dimension",
        }
    }

    /// Returns true if the flag has a wire meaning for `kind`.
    pub fn supported_by(self, kind: ResourceKind) -> bool {
        !self.wire_params(kind).is_empty()
    }

    /// URI parameters this flag sets for `kind`. Empty when unsupported.
    pub fn wire_params(self, kind: ResourceKind) -> Vec<(&'static str, ParamValue)> {
        use Include::*;
        use ResourceKind::*;

        let on = || ParamValue::Bool(true);
        match (self, kind) {
            (Count, _) => vec![("include_count", on())],
            (ContentType, Entries) => vec![
                ("include_content_type", on()),
                ("include_global_field_schema", on()),
            ],
            (GlobalField, Entries | ContentTypes | GlobalFields) => {
                vec![("include_global_field_schema", on())]
            }
            (Fallback, Entries | Assets | Taxonomies) => vec![("include_fallback", on())],
            (EmbeddedItems, Entries) => vec![(
                "include_embedded_items",
                ParamValue::Seq(vec![ParamValue::from("BASE")]),
            )],
            (Metadata, Entries | Assets) => vec![("include_metadata", on())],
            (ReferenceContentTypeUid, Entries) => {
                vec![("include_reference_content_type_uid", on())]
            }
            (Unpublished, Entries) => vec![("include_unpublished", on())],
            (RelativeUrl, Assets) => vec![("relative_urls", on())],
            (Dimension, Assets) => vec![("include_dimension", on())],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`Include`] flags, merged with OR semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IncludeSet(u16);

impl IncludeSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every flag that has a wire meaning for `kind`.
    pub fn all_for(kind: ResourceKind) -> Self {
        Include::ALL
            .into_iter()
            .filter(|flag| flag.supported_by(kind))
            .collect()
    }

    #[must_use]
    pub const fn with(self, flag: Include) -> Self {
        Self(self.0 | flag.bit())
    }

    pub fn insert(&mut self, flag: Include) {
        self.0 |= flag.bit();
    }

    pub const fn contains(self, flag: Include) -> bool {
        self.0 & flag.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Include> {
        Include::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }
}

impl From<Include> for IncludeSet {
    fn from(flag: Include) -> Self {
        Self::empty().with(flag)
    }
}

impl FromIterator<Include> for IncludeSet {
    fn from_iter<I: IntoIterator<Item = Include>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), IncludeSet::with)
    }
}

impl BitOr for IncludeSet {
    type Output = IncludeSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOr<Include> for IncludeSet {
    type Output = IncludeSet;

    fn bitor(self, rhs: Include) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOr for Include {
    type Output = IncludeSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        IncludeSet::from(self).with(rhs)
    }
}
