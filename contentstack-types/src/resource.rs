use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of resource a query or fetch targets.
///
/// Fixes the envelope keys the server answers with and the fields that
/// must survive an `only` projection for the response to stay decodable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Entries,
    Assets,
    ContentTypes,
    GlobalFields,
    Taxonomies,
}

impl ResourceKind {
    /// Envelope key holding the item array of a collection response.
    pub const fn collection_key(self) -> &'static str {
        match self {
            ResourceKind::Entries | ResourceKind::Taxonomies => "entries",
            ResourceKind::Assets => "assets",
            ResourceKind::ContentTypes => "content_types",
            ResourceKind::GlobalFields => "global_fields",
        }
    }

    /// Envelope key holding the object of a single-resource response.
    pub const fn single_key(self) -> &'static str {
        match self {
            ResourceKind::Entries | ResourceKind::Taxonomies => "entry",
            ResourceKind::Assets => "asset",
            ResourceKind::ContentTypes => "content_type",
            ResourceKind::GlobalFields => "global_field",
        }
    }

    /// Fields always added to a base `only` projection.
    pub const fn mandatory_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Entries => &["locale", "title"],
            ResourceKind::Assets => &["filename", "title"],
            ResourceKind::ContentTypes | ResourceKind::GlobalFields => &["title"],
            ResourceKind::Taxonomies => &["uid"],
        }
    }

    /// Singular noun used in error messages.
    pub const fn noun(self) -> &'static str {
        match self {
            ResourceKind::Entries => "entry",
            ResourceKind::Assets => "asset",
            ResourceKind::ContentTypes => "content type",
            ResourceKind::GlobalFields => "global field",
            ResourceKind::Taxonomies => "taxonomy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Entries => "entries",
            ResourceKind::Assets => "assets",
            ResourceKind::ContentTypes => "content types",
            ResourceKind::GlobalFields => "global fields",
            ResourceKind::Taxonomies => "taxonomies",
        };
        f.write_str(name)
    }
}
