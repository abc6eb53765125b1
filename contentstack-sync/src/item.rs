use chrono::{DateTime, Utc};
use contentstack_model::FieldBag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change event reported by the sync feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishType {
    AssetPublished,
    AssetUnpublished,
    AssetDeleted,
    EntryPublished,
    EntryUnpublished,
    EntryDeleted,
    ContentTypeDeleted,
}

impl PublishType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PublishType::AssetPublished => "asset_published",
            PublishType::AssetUnpublished => "asset_unpublished",
            PublishType::AssetDeleted => "asset_deleted",
            PublishType::EntryPublished => "entry_published",
            PublishType::EntryUnpublished => "entry_unpublished",
            PublishType::EntryDeleted => "entry_deleted",
            PublishType::ContentTypeDeleted => "content_type_deleted",
        }
    }

    /// Returns true for events that remove content from the delivery side.
    pub fn is_removal(self) -> bool {
        !matches!(self, PublishType::AssetPublished | PublishType::EntryPublished)
    }
}

impl fmt::Display for PublishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncItem {
    #[serde(rename = "type")]
    pub publish_type: PublishType,
    pub event_at: DateTime<Utc>,
    /// Absent for asset events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_uid: Option<String>,
    /// The entry, asset or content type the event is about.
    #[serde(default)]
    pub data: FieldBag,
}

impl SyncItem {
    pub fn uid(&self) -> Option<&str> {
        self.data.uid()
    }
}
