use chrono::{DateTime, Utc};
use contentstack_query::ParamValue;
use contentstack_types::ConfigurationError;
use std::collections::BTreeMap;

use crate::item::{PublishType, SyncItem};

/// Where a [`SyncStack`] stands in the sync protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No token yet; the next request sends `init=true`.
    Init,
    /// Holds a sync token from an earlier run.
    Resuming,
    /// A multi-page fetch is under way.
    Paginating,
    /// The server handed back a sync token; no more pages this run.
    Terminal,
}

/// Filters for an initial sync. The server folds them into the tokens it
/// returns, so they are never sent again once a token exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub content_type_uid: Option<String>,
    pub locale: Option<String>,
    pub publish_type: Option<PublishType>,
    pub start_from: Option<DateTime<Utc>>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(mut self, uid: impl Into<String>) -> Self {
        self.content_type_uid = Some(uid.into());
        self
    }

    pub fn locale(mut self, code: impl Into<String>) -> Self {
        self.locale = Some(code.into());
        self
    }

    pub fn publish_type(mut self, publish_type: PublishType) -> Self {
        self.publish_type = Some(publish_type);
        self
    }

    pub fn start_from(mut self, date: DateTime<Utc>) -> Self {
        self.start_from = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn write_params(&self, params: &mut BTreeMap<String, ParamValue>) {
        if let Some(uid) = &self.content_type_uid {
            params.insert("content_type_uid".into(), uid.into());
        }
        if let Some(locale) = &self.locale {
            params.insert("locale".into(), locale.into());
        }
        if let Some(publish_type) = self.publish_type {
            params.insert("type".into(), publish_type.as_str().into());
        }
        if let Some(date) = self.start_from {
            params.insert("start_from".into(), date.into());
        }
    }
}

/// Sync cursor state owned by the caller.
///
/// At most one of `sync_token` and `pagination_token` is ever set.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStack {
    sync_token: Option<String>,
    pagination_token: Option<String>,
    last_seq_id: Option<String>,
    items: Vec<SyncItem>,
    has_more_pages: bool,
    finished: bool,
    options: SyncOptions,
}

impl Default for SyncStack {
    fn default() -> Self {
        Self::init()
    }
}

impl SyncStack {
    /// Builds a cursor from optional persisted tokens. Empty strings count
    /// as absent.
    pub fn new(
        sync_token: Option<String>,
        pagination_token: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let sync_token = sync_token.filter(|t| !t.is_empty());
        let pagination_token = pagination_token.filter(|t| !t.is_empty());
        if sync_token.is_some() && pagination_token.is_some() {
            return Err(ConfigurationError::ConflictingSyncTokens);
        }
        Ok(Self {
            sync_token,
            pagination_token,
            ..Self::init()
        })
    }

    /// A fresh, full sync.
    pub fn init() -> Self {
        Self {
            sync_token: None,
            pagination_token: None,
            last_seq_id: None,
            items: Vec::new(),
            has_more_pages: true,
            finished: false,
            options: SyncOptions::default(),
        }
    }

    /// Continues from the sync token of a completed run.
    pub fn resume(sync_token: impl Into<String>) -> Self {
        Self {
            sync_token: Some(sync_token.into()),
            ..Self::init()
        }
    }

    /// Continues an interrupted multi-page fetch.
    pub fn paginate(pagination_token: impl Into<String>) -> Self {
        Self {
            pagination_token: Some(pagination_token.into()),
            ..Self::init()
        }
    }

    pub fn with_seq_id(mut self, seq_id: impl Into<String>) -> Self {
        self.last_seq_id = Some(seq_id.into());
        self
    }

    /// Attaches initial-sync filters. Rejected once a token is held.
    pub fn with_options(mut self, options: SyncOptions) -> Result<Self, ConfigurationError> {
        if self.state() != SyncState::Init && !options.is_empty() {
            return Err(ConfigurationError::SyncFilterOnResume);
        }
        self.options = options;
        Ok(self)
    }

    pub fn state(&self) -> SyncState {
        if self.finished {
            SyncState::Terminal
        } else if self.pagination_token.is_some() {
            SyncState::Paginating
        } else if self.sync_token.is_some() {
            SyncState::Resuming
        } else {
            SyncState::Init
        }
    }

    pub fn sync_token(&self) -> Option<&str> {
        self.sync_token.as_deref()
    }

    pub fn pagination_token(&self) -> Option<&str> {
        self.pagination_token.as_deref()
    }

    pub fn last_seq_id(&self) -> Option<&str> {
        self.last_seq_id.as_deref()
    }

    /// Items of the most recently consumed page.
    pub fn items(&self) -> &[SyncItem] {
        &self.items
    }

    pub fn has_more_pages(&self) -> bool {
        self.has_more_pages
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// A cursor that picks up where this one stands, for persisting and
    /// resuming later. Returns `None` while still in `Init`.
    pub fn checkpoint(&self) -> Option<SyncStack> {
        let next = match (&self.pagination_token, &self.sync_token) {
            (Some(token), _) => SyncStack::paginate(token.clone()),
            (None, Some(token)) => SyncStack::resume(token.clone()),
            (None, None) => return None,
        };
        Some(match &self.last_seq_id {
            Some(seq) => next.with_seq_id(seq.clone()),
            None => next,
        })
    }

    /// URI parameters for the next request.
    ///
    /// Exactly one of `init`, `sync_token` or `pagination_token` is present.
    /// Filters only travel with `init`.
    pub fn request_params(&self) -> BTreeMap<String, ParamValue> {
        let mut params = BTreeMap::new();
        match (&self.pagination_token, &self.sync_token) {
            (Some(token), _) => {
                params.insert("pagination_token".into(), token.into());
            }
            (None, Some(token)) => {
                params.insert("sync_token".into(), token.into());
            }
            (None, None) => {
                params.insert("init".into(), true.into());
                self.options.write_params(&mut params);
            }
        }
        if let Some(seq) = &self.last_seq_id {
            params.insert("seq_id".into(), seq.into());
        }
        params
    }

    /// Records a page. The caller has already checked that exactly one
    /// token is present.
    pub(crate) fn advance(
        &mut self,
        items: Vec<SyncItem>,
        sync_token: Option<String>,
        pagination_token: Option<String>,
        last_seq_id: Option<String>,
    ) {
        self.items = items;
        self.finished = sync_token.is_some();
        self.has_more_pages = pagination_token.is_some();
        self.sync_token = sync_token;
        self.pagination_token = pagination_token;
        if last_seq_id.is_some() {
            self.last_seq_id = last_seq_id;
        }
    }
}
