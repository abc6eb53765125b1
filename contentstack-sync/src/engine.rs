use contentstack_query::encode;
use contentstack_types::{dispatch, DecodeError, HttpTransport, RequestContext, Result};
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::item::SyncItem;
use crate::stack::{SyncStack, SyncState};

/// Endpoint of the change feed, relative to the API base URL.
pub const SYNC_PATH: &str = "/stacks/sync";

/// One page of change events.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPage {
    pub items: Vec<SyncItem>,
    /// Set on the last page of a run. Persist it to resume later.
    pub sync_token: Option<String>,
    /// Set while more pages are pending.
    pub pagination_token: Option<String>,
    pub total_count: Option<u64>,
}

impl SyncPage {
    pub fn has_more_pages(&self) -> bool {
        self.pagination_token.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct SyncEnvelope {
    #[serde(default)]
    items: Vec<SyncItem>,
    sync_token: Option<String>,
    pagination_token: Option<String>,
    total_count: Option<u64>,
    last_seq_id: Option<String>,
}

/// Drives a [`SyncStack`] against the change feed, one request per page.
pub struct SyncEngine {
    transport: Arc<dyn HttpTransport>,
    context: RequestContext,
    stack: SyncStack,
}

impl SyncEngine {
    pub fn new(transport: Arc<dyn HttpTransport>, context: RequestContext, stack: SyncStack) -> Self {
        Self {
            transport,
            context,
            stack,
        }
    }

    /// The cursor as of the last consumed page.
    pub fn stack(&self) -> &SyncStack {
        &self.stack
    }

    pub fn into_stack(self) -> SyncStack {
        self.stack
    }

    pub fn is_finished(&self) -> bool {
        self.stack.state() == SyncState::Terminal
    }

    /// Fetches the next page, or `None` once the run is finished.
    ///
    /// On error the cursor is left as it was, so the call can be retried.
    ///
    /// Items are decoded all or nothing. One malformed item (an unknown
    /// `type`, a missing `event_at`) fails the whole page with
    /// [`DecodeError::SchemaMismatch`] and leaves the cursor unchanged.
    pub async fn next_page(&mut self) -> Option<Result<SyncPage>> {
        if self.is_finished() {
            return None;
        }
        Some(self.fetch_page().await)
    }

    async fn fetch_page(&mut self) -> Result<SyncPage> {
        let mut params = self.stack.request_params();
        if let Some(environment) = &self.context.environment {
            params.insert("environment".into(), environment.into());
        }
        debug!("sync request in state {:?}", self.stack.state());

        let request = self.context.get(SYNC_PATH, &encode(&params));
        let response = dispatch(self.transport.as_ref(), request).await?;
        let envelope = decode_envelope(&response.body)?;

        info!(
            "sync page: {} items, more pages: {}",
            envelope.items.len(),
            envelope.pagination_token.is_some()
        );

        let page = SyncPage {
            items: envelope.items,
            sync_token: envelope.sync_token,
            pagination_token: envelope.pagination_token,
            total_count: envelope.total_count,
        };
        self.stack.advance(
            page.items.clone(),
            page.sync_token.clone(),
            page.pagination_token.clone(),
            envelope.last_seq_id,
        );
        Ok(page)
    }

    /// Turns the engine into a stream of pages.
    ///
    /// The stream ends after the terminal page or after the first error.
    /// Dropping it early is fine: every yielded page carries the tokens to
    /// resume from.
    pub fn into_stream(self) -> impl Stream<Item = Result<SyncPage>> {
        futures::stream::unfold((self, false), |(mut engine, failed)| async move {
            if failed {
                return None;
            }
            let page = engine.next_page().await?;
            let failed = page.is_err();
            Some((page, (engine, failed)))
        })
    }
}

fn decode_envelope(body: &[u8]) -> std::result::Result<SyncEnvelope, DecodeError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError::unparseable(&e, body))?;
    let mut envelope: SyncEnvelope = serde_json::from_value(value)
        .map_err(|e| DecodeError::missing(format!("a sync envelope ({e})")))?;
    envelope.sync_token = envelope.sync_token.filter(|t| !t.is_empty());
    envelope.pagination_token = envelope.pagination_token.filter(|t| !t.is_empty());

    match (&envelope.sync_token, &envelope.pagination_token) {
        (Some(_), None) | (None, Some(_)) => Ok(envelope),
        _ => Err(DecodeError::missing(
            "exactly one of `sync_token` or `pagination_token`",
        )),
    }
}
