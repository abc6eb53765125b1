use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use contentstack_sync::{
    PublishType, SyncEngine, SyncItem, SyncOptions, SyncPage, SyncStack, SyncState,
};
use contentstack_types::{
    ConfigurationError, DecodeError, Error, HttpRequest, HttpResponse, HttpTransport,
    RequestContext, TransportError,
};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Replays canned responses in order and records every request.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(pages: Vec<Value>) -> Arc<Self> {
        let script = pages
            .into_iter()
            .map(|page| {
                Ok(HttpResponse {
                    status: 200,
                    headers: BTreeMap::new(),
                    body: serde_json::to_vec(&page).unwrap(),
                })
            })
            .collect();
        Arc::new(Self {
            script: Mutex::new(script),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) {
        self.script.lock().unwrap().push_back(response);
    }

    fn urls(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Network("script exhausted".into())))
    }
}

fn context() -> RequestContext {
    RequestContext {
        base_url: "https://cdn.contentstack.io/v3".into(),
        headers: BTreeMap::new(),
        environment: Some("production".into()),
    }
}

fn items(count: usize, offset: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "type": "entry_published",
                "event_at": "2020-03-01T17:25:20.000Z",
                "content_type_uid": "session",
                "data": {"uid": format!("e{}", offset + i), "title": "x"}
            })
        })
        .collect()
}

fn three_page_feed() -> Vec<Value> {
    vec![
        json!({"items": items(100, 0), "pagination_token": "p1", "total_count": 229}),
        json!({"items": items(100, 100), "pagination_token": "p2", "total_count": 229}),
        json!({"items": items(29, 200), "sync_token": "s1", "total_count": 229}),
    ]
}

fn engine(transport: &Arc<ScriptedTransport>, stack: SyncStack) -> SyncEngine {
    SyncEngine::new(transport.clone(), context(), stack)
}

// ── SyncStack ───────────────────────────────────────────────────

#[test]
fn both_tokens_are_rejected() {
    let err = SyncStack::new(Some("s".into()), Some("p".into())).unwrap_err();
    assert_eq!(err, ConfigurationError::ConflictingSyncTokens);
}

#[test]
fn empty_tokens_count_as_absent() {
    let stack = SyncStack::new(Some(String::new()), Some("p".into())).unwrap();
    assert_eq!(stack.state(), SyncState::Paginating);
    assert_eq!(SyncStack::new(None, None).unwrap().state(), SyncState::Init);
    assert_eq!(SyncStack::resume("s").state(), SyncState::Resuming);
}

#[test]
fn filters_are_refused_when_resuming() {
    let options = SyncOptions::new().locale("en-us");
    assert_eq!(
        SyncStack::resume("s").with_options(options.clone()).unwrap_err(),
        ConfigurationError::SyncFilterOnResume
    );
    assert!(SyncStack::init().with_options(options).is_ok());
}

#[test]
fn init_params_carry_filters() {
    let start = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
    let stack = SyncStack::init()
        .with_options(
            SyncOptions::new()
                .content_type("session")
                .locale("en-us")
                .publish_type(PublishType::EntryDeleted)
                .start_from(start),
        )
        .unwrap();

    assert_eq!(
        contentstack_query::encode(&stack.request_params()),
        "content_type_uid=session&init=true&locale=en-us&start_from=2020-03-01T00%3A00%3A00Z&type=entry_deleted"
    );
}

#[test]
fn resume_params_carry_only_the_token() {
    let params = SyncStack::resume("s1").with_seq_id("42").request_params();
    let keys: Vec<_> = params.keys().cloned().collect();
    assert_eq!(keys, vec!["seq_id", "sync_token"]);
}

#[test]
fn sync_item_decodes_from_the_wire() {
    let item: SyncItem = serde_json::from_value(items(1, 0).remove(0)).unwrap();
    assert_eq!(item.publish_type, PublishType::EntryPublished);
    assert_eq!(item.uid(), Some("e0"));
    assert!(!item.publish_type.is_removal());
    assert!(PublishType::ContentTypeDeleted.is_removal());
}

// ── SyncEngine ──────────────────────────────────────────────────

#[tokio::test]
async fn three_pages_yield_229_items_and_a_sync_token() {
    let transport = ScriptedTransport::new(three_page_feed());
    let mut engine = engine(&transport, SyncStack::init());

    let mut total = 0;
    let mut uids = Vec::new();
    while let Some(page) = engine.next_page().await {
        let page = page.unwrap();
        total += page.items.len();
        uids.extend(page.items.iter().filter_map(|i| i.uid().map(str::to_string)));
    }

    assert_eq!(total, 229);
    assert_eq!(uids.first().map(String::as_str), Some("e0"));
    assert_eq!(uids.last().map(String::as_str), Some("e228"));
    assert_eq!(engine.stack().state(), SyncState::Terminal);
    assert_eq!(engine.stack().sync_token(), Some("s1"));
    assert_eq!(engine.stack().pagination_token(), None);
    assert!(!engine.stack().has_more_pages());
    assert_eq!(engine.stack().items().len(), 29);

    let urls = transport.urls();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].ends_with("/stacks/sync?environment=production&init=true"));
    assert!(urls[1].ends_with("/stacks/sync?environment=production&pagination_token=p1"));
    assert!(urls[2].ends_with("/stacks/sync?environment=production&pagination_token=p2"));
}

#[tokio::test]
async fn stream_ends_after_the_terminal_page() {
    let transport = ScriptedTransport::new(three_page_feed());
    let pages: Vec<SyncPage> = engine(&transport, SyncStack::init())
        .into_stream()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(pages.len(), 3);
    assert!(pages[0].has_more_pages());
    assert_eq!(pages[2].sync_token.as_deref(), Some("s1"));
    assert_eq!(transport.urls().len(), 3);
}

#[tokio::test]
async fn stopping_early_keeps_the_last_consumed_cursor() {
    let transport = ScriptedTransport::new(three_page_feed());
    let mut engine = engine(&transport, SyncStack::init());

    engine.next_page().await.unwrap().unwrap();
    let checkpoint = engine.stack().checkpoint().unwrap();

    assert_eq!(checkpoint.state(), SyncState::Paginating);
    assert_eq!(checkpoint.pagination_token(), Some("p1"));
    assert_eq!(transport.urls().len(), 1);

    let mut resumed = SyncEngine::new(transport.clone(), context(), checkpoint);
    let page = resumed.next_page().await.unwrap().unwrap();
    assert_eq!(page.pagination_token.as_deref(), Some("p2"));
    assert!(transport.urls()[1].contains("pagination_token=p1"));
}

#[tokio::test]
async fn filters_are_sent_on_init_only() {
    let transport = ScriptedTransport::new(three_page_feed());
    let stack = SyncStack::init()
        .with_options(SyncOptions::new().locale("fr-fr"))
        .unwrap();
    let mut engine = engine(&transport, stack);
    engine.next_page().await.unwrap().unwrap();
    engine.next_page().await.unwrap().unwrap();

    let urls = transport.urls();
    assert!(urls[0].contains("locale=fr-fr"));
    assert!(!urls[1].contains("locale"));
    assert!(!urls[1].contains("init"));
}

#[tokio::test]
async fn terminal_engine_makes_no_more_requests() {
    let transport = ScriptedTransport::new(vec![json!({"items": [], "sync_token": "s2"})]);
    let mut engine = engine(&transport, SyncStack::resume("s1"));

    assert!(engine.next_page().await.unwrap().is_ok());
    assert!(engine.next_page().await.is_none());
    assert_eq!(transport.urls().len(), 1);
    assert_eq!(engine.into_stack().sync_token(), Some("s2"));
}

#[tokio::test]
async fn envelope_with_both_tokens_is_a_mismatch() {
    let transport = ScriptedTransport::new(vec![
        json!({"items": [], "sync_token": "s", "pagination_token": "p"}),
    ]);
    let mut engine = engine(&transport, SyncStack::init());

    let err = engine.next_page().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::SchemaMismatch { .. })));
    assert_eq!(engine.stack().state(), SyncState::Init);
}

#[tokio::test]
async fn one_malformed_item_fails_the_whole_page() {
    let mut page = items(2, 0);
    page.push(json!({
        "type": "entry_archived",
        "event_at": "2020-03-01T17:25:20.000Z",
        "content_type_uid": "session",
        "data": {"uid": "e2"}
    }));
    let transport = ScriptedTransport::new(vec![json!({"items": page, "pagination_token": "p1"})]);
    let mut engine = engine(&transport, SyncStack::init());

    let err = engine.next_page().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::SchemaMismatch { .. })));
    assert_eq!(engine.stack().state(), SyncState::Init);
    assert_eq!(engine.stack().pagination_token(), None);
}

#[tokio::test]
async fn item_without_event_time_fails_the_page() {
    let transport = ScriptedTransport::new(vec![json!({
        "items": [{"type": "asset_deleted", "content_type_uid": "asset", "data": {"uid": "a1"}}],
        "sync_token": "s1"
    })]);
    let mut engine = engine(&transport, SyncStack::resume("s0"));

    let err = engine.next_page().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::SchemaMismatch { .. })));
    assert_eq!(engine.stack().sync_token(), Some("s0"));
}

#[tokio::test]
async fn failed_page_leaves_the_cursor_and_can_be_retried() {
    let transport = ScriptedTransport::new(vec![]);
    transport.push(Err(TransportError::Timeout));
    transport.push(Ok(HttpResponse {
        status: 200,
        headers: BTreeMap::new(),
        body: serde_json::to_vec(&json!({"items": [], "sync_token": "s9"})).unwrap(),
    }));
    let mut engine = engine(&transport, SyncStack::paginate("p7"));

    let err = engine.next_page().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout)));
    assert_eq!(engine.stack().pagination_token(), Some("p7"));

    engine.next_page().await.unwrap().unwrap();
    assert_eq!(engine.stack().sync_token(), Some("s9"));
    assert!(transport.urls().iter().all(|u| u.contains("pagination_token=p7")));
}

#[tokio::test]
async fn stream_stops_after_an_error() {
    let transport = ScriptedTransport::new(vec![]);
    transport.push(Ok(HttpResponse {
        status: 412,
        headers: BTreeMap::new(),
        body: br#"{"error_message":"Invalid sync token","error_code":141}"#.to_vec(),
    }));
    let results: Vec<_> = engine(&transport, SyncStack::resume("stale"))
        .into_stream()
        .collect()
        .await;

    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(Error::Api(api)) => assert_eq!(api.error_code, 141),
        other => panic!("expected an API error, got {other:?}"),
    }
}
