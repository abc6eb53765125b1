use contentstack_model::{
    ContentModel, DecodeOptions, DecodePolicy, FieldBag, Materializer, ModelSchema, SchemaRegistry,
};
use contentstack_types::{DecodeError, FieldError, ResourceKind};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[derive(Debug, PartialEq)]
struct Session {
    title: String,
    track: Vec<FieldBag>,
}

impl ContentModel for Session {
    const FIELD_KEYS: &'static [&'static str] = &["title", "track"];

    fn from_fields(fields: &FieldBag) -> Result<Self, FieldError> {
        let track = fields
            .get_array("track")
            .map(|items| items.iter().cloned().filter_map(FieldBag::from_value).collect())
            .unwrap_or_default();
        Ok(Self {
            title: fields.required_str("title")?.to_string(),
            track,
        })
    }
}

struct Track;

impl ContentModel for Track {
    const FIELD_KEYS: &'static [&'static str] = &["title", "color"];

    fn from_fields(fields: &FieldBag) -> Result<Self, FieldError> {
        fields.required_str("color")?;
        Ok(Self)
    }
}

fn body(value: Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn session_page() -> Vec<u8> {
    body(json!({
        "entries": [{
            "uid": "s1",
            "title": "Keynote",
            "track": [{"uid": "t1", "_content_type_uid": "track"}]
        }],
        "included": {
            "track": [{"uid": "t1", "title": "Systems", "color": "red", "internal": 7}]
        }
    }))
}

fn entries() -> DecodeOptions {
    DecodeOptions::collection(ResourceKind::Entries)
}

// ── Reference resolution ────────────────────────────────────────

#[test]
fn included_reference_replaces_the_stub() {
    let registry = SchemaRegistry::new();
    let page = Materializer::new(&registry)
        .materialize::<Session>(&session_page(), &entries().with_references(["track"]))
        .unwrap();

    let track = &page.items[0].track[0];
    assert_eq!(track.get_str("title"), Some("Systems"));
    assert_eq!(track.content_type_uid(), Some("track"));
    assert_eq!(track.get_i64("internal"), Some(7));
}

#[test]
fn stub_is_untouched_without_the_include() {
    let registry = SchemaRegistry::new();
    let page = Materializer::new(&registry)
        .materialize::<Session>(&session_page(), &entries())
        .unwrap();

    assert_eq!(
        page.items[0].track[0].clone().into_value(),
        json!({"uid": "t1", "_content_type_uid": "track"})
    );
}

#[test]
fn link_with_extra_keys_is_resolved() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({
        "entries": [{
            "title": "Keynote",
            "track": [{"uid": "t1", "_content_type_uid": "track", "locale": "en-us", "_version": 2}]
        }],
        "included": {
            "track": [{"uid": "t1", "title": "Systems", "_version": 3}]
        }
    }));

    let page = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries().with_references(["track"]))
        .unwrap();

    let track = &page.items[0].track[0];
    assert_eq!(track.get_str("title"), Some("Systems"));
    assert_eq!(track.locale(), Some("en-us"));
    assert_eq!(track.get_i64("_version"), Some(3));
    assert_eq!(track.content_type_uid(), Some("track"));
}

#[test]
fn missing_target_leaves_the_stub() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({
        "entries": [{"title": "x", "track": [{"uid": "t9", "_content_type_uid": "track"}]}],
        "included": {"track": []}
    }));
    let page = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries().with_references(["track"]))
        .unwrap();
    assert_eq!(page.items[0].track[0].uid(), Some("t9"));
    assert_eq!(page.items[0].track[0].len(), 2);
}

#[test]
fn registered_target_is_projected_to_its_keys() {
    let mut registry = SchemaRegistry::new();
    registry.register::<Track>("track");

    let page = Materializer::new(&registry)
        .materialize::<Session>(&session_page(), &entries().with_references(["track"]))
        .unwrap();

    let track = &page.items[0].track[0];
    assert_eq!(track.get_str("color"), Some("red"));
    assert!(!track.contains("internal"));
    assert_eq!(track.uid(), Some("t1"));
}

#[test]
fn registered_target_that_does_not_decode_fails_the_item() {
    let mut registry = SchemaRegistry::new();
    registry.register::<Track>("track");
    let raw = body(json!({
        "entries": [{"title": "x", "track": [{"uid": "t1", "_content_type_uid": "track"}]}],
        "included": {"track": [{"uid": "t1", "title": "no color"}]}
    }));

    let err = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries().with_references(["track"]))
        .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidItem { index: 0, .. }));
}

#[test]
fn nested_paths_resolve_through_resolved_objects() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({
        "entries": [{
            "title": "Keynote",
            "track": [{"uid": "t1", "_content_type_uid": "track"}]
        }],
        "included": {
            "track": [{"uid": "t1", "title": "Systems", "owner": {"uid": "p1", "_content_type_uid": "person"}}],
            "person": [{"uid": "p1", "name": "Ada"}]
        }
    }));

    let page = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries().with_references(["track", "track.owner"]))
        .unwrap();
    let owner = page.items[0].track[0].get_object("owner").unwrap();
    assert_eq!(owner.get("name"), Some(&json!("Ada")));
}

#[test]
fn inline_references_are_kept() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({
        "entries": [{
            "title": "Keynote",
            "track": [{"uid": "t1", "_content_type_uid": "track", "title": "Inline"}]
        }]
    }));
    let page = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries().with_references(["track"]))
        .unwrap();
    assert_eq!(page.items[0].track[0].get_str("title"), Some("Inline"));
}

// ── Typed decode ────────────────────────────────────────────────

#[test]
fn unknown_fields_never_reach_the_model() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({"entries": [{"title": "x", "unknown": {"deep": true}}]}));
    let page = Materializer::new(&registry)
        .materialize::<FieldBag>(&raw, &entries())
        .unwrap();
    assert!(page.items[0].contains("unknown"));

    let typed = Materializer::new(&registry)
        .materialize::<Session>(&raw, &entries())
        .unwrap();
    assert_eq!(typed.items[0].title, "x");
}

fn mixed_page() -> Vec<u8> {
    body(json!({"entries": [{"title": "ok"}, {"seats": 3}, {"title": "also ok"}]}))
}

#[test]
fn fail_fast_stops_at_the_first_bad_item() {
    let registry = SchemaRegistry::new();
    let err = Materializer::new(&registry)
        .materialize::<Session>(&mixed_page(), &entries())
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidItem {
            index: 1,
            source: FieldError::Missing { key: "title".into() }
        }
    );
}

#[test]
fn partial_collects_failures() {
    let registry = SchemaRegistry::new();
    let page = Materializer::new(&registry)
        .materialize::<Session>(&mixed_page(), &entries().with_policy(DecodePolicy::Partial))
        .unwrap();

    let titles: Vec<_> = page.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["ok", "also ok"]);
    assert_eq!(page.failures.len(), 1);
    assert!(matches!(page.failures[0], DecodeError::InvalidItem { index: 1, .. }));
}

#[test]
fn non_object_item_is_an_item_failure() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({"entries": [42]}));
    let err = Materializer::new(&registry)
        .materialize::<FieldBag>(&raw, &entries())
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidItem {
            source: FieldError::TypeMismatch { .. },
            ..
        }
    ));
}

// ── Envelope ────────────────────────────────────────────────────

#[test]
fn garbage_is_unparseable() {
    let registry = SchemaRegistry::new();
    let err = Materializer::new(&registry)
        .materialize::<FieldBag>(b"<html>oops</html>", &entries())
        .unwrap_err();
    match err {
        DecodeError::Unparseable { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Unparseable, got {other:?}"),
    }
}

#[test]
fn missing_items_key_is_a_schema_mismatch() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({"assets": []}));
    let err = Materializer::new(&registry)
        .materialize::<FieldBag>(&raw, &entries())
        .unwrap_err();
    assert!(matches!(err, DecodeError::SchemaMismatch { .. }));

    let err = Materializer::new(&registry)
        .materialize::<FieldBag>(b"[1,2]", &entries())
        .unwrap_err();
    assert!(matches!(err, DecodeError::SchemaMismatch { .. }));
}

#[test]
fn count_is_read_only_when_requested() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({"entries": [], "count": 12}));
    let materializer = Materializer::new(&registry);

    let with = materializer
        .materialize::<FieldBag>(&raw, &entries().with_count(true))
        .unwrap();
    assert_eq!(with.count, Some(12));

    let without = materializer.materialize::<FieldBag>(&raw, &entries()).unwrap();
    assert_eq!(without.count, None);
    assert!(without.fields.is_none());
}

#[test]
fn sibling_members_are_exposed_as_fields() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({
        "entries": [{"title": "x"}],
        "content_type": {"uid": "session", "schema": []},
        "included": {}
    }));
    let page = Materializer::new(&registry)
        .materialize::<FieldBag>(&raw, &entries())
        .unwrap();

    assert_eq!(page.field("content_type").unwrap()["uid"], json!("session"));
    assert!(page.field("included").is_none());
    assert!(page.field("entries").is_none());

    let schema = ModelSchema::from_content_type(page.field("content_type").unwrap()).unwrap();
    assert_eq!(schema.content_type_uid, "session");
}

#[test]
fn single_envelope_yields_one_item() {
    let registry = SchemaRegistry::new();
    let raw = body(json!({"asset": {"uid": "a1", "filename": "cat.png", "locale": "fr-fr"}}));
    let page = Materializer::new(&registry)
        .materialize::<FieldBag>(&raw, &DecodeOptions::single(ResourceKind::Assets).with_locale("en-us"))
        .unwrap();
    assert_eq!(page.len(), 1);
    // Fallback is server-side: whatever locale arrived is what we decode.
    assert_eq!(page.first().unwrap().locale(), Some("fr-fr"));
}
