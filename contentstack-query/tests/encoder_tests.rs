use chrono::{TimeZone, Utc};
use contentstack_query::{encode, encode_filter, encode_filter_string, FilterFormat, ParamValue};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;

fn params(pairs: Vec<(&str, ParamValue)>) -> BTreeMap<String, ParamValue> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

// ── Scalars ─────────────────────────────────────────────────────

#[test]
fn keys_are_sorted_alphabetically() {
    let p = params(vec![("title", "Gold".into()), ("count", 3.into())]);
    assert_eq!(encode(&p), "count=3&title=Gold");
}

#[test]
fn spaces_are_percent_encoded() {
    let p = params(vec![("title", "Gold Medal".into())]);
    assert_eq!(encode(&p), "title=Gold%20Medal");
}

#[test]
fn reserved_characters_are_percent_encoded() {
    let p = params(vec![("q", "a&b=c/d".into())]);
    assert_eq!(encode(&p), "q=a%26b%3Dc%2Fd");
}

#[test]
fn booleans_render_literally() {
    let p = params(vec![("include_count", true.into()), ("draft", false.into())]);
    assert_eq!(encode(&p), "draft=false&include_count=true");
}

#[test]
fn floats_use_natural_decimal_text() {
    let p = params(vec![("price", 19.5.into())]);
    assert_eq!(encode(&p), "price=19.5");
}

#[test]
fn dates_render_to_whole_seconds() {
    let date = Utc.with_ymd_and_hms(2020, 3, 1, 17, 25, 20).unwrap()
        + chrono::Duration::milliseconds(742);
    let p = params(vec![("start_from", date.into())]);
    assert_eq!(encode(&p), "start_from=2020-03-01T17%3A25%3A20Z");
}

#[test]
fn empty_map_encodes_to_empty_string() {
    assert_eq!(encode(&BTreeMap::new()), "");
}

// ── Structural keys ─────────────────────────────────────────────

#[test]
fn structural_keys_are_skipped() {
    let p = params(vec![
        ("query", "{}".into()),
        ("uid", "blt1".into()),
        ("content_type", "blog".into()),
        ("locale", "en-us".into()),
    ]);
    assert_eq!(encode(&p), "locale=en-us");
}

// ── Sequences and maps ──────────────────────────────────────────

#[test]
fn sequences_repeat_with_brackets_in_order() {
    let p = params(vec![("include", vec!["track", "author", "album"].into())]);
    assert_eq!(
        encode(&p),
        "include[]=track&include[]=author&include[]=album"
    );
}

#[test]
fn nested_maps_expand_with_sorted_subkeys() {
    let mut inner = BTreeMap::new();
    inner.insert("zeta".to_string(), ParamValue::from(1));
    inner.insert("alpha".to_string(), ParamValue::from(2));
    let mut outer = BTreeMap::new();
    outer.insert("deep".to_string(), ParamValue::Map(inner));
    let p = params(vec![("filter", ParamValue::Map(outer))]);

    assert_eq!(
        encode(&p),
        "filter[deep][alpha]=2&filter[deep][zeta]=1"
    );
}

#[test]
fn encoding_is_deterministic() {
    let p = params(vec![
        ("tags", vec!["b", "a"].into()),
        ("limit", 10.into()),
        ("asc", "title".into()),
    ]);
    assert_eq!(encode(&p), encode(&p.clone()));
}

// ── Filter JSON ─────────────────────────────────────────────────

#[test]
fn filter_renders_nested_json() {
    let mut ops = BTreeMap::new();
    ops.insert("$gt".to_string(), ParamValue::from(5));
    let p = params(vec![
        ("title", "Gold".into()),
        ("rank", ParamValue::Map(ops)),
        ("tags", vec!["a", "b"].into()),
    ]);

    assert_eq!(
        encode_filter(&p),
        json!({"title": "Gold", "rank": {"$gt": 5}, "tags": ["a", "b"]})
    );
}

#[test]
fn filter_renders_dates_as_strings() {
    let date = Utc.with_ymd_and_hms(2021, 7, 4, 0, 0, 0).unwrap();
    let p = params(vec![("published", date.into())]);
    assert_eq!(encode_filter(&p), json!({"published": "2021-07-04T00:00:00Z"}));
}

#[test]
fn filter_compact_and_pretty() {
    let p = params(vec![("title", "Gold".into())]);
    assert_eq!(encode_filter_string(&p, FilterFormat::Compact), r#"{"title":"Gold"}"#);
    let pretty = encode_filter_string(&p, FilterFormat::Pretty);
    assert!(pretty.contains('\n'));
    let reparsed: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(reparsed, json!({"title": "Gold"}));
}

// ── Raw JSON conversion ─────────────────────────────────────────

#[test]
fn try_from_json_rejects_null() {
    let err = ParamValue::try_from_json("field", json!({"a": null})).unwrap_err();
    assert_eq!(err.to_string(), "unsupported parameter value for `field.a`");
}

#[test]
fn try_from_json_keeps_integer_and_float_apart() {
    assert_eq!(ParamValue::try_from_json("n", json!(3)).unwrap(), ParamValue::Int(3));
    assert_eq!(
        ParamValue::try_from_json("n", json!(2.5)).unwrap(),
        ParamValue::Float(2.5)
    );
}

// ── Checked floats ──────────────────────────────────────────────

#[test]
fn float_constructor_rejects_non_finite() {
    assert_eq!(ParamValue::float(2.5), Ok(ParamValue::Float(2.5)));
    assert!(ParamValue::float(f64::NAN).is_err());
    assert!(ParamValue::float(f64::INFINITY).is_err());
}

#[test]
fn check_names_the_nested_path() {
    let value = ParamValue::Seq(vec![ParamValue::Int(1), ParamValue::Float(f64::NAN)]);
    assert_eq!(
        value.check("ids"),
        Err(contentstack_types::ConfigurationError::UnsupportedValue("ids".into()))
    );
    assert_eq!(ParamValue::from("text").check("title"), Ok(()));
}
