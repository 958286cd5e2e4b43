// tests/search_tests.rs

use peek_query::search::{SearchRoute, classify, derive_key};
use peek_query::{QueryEngine, QueryOptions, Searcher, search};
use serde_json::{Value as JsonValue, json};

fn snapshot() -> JsonValue {
    json!({
        "user": {"name": "ada", "role": "admin"},
        "userId": 7,
        "items": [
            {"id": 1, "name": "pen"},
            {"id": 2, "name": "ink"}
        ],
        "file.txt": "contents"
    })
}

#[test]
fn test_empty_query_returns_snapshot() {
    assert_eq!(search(&snapshot(), ""), snapshot());
    assert_eq!(search(&snapshot(), "   "), snapshot());
}

#[test]
fn test_plain_word_matches_keys_case_insensitively() {
    assert_eq!(
        search(&snapshot(), "user"),
        json!({"user": {"name": "ada", "role": "admin"}, "userId": 7})
    );
    assert_eq!(search(&snapshot(), "ID"), json!({"userId": 7}));
    assert_eq!(search(&snapshot(), "zzz"), json!({}));
}

#[test]
fn test_key_search_on_non_object_snapshot() {
    assert_eq!(search(&json!([1, 2]), "a"), json!({}));
}

#[test]
fn test_dotted_query_runs_as_path() {
    assert_eq!(search(&snapshot(), "user.name"), json!({"name": "ada"}));
    assert_eq!(search(&snapshot(), "  user.name  "), json!({"name": "ada"}));
    assert_eq!(search(&snapshot(), "$.user.name"), json!({"name": "ada"}));
}

#[test]
fn test_single_object_match_is_returned_as_is() {
    assert_eq!(
        search(&snapshot(), "$.user"),
        json!({"name": "ada", "role": "admin"})
    );
    assert_eq!(search(&snapshot(), "items[1]"), json!({"id": 2, "name": "ink"}));
}

#[test]
fn test_root_match_is_returned_as_is() {
    assert_eq!(search(&snapshot(), "$"), snapshot());
}

#[test]
fn test_multiple_matches_are_merged_with_suffixes() {
    assert_eq!(
        search(&snapshot(), "items[*].name"),
        json!({"name": "pen", "name_2": "ink"})
    );
    assert_eq!(
        search(&snapshot(), "$..name"),
        json!({"name": "ada", "name_2": "pen", "name_3": "ink"})
    );
}

#[test]
fn test_bracket_query_gets_root_prefix() {
    assert_eq!(search(&snapshot(), "['userId']"), json!({"userId": 7}));
}

#[test]
fn test_no_match_is_empty_object() {
    assert_eq!(search(&snapshot(), "user.email"), json!({}));
    assert_eq!(search(&snapshot(), "$.items[?(@.id > 5)]"), json!({}));
}

#[test]
fn test_malformed_path_is_empty_object() {
    assert_eq!(search(&snapshot(), "$.["), json!({}));
    assert_eq!(search(&snapshot(), "$.items[?(@.id >)]"), json!({}));
}

#[test]
fn test_extreme_numeric_bounds_do_not_escape() {
    let doc = json!({"a": [{"id": 1}, {"id": 2}, {"id": 3}]});
    assert_eq!(search(&doc, "$.a[1::9223372036854775807]"), json!({"id": 2}));
    assert_eq!(search(&doc, "$.a[::-9223372036854775808].id"), json!({"id": 3}));
    assert_eq!(
        search(&doc, "$.a[-9223372036854775808:9223372036854775807].id"),
        json!({"id": 1, "id_2": 2, "id_3": 3})
    );
    assert_eq!(search(&doc, "$.a[9223372036854775807]"), json!({}));
    assert_eq!(search(&doc, "$.a[-9223372036854775808]"), json!({}));
    assert_eq!(search(&doc, "$[9223372036854775807]"), json!({}));
    assert_eq!(search(&doc, "$[-9223372036854775808]"), json!({}));
    assert_eq!(search(&doc, "$.a[99999999999999999999]"), json!({}));
    assert_eq!(search(&doc, "$.a[1:99999999999999999999]"), json!({}));
}

#[test]
fn test_deeply_nested_filters_are_empty_object() {
    let doc = json!({"a": [1]});
    let deep = |open: &str, inner: &str, close: &str| {
        format!("$.a[?({}{}{})]", open.repeat(1_000), inner, close.repeat(1_000))
    };
    assert_eq!(search(&doc, &deep("(", "1", ")")), json!({}));
    assert_eq!(search(&doc, &deep("!", "@", "")), json!({}));
    assert_eq!(search(&doc, &deep("[", "1", "]")), json!({}));
    assert_eq!(search(&doc, &deep("~", "@", "")), json!({}));
    let chain = format!("$.a[?({})]", vec!["@"; 1_000].join(" + "));
    assert_eq!(search(&doc, &chain), json!({}));
    let script = format!("$.a[({}0{})]", "(".repeat(1_000), ")".repeat(1_000));
    assert_eq!(search(&doc, &script), json!({}));
}

#[test]
fn test_failing_filter_with_strict_engine_is_empty_object() {
    let engine = QueryEngine::new(QueryOptions::new().strict_eval(true));
    let searcher = Searcher::new(&engine);
    assert_eq!(searcher.search(&snapshot(), "$.items[?(@.missing.x)]"), json!({}));
    assert_eq!(
        searcher.search(&snapshot(), "user.name"),
        json!({"name": "ada"})
    );
}

#[test]
fn test_dotted_key_reads_as_path() {
    // "file.txt" looks like a path, so key search never sees it
    assert_eq!(classify("file.txt"), SearchRoute::Path);
    assert_eq!(search(&snapshot(), "file.txt"), json!({}));
    assert_eq!(search(&snapshot(), "['file.txt']"), json!({"file.txt": "contents"}));
}

#[test]
fn test_routes() {
    assert_eq!(classify(""), SearchRoute::Empty);
    assert_eq!(classify("name"), SearchRoute::Keys);
    assert_eq!(classify("v1"), SearchRoute::Keys);
    assert_eq!(classify("$"), SearchRoute::Path);
    assert_eq!(classify("items[0]"), SearchRoute::Path);
    assert_eq!(classify("[\"a\"]"), SearchRoute::Path);
    assert_eq!(classify("..name"), SearchRoute::Path);
    assert_eq!(classify("*"), SearchRoute::Path);
}

#[test]
fn test_derive_key_forms() {
    assert_eq!(derive_key("$['items'][0]['name']"), "name");
    assert_eq!(derive_key("$['file.txt']"), "file.txt");
    assert_eq!(derive_key("$.a.b"), "b");
}

#[test]
fn test_plain_word_against_partial_keys() {
    let snapshot = json!({"username": "x", "email": "y"});
    assert_eq!(search(&snapshot, "user"), json!({"username": "x"}));
    assert_eq!(classify("user.name"), SearchRoute::Path);
}
