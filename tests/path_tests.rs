// tests/path_tests.rs

use peek_query::path::{Slice, ValueType};
use peek_query::{
    EvalError, PathError, PathSegment, PathToken, QueryEngine, QueryOptions, query, to_path_string,
    tokenize,
};
use serde_json::{Value as JsonValue, json};

fn store() -> JsonValue {
    json!({
        "store": {
            "book": [
                {"category": "reference", "author": "Nigel", "title": "Sayings", "price": 8.95},
                {"category": "fiction", "author": "Evelyn", "title": "Sword", "price": 12.99},
                {"category": "fiction", "author": "Herman", "title": "Moby", "isbn": "0-553", "price": 8.99}
            ],
            "bicycle": {"color": "red", "price": 19.95}
        }
    })
}

fn values(doc: &JsonValue, path: &str) -> Vec<JsonValue> {
    QueryEngine::default()
        .values(doc, path)
        .unwrap_or_else(|e| panic!("query {:?} failed: {}", path, e))
}

// ============================================================================
// Basic selection
// ============================================================================

#[test]
fn test_member_and_wildcard() {
    let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}, {"d": 3}]}});
    assert_eq!(values(&doc, "$.a.b[*].c"), vec![json!(1), json!(2)]);
}

#[test]
fn test_leading_dollar_is_optional() {
    assert_eq!(values(&store(), "store.bicycle.color"), vec![json!("red")]);
    assert_eq!(values(&store(), "$"), vec![store()]);
}

#[test]
fn test_bracket_names() {
    let doc = json!({"first name": "ada", "it's": 1});
    assert_eq!(values(&doc, "$['first name']"), vec![json!("ada")]);
    assert_eq!(values(&doc, r#"$["first name"]"#), vec![json!("ada")]);
    assert_eq!(values(&doc, r"$['it\'s']"), vec![json!(1)]);
}

#[test]
fn test_backtick_literal_name() {
    let doc = json!({"*": "star", "x": "other"});
    assert_eq!(values(&doc, "$.`*"), vec![json!("star")]);
    assert_eq!(values(&doc, "$.*").len(), 2);
}

#[test]
fn test_indices() {
    let doc = store();
    assert_eq!(values(&doc, "$.store.book[0].title"), vec![json!("Sayings")]);
    assert_eq!(values(&doc, "$.store.book[-1].title"), vec![json!("Moby")]);
    assert_eq!(values(&doc, "$.store.book.1.title"), vec![json!("Sword")]);
    assert!(values(&doc, "$.store.book[7]").is_empty());
    assert!(values(&doc, "$.store.book[-4]").is_empty());
}

#[test]
fn test_index_on_object_reads_key() {
    let doc = json!({"o": {"0": "zero", "-1": "minus"}});
    assert_eq!(values(&doc, "$.o[0]"), vec![json!("zero")]);
    assert_eq!(values(&doc, "$.o[-1]"), vec![json!("minus")]);
}

#[test]
fn test_length_of_arrays_and_strings() {
    let doc = json!({"items": [1, 2, 3], "name": "añb"});
    assert_eq!(values(&doc, "$.items.length"), vec![json!(3)]);
    assert_eq!(values(&doc, "$.name.length"), vec![json!(3)]);
}

#[test]
fn test_missing_members_select_nothing() {
    let doc = store();
    assert!(values(&doc, "$.nope").is_empty());
    assert!(values(&doc, "$.store.bicycle.color.shade").is_empty());
    assert!(values(&doc, "$.store.bicycle[*][*]").is_empty());
}

// ============================================================================
// Recursive descent
// ============================================================================

#[test]
fn test_descendant_in_document_order() {
    let doc = store();
    assert_eq!(
        values(&doc, "$..author"),
        vec![json!("Nigel"), json!("Evelyn"), json!("Herman")]
    );
    assert_eq!(
        values(&doc, "$..price"),
        vec![json!(8.95), json!(12.99), json!(8.99), json!(19.95)]
    );
}

#[test]
fn test_descendant_matches_current_level_first() {
    let doc = json!({"a": 1, "b": {"a": 2, "c": {"a": 3}}});
    assert_eq!(values(&doc, "$..a"), vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_descendant_wildcard_visits_everything() {
    let doc = json!({"a": {"b": 1}, "c": [2]});
    assert_eq!(
        values(&doc, "$..*"),
        vec![json!({"b": 1}), json!([2]), json!(1), json!(2)]
    );
}

// ============================================================================
// Slices and unions
// ============================================================================

#[test]
fn test_slices() {
    let doc = json!({"n": [0, 1, 2, 3, 4]});
    assert_eq!(values(&doc, "$.n[1:3]"), vec![json!(1), json!(2)]);
    assert_eq!(values(&doc, "$.n[3:]"), vec![json!(3), json!(4)]);
    assert_eq!(values(&doc, "$.n[:-3]"), vec![json!(0), json!(1)]);
    assert_eq!(values(&doc, "$.n[::2]"), vec![json!(0), json!(2), json!(4)]);
    assert_eq!(
        values(&doc, "$.n[::-1]"),
        vec![json!(4), json!(3), json!(2), json!(1), json!(0)]
    );
    assert!(values(&doc, "$.n[10:]").is_empty());
}

#[test]
fn test_slices_with_extreme_bounds() {
    let doc = json!({"n": [0, 1, 2]});
    assert_eq!(values(&doc, "$.n[1::9223372036854775807]"), vec![json!(1)]);
    assert_eq!(values(&doc, "$.n[::-9223372036854775808]"), vec![json!(2)]);
    assert_eq!(
        values(&doc, "$.n[-9223372036854775808:9223372036854775807]"),
        vec![json!(0), json!(1), json!(2)]
    );
    assert!(values(&doc, "$.n[9223372036854775807]").is_empty());
    assert!(values(&doc, "$.n[-9223372036854775808]").is_empty());
    assert!(QueryEngine::default().query(&doc, "$.n[99999999999999999999:]").is_err());
}

#[test]
fn test_slice_on_object_selects_nothing() {
    let doc = json!({"o": {"a": 1}});
    assert!(values(&doc, "$.o[0:1]").is_empty());
}

#[test]
fn test_unions() {
    let doc = store();
    assert_eq!(
        values(&doc, "$.store.book[0,2].title"),
        vec![json!("Sayings"), json!("Moby")]
    );
    assert_eq!(
        values(&doc, "$.store.bicycle['color','price']"),
        vec![json!("red"), json!(19.95)]
    );
}

// ============================================================================
// Filters and scripts
// ============================================================================

#[test]
fn test_filter_comparison() {
    let doc = json!({"items": [{"n": 1}, {"n": 3}, {"n": 5}]});
    assert_eq!(
        values(&doc, "$.items[?(@.n > 2)]"),
        vec![json!({"n": 3}), json!({"n": 5})]
    );
}

#[test]
fn test_filter_on_store() {
    let doc = store();
    assert_eq!(
        values(&doc, "$.store.book[?(@.price < 10)].title"),
        vec![json!("Sayings"), json!("Moby")]
    );
    assert_eq!(values(&doc, "$.store.book[?(@.isbn)].title"), vec![json!("Moby")]);
    assert_eq!(
        values(&doc, "$..book[?(@.category === 'fiction' && @.price > 10)].author"),
        vec![json!("Evelyn")]
    );
}

#[test]
fn test_filter_methods_and_regex() {
    let doc = store();
    assert_eq!(
        values(&doc, "$.store.book[?(@.title.startsWith('S'))].title"),
        vec![json!("Sayings"), json!("Sword")]
    );
    assert_eq!(
        values(&doc, "$.store.book[?(/^h/i.test(@.author))].title"),
        vec![json!("Moby")]
    );
}

#[test]
fn test_filter_shorthands() {
    let doc = json!({"limit": 10, "items": [4, 12, 7]});
    assert_eq!(
        values(&doc, "$.items[?(@ < @root.limit)]"),
        vec![json!(4), json!(7)]
    );
    assert_eq!(values(&doc, "$.items[?(@property === 1)]"), vec![json!(12)]);
    assert_eq!(
        values(&doc, "$.items[?(@parent.length === 3 && @parentProperty === 'items')]").len(),
        3
    );
    assert_eq!(
        values(&doc, "$.items[?(@path === \"$['items'][2]\")]"),
        vec![json!(7)]
    );
}

#[test]
fn test_filter_over_object_members() {
    let doc = json!({"users": {"ada": {"age": 36}, "bob": {"age": 12}}});
    let engine = QueryEngine::default();
    assert_eq!(
        engine.paths(&doc, "$.users[?(@.age >= 18)]").unwrap(),
        vec!["$['users']['ada']".to_string()]
    );
    assert_eq!(
        engine.values(&doc, "$.users[?(@property !== 'ada')].age").unwrap(),
        vec![json!(12)]
    );
}

#[test]
fn test_failing_filter_is_no_match() {
    let doc = json!({"items": [{"a": {"b": 1}}, {"a": null}, {"c": 2}]});
    assert_eq!(
        values(&doc, "$.items[?(@.a.b === 1)]"),
        vec![json!({"a": {"b": 1}})]
    );
}

#[test]
fn test_strict_eval_surfaces_errors() {
    let doc = json!({"items": [{"a": {"b": 1}}, {"a": null}]});
    let engine = QueryEngine::new(QueryOptions::new().strict_eval(true));
    let err = engine.query(&doc, "$.items[?(@.a.b === 1)]").unwrap_err();
    match err {
        PathError::Evaluation { code, source } => {
            assert_eq!(code, "@.a.b === 1");
            assert!(matches!(source, EvalError::Type(_)));
        }
        other => panic!("Expected evaluation error, got {:?}", other),
    }
}

#[test]
fn test_malformed_filter_is_expression_error() {
    let doc = json!({"items": [1]});
    let err = QueryEngine::default()
        .query(&doc, "$.items[?(@ ==)]")
        .unwrap_err();
    assert!(matches!(err, PathError::Expression { ref code, .. } if code == "@ =="));
}

#[test]
fn test_deeply_nested_filter_is_expression_error() {
    let doc = json!({"items": [1]});
    let path = format!("$.items[?({}@{})]", "(".repeat(1_000), ")".repeat(1_000));
    let err = QueryEngine::default().query(&doc, &path).unwrap_err();
    assert!(matches!(err, PathError::Expression { .. }));
}

#[test]
fn test_script_selects_index_or_name() {
    let doc = store();
    assert_eq!(
        values(&doc, "$.store.book[(@.length - 1)].title"),
        vec![json!("Moby")]
    );
    assert_eq!(
        values(&doc, "$.store.bicycle[('col' + 'or')]"),
        vec![json!("red")]
    );
}

// ============================================================================
// Parent, property name and type checks
// ============================================================================

#[test]
fn test_parent_selector() {
    let doc = store();
    assert_eq!(
        values(&doc, "$.store.bicycle.color^"),
        vec![json!({"color": "red", "price": 19.95})]
    );
    assert_eq!(
        values(&doc, "$.store.book[?(@.isbn)]^^.bicycle.color"),
        vec![json!("red")]
    );
    assert!(values(&doc, "$^").is_empty());
}

#[test]
fn test_parent_after_wildcard_repeats_per_match() {
    let doc = json!({"o": {"a": 1, "b": 2}});
    assert_eq!(
        values(&doc, "$.o.*^"),
        vec![json!({"a": 1, "b": 2}), json!({"a": 1, "b": 2})]
    );
}

#[test]
fn test_property_name_selector() {
    let doc = store();
    assert_eq!(values(&doc, "$.store.*~"), vec![json!("book"), json!("bicycle")]);
    assert_eq!(
        values(&doc, "$.store.book[?(@.price > 10)]~"),
        vec![json!(1)]
    );
    assert!(values(&doc, "$~").is_empty());
}

#[test]
fn test_type_checks() {
    let doc = json!({
        "s": "text", "i": 3, "f": 1.5, "b": true, "n": null, "a": [1], "o": {"k": "v"}
    });
    assert_eq!(values(&doc, "$.*@string()"), vec![json!("text")]);
    assert_eq!(values(&doc, "$.*@number()"), vec![json!(3), json!(1.5)]);
    assert_eq!(values(&doc, "$.*@integer()"), vec![json!(3)]);
    assert_eq!(values(&doc, "$.*@boolean()"), vec![json!(true)]);
    assert_eq!(values(&doc, "$.*@null()"), vec![json!(null)]);
    assert_eq!(values(&doc, "$.*@array()"), vec![json!([1])]);
    assert_eq!(values(&doc, "$.*@object()"), vec![json!({"k": "v"})]);
    assert_eq!(
        values(&doc, "$.*@scalar()"),
        vec![json!("text"), json!(3), json!(1.5), json!(true)]
    );
    assert!(values(&doc, "$.*@undefined()").is_empty());
    assert!(values(&doc, "$.*@nonFinite()").is_empty());
    assert!(values(&doc, "$.*@function()").is_empty());
}

#[test]
fn test_type_check_continues_with_rest_of_path() {
    let doc = json!({"cfg": {"name": "x", "port": 80, "host": "h"}});
    assert_eq!(
        values(&doc, "$.cfg.*@string()~"),
        vec![json!("name"), json!("host")]
    );
    assert_eq!(
        values(&doc, "$..*@number()"),
        vec![json!(80)]
    );
}

#[test]
fn test_other_type_uses_predicate() {
    let doc = store();
    let engine = QueryEngine::new(
        QueryOptions::new().other(|value, _| value.as_str().is_some_and(|s| s.starts_with("0-"))),
    );
    assert_eq!(engine.values(&doc, "$..*@other()").unwrap(), vec![json!("0-553")]);

    assert!(QueryEngine::default().values(&doc, "$..*@other()").unwrap().is_empty());
}

// ============================================================================
// Matches, paths and pointers
// ============================================================================

#[test]
fn test_match_metadata() {
    let doc = store();
    let matches = query(&doc, "$.store.book[1]").unwrap();
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(
        m.path,
        vec![
            PathSegment::from("store"),
            PathSegment::from("book"),
            PathSegment::Index(1)
        ]
    );
    assert_eq!(m.parent_property, Some(PathSegment::Index(1)));
    assert_eq!(m.parent, Some(&doc["store"]["book"]));
    assert!(!m.has_array_expr);
    assert_eq!(m.path_string(), "$['store']['book'][1]");
    assert_eq!(m.pointer(), "/store/book/1");

    let matches = query(&doc, "$.store.book[*]").unwrap();
    assert!(matches.iter().all(|m| m.has_array_expr));

    let root = query(&doc, "$").unwrap();
    assert_eq!(root[0].parent, None);
    assert_eq!(root[0].pointer(), "");
}

#[test]
fn test_paths_and_pointers() {
    let doc = json!({"a/b": {"~c": 1}, "list": [1, 2]});
    let engine = QueryEngine::default();
    assert_eq!(engine.pointers(&doc, "$['a/b']['~c']").unwrap(), vec!["/a~1b/~0c"]);
    assert_eq!(
        engine.paths(&doc, "$.list[*]").unwrap(),
        vec!["$['list'][0]", "$['list'][1]"]
    );
    assert_eq!(engine.paths(&doc, "$.*~").unwrap(), vec!["$['a/b']", "$['list']"]);
}

// ============================================================================
// Tokenizer
// ============================================================================

#[test]
fn test_tokenize_forms() {
    assert_eq!(
        tokenize("$..book[0:2]['title','author']").unwrap(),
        vec![
            PathToken::Descendant,
            PathToken::Name("book".into()),
            PathToken::Slice(Slice {
                start: Some(0),
                end: Some(2),
                step: None
            }),
            PathToken::Union(vec![
                PathToken::Name("title".into()),
                PathToken::Name("author".into())
            ]),
        ]
    );
    assert_eq!(
        tokenize("$.a[?(@.x)][(@.length)]^~@string()").unwrap(),
        vec![
            PathToken::Name("a".into()),
            PathToken::Filter("@.x".into()),
            PathToken::Script("@.length".into()),
            PathToken::Parent,
            PathToken::PropertyName,
            PathToken::TypeCheck(ValueType::String),
        ]
    );
    assert_eq!(tokenize("$").unwrap(), vec![]);
    assert_eq!(tokenize("$..").unwrap(), vec![PathToken::Descendant]);
}

#[test]
fn test_canonical_form_round_trips() {
    for path in [
        "$.store.book[?(@.price < 10)]['title','author']",
        "$..*@number()",
        "$['it\\'s'][-1][::-1].*~",
        "$.a.b^^[(@.length-1)]",
    ] {
        let tokens = tokenize(path).unwrap();
        let canonical = to_path_string(&tokens);
        assert_eq!(tokenize(&canonical).unwrap(), tokens, "{}", canonical);
    }
    assert_eq!(
        to_path_string(&tokenize("$.store.book[0].*").unwrap()),
        "$['store']['book'][0][*]"
    );
}

#[test]
fn test_tokenizer_errors() {
    let description = |path: &str| tokenize(path).unwrap_err().description;
    assert_eq!(description("$.a["), "Unclosed [");
    assert_eq!(description("$[]"), "Empty brackets");
    assert_eq!(description("$[?(@.a"), "Unclosed (");
    assert_eq!(description("$[0]@foo()"), "Unknown value type foo");
    assert!(description("$['a").starts_with("Unclosed quote"));
    assert!(tokenize("$...a").is_err());
    assert!(tokenize("$.a.").is_err());
    assert!(tokenize("$.a..").is_ok());
}

#[test]
fn test_syntax_error_from_query() {
    let doc = json!({});
    let err = query(&doc, "$.a[").unwrap_err();
    assert!(matches!(err, PathError::Syntax(_)));
    assert!(err.to_string().starts_with("invalid path: Unclosed ["));
}

#[test]
fn test_descendant_orders_shallow_match_first() {
    let doc = json!({"a": {"x": 1}, "b": {"a": {"x": 2}}});
    let engine = QueryEngine::default();
    assert_eq!(
        engine.paths(&doc, "$..a").unwrap(),
        vec!["$['a']", "$['b']['a']"]
    );
    assert_eq!(
        engine.values(&doc, "$..a").unwrap(),
        vec![json!({"x": 1}), json!({"x": 2})]
    );
}
