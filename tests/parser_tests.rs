// tests/parser_tests.rs

use peek_query::ast::{Expr, Literal};
use peek_query::parser::MAX_NESTING_DEPTH;
use peek_query::{GrammarConfig, Parser, parse_expression};

fn num(n: f64) -> Expr {
    Expr::Literal {
        value: Literal::Number(n),
        raw: if n.fract() == 0.0 {
            format!("{}", n as i64)
        } else {
            n.to_string()
        },
    }
}

fn ident(name: &str) -> Expr {
    Expr::identifier(name)
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    let expr = parse_expression("2 + 3 * 4").unwrap();
    assert_eq!(
        expr,
        Expr::binary("+", num(2.0), Expr::binary("*", num(3.0), num(4.0)))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    let expr = parse_expression("(2 + 3) * 4").unwrap();
    assert_eq!(
        expr,
        Expr::binary("*", Expr::binary("+", num(2.0), num(3.0)), num(4.0))
    );
}

#[test]
fn test_exponent_is_right_associative() {
    let expr = parse_expression("2 ** 3 ** 2").unwrap();
    assert_eq!(
        expr,
        Expr::binary("**", num(2.0), Expr::binary("**", num(3.0), num(2.0)))
    );
}

#[test]
fn test_logical_precedence() {
    let expr = parse_expression("a || b && c").unwrap();
    assert_eq!(
        expr,
        Expr::binary("||", ident("a"), Expr::binary("&&", ident("b"), ident("c")))
    );
}

#[test]
fn test_comparison_below_arithmetic() {
    let expr = parse_expression("a + 1 > b * 2").unwrap();
    assert!(matches!(&expr, Expr::Binary { operator, .. } if operator == ">"));
}

#[test]
fn test_longest_operator_wins() {
    let expr = parse_expression("a === b").unwrap();
    assert!(matches!(&expr, Expr::Binary { operator, .. } if operator == "==="));

    let expr = parse_expression("a >>> 1").unwrap();
    assert!(matches!(&expr, Expr::Binary { operator, .. } if operator == ">>>"));
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_numeric_literals() {
    let expr = parse_expression("1.5").unwrap();
    assert!(matches!(expr, Expr::Literal { value: Literal::Number(n), .. } if n == 1.5));

    let expr = parse_expression("1e3").unwrap();
    assert!(matches!(expr, Expr::Literal { value: Literal::Number(n), .. } if n == 1000.0));

    let expr = parse_expression(".5").unwrap();
    assert!(matches!(expr, Expr::Literal { value: Literal::Number(n), .. } if n == 0.5));
}

#[test]
fn test_string_escapes() {
    let expr = parse_expression(r#""a\tb\"c\q""#).unwrap();
    assert!(matches!(
        expr,
        Expr::Literal { value: Literal::String(ref s), .. } if s == "a\tb\"cq"
    ));
}

#[test]
fn test_keyword_literals_and_this() {
    assert!(matches!(
        parse_expression("true").unwrap(),
        Expr::Literal { value: Literal::Boolean(true), .. }
    ));
    assert!(matches!(
        parse_expression("null").unwrap(),
        Expr::Literal { value: Literal::Null, .. }
    ));
    assert_eq!(parse_expression("this").unwrap(), Expr::This);
}

#[test]
fn test_unary_operators() {
    let expr = parse_expression("-x").unwrap();
    assert!(matches!(
        &expr,
        Expr::Unary { operator, prefix: true, .. } if operator == "-"
    ));

    let expr = parse_expression("!!x").unwrap();
    match expr {
        Expr::Unary { operator, argument, .. } => {
            assert_eq!(operator, "!");
            assert!(matches!(*argument, Expr::Unary { .. }));
        }
        other => panic!("Expected unary, got {:?}", other),
    }
}

#[test]
fn test_word_operator_needs_boundary() {
    let mut grammar = GrammarConfig::default();
    grammar.add_unary_op("typeof");
    let expr = grammar.parse("typeofx").unwrap();
    assert_eq!(expr, ident("typeofx"));

    let expr = grammar.parse("typeof x").unwrap();
    assert!(matches!(&expr, Expr::Unary { operator, .. } if operator == "typeof"));
}

// ============================================================================
// Member access and calls
// ============================================================================

#[test]
fn test_member_chain() {
    let expr = parse_expression("a.b[0].c").unwrap();
    match expr {
        Expr::Member {
            computed: false,
            object,
            property,
            ..
        } => {
            assert_eq!(*property, ident("c"));
            assert!(matches!(*object, Expr::Member { computed: true, .. }));
        }
        other => panic!("Expected member, got {:?}", other),
    }
}

#[test]
fn test_method_call_with_arguments() {
    let expr = parse_expression("name.slice(1, -1)").unwrap();
    match expr {
        Expr::Call {
            arguments, callee, ..
        } => {
            assert_eq!(arguments.len(), 2);
            assert_eq!(*callee, Expr::member(ident("name"), "slice"));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_optional_chaining() {
    let expr = parse_expression("a?.b").unwrap();
    assert!(matches!(expr, Expr::Member { optional: true, computed: false, .. }));

    let expr = parse_expression("a?.[0]").unwrap();
    assert!(matches!(expr, Expr::Member { optional: true, computed: true, .. }));

    let expr = parse_expression("f?.()").unwrap();
    assert!(matches!(expr, Expr::Call { optional: true, .. }));
}

#[test]
fn test_array_literal_with_holes() {
    let expr = parse_expression("[1, , 2]").unwrap();
    match expr {
        Expr::Array { elements } => {
            assert_eq!(elements.len(), 3);
            assert!(elements[1].is_none());
        }
        other => panic!("Expected array, got {:?}", other),
    }
}

#[test]
fn test_compound_and_sequence() {
    let expr = parse_expression("a; b").unwrap();
    assert!(matches!(expr, Expr::Compound { ref body } if body.len() == 2));

    let expr = parse_expression("(a, b)").unwrap();
    assert!(matches!(expr, Expr::Sequence { ref expressions } if expressions.len() == 2));

    let expr = parse_expression("").unwrap();
    assert!(matches!(expr, Expr::Compound { ref body } if body.is_empty()));
}

// ============================================================================
// Ternary
// ============================================================================

#[test]
fn test_ternary_keeps_logical_test() {
    let expr = parse_expression("a || b ? c : d").unwrap();
    match expr {
        Expr::Conditional { test, .. } => {
            assert_eq!(*test, Expr::binary("||", ident("a"), ident("b")));
        }
        other => panic!("Expected conditional, got {:?}", other),
    }
}

#[test]
fn test_nested_ternary_in_alternate() {
    let expr = parse_expression("a ? b : c ? d : e").unwrap();
    match expr {
        Expr::Conditional { alternate, .. } => {
            assert!(matches!(*alternate, Expr::Conditional { .. }));
        }
        other => panic!("Expected conditional, got {:?}", other),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_right_operand() {
    let err = parse_expression("a + ").unwrap_err();
    assert_eq!(err.description, "Expected expression after +");
    assert_eq!(err.index, 4);
    assert_eq!(err.to_string(), "Expected expression after + at character 4");
}

#[test]
fn test_unclosed_constructs() {
    assert_eq!(parse_expression("a[0").unwrap_err().description, "Unclosed [");
    assert_eq!(parse_expression("(a").unwrap_err().description, "Unclosed (");
    assert!(
        parse_expression("'abc")
            .unwrap_err()
            .description
            .starts_with("Unclosed quote after")
    );
    assert_eq!(parse_expression("f(a").unwrap_err().description, "Expected )");
}

#[test]
fn test_bad_numbers() {
    assert!(
        parse_expression("1e")
            .unwrap_err()
            .description
            .starts_with("Expected exponent")
    );
    assert!(
        parse_expression("12abc")
            .unwrap_err()
            .description
            .starts_with("Variable names cannot start with a number")
    );
    assert_eq!(
        parse_expression("1.2.3").unwrap_err().description,
        "Unexpected period"
    );
}

#[test]
fn test_argument_list_errors() {
    assert_eq!(
        parse_expression("f(a,,b)").unwrap_err().description,
        "Unexpected token ,"
    );
    assert_eq!(
        parse_expression("f(a, b c)").unwrap_err().description,
        "Expected comma"
    );
}

#[test]
fn test_unexpected_character() {
    let err = parse_expression("a # b").unwrap_err();
    assert!(err.description.starts_with("Unexpected"));
}

// ============================================================================
// Nesting limits
// ============================================================================

fn nested(open: &str, inner: &str, close: &str, levels: usize) -> String {
    format!("{}{}{}", open.repeat(levels), inner, close.repeat(levels))
}

fn assert_too_deep(source: &str) {
    let err = parse_expression(source).unwrap_err();
    assert_eq!(err.description, "Maximum nesting depth exceeded", "{:.40}", source);
}

#[test]
fn test_deep_nesting_is_rejected() {
    assert_too_deep(&nested("(", "1", ")", 1_000));
    assert_too_deep(&nested("[", "1", "]", 1_000));
    assert_too_deep(&nested("f(", "1", ")", 1_000));
    assert_too_deep(&nested("a[", "0", "]", 1_000));
    assert_too_deep(&format!("{}a", "!".repeat(1_000)));
    assert_too_deep(&format!("{}c", "a ? b : ".repeat(1_000)));
}

#[test]
fn test_long_chains_are_rejected() {
    assert_too_deep(&vec!["1"; 1_000].join(" + "));
    assert_too_deep(&vec!["a"; 1_000].join(" ** "));
    assert_too_deep(&format!("a{}", ".b".repeat(1_000)));
    assert_too_deep(&format!("a{}", "()".repeat(1_000)));
}

#[test]
fn test_moderate_nesting_parses() {
    assert_eq!(parse_expression(&nested("(", "1", ")", 20)).unwrap(), num(1.0));
    assert!(parse_expression(&nested("[", "1", "]", 10)).is_ok());
    assert!(parse_expression(&format!("{}a", "!".repeat(20))).is_ok());
    assert!(parse_expression(&vec!["1"; 30].join(" + ")).is_ok());
    assert!(parse_expression(&format!("a{}", ".b".repeat(30))).is_ok());
}

#[test]
fn test_parsed_trees_stay_within_the_limit() {
    let source = nested("(", &vec!["1"; 20].join(" + "), " + 1)", 2);
    let expr = parse_expression(&source).unwrap();
    assert!(expr.depth() <= MAX_NESTING_DEPTH);

    // Left operands that are themselves long chains still count
    let chain = vec!["1"; 25].join(" + ");
    let source = format!("(({}) + {}) + {}", chain, chain, chain);
    assert_too_deep(&source);
}

// ============================================================================
// Grammar configuration
// ============================================================================

#[test]
fn test_custom_binary_operator() {
    let mut grammar = GrammarConfig::default();
    grammar.add_binary_op("^^", 3.5, false);
    let expr = Parser::parse_with(&grammar, "a ^^ b").unwrap();
    assert!(matches!(&expr, Expr::Binary { operator, .. } if operator == "^^"));
}

#[test]
fn test_word_binary_operator() {
    let mut grammar = GrammarConfig::default();
    grammar.add_binary_op("and", 2.0, false);
    let expr = grammar.parse("a and b").unwrap();
    assert_eq!(expr, Expr::binary("and", ident("a"), ident("b")));

    // `andy` is an identifier, not `and` followed by `y`
    let expr = grammar.parse("a andy").unwrap();
    assert_eq!(
        expr,
        Expr::Compound {
            body: vec![ident("a"), ident("andy")]
        }
    );
}

#[test]
fn test_removed_operator_is_rejected() {
    let mut grammar = GrammarConfig::default();
    grammar.remove_binary_op("%");
    assert!(grammar.parse("a % b").is_err());
    assert!(!grammar.is_binary_op("%"));
}

#[test]
fn test_custom_literal_and_identifier_char() {
    let mut grammar = GrammarConfig::default();
    grammar.add_literal("yes", Literal::Boolean(true));
    grammar.add_identifier_char('@');
    assert!(matches!(
        grammar.parse("yes").unwrap(),
        Expr::Literal { value: Literal::Boolean(true), .. }
    ));
    assert_eq!(grammar.parse("@name").unwrap(), ident("@name"));
}

#[test]
fn test_this_keyword_can_be_renamed() {
    let mut grammar = GrammarConfig::default();
    grammar.set_this_keyword("self");
    assert_eq!(grammar.parse("self").unwrap(), Expr::This);
    assert_eq!(grammar.parse("this").unwrap(), ident("this"));
}

#[test]
fn test_ast_serializes_with_type_tags() {
    let expr = parse_expression("a.b + 1").unwrap();
    let json = serde_json::to_value(&expr).unwrap();
    assert_eq!(json["type"], "BinaryExpression");
    assert_eq!(json["operator"], "+");
    assert_eq!(json["left"]["type"], "MemberExpression");
    assert_eq!(json["right"]["raw"], "1");
}
