// tests/parser_tests.rs

use elx_lang::{
    BinOp, Designator, ErrorCode, ErrorKind, EvalContext, FunctionMapper, Lexer,
    MAX_NESTING_DEPTH, Node, Parser, RelOp, UnaryOp, Value, parse,
};
use pretty_assertions::assert_eq;

/// Parses a template holding exactly one expression and returns its body.
fn expr(src: &str) -> Node {
    match parse(src) {
        Ok(Node::Composite(mut parts)) if parts.len() == 1 => parts.remove(0),
        other => panic!("expected a single expression from {src:?}, got {other:?}"),
    }
}

/// Error codes raised while parsing `src`.
fn error_codes(src: &str) -> Vec<u32> {
    let mut parser = Parser::new(Lexer::new(src));
    parser.parse();
    parser.diagnostics().iter().map(|d| d.code).collect()
}

fn int(n: i64) -> Node {
    Node::literal(Value::Integer(n), n.to_string())
}

fn id(name: &str) -> Node {
    Node::identifier(name)
}

fn binary(op: BinOp, operands: Vec<Node>) -> Node {
    Node::Binary { op, operands }
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_text_only() {
    assert_eq!(
        parse("hello world").unwrap(),
        Node::Composite(vec![Node::text("hello world")])
    );
}

#[test]
fn test_empty_template() {
    assert_eq!(parse("").unwrap(), Node::Composite(vec![]));
}

#[test]
fn test_text_and_expressions_in_order() {
    assert_eq!(
        parse("a${x}b#{y}").unwrap(),
        Node::Composite(vec![Node::text("a"), id("x"), Node::text("b"), id("y")])
    );
}

#[test]
fn test_closing_brace_in_text_after_expression() {
    assert_eq!(
        parse("${x}}").unwrap(),
        Node::Composite(vec![id("x"), Node::text("}")])
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(expr("${42}"), int(42));
    assert_eq!(expr("${2.50}"), Node::literal(Value::Double(2.5), "2.50"));
    assert_eq!(expr("${true}"), Node::literal(Value::Boolean(true), "true"));
    assert_eq!(expr("${null}"), Node::literal(Value::Null, "null"));
    assert_eq!(expr(r"${'a\'b'}"), Node::text("a'b"));
}

// ============================================================================
// Precedence and Chains
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        expr("${1 + 2 * 3}"),
        binary(
            BinOp::Add,
            vec![int(1), binary(BinOp::Multiply, vec![int(2), int(3)])]
        )
    );
}

#[test]
fn test_same_operator_chain_folds() {
    assert_eq!(
        expr("${1 + 2 + 3}"),
        binary(BinOp::Add, vec![int(1), int(2), int(3)])
    );
    assert_eq!(
        expr("${a and b && c}"),
        binary(BinOp::And, vec![id("a"), id("b"), id("c")])
    );
}

#[test]
fn test_operator_change_nests_left() {
    assert_eq!(
        expr("${1 + 2 - 3}"),
        binary(
            BinOp::Subtract,
            vec![binary(BinOp::Add, vec![int(1), int(2)]), int(3)]
        )
    );
}

#[test]
fn test_word_operators() {
    assert_eq!(
        expr("${a div b mod c}"),
        binary(
            BinOp::Modulo,
            vec![binary(BinOp::Divide, vec![id("a"), id("b")]), id("c")]
        )
    );
    assert_eq!(
        expr("${a or b}"),
        binary(BinOp::Or, vec![id("a"), id("b")])
    );
}

#[test]
fn test_relation() {
    assert_eq!(
        expr("${a + 1 lt b}"),
        Node::Relation {
            op: RelOp::LessThan,
            left: Box::new(binary(BinOp::Add, vec![id("a"), int(1)])),
            right: Box::new(id("b")),
        }
    );
    assert!(matches!(
        expr("${a <> b}"),
        Node::Relation {
            op: RelOp::NotEqual,
            ..
        }
    ));
}

#[test]
fn test_choice_nests_to_the_right() {
    assert_eq!(
        expr("${a ? 1 : b ? 2 : 3}"),
        Node::Choice {
            condition: Box::new(id("a")),
            then: Box::new(int(1)),
            otherwise: Box::new(Node::Choice {
                condition: Box::new(id("b")),
                then: Box::new(int(2)),
                otherwise: Box::new(int(3)),
            }),
        }
    );
}

#[test]
fn test_grouping() {
    assert_eq!(
        expr("${(1 + 2) * 3}"),
        binary(
            BinOp::Multiply,
            vec![
                Node::Grouping(Box::new(binary(BinOp::Add, vec![int(1), int(2)]))),
                int(3)
            ]
        )
    );
}

// ============================================================================
// Unary Operators
// ============================================================================

#[test]
fn test_unary_minus_wraps_term() {
    assert_eq!(
        expr("${-a * b + 1}"),
        binary(
            BinOp::Add,
            vec![
                Node::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(binary(BinOp::Multiply, vec![id("a"), id("b")])),
                },
                int(1)
            ]
        )
    );
}

#[test]
fn test_unary_plus_is_dropped() {
    assert_eq!(expr("${+5}"), int(5));
}

#[test]
fn test_empty_and_not() {
    assert_eq!(
        expr("${empty x}"),
        Node::Unary {
            op: UnaryOp::Empty,
            operand: Box::new(id("x")),
        }
    );
    assert_eq!(
        expr("${not a and !b}"),
        binary(
            BinOp::And,
            vec![
                Node::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(id("a")),
                },
                Node::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(id("b")),
                },
            ]
        )
    );
}

// ============================================================================
// Designators
// ============================================================================

#[test]
fn test_designator_chain() {
    assert_eq!(
        expr("${user.address[0].city}"),
        Node::Identifier {
            name: "user".to_string(),
            designators: vec![
                Designator::Member("address".to_string()),
                Designator::Index(int(0)),
                Designator::Member("city".to_string()),
            ],
        }
    );
}

#[test]
fn test_function_call() {
    assert_eq!(
        expr("${fn:join(items, ', ')}"),
        Node::Identifier {
            name: "fn:join".to_string(),
            designators: vec![Designator::Call(vec![id("items"), Node::text(", ")])],
        }
    );
}

#[test]
fn test_method_call_without_arguments() {
    assert_eq!(
        expr("${list.size()}"),
        Node::Identifier {
            name: "list".to_string(),
            designators: vec![
                Designator::Member("size".to_string()),
                Designator::Call(vec![]),
            ],
        }
    );
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_missing_operand() {
    assert_eq!(error_codes("${}"), vec![ErrorCode::OperandExpected.code()]);
    assert_eq!(error_codes("${1 +}"), vec![ErrorCode::OperandExpected.code()]);
}

#[test]
fn test_operator_expected() {
    assert_eq!(error_codes("${a b}"), vec![ErrorCode::OperatorExpected.code()]);
}

#[test]
fn test_brace_expected() {
    assert_eq!(error_codes("${a )}"), vec![ErrorCode::BraceExpected.code()]);
    assert_eq!(error_codes("${a"), vec![ErrorCode::BraceExpected.code()]);
}

#[test]
fn test_closing_delimiters() {
    assert_eq!(error_codes("${(1 + 2}"), vec![ErrorCode::RParenExpected.code()]);
    assert_eq!(error_codes("${a[1}"), vec![ErrorCode::RBracketExpected.code()]);
    assert_eq!(error_codes("${f(1, 2}"), vec![ErrorCode::RParenExpected.code()]);
}

#[test]
fn test_identifier_expected_after_dot() {
    assert_eq!(error_codes("${a.}"), vec![ErrorCode::IdentifierExpected.code()]);
    assert_eq!(error_codes("${a.1}"), vec![
        ErrorCode::IdentifierExpected.code(),
        ErrorCode::OperatorExpected.code(),
    ]);
}

#[test]
fn test_colon_expected() {
    let codes = error_codes("${a ? b}");
    assert_eq!(codes[0], ErrorCode::ColonExpected.code());
}

#[test]
fn test_invalid_symbol() {
    assert_eq!(error_codes("${@}"), vec![ErrorCode::InvalidSymbol.code()]);
}

#[test]
fn test_nesting_up_to_the_limit_parses() {
    let depth = MAX_NESTING_DEPTH - 1;
    let src = format!("${{{}7{}}}", "(".repeat(depth), ")".repeat(depth));
    let node = parse(&src).unwrap();
    assert_eq!(node.evaluate_to_string(&mut EvalContext::default()).unwrap(), "7");
}

#[test]
fn test_deep_nesting_is_reported_not_overflowed() {
    let codes = error_codes(&format!("${{{}", "(".repeat(200_000)));
    assert_eq!(codes[0], ErrorCode::NestingTooDeep.code());
    assert_eq!(
        codes
            .iter()
            .filter(|&&c| c == ErrorCode::NestingTooDeep.code())
            .count(),
        1
    );

    let codes = error_codes(&format!("${{{}true}} after", "not ".repeat(50_000)));
    assert_eq!(codes, vec![ErrorCode::NestingTooDeep.code()]);

    let codes = error_codes(&format!("${{{}0}}", "a[".repeat(50_000)));
    assert_eq!(codes[0], ErrorCode::NestingTooDeep.code());
}

#[test]
fn test_parsing_resumes_after_deep_nesting() {
    let src = format!("${{{}1}} tail ${{x}}", "(".repeat(1_000));
    let mut parser = Parser::new(Lexer::new(&src));
    let node = parser.parse();
    assert_eq!(parser.diagnostics()[0].code, ErrorCode::NestingTooDeep.code());
    assert!(parser.diagnostics()[0].message().contains("nested too deeply"));
    let Node::Composite(parts) = node else {
        panic!("expected composite");
    };
    assert_eq!(parts[parts.len() - 2], Node::text(" tail "));
    assert_eq!(parts[parts.len() - 1], id("x"));
}

#[test]
fn test_literal_is_not_an_array() {
    let mut parser = Parser::new(Lexer::new("${1[0]}"));
    parser.parse();
    let diagnostics = parser.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::NotAnArray.code());
    assert_eq!(diagnostics[0].kind, ErrorKind::Semantic);
}

#[test]
fn test_too_many_parameters_with_known_functions() {
    let functions = FunctionMapper::with_standard_functions();
    let mut parser = Parser::new(Lexer::new("${fn:trim('a', 'b')} ${fn:trim('a')}"))
        .with_functions(&functions);
    parser.parse();
    assert_eq!(parser.error_count(), 1);
    assert_eq!(parser.diagnostics()[0].code, ErrorCode::TooManyParameters.code());
    assert_eq!(parser.diagnostics()[0].kind, ErrorKind::Semantic);

    // Without the mapper the call is not checked
    assert!(parse("${fn:trim('a', 'b')}").is_ok());
}

#[test]
fn test_several_diagnostics_from_one_source() {
    let mut parser = Parser::new(Lexer::new("${1 +} and ${* 2} end"));
    let node = parser.parse();
    assert_eq!(parser.error_count(), 2);

    // Recovery keeps the surrounding text
    let Node::Composite(parts) = node else {
        panic!("expected composite");
    };
    assert_eq!(parts[1], Node::text(" and "));
    assert_eq!(parts[2], int(2));
    assert_eq!(parts[3], Node::text(" end"));
}

#[test]
fn test_recovery_resumes_after_brace() {
    let mut parser = Parser::new(Lexer::new("${a b} tail"));
    let node = parser.parse();
    assert_eq!(parser.error_count(), 1);
    assert_eq!(node, Node::Composite(vec![id("a"), Node::text(" tail")]));
}

#[test]
fn test_error_handler_sees_every_diagnostic() {
    let mut seen = Vec::new();
    {
        let mut parser = Parser::new(Lexer::new("ab ${1 +} ${@}"))
            .with_error_handler(|d| seen.push((d.code, d.kind, d.position, d.found.clone())));
        parser.parse();
    }
    assert_eq!(
        seen,
        vec![
            (7, ErrorKind::Syntax, 8, "}".to_string()),
            (11, ErrorKind::Syntax, 12, "@".to_string()),
        ]
    );
}

#[test]
fn test_parse_error_message() {
    let err = parse("${a + }").unwrap_err();
    assert_eq!(err.diagnostics.len(), 1);
    assert!(err.to_string().contains("operand expected"));
    assert_eq!(elx_lang::diagnostics::message(999), "unregistered error");
}

// ============================================================================
// Tree Helpers
// ============================================================================

#[test]
fn test_walk_is_pre_order() {
    let node = parse("${a + b * c(d)}").unwrap();
    let mut names = Vec::new();
    node.walk(&mut |n: &Node| {
        if let Node::Identifier { name, .. } = n {
            names.push(name.clone());
        }
    });
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_images() {
    assert_eq!(expr("${a + b}").image(), "+");
    assert_eq!(expr("${a ? b : c}").image(), "?:");
    assert_eq!(expr("${x.y}").image(), "x");
    assert_eq!(expr("${'txt'}").image(), "txt");
    assert_eq!(expr("${a ? b : c}").children().len(), 3);
}
