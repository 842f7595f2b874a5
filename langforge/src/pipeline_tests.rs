//! End-to-end tests driving the lexer and the grammar compiler together, the way a real caller would
//! chain them: a lexer built from an ordered pattern file feeds the token stream straight into an
//! SLR(1) driver built from a separately compiled grammar.
use crate::grammar::driver::{Driver, ParseError, Token};
use crate::grammar::{compile, driver};
use crate::lexer::Lexer;
use std::rc::Rc;

fn expr_lexer() -> Lexer {
    Lexer::from_definitions(&[
        "id: [a-zA-Z]([a-zA-Z]|[0-9])*",
        "plus: +",
        "times: *",
        "lpar: (",
        "rpar: )",
    ])
    .unwrap()
}

fn rendered(lexer: &Lexer, input: &str) -> Vec<(String, String)> {
    lexer
        .tokenize(input)
        .into_iter()
        .map(|t| (t.lexeme.to_string(), t.kind.to_string()))
        .collect()
}

#[test]
fn tokenizes_an_arithmetic_expression() {
    let lexer = expr_lexer();
    let tokens = rendered(&lexer, "a1+b*(c)");
    assert_eq!(
        tokens,
        vec![
            ("a1".into(), "id".into()),
            ("+".into(), "plus".into()),
            ("b".into(), "id".into()),
            ("*".into(), "times".into()),
            ("(".into(), "lpar".into()),
            ("c".into(), "id".into()),
            (")".into(), "rpar".into()),
        ]
    );
}

#[test]
fn leading_digit_is_not_an_id_and_recovers_as_an_error_token() {
    let lexer = expr_lexer();
    let tokens = rendered(&lexer, "1a");
    assert_eq!(
        tokens,
        vec![("1".into(), driver::LEX_ERROR_KIND.into()), ("a".into(), "id".into())]
    );
}

fn expr_grammar_tokens() -> Vec<Token> {
    let lexer = expr_lexer();
    lexer
        .tokenize("a1+b*(c)")
        .into_iter()
        .filter(|t| t.kind.as_ref() != driver::LEX_ERROR_KIND)
        .map(|t| Token { lexeme: t.lexeme, kind: t.kind })
        .collect()
}

fn expr_driver() -> Driver {
    let (grammar, table) = compile(
        "
        E ::= E + T | T
        T ::= T * F | F
        F ::= ( E ) | id
        ",
    )
    .unwrap();
    Driver::new(table, grammar.productions)
}

#[test]
fn accepts_a_full_expression_and_builds_its_symbol_table() {
    let driver = expr_driver();
    let tokens = expr_grammar_tokens();
    let (outcome, result) = driver.parse(&tokens);
    assert_eq!(result, Ok(()));
    assert_eq!(outcome.steps.last().unwrap(), "accept");

    let entries: Vec<_> = outcome.symbol_table.entries().collect();
    assert_eq!(entries.len(), 3);
    assert_eq!((entries[0].0, entries[0].1), (1, "a1"));
    assert_eq!((entries[1].0, entries[1].1), (2, "b"));
    assert_eq!((entries[2].0, entries[2].1), (3, "c"));
}

#[test]
fn a_trailing_operator_with_no_right_operand_is_rejected() {
    let driver = expr_driver();
    let lexer = expr_lexer();
    let tokens: Vec<Token> = lexer
        .tokenize("a1+")
        .into_iter()
        .map(|t| Token { lexeme: t.lexeme, kind: t.kind })
        .collect();
    let (outcome, result) = driver.parse(&tokens);
    assert!(matches!(result, Err(ParseError::NoAction(_, _))));
    assert!(!outcome.steps.is_empty(), "partial trace survives a rejection");
}

#[test]
fn pattern_listing_order_decides_the_priority_tie() {
    let id_first = Lexer::from_definitions(&["id: [a-zA-Z]+", "kw: for"]).unwrap();
    assert_eq!(rendered(&id_first, "for"), vec![("for".into(), "id".into())]);

    let kw_first = Lexer::from_definitions(&["kw: for", "id: [a-zA-Z]+"]).unwrap();
    assert_eq!(rendered(&kw_first, "for"), vec![("for".into(), "kw".into())]);
}
