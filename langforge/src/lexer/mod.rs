//! # Regex-to-lexer pipeline
//! Wires components A through G together: compiling named patterns (component A), building each one's
//! syntax tree and followpos table (component B), constructing its DFA directly via the followpos
//! worklist (component C), tagging and unioning all the pattern DFAs into one NFA (components D/E),
//! re-running subset construction while resolving each state's winning token kind (component F), and
//! scanning input against the result with longest-match (component G).
pub mod runtime;
pub mod serial;
pub mod subset;
pub mod tagged_nfa;
pub mod token_kind;

use crate::dfa::{direct, Dfa};
use crate::regex::{self, RegexError};
use crate::syntax::{self, SyntaxError};
use std::collections::HashMap;
use tagged_nfa::{combine, TaggedNfaError};
use thiserror::Error;

pub use runtime::{LexError, TokenRecord, ERROR_KIND};
pub use token_kind::TokenKind;

#[derive(Debug, Error)]
pub enum LexerBuildError {
    #[error("pattern {0:?} does not compile: {1}")]
    Regex(String, RegexError),
    #[error("pattern {0:?} has a malformed syntax tree: {1}")]
    Syntax(String, SyntaxError),
    #[error("could not combine patterns: {0}")]
    Combine(#[from] TaggedNfaError),
}

/// A lexer compiled from an ordered set of named patterns, ready to tokenize input text.
#[derive(Debug)]
pub struct Lexer {
    dfa: Dfa,
    token_map: HashMap<usize, TokenKind>,
}

impl Lexer {
    /// Builds a lexer from `name: pattern` definition lines, in priority order: earlier lines win a
    /// longest-match tie over later ones (§11 of the design this module implements).
    #[tracing::instrument(skip(lines), fields(pattern_count = lines.len()))]
    pub fn from_definitions(lines: &[&str]) -> Result<Lexer, LexerBuildError> {
        let mut patterns = Vec::with_capacity(lines.len());
        for (priority, line) in lines.iter().enumerate() {
            let pattern = regex::compile_definition(line)
                .map_err(|e| LexerBuildError::Regex((*line).to_string(), e))?;
            let tree = syntax::build(&pattern.postfix)
                .map_err(|e| LexerBuildError::Syntax(pattern.name.clone(), e))?;
            let dfa = direct::build(&tree);
            patterns.push((TokenKind::new(pattern.name, priority), dfa));
        }
        let tagged = combine(patterns)?;
        let (dfa, token_map) = subset::build(&tagged);
        Ok(Lexer { dfa, token_map })
    }

    /// Tokenizes `input`, never failing outright: a character no pattern can start gets its own
    /// [ERROR_KIND] token and the scan continues after it.
    pub fn tokenize(&self, input: &str) -> Vec<TokenRecord> {
        runtime::tokenize(&self.dfa, &self.token_map, input)
    }

    /// Checks that `line` is, in its entirety, exactly one token.
    pub fn match_line(&self, line: &str) -> Result<TokenRecord, LexError> {
        runtime::match_line(&self.dfa, &self.token_map, line)
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_tokenizes_a_small_language() {
        let lexer = Lexer::from_definitions(&[
            "IF: if",
            "IDENTIFIER: [a-zA-Z_][a-zA-Z_0-9]*",
            "NUMBER: [0-9]+",
            "SPACE: \\ +",
        ])
        .unwrap();

        let tokens = lexer.tokenize("if x1 123");
        let rendered: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.kind.as_ref(), t.lexeme.as_ref()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("IF", "if"),
                ("SPACE", " "),
                ("IDENTIFIER", "x1"),
                ("SPACE", " "),
                ("NUMBER", "123"),
            ]
        );
    }

    #[test]
    fn rejects_an_unparseable_pattern() {
        let err = Lexer::from_definitions(&["BAD: ("]).unwrap_err();
        assert!(matches!(err, LexerBuildError::Regex(_, RegexError::UnmatchedOpenParen)));
    }
}
