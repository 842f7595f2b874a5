//! # Longest-match lexer runtime (component G)
//! Scans an input string against the combined DFA produced by [crate::lexer::subset::build], greedily
//! extending each token to the longest prefix the DFA still accepts. Grapheme-by-grapheme, mirroring
//! [crate::dfa::Dfa::accepts_graphemes]: one extended grapheme cluster is one step of the automaton.
use crate::dfa::Dfa;
use crate::lexer::token_kind::TokenKind;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// The sentinel kind name a [TokenRecord] carries when no pattern matched at its starting position.
pub const ERROR_KIND: &str = "erro!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub lexeme: Rc<str>,
    pub kind: Rc<str>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("input ended before the DFA reached an accepting state (matched {0:?} so far)")]
    IncompleteMatch(String),
}

/// Tokenizes `input` against `dfa`, resolving each accepting state to its [TokenKind] name via
/// `token_map`. At every position the scan advances grapheme by grapheme for as long as the DFA has a
/// defined transition, remembering the most recent position at which it was accepting. When no further
/// progress is possible, that remembered position ends the token; if none was ever reached, a single
/// grapheme is emitted tagged [ERROR_KIND] and the scan resumes one grapheme later (§4.G) — an
/// unrecognized character never aborts the whole scan.
pub fn tokenize(dfa: &Dfa, token_map: &HashMap<usize, TokenKind>, input: &str) -> Vec<TokenRecord> {
    let graphemes: Vec<&str> = input.graphemes(true).collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < graphemes.len() {
        let mut evaluator = dfa.evaluator();
        let mut last_accept: Option<(usize, Rc<str>)> = None;
        let mut cursor = pos;

        loop {
            if let Some(kind) = resolve(token_map, evaluator.current_state_idx()) {
                last_accept = Some((cursor, kind));
            }
            if cursor >= graphemes.len() {
                break;
            }
            if evaluator.step(graphemes[cursor]).is_none() {
                break;
            }
            cursor += 1;
        }

        match last_accept {
            Some((end, kind)) if end > pos => {
                tokens.push(TokenRecord {
                    lexeme: Rc::from(graphemes[pos..end].concat()),
                    kind,
                });
                pos = end;
            }
            _ => {
                tracing::debug!(grapheme = graphemes[pos], position = pos, "no pattern matched, emitting error token");
                tokens.push(TokenRecord {
                    lexeme: Rc::from(graphemes[pos]),
                    kind: Rc::from(ERROR_KIND),
                });
                pos += 1;
            }
        }
    }

    tokens
}

/// The per-line variant used to check that an entire line is exactly one token: rejects unless the
/// whole line is consumed and the DFA ends in an accepting state.
pub fn match_line(
    dfa: &Dfa,
    token_map: &HashMap<usize, TokenKind>,
    line: &str,
) -> Result<TokenRecord, LexError> {
    let graphemes: Vec<&str> = line.graphemes(true).collect();
    let mut evaluator = dfa.evaluator();
    for g in &graphemes {
        evaluator.step(g);
    }
    if !evaluator.is_accepting() {
        return Err(LexError::IncompleteMatch(line.to_string()));
    }
    match resolve(token_map, evaluator.current_state_idx()) {
        Some(kind) => Ok(TokenRecord {
            lexeme: Rc::from(line),
            kind,
        }),
        None => Err(LexError::IncompleteMatch(line.to_string())),
    }
}

/// Breaks a tie between several patterns matching the same prefix by picking the kind with the
/// lowest [TokenKind::priority] — explicit carried data rather than an accident of NFA branch order.
fn resolve(token_map: &HashMap<usize, TokenKind>, state_idx: usize) -> Option<Rc<str>> {
    token_map.get(&state_idx).map(|k| k.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::direct::build as build_dfa;
    use crate::lexer::subset::build as build_subset;
    use crate::lexer::tagged_nfa::combine;
    use crate::regex::compile_pattern;
    use crate::syntax::build as build_tree;

    fn dfa_for(pattern: &str) -> Dfa {
        let postfix = compile_pattern(pattern).unwrap();
        let tree = build_tree(&postfix).unwrap();
        build_dfa(&tree)
    }

    fn lexer(patterns: Vec<(TokenKind, &str)>) -> (Dfa, HashMap<usize, TokenKind>) {
        let patterns = patterns
            .into_iter()
            .map(|(kind, pat)| (kind, dfa_for(pat)))
            .collect();
        let tagged = combine(patterns).unwrap();
        build_subset(&tagged)
    }

    #[test]
    fn greedily_matches_the_longest_prefix() {
        let number = TokenKind::new("NUMBER", 0);
        let dot = TokenKind::new("DOT", 0);
        let (dfa, token_map) = lexer(vec![(number, "[0-9]+"), (dot, "\\.")]);
        let tokens = tokenize(&dfa, &token_map, "123.45");
        assert_eq!(tokens[0].lexeme.as_ref(), "123");
        assert_eq!(tokens[0].kind.as_ref(), "NUMBER");
        assert_eq!(tokens[1].lexeme.as_ref(), ".");
        assert_eq!(tokens[2].lexeme.as_ref(), "45");
    }

    #[test]
    fn keyword_beats_identifier_at_equal_length_by_priority() {
        let keyword = TokenKind::new("IF", 0);
        let identifier = TokenKind::new("IDENTIFIER", 1);
        let (dfa, token_map) = lexer(vec![(keyword, "if"), (identifier, "[a-z]+")]);
        let tokens = tokenize(&dfa, &token_map, "if");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind.as_ref(), "IF");
    }

    #[test]
    fn unrecognized_character_becomes_an_error_token_and_scanning_continues() {
        let identifier = TokenKind::new("IDENTIFIER", 0);
        let (dfa, token_map) = lexer(vec![(identifier, "[a-z]+")]);
        let tokens = tokenize(&dfa, &token_map, "ab1cd");
        let rendered: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.kind.as_ref(), t.lexeme.as_ref()))
            .collect();
        assert_eq!(
            rendered,
            vec![("IDENTIFIER", "ab"), (ERROR_KIND, "1"), ("IDENTIFIER", "cd")]
        );
    }

    #[test]
    fn whitespace_between_tokens_needs_its_own_pattern() {
        let identifier = TokenKind::new("IDENTIFIER", 0);
        let space = TokenKind::new("SPACE", 0);
        let (dfa, token_map) = lexer(vec![(identifier, "[a-z]+"), (space, " +")]);
        let tokens = tokenize(&dfa, &token_map, "foo bar");
        let names: Vec<&str> = tokens.iter().map(|t| t.kind.as_ref()).collect();
        assert_eq!(names, vec!["IDENTIFIER", "SPACE", "IDENTIFIER"]);
    }

    #[test]
    fn match_line_requires_the_whole_line_to_match() {
        let identifier = TokenKind::new("IDENTIFIER", 0);
        let (dfa, token_map) = lexer(vec![(identifier, "[a-z]+")]);
        assert!(match_line(&dfa, &token_map, "abc").is_ok());
        assert_eq!(
            match_line(&dfa, &token_map, "abc1"),
            Err(LexError::IncompleteMatch("abc1".to_string()))
        );
    }
}
