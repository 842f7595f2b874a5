//! # Pattern union with priority tagging (component E)
//! Combines several patterns' direct-built DFAs into a single NFA via [Nfa::union], remembering which
//! [TokenKind] each accepting state came from. This is where the carried-priority design settles: rather
//! than reconstructing "which pattern did this come from" from NFA branch offsets after the fact, every
//! accepting state is tagged with its [TokenKind] the moment it is created and the tag rides along
//! through every later subset construction.
use crate::dfa::{direct, Dfa};
use crate::lexer::token_kind::TokenKind;
use crate::nfa::Nfa;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, PartialEq)]
pub struct TaggedNfa {
    pub nfa: Nfa,
    pub token_of_state: HashMap<usize, TokenKind>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaggedNfaError {
    #[error("no patterns were supplied")]
    Empty,
}

/// Combines one DFA per pattern into a single tagged NFA. Patterns need not share an alphabet: symbols
/// absent from a pattern are routed to that pattern's own trap state via [direct::extend_alphabet]
/// before union, so "this pattern doesn't use that symbol" and "this pattern rejects that symbol"
/// coincide.
pub fn combine(patterns: Vec<(TokenKind, Dfa)>) -> Result<TaggedNfa, TaggedNfaError> {
    let mut patterns = patterns.into_iter();
    let (first_kind, first_dfa) = patterns.next().ok_or(TaggedNfaError::Empty)?;

    let mut global_alphabet: Vec<Rc<str>> = first_dfa.alphabet().to_vec();
    let rest: Vec<(TokenKind, Dfa)> = patterns.collect();
    for (_, dfa) in &rest {
        global_alphabet.extend(dfa.alphabet().iter().cloned());
    }
    global_alphabet.sort_unstable();
    global_alphabet.dedup();

    let mut token_of_state = HashMap::new();
    let first_dfa = direct::extend_alphabet(first_dfa, &global_alphabet);
    tag_accepting(&first_dfa, &first_kind, 0, &mut token_of_state);
    let mut combined = first_dfa.to_nfa();

    for (kind, dfa) in rest {
        let dfa = direct::extend_alphabet(dfa, &global_alphabet);
        let base = combined.states().len();
        tag_accepting(&dfa, &kind, base, &mut token_of_state);
        let nfa = dfa.to_nfa();
        combined = combined
            .union(nfa)
            .map_err(|_| TaggedNfaError::Empty)?;
    }

    Ok(TaggedNfa {
        nfa: combined,
        token_of_state,
    })
}

fn tag_accepting(dfa: &Dfa, kind: &TokenKind, base: usize, out: &mut HashMap<usize, TokenKind>) {
    for (idx, state) in dfa.states().iter().enumerate() {
        if state.is_accepting() {
            out.insert(base + idx, kind.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::direct::build as build_dfa;
    use crate::regex::compile_pattern;
    use crate::syntax::build as build_tree;

    fn dfa_for(pattern: &str) -> Dfa {
        let postfix = compile_pattern(pattern).unwrap();
        let tree = build_tree(&postfix).unwrap();
        build_dfa(&tree)
    }

    #[test]
    fn rejects_empty_pattern_list() {
        assert_eq!(combine(vec![]), Err(TaggedNfaError::Empty));
    }

    #[test]
    fn tags_every_pattern_accepting_state() {
        let number = TokenKind::new("NUMBER", 1);
        let identifier = TokenKind::new("IDENTIFIER", 2);
        let tagged = combine(vec![
            (number, dfa_for("[0-9]+")),
            (identifier, dfa_for("[a-z]+")),
        ])
        .unwrap();
        assert!(!tagged.token_of_state.is_empty());
        assert!(tagged.nfa.accepts_graphemes("123"));
        assert!(tagged.nfa.accepts_graphemes("abc"));
        assert!(!tagged.nfa.accepts_graphemes("12a"));
    }
}
