//! # Direct DFA construction (component C)
//! Builds a [Dfa] straight from one pattern's [SyntaxTree] using followpos, without ever building an
//! intermediate NFA (the McNaughton–Yamada–Thompson direct method). States are sets of tree positions;
//! two positions that can follow each other in the same input symbol are merged into one DFA state by
//! the worklist below.
//!
//! A state with no outgoing transition on some alphabet symbol is routed to a single trailing
//! non-accepting trap state that self-loops on every symbol. This keeps [Dfa]'s transition function
//! total (as every other automaton in this crate expects) while behaving exactly like an "undefined
//! transition breaks the match" rule to any caller: the trap state can never become accepting again, so
//! [crate::lexer::runtime] never records a new longest match after entering it.
use crate::dfa::{Dfa, DfaState};
use crate::syntax::{LeafSymbol, Position, SyntaxTree};
use std::collections::HashMap;
use std::rc::Rc;

/// Builds a DFA recognizing exactly the language of `tree`.
pub fn build(tree: &SyntaxTree) -> Dfa {
    let mut alphabet: Vec<char> = tree
        .leaf_symbols
        .values()
        .filter_map(|s| match s {
            LeafSymbol::Literal(c) => Some(*c),
            LeafSymbol::EndMarker => None,
        })
        .collect();
    alphabet.sort_unstable();
    alphabet.dedup();

    let mut discovered: Vec<Vec<Position>> = Vec::new();
    let mut index_of: HashMap<Vec<Position>, usize> = HashMap::new();
    let mut transitions: Vec<Vec<Option<usize>>> = Vec::new();

    let start = sorted(tree.root.firstpos());
    index_of.insert(start.clone(), 0);
    discovered.push(start);
    transitions.push(vec![None; alphabet.len()]);

    let mut worklist = vec![0usize];
    while let Some(state_idx) = worklist.pop() {
        let state = discovered[state_idx].clone();
        for (symbol_idx, &symbol) in alphabet.iter().enumerate() {
            let mut target = Vec::new();
            for &p in &state {
                if tree.leaf_symbols.get(&p) == Some(&LeafSymbol::Literal(symbol)) {
                    target.extend(tree.followpos.get(&p).into_iter().flatten().copied());
                }
            }
            if target.is_empty() {
                continue;
            }
            let target = sorted(&target);
            let target_idx = *index_of.entry(target.clone()).or_insert_with(|| {
                let idx = discovered.len();
                discovered.push(target.clone());
                transitions.push(vec![None; alphabet.len()]);
                worklist.push(idx);
                idx
            });
            transitions[state_idx][symbol_idx] = Some(target_idx);
        }
    }

    let trap = discovered.len();
    let rc_alphabet: Rc<[Rc<str>]> = alphabet
        .iter()
        .map(|c| Rc::from(c.to_string()))
        .collect::<Vec<_>>()
        .into();

    let mut states: Vec<DfaState> = discovered
        .iter()
        .enumerate()
        .map(|(idx, positions)| DfaState {
            name: Rc::from(format!("q{idx}")),
            initial: idx == 0,
            accepting: positions.contains(&tree.end_marker_position),
            transitions: transitions[idx]
                .iter()
                .map(|t| t.unwrap_or(trap))
                .collect(),
        })
        .collect();
    states.push(DfaState {
        name: Rc::from("dead"),
        initial: false,
        accepting: false,
        transitions: vec![trap; alphabet.len()],
    });

    Dfa {
        alphabet: rc_alphabet,
        states,
        initial_state: 0,
    }
}

/// Rewrites `dfa`'s alphabet to `global`, which must be a superset of `dfa`'s own alphabet. Every
/// symbol `global` adds gets routed to the trap state, the last state [build] always appends, so a
/// pattern that never uses that symbol still rejects it rather than producing an undefined transition.
/// Used before combining several patterns' DFAs into one NFA (see [crate::lexer::tagged_nfa]), since
/// [crate::nfa::Nfa::union] requires both operands to share the same alphabet.
pub fn extend_alphabet(dfa: Dfa, global: &[Rc<str>]) -> Dfa {
    let trap = dfa.states().len() - 1;
    let old_index: HashMap<&str, usize> = dfa
        .alphabet()
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_ref(), i))
        .collect();

    let states = dfa
        .states()
        .iter()
        .map(|state| DfaState {
            name: Rc::from(state.name()),
            initial: state.is_initial(),
            accepting: state.is_accepting(),
            transitions: global
                .iter()
                .map(|symbol| {
                    old_index
                        .get(symbol.as_ref())
                        .map(|&i| state.transitions()[i])
                        .unwrap_or(trap)
                })
                .collect(),
        })
        .collect();

    Dfa {
        alphabet: global.to_vec().into(),
        states,
        initial_state: dfa.initial_state_index(),
    }
}

fn sorted(positions: &[Position]) -> Vec<Position> {
    let mut v = positions.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::compile_pattern;
    use crate::syntax::build as build_tree;

    fn dfa_for(pattern: &str) -> Dfa {
        let postfix = compile_pattern(pattern).unwrap();
        let tree = build_tree(&postfix).unwrap();
        build(&tree)
    }

    #[test]
    fn accepts_exact_literal() {
        let dfa = dfa_for("ab");
        assert!(dfa.accepts_graphemes("ab"));
        assert!(!dfa.accepts_graphemes("a"));
        assert!(!dfa.accepts_graphemes("abc"));
    }

    #[test]
    fn star_accepts_empty_and_repeats() {
        let dfa = dfa_for("a*");
        assert!(dfa.accepts_graphemes(""));
        assert!(dfa.accepts_graphemes("aaaa"));
        assert!(!dfa.accepts_graphemes("aaab"));
    }

    #[test]
    fn plus_requires_one_occurrence() {
        let dfa = dfa_for("a+");
        assert!(!dfa.accepts_graphemes(""));
        assert!(dfa.accepts_graphemes("a"));
        assert!(dfa.accepts_graphemes("aaa"));
    }

    #[test]
    fn identifier_pattern_from_scenario_s1() {
        let dfa = dfa_for("[a-zA-Z]([a-zA-Z]|[0-9])*");
        assert!(dfa.accepts_graphemes("a1"));
        assert!(dfa.accepts_graphemes("Z"));
        assert!(!dfa.accepts_graphemes("1a"));
    }

    #[test]
    fn extend_alphabet_routes_new_symbols_to_trap() {
        let dfa = dfa_for("a");
        let global: Vec<Rc<str>> = vec![Rc::from("a"), Rc::from("b")];
        let extended = extend_alphabet(dfa, &global);
        assert_eq!(extended.alphabet(), global.as_slice());
        assert!(extended.accepts_graphemes("a"));
        assert!(!extended.accepts_graphemes("b"));
        assert!(!extended.accepts_graphemes("ab"));
    }

    #[test]
    fn transition_function_is_total() {
        let dfa = dfa_for("a");
        for state in dfa.states() {
            assert_eq!(state.transitions().len(), dfa.alphabet().len());
        }
    }
}
