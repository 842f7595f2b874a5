//! # Subset construction with token resolution (component F)
//! A variant of [crate::nfa::Nfa::to_dfa]'s subset construction that additionally resolves, for every
//! newly discovered DFA state, which [TokenKind] it accepts. A DFA state is a set of NFA state indices;
//! when more than one of them is a tagged accepting state, the state's winner is the lowest-priority
//! tagged kind, the same rule [crate::lexer::runtime] uses to break a longest-match tie.
use crate::dfa::{Dfa, DfaState};
use crate::lexer::tagged_nfa::TaggedNfa;
use crate::lexer::token_kind::TokenKind;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Builds the combined DFA and the map from DFA state index to the token kind it accepts. States not
/// present in the map are non-accepting (or, in pathological cases, accepting states whose NFA states
/// carry no tag at all, which cannot happen for DFAs produced by [crate::lexer::tagged_nfa::combine]).
pub fn build(tagged: &TaggedNfa) -> (Dfa, HashMap<usize, TokenKind>) {
    let nfa = &tagged.nfa;
    let mut gen = 0usize..;
    let mut map: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut accepting: HashSet<usize> = HashSet::new();
    let mut token_map: HashMap<usize, TokenKind> = HashMap::new();
    let mut transitions: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
    let mut to_explore = vec![nfa.evaluator()];

    let resolve = |idx_set: &HashSet<usize>| -> Option<TokenKind> {
        idx_set
            .iter()
            .filter_map(|i| tagged.token_of_state.get(i))
            .min_by_key(|k| k.priority)
            .cloned()
    };

    {
        let initial = &to_explore[0];
        let key = set_to_vec(initial.current_states_idx());
        let n = gen.next().unwrap();
        map.insert(key, n);
        if initial.is_accepting() {
            accepting.insert(n);
            if let Some(kind) = resolve(initial.current_states_idx()) {
                token_map.insert(n, kind);
            }
        }
    }

    while let Some(eval) = to_explore.pop() {
        let mut tr = Vec::with_capacity(nfa.alphabet().len());
        for new_evaluator in eval.step_all() {
            let is_accepting = new_evaluator.is_accepting();
            let key = set_to_vec(new_evaluator.current_states_idx());
            let is_new = !map.contains_key(&key);
            let resolved = if is_accepting {
                resolve(new_evaluator.current_states_idx())
            } else {
                None
            };
            let n = *map.entry(key.clone()).or_insert_with(|| gen.next().unwrap());
            tr.push(n);
            if is_accepting {
                accepting.insert(n);
                if let Some(kind) = resolved {
                    token_map.entry(n).or_insert(kind);
                }
            }
            if is_new {
                to_explore.push(new_evaluator);
            }
        }
        transitions.insert(set_to_vec(eval.current_states_idx()), tr);
    }

    let mut sorted_keys: Vec<(&Vec<usize>, &usize)> = map.iter().collect();
    sorted_keys.sort_by_key(|(_, &n)| n);

    let alphabet: Rc<[Rc<str>]> = nfa.alphabet().to_vec().into();
    let states = sorted_keys
        .into_iter()
        .map(|(key, &n)| DfaState {
            name: Rc::from(n.to_string()),
            initial: n == 0,
            accepting: accepting.contains(&n),
            transitions: transitions.remove(key).unwrap(),
        })
        .collect();

    (
        Dfa {
            alphabet,
            states,
            initial_state: 0,
        },
        token_map,
    )
}

fn set_to_vec(set: &HashSet<usize>) -> Vec<usize> {
    let mut v: Vec<usize> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::direct::build as build_dfa;
    use crate::lexer::tagged_nfa::combine;
    use crate::regex::compile_pattern;
    use crate::syntax::build as build_tree;

    fn dfa_for(pattern: &str) -> Dfa {
        let postfix = compile_pattern(pattern).unwrap();
        let tree = build_tree(&postfix).unwrap();
        build_dfa(&tree)
    }

    #[test]
    fn keyword_outranks_identifier_on_tie() {
        let keyword = TokenKind::new("IF", 0);
        let identifier = TokenKind::new("IDENTIFIER", 1);
        let tagged = combine(vec![
            (keyword, dfa_for("if")),
            (identifier, dfa_for("[a-z]+")),
        ])
        .unwrap();
        let (dfa, token_map) = build(&tagged);

        let mut evaluator = dfa.evaluator();
        evaluator.step_multiple(&["i", "f"]).unwrap();
        let idx = evaluator.current_state_idx();
        assert_eq!(token_map[&idx].name.as_ref(), "IF");
    }

    #[test]
    fn non_accepting_states_have_no_token() {
        let identifier = TokenKind::new("IDENTIFIER", 0);
        let tagged = combine(vec![(identifier, dfa_for("[a-z]+"))]).unwrap();
        let (dfa, token_map) = build(&tagged);
        assert!(token_map.len() < dfa.states().len());
    }
}
