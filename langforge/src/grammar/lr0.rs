//! # LR(0) canonical collection (component J)
//! An [Item] is a production together with a dot position, `A → α·β`, referenced by index into the
//! (augmented) grammar's production list rather than carrying its own copy of the right-hand side.
//! A state is the set of items reachable by [closure] from some starting item; two states are the same
//! state iff they contain the same items, so states are looked up by their sorted item list as a
//! canonical hash key instead of the linear "is this set already in the list" scan a naive port would
//! do — that scan is quadratic in the number of states, which matters once a grammar has more than a
//! couple dozen productions.
use crate::grammar::Grammar;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
}

pub type State = BTreeSet<Item>;

/// The canonical LR(0) item sets (`states[0]` is the initial state, for `S' → ·S`) and the transition
/// function between them, keyed by grammar symbol.
pub struct CanonicalCollection {
    pub states: Vec<State>,
    pub transitions: HashMap<(usize, Rc<str>), usize>,
}

fn symbol_after_dot<'g>(grammar: &'g Grammar, item: &Item) -> Option<&'g Rc<str>> {
    grammar.productions[item.production].rhs.get(item.dot)
}

/// Adds, for every item `A → α·Bβ` in `items` where `B` is a non-terminal, every production `B → γ`
/// as a new item `B → ·γ` — repeated to a fixed point, since the newly added item may itself have a
/// non-terminal right after its dot.
pub fn closure(items: &State, grammar: &Grammar) -> State {
    let mut closure_set = items.clone();
    let mut frontier: Vec<Item> = items.iter().copied().collect();

    while let Some(item) = frontier.pop() {
        let Some(symbol) = symbol_after_dot(grammar, &item) else {
            continue;
        };
        if !grammar.is_non_terminal(symbol) {
            continue;
        }
        for (index, production) in grammar.productions.iter().enumerate() {
            if production.lhs.as_ref() != symbol.as_ref() {
                continue;
            }
            let new_item = Item { production: index, dot: 0 };
            if closure_set.insert(new_item) {
                frontier.push(new_item);
            }
        }
    }

    closure_set
}

/// The state reached from `items` by shifting the dot over `symbol`: every item `A → α·Xβ` with
/// `X = symbol` becomes `A → αX·β`, then the result is closed. Empty (no item advances on `symbol`)
/// means there is no transition on that symbol from this state.
pub fn goto(items: &State, symbol: &str, grammar: &Grammar) -> State {
    let advanced: State = items
        .iter()
        .filter(|item| symbol_after_dot(grammar, item).is_some_and(|s| s.as_ref() == symbol))
        .map(|item| Item { production: item.production, dot: item.dot + 1 })
        .collect();
    if advanced.is_empty() {
        advanced
    } else {
        closure(&advanced, grammar)
    }
}

/// Builds the canonical collection for `grammar`, which must already be [augmented](Grammar::augmented)
/// — `grammar.productions[0]` is taken as `S' → S`. States are numbered in breadth-first discovery
/// order, which the SLR table builder (§4.K) relies on to report a conflict against the lower-indexed
/// of the two states involved.
pub fn canonical_collection(grammar: &Grammar) -> CanonicalCollection {
    let start_item = Item { production: 0, dot: 0 };
    let start_state = closure(&BTreeSet::from([start_item]), grammar);

    let mut states: Vec<State> = vec![start_state.clone()];
    let mut index_of: HashMap<Vec<Item>, usize> = HashMap::new();
    index_of.insert(start_state.into_iter().collect(), 0);

    let mut transitions: HashMap<(usize, Rc<str>), usize> = HashMap::new();
    let mut queue: VecDeque<usize> = VecDeque::from([0]);

    while let Some(state_index) = queue.pop_front() {
        let mut symbols: Vec<Rc<str>> = Vec::new();
        for item in &states[state_index] {
            if let Some(symbol) = symbol_after_dot(grammar, item) {
                if !symbols.contains(symbol) {
                    symbols.push(symbol.clone());
                }
            }
        }

        for symbol in symbols {
            let target = goto(&states[state_index], &symbol, grammar);
            if target.is_empty() {
                continue;
            }
            let key: Vec<Item> = target.iter().copied().collect();
            let target_index = *index_of.entry(key).or_insert_with(|| {
                states.push(target.clone());
                queue.push_back(states.len() - 1);
                states.len() - 1
            });
            transitions.insert((state_index, symbol), target_index);
        }
    }

    CanonicalCollection { states, transitions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    #[test]
    fn canonical_collection_of_a_small_grammar_has_the_expected_shape() {
        let grammar = Grammar::load("S ::= a S | a").unwrap().augmented();
        let collection = canonical_collection(&grammar);
        assert!(!collection.states.is_empty());
        assert!(collection.states[0].contains(&Item { production: 0, dot: 0 }));
        // Both productions' "after consuming a" items live together in goto(state0, "a").
        let via_a = *collection.transitions.get(&(0, Rc::from("a"))).unwrap();
        assert!(collection.states[via_a].iter().any(|i| i.dot == 1));
    }

    #[test]
    fn identical_item_sets_collapse_to_one_state() {
        let grammar = Grammar::load("S ::= A | B\nA ::= a\nB ::= a").unwrap().augmented();
        let collection = canonical_collection(&grammar);
        let via_a_from_start = collection.transitions.get(&(0, Rc::from("a")));
        assert!(via_a_from_start.is_some());
    }
}
