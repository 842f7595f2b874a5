//! # FIRST and FOLLOW set computation (component I)
use crate::grammar::{Grammar, EPSILON, END_MARKER};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type SymbolSet = HashSet<Rc<str>>;
pub type SymbolSets = HashMap<Rc<str>, SymbolSet>;

/// Computes FIRST(X) for every terminal and non-terminal `X` by fixed-point iteration. A terminal's
/// FIRST set is just itself. [EPSILON] appearing in a non-terminal's FIRST set means that non-terminal
/// can derive the empty string; it never appears in a terminal's own FIRST set.
pub fn first_sets(grammar: &Grammar) -> SymbolSets {
    let mut first: SymbolSets = HashMap::new();

    for terminal in &grammar.terminals {
        first.entry(terminal.clone()).or_default().insert(terminal.clone());
    }
    for non_terminal in &grammar.non_terminals {
        first.entry(non_terminal.clone()).or_default();
    }

    let epsilon: Rc<str> = Rc::from(EPSILON);
    let mut changed = true;
    while changed {
        changed = false;

        for production in &grammar.productions {
            let before = first.get(&production.lhs).map(SymbolSet::len).unwrap_or(0);

            if production.is_empty() {
                changed |= first.entry(production.lhs.clone()).or_default().insert(epsilon.clone());
                continue;
            }

            let mut nullable_prefix = true;
            for symbol in &production.rhs {
                let symbol_first = first.get(symbol).cloned().unwrap_or_default();
                let without_epsilon: Vec<Rc<str>> = symbol_first
                    .iter()
                    .filter(|s| s.as_ref() != EPSILON)
                    .cloned()
                    .collect();
                let entry = first.entry(production.lhs.clone()).or_default();
                for s in without_epsilon {
                    entry.insert(s);
                }
                if !symbol_first.contains(EPSILON) {
                    nullable_prefix = false;
                    break;
                }
            }
            if nullable_prefix {
                first.entry(production.lhs.clone()).or_default().insert(epsilon.clone());
            }

            let after = first.get(&production.lhs).map(SymbolSet::len).unwrap_or(0);
            if after > before {
                changed = true;
            }
        }
    }

    first
}

/// Computes FOLLOW(A) for every non-terminal `A`, given `first` from [first_sets]. FOLLOW(start) always
/// contains [END_MARKER]. For `A → αBβ`, FOLLOW(B) gains FIRST(β) minus ε; if β is nullable (or empty),
/// FOLLOW(B) also gains FOLLOW(A). Swept right to left over each production's rhs, carrying a
/// "trailer" — what can legally follow the suffix processed so far.
pub fn follow_sets(grammar: &Grammar, first: &SymbolSets) -> SymbolSets {
    let mut follow: SymbolSets = HashMap::new();
    for non_terminal in &grammar.non_terminals {
        follow.entry(non_terminal.clone()).or_default();
    }
    follow
        .entry(grammar.start_symbol.clone())
        .or_default()
        .insert(Rc::from(END_MARKER));

    let mut changed = true;
    while changed {
        changed = false;

        for production in &grammar.productions {
            let mut trailer = follow.get(&production.lhs).cloned().unwrap_or_default();

            for symbol in production.rhs.iter().rev() {
                if grammar.is_non_terminal(symbol) {
                    let before = follow.get(symbol).map(SymbolSet::len).unwrap_or(0);
                    let entry = follow.entry(symbol.clone()).or_default();
                    for t in &trailer {
                        entry.insert(t.clone());
                    }
                    let after = follow.get(symbol).map(SymbolSet::len).unwrap_or(0);
                    if after > before {
                        changed = true;
                    }

                    let symbol_first = first.get(symbol).cloned().unwrap_or_default();
                    if symbol_first.contains(EPSILON) {
                        let without_epsilon: SymbolSet = symbol_first
                            .into_iter()
                            .filter(|s| s.as_ref() != EPSILON)
                            .collect();
                        trailer.extend(without_epsilon);
                    } else {
                        trailer = symbol_first;
                    }
                } else {
                    trailer = first.get(symbol).cloned().unwrap_or_else(|| {
                        let mut set = SymbolSet::new();
                        set.insert(symbol.clone());
                        set
                    });
                }
            }
        }
    }

    follow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        Grammar::load(
            "
            E ::= T E'
            E' ::= + T E' | ε
            T ::= F T'
            T' ::= * F T' | ε
            F ::= ( E ) | id
            ",
        )
        .unwrap()
    }

    #[test]
    fn first_of_a_nullable_chain_includes_what_follows_it() {
        let grammar = grammar();
        let first = first_sets(&grammar);
        assert_eq!(
            first["E"].clone(),
            HashSet::from([Rc::from("("), Rc::from("id")])
        );
        assert!(first["E'"].contains(EPSILON));
        assert!(first["E'"].contains("+"));
    }

    #[test]
    fn follow_of_start_symbol_contains_end_marker() {
        let grammar = grammar();
        let first = first_sets(&grammar);
        let follow = follow_sets(&grammar, &first);
        assert!(follow["E"].contains(END_MARKER));
        assert!(follow["E'"].contains(END_MARKER));
        assert!(follow["F"].contains("+"));
        assert!(follow["F"].contains("*"));
        assert!(follow["F"].contains(")"));
    }
}
