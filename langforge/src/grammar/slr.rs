//! # SLR(1) ACTION/GOTO table construction (component K)
//! Reads shift and goto entries straight off the canonical collection's transitions, and reduce/accept
//! entries off each state's complete items, consulting FOLLOW sets to decide which lookaheads a reduction
//! applies under. Unlike a naive port that lets a later entry silently overwrite an earlier one, any
//! attempt to write two different actions into the same `(state, symbol)` cell is rejected as a
//! shift/reduce or reduce/reduce conflict rather than resolved by insertion order.
use crate::grammar::first_follow::SymbolSets;
use crate::grammar::lr0::CanonicalCollection;
use crate::grammar::{Grammar, END_MARKER};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlrError {
    #[error("shift/reduce conflict in state {0} on {1:?}")]
    ShiftReduce(usize, String),
    #[error("reduce/reduce conflict in state {0} on {1:?}")]
    ReduceReduce(usize, String),
}

#[derive(Debug)]
pub struct Table {
    pub action: HashMap<usize, HashMap<Rc<str>, Action>>,
    pub goto: HashMap<usize, HashMap<Rc<str>, usize>>,
}

impl Table {
    pub fn action(&self, state: usize, symbol: &str) -> Option<Action> {
        self.action.get(&state)?.get(symbol).copied()
    }

    pub fn goto(&self, state: usize, symbol: &str) -> Option<usize> {
        self.goto.get(&state)?.get(symbol).copied()
    }
}

fn set(
    action: &mut HashMap<usize, HashMap<Rc<str>, Action>>,
    state: usize,
    symbol: Rc<str>,
    new: Action,
) -> Result<(), SlrError> {
    let row = action.entry(state).or_default();
    match row.get(&symbol) {
        None => {
            row.insert(symbol, new);
            Ok(())
        }
        Some(existing) if *existing == new => Ok(()),
        Some(Action::Shift(_)) => {
            tracing::warn!(state, symbol = %symbol, "shift/reduce conflict");
            Err(SlrError::ShiftReduce(state, symbol.to_string()))
        }
        Some(Action::Reduce(_)) if matches!(new, Action::Shift(_)) => {
            tracing::warn!(state, symbol = %symbol, "shift/reduce conflict");
            Err(SlrError::ShiftReduce(state, symbol.to_string()))
        }
        Some(Action::Reduce(_)) => {
            tracing::warn!(state, symbol = %symbol, "reduce/reduce conflict");
            Err(SlrError::ReduceReduce(state, symbol.to_string()))
        }
        Some(Action::Accept) => Err(SlrError::ReduceReduce(state, symbol.to_string())),
    }
}

/// Builds the table for an already-[augmented](Grammar::augmented) `grammar`. `follow` must be the
/// FOLLOW sets of that same augmented grammar (FOLLOW(S') is never consulted, but the augmented
/// start symbol itself is what triggers the accept action).
pub fn build(grammar: &Grammar, collection: &CanonicalCollection, follow: &SymbolSets) -> Result<Table, SlrError> {
    let mut action: HashMap<usize, HashMap<Rc<str>, Action>> = HashMap::new();
    let mut goto: HashMap<usize, HashMap<Rc<str>, usize>> = HashMap::new();

    for (state_index, state) in collection.states.iter().enumerate() {
        for item in state {
            let production = &grammar.productions[item.production];

            if item.dot < production.rhs.len() {
                let symbol = &production.rhs[item.dot];
                let Some(&target) = collection.transitions.get(&(state_index, symbol.clone())) else {
                    continue;
                };
                if grammar.is_terminal(symbol) {
                    set(&mut action, state_index, symbol.clone(), Action::Shift(target))?;
                } else {
                    goto.entry(state_index).or_default().insert(symbol.clone(), target);
                }
                continue;
            }

            if production.lhs == grammar.start_symbol {
                set(&mut action, state_index, Rc::from(END_MARKER), Action::Accept)?;
                continue;
            }

            for terminal in follow.get(&production.lhs).into_iter().flatten() {
                set(&mut action, state_index, terminal.clone(), Action::Reduce(item.production))?;
            }
        }
    }

    Ok(Table { action, goto })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::first_follow::{first_sets, follow_sets};
    use crate::grammar::lr0::canonical_collection;

    fn table_for(source: &str) -> (Grammar, Table) {
        let grammar = Grammar::load(source).unwrap().augmented();
        let collection = canonical_collection(&grammar);
        let first = first_sets(&grammar);
        let follow = follow_sets(&grammar, &first);
        let table = build(&grammar, &collection, &follow).unwrap();
        (grammar, table)
    }

    #[test]
    fn accept_action_exists_for_the_final_state() {
        let (_, table) = table_for("S ::= a S | a");
        assert!(table
            .action
            .values()
            .flat_map(|row| row.values())
            .any(|a| matches!(a, Action::Accept)));
    }

    #[test]
    fn every_reduce_targets_a_real_production() {
        let (grammar, table) = table_for(
            "
            E ::= E + T | T
            T ::= id
            ",
        );
        for action in table.action.values().flat_map(|row| row.values()) {
            if let Action::Reduce(index) = action {
                assert!(*index < grammar.productions.len());
            }
        }
    }

    #[test]
    fn ambiguous_grammar_is_rejected_as_a_conflict() {
        let grammar = Grammar::load("E ::= E + E | id").unwrap().augmented();
        let collection = canonical_collection(&grammar);
        let first = first_sets(&grammar);
        let follow = follow_sets(&grammar, &first);
        let result = build(&grammar, &collection, &follow);
        assert!(result.is_err());
    }
}
