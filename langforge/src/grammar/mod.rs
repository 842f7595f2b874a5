//! # Context-free grammar loading and augmentation (component H)
//! A [Grammar] is loaded from `LHS ::= α₁ | α₂ | …` lines: one or more right-hand-side alternatives,
//! each a whitespace-separated list of symbols. The grammar never declares its terminals directly —
//! they're inferred once loading finishes, as every symbol that appears on some right-hand side but
//! never as a left-hand side. `ε` on a right-hand side is the reserved marker for the empty string and
//! is normalized away at load time: a rule written `A ::= ε` is stored with an empty right-hand side,
//! so every later stage (closure, FIRST/FOLLOW, the parser stack) only has to handle "empty rhs", not a
//! separate epsilon symbol.
pub mod driver;
pub mod first_follow;
pub mod lr0;
pub mod slr;

use nom::bytes::complete::{tag, take_until};
use nom::combinator::rest;
use nom::sequence::separated_pair;
use nom::IResult;
use std::rc::Rc;
use thiserror::Error;

/// The reserved right-hand-side token denoting the empty string. Normalized to an empty `rhs` by
/// [Grammar::load] and never appears in a [Production]'s `rhs` afterward.
pub const EPSILON: &str = "ε";

/// End-of-input marker used in FOLLOW sets and the augmented grammar's accept condition.
pub const END_MARKER: &str = "$";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: Rc<str>,
    pub rhs: Vec<Rc<str>>,
}

impl Production {
    /// True for a production whose right-hand side is empty (written `ε` in the source grammar).
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("no productions were loaded")]
    Empty,
    #[error("line {0} is missing '::=': {1:?}")]
    MissingSeparator(usize, String),
    #[error("line {0} has an empty left-hand side: {1:?}")]
    EmptyLhs(usize, String),
    #[error("line {0} has an empty alternative on the right-hand side: {1:?}")]
    EmptyAlternative(usize, String),
}

/// Splits a production line on its `::=`, the way [nfa/dfa transition tables](crate::parser) are split
/// into fields: a small `nom` combinator rather than a hand-rolled scan.
fn lhs_and_rhs(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_until("::="), tag("::="), rest)(input)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar {
    pub non_terminals: Vec<Rc<str>>,
    pub terminals: Vec<Rc<str>>,
    pub start_symbol: Rc<str>,
    pub productions: Vec<Production>,
}

impl Grammar {
    /// Parses `source` line by line. Blank lines and lines starting with `#` are skipped. The first
    /// left-hand side seen becomes the start symbol.
    pub fn load(source: &str) -> Result<Grammar, GrammarError> {
        let mut non_terminals: Vec<Rc<str>> = Vec::new();
        let mut start_symbol: Option<Rc<str>> = None;
        let mut productions: Vec<Production> = Vec::new();

        for (line_no, raw_line) in source.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (_, (lhs_part, rhs_part)) = lhs_and_rhs(line)
                .map_err(|_| GrammarError::MissingSeparator(line_no + 1, line.to_string()))?;
            let lhs = lhs_part.trim();
            if lhs.is_empty() {
                return Err(GrammarError::EmptyLhs(line_no + 1, line.to_string()));
            }
            let lhs: Rc<str> = Rc::from(lhs);

            if start_symbol.is_none() {
                start_symbol = Some(lhs.clone());
            }
            if !non_terminals.contains(&lhs) {
                non_terminals.push(lhs.clone());
            }

            for alternative in rhs_part.split('|') {
                let symbols: Vec<&str> = alternative.split_whitespace().collect();
                if symbols.is_empty() {
                    return Err(GrammarError::EmptyAlternative(line_no + 1, line.to_string()));
                }
                let rhs = if symbols == [EPSILON] {
                    Vec::new()
                } else {
                    symbols.into_iter().map(Rc::from).collect()
                };
                productions.push(Production {
                    lhs: lhs.clone(),
                    rhs,
                });
            }
        }

        let start_symbol = start_symbol.ok_or(GrammarError::Empty)?;

        let mut terminals: Vec<Rc<str>> = Vec::new();
        for production in &productions {
            for symbol in &production.rhs {
                if !non_terminals.contains(symbol) && !terminals.contains(symbol) {
                    terminals.push(symbol.clone());
                }
            }
        }

        Ok(Grammar {
            non_terminals,
            terminals,
            start_symbol,
            productions,
        })
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.iter().any(|t| t.as_ref() == symbol)
    }

    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.non_terminals.iter().any(|n| n.as_ref() == symbol)
    }

    pub fn productions_of<'a>(&'a self, lhs: &'a str) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| p.lhs.as_ref() == lhs)
    }

    /// Prepends a fresh start production `S' → S` and makes `S'` the new start symbol, appending
    /// primes to `S'` until the name is unused. Required before building the LR(0) canonical
    /// collection (§4.J): it gives the parser a single accept state, reached only once the whole
    /// original start symbol has been reduced and nothing follows it.
    pub fn augmented(&self) -> Grammar {
        let mut augmented_start = format!("{}'", self.start_symbol);
        while self.non_terminals.iter().any(|n| n.as_ref() == augmented_start) {
            augmented_start.push('\'');
        }
        let augmented_start: Rc<str> = Rc::from(augmented_start);

        let mut non_terminals = Vec::with_capacity(self.non_terminals.len() + 1);
        non_terminals.push(augmented_start.clone());
        non_terminals.extend(self.non_terminals.iter().cloned());

        let mut productions = Vec::with_capacity(self.productions.len() + 1);
        productions.push(Production {
            lhs: augmented_start.clone(),
            rhs: vec![self.start_symbol.clone()],
        });
        productions.extend(self.productions.iter().cloned());

        Grammar {
            non_terminals,
            terminals: self.terminals.clone(),
            start_symbol: augmented_start,
            productions,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not load grammar: {0}")]
    Grammar(#[from] GrammarError),
    #[error("could not build parsing table: {0}")]
    Table(#[from] slr::SlrError),
}

/// Runs the whole pipeline (components H–K) over `source`: loads the grammar, augments it, computes
/// FIRST/FOLLOW, builds the LR(0) canonical collection, and compiles the SLR(1) table. Returns the
/// augmented grammar (whose production indices the table's [slr::Action::Reduce] entries refer to)
/// alongside the table, ready to feed [driver::Driver::new].
pub fn compile(source: &str) -> Result<(Grammar, slr::Table), CompileError> {
    let grammar = Grammar::load(source)?.augmented();
    let collection = lr0::canonical_collection(&grammar);
    let first = first_follow::first_sets(&grammar);
    let follow = first_follow::follow_sets(&grammar, &first);
    let table = slr::build(&grammar, &collection, &follow)?;
    Ok((grammar, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_alternatives_and_infers_terminals() {
        let grammar = Grammar::load(
            "
            # a tiny expression grammar
            E ::= E + T | T
            T ::= T * F | F
            F ::= ( E ) | id
            ",
        )
        .unwrap();

        assert_eq!(grammar.start_symbol.as_ref(), "E");
        assert_eq!(grammar.non_terminals.len(), 3);
        assert!(grammar.is_non_terminal("E"));
        assert!(grammar.is_non_terminal("T"));
        assert!(grammar.is_non_terminal("F"));
        for terminal in ["+", "*", "(", ")", "id"] {
            assert!(grammar.is_terminal(terminal), "{terminal} should be a terminal");
        }
        assert_eq!(grammar.productions.len(), 6);
    }

    #[test]
    fn epsilon_alternative_normalizes_to_empty_rhs() {
        let grammar = Grammar::load("A ::= a A | ε").unwrap();
        let empty_count = grammar.productions.iter().filter(|p| p.is_empty()).count();
        assert_eq!(empty_count, 1);
    }

    #[test]
    fn rejects_a_line_without_the_separator() {
        let err = Grammar::load("A -> a").unwrap_err();
        assert!(matches!(err, GrammarError::MissingSeparator(1, _)));
    }

    #[test]
    fn augmentation_prepends_a_fresh_start_production() {
        let grammar = Grammar::load("S ::= a S | a").unwrap().augmented();
        assert_eq!(grammar.start_symbol.as_ref(), "S'");
        assert_eq!(grammar.productions[0].lhs.as_ref(), "S'");
        assert_eq!(grammar.productions[0].rhs, vec![Rc::from("S")]);
    }

    #[test]
    fn augmentation_avoids_clashing_with_an_existing_prime() {
        let grammar = Grammar::load("S ::= a\nS' ::= b").unwrap().augmented();
        assert_eq!(grammar.start_symbol.as_ref(), "S''");
    }

    #[test]
    fn compile_builds_a_usable_table_for_an_unambiguous_grammar() {
        let (grammar, table) = compile("E ::= E + T | T\nT ::= id").unwrap();
        assert_eq!(grammar.productions[0].lhs.as_ref(), "E'");
        assert!(table.action.values().flat_map(|row| row.values()).count() > 0);
    }

    #[test]
    fn compile_rejects_an_ambiguous_grammar() {
        let err = compile("E ::= E + E | id").unwrap_err();
        assert!(matches!(err, CompileError::Table(_)));
    }
}
