//! # langforge
//!
//! `langforge` is a compiler front-end construction toolkit: regular expressions compiled directly to
//! DFAs via the followpos method, several patterns' automata combined into one priority-tagged
//! longest-match lexer, and context-free grammars compiled to LR(0)/SLR(1) parsing tables driven by a
//! stack machine.
//!
//! ## Pipeline
//!
//! - [regex] compiles a `name: pattern` definition to postfix form (component A).
//! - [syntax] builds the annotated syntax tree and followpos table (component B).
//! - [dfa::direct] builds a DFA straight from one pattern's followpos table, no NFA required (component C).
//! - [lexer::tagged_nfa] and [lexer::subset] combine several patterns into one DFA, tagging accepting
//!   states with the [lexer::TokenKind] they resolve to (components D–F).
//! - [lexer::runtime] scans input against that DFA with longest-match, tagging any unrecognized
//!   character with the reserved [lexer::ERROR_KIND] rather than aborting the scan (component G).
//! - [grammar] augments a context-free grammar, builds its FIRST/FOLLOW sets and LR(0) canonical
//!   collection, compiles an SLR(1) ACTION/GOTO table and drives it with a stack machine to parse a
//!   token stream into a parse tree (components H–L).
//!
//! [dfa] and [nfa] also retain the general-purpose automata algebra (union, intersection, minimization,
//! table parsing) this toolkit's automaton constructions are built on top of.
//!
//! ## Automata file format
//!
//! [parser::dfa] and [parser::nfa] parse DFAs and NFAs (with or without epsilon transitions) from a
//! transition-table text format; see the [parser] module for the full grammar. [lexer::serial] parses
//! and writes a different, line-oriented format for persisting the combined lexer DFA (see [lexer]).
//!
//! ## Operations
//!
//! This library supports:
//!
//! * Compiling [named regex patterns](regex::compile_definition) straight to a [DFA](dfa::direct::build)
//! * Building a whole-language [Lexer](lexer::Lexer) from several patterns and [tokenizing](lexer::Lexer::tokenize) text with it
//! * [Parsing](parser::dfa) and [validating](dfa::parse) DFAs, and [parsing](parser::nfa) and [validating](nfa::parse) NFAs
//! * Generating a table suitable for re-parsing of [DFAs](dfa::Dfa::to_table) and [NFAs](nfa::Nfa::to_table)
//! * Converting [DFAs to NFAs](dfa::Dfa::to_nfa), and [NFAs to DFAs](nfa::Nfa::to_dfa)
//! * [Checking whether two DFAs or two NFAs are equivalent](dfa::Dfa::equivalent_to)
//! * Checking if a string is accepted by a [DFA](dfa::Dfa::accepts) or [NFA](nfa::Nfa::accepts)
//! * [Step-by-step evaluation of a string](dfa::Dfa::evaluator)
//! * [Identifying and removing unreachable states from a DFA](dfa::Dfa::unreachable_states)
//! * [Identifying and merging non-distinguishable states from a DFA](dfa::Dfa::state_equivalence_classes)
//! * [Minimizing a DFA](dfa::Dfa::minimize) (by executing the two above-mentioned steps)
//! * Building a [Grammar](grammar::Grammar), compiling its [SLR(1) table](grammar::slr::Table) and
//!   [parsing](grammar::driver::Driver::parse) a token stream with it

pub mod dfa;
pub mod grammar;
pub mod lexer;
pub mod nfa;
pub mod parser;
pub mod regex;
pub mod syntax;
mod table;
mod util;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod pipeline_tests;
