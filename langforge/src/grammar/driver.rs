//! # SLR(1) stack machine (component L)
//! Drives an [Table] over a token stream: shift pushes a (symbol, state) pair, reduce pops `2 *
//! len(rhs)` entries (0 for an `ε` production) and re-pushes the reduced non-terminal with its GOTO
//! target, accept stops successfully, and any undefined `(state, token)` cell rejects the input. A
//! lexer's token kind names rarely match a grammar's terminal spelling one-for-one (a lexer calls it
//! `plus`, a grammar wants `+`), so an alias table translates kind names to terminals before every
//! lookup; it's supplied as configuration rather than hardcoded, since the default mapping only covers
//! one example language's reserved operator names.
use crate::grammar::slr::{Action, Table};
use crate::grammar::{Production, END_MARKER};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

/// The lexer error sentinel (see [crate::lexer::ERROR_KIND]); kept as a separate constant here so this
/// module doesn't need to depend on [crate::lexer] for a single string literal.
pub const LEX_ERROR_KIND: &str = "erro!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub lexeme: Rc<str>,
    pub kind: Rc<str>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("lexical error on {0:?}, sentence rejected")]
    LexicalError(Rc<str>),
    #[error("no action for (state {0}, token {1:?})")]
    NoAction(usize, Rc<str>),
    #[error("no transition for (state {0}, non-terminal {1:?})")]
    NoGoto(usize, Rc<str>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Id,
    Reserved,
}

/// An append-only mapping from first-seen lexeme to (1-based index, category). Every shifted lexeme is
/// interned here, reserved words aside, in the order the parser first shifts them.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: Vec<(Rc<str>, Category)>,
    index_of: HashMap<Rc<str>, usize>,
}

impl SymbolTable {
    pub fn add_or_get(&mut self, lexeme: &str, reserved_words: &HashSet<Rc<str>>) -> (usize, Category) {
        if let Some(&index) = self.index_of.get(lexeme) {
            return (index, self.entries[index - 1].1);
        }
        let category = if reserved_words.contains(lexeme) {
            Category::Reserved
        } else {
            Category::Id
        };
        let lexeme: Rc<str> = Rc::from(lexeme);
        self.entries.push((lexeme.clone(), category));
        let index = self.entries.len();
        self.index_of.insert(lexeme, index);
        (index, category)
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &str, Category)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (lexeme, category))| (i + 1, lexeme.as_ref(), *category))
    }
}

fn default_aliases() -> HashMap<Rc<str>, Rc<str>> {
    [
        ("plus", "+"),
        ("times", "*"),
        ("lpar", "("),
        ("rpar", ")"),
        ("minus", "-"),
        ("div", "/"),
    ]
    .into_iter()
    .map(|(k, v)| (Rc::from(k), Rc::from(v)))
    .collect()
}

fn default_reserved_words() -> HashSet<Rc<str>> {
    ["for", "if", "else", "while", "return"]
        .into_iter()
        .map(Rc::from)
        .collect()
}

enum StackEntry {
    State(usize),
    Symbol(Rc<str>),
}

pub struct ParseOutcome {
    pub steps: Vec<String>,
    pub symbol_table: SymbolTable,
}

pub struct Driver {
    table: Table,
    productions: Vec<Production>,
    aliases: HashMap<Rc<str>, Rc<str>>,
    reserved_words: HashSet<Rc<str>>,
}

impl Driver {
    /// `productions` must be the augmented grammar's production list — [Action::Reduce] indices refer
    /// into it directly, the same list the table was built against.
    pub fn new(table: Table, productions: Vec<Production>) -> Driver {
        Driver {
            table,
            productions,
            aliases: default_aliases(),
            reserved_words: default_reserved_words(),
        }
    }

    pub fn with_aliases(mut self, aliases: HashMap<Rc<str>, Rc<str>>) -> Driver {
        self.aliases = aliases;
        self
    }

    pub fn with_reserved_words(mut self, reserved_words: HashSet<Rc<str>>) -> Driver {
        self.reserved_words = reserved_words;
        self
    }

    fn remap<'a>(&'a self, kind: &'a str) -> &'a str {
        self.aliases.get(kind).map(|a| a.as_ref()).unwrap_or(kind)
    }

    /// Parses `tokens`, rejecting immediately if any carries [LEX_ERROR_KIND] before the stack machine
    /// takes a single step. An end-of-input sentinel is appended internally; callers never pass one.
    ///
    /// Always returns the [ParseOutcome] built so far, even on rejection: the steps taken and the
    /// symbol table entries interned before the failing step are printed on a rejection the same as on
    /// an accept, so the caller can show what the parser had built up to the error.
    pub fn parse(&self, tokens: &[Token]) -> (ParseOutcome, Result<(), ParseError>) {
        let mut steps = Vec::new();
        let mut symbol_table = SymbolTable::default();

        if let Some(bad) = tokens.iter().find(|t| t.kind.as_ref() == LEX_ERROR_KIND) {
            let outcome = ParseOutcome { steps, symbol_table };
            return (outcome, Err(ParseError::LexicalError(bad.lexeme.clone())));
        }

        let mut stream: Vec<Token> = tokens.to_vec();
        stream.push(Token {
            lexeme: Rc::from(END_MARKER),
            kind: Rc::from(END_MARKER),
        });

        let mut stack = vec![StackEntry::State(0)];
        let mut pointer = 0usize;

        loop {
            let state = match stack.last().unwrap() {
                StackEntry::State(s) => *s,
                StackEntry::Symbol(_) => unreachable!("stack must end on a state"),
            };
            let token = &stream[pointer];
            let terminal = self.remap(token.kind.as_ref());

            match self.table.action(state, terminal) {
                Some(Action::Shift(next_state)) => {
                    let interned = terminal == "id" || self.reserved_words.contains(token.lexeme.as_ref());
                    let step = if interned {
                        let (index, category) = symbol_table.add_or_get(&token.lexeme, &self.reserved_words);
                        format!(
                            "shift <{}, {:?}({index})> and go to state {next_state}",
                            token.lexeme, category
                        )
                    } else {
                        format!("shift {:?} and go to state {next_state}", token.lexeme)
                    };
                    steps.push(step);
                    stack.push(StackEntry::Symbol(Rc::from(terminal)));
                    stack.push(StackEntry::State(next_state));
                    pointer += 1;
                }
                Some(Action::Reduce(production_index)) => {
                    let production = &self.productions[production_index];
                    let pop_count = if production.is_empty() { 0 } else { 2 * production.rhs.len() };
                    for _ in 0..pop_count {
                        stack.pop();
                    }
                    let new_top = match stack.last().unwrap() {
                        StackEntry::State(s) => *s,
                        StackEntry::Symbol(_) => unreachable!("stack must end on a state"),
                    };
                    let lhs = production.lhs.clone();
                    let Some(goto_state) = self.table.goto(new_top, &lhs) else {
                        let outcome = ParseOutcome { steps, symbol_table };
                        return (outcome, Err(ParseError::NoGoto(new_top, lhs)));
                    };
                    steps.push(format!("reduce by {lhs} → {}", render_rhs(&production.rhs)));
                    stack.push(StackEntry::Symbol(lhs));
                    stack.push(StackEntry::State(goto_state));
                }
                Some(Action::Accept) => {
                    steps.push("accept".to_string());
                    let outcome = ParseOutcome { steps, symbol_table };
                    return (outcome, Ok(()));
                }
                None => {
                    let outcome = ParseOutcome { steps, symbol_table };
                    return (outcome, Err(ParseError::NoAction(state, Rc::from(terminal))));
                }
            }
        }
    }
}

fn render_rhs(rhs: &[Rc<str>]) -> String {
    if rhs.is_empty() {
        "ε".to_string()
    } else {
        rhs.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::compile;

    fn driver_for(source: &str) -> Driver {
        let (grammar, table) = compile(source).unwrap();
        Driver::new(table, grammar.productions)
    }

    fn token(lexeme: &str, kind: &str) -> Token {
        Token { lexeme: Rc::from(lexeme), kind: Rc::from(kind) }
    }

    #[test]
    fn accepts_a_valid_expression() {
        let driver = driver_for(
            "
            E ::= E + T | T
            T ::= T * F | F
            F ::= ( E ) | id
            ",
        );
        let tokens = vec![
            token("a", "id"),
            token("+", "+"),
            token("b", "id"),
            token("*", "*"),
            token("c", "id"),
        ];
        let (outcome, result) = driver.parse(&tokens);
        assert_eq!(result, Ok(()));
        assert_eq!(outcome.steps.last().unwrap(), "accept");
        let entries: Vec<_> = outcome.symbol_table.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1, "a");
    }

    #[test]
    fn rejects_a_malformed_expression() {
        let driver = driver_for("E ::= E + T | T\nT ::= id");
        let tokens = vec![token("a", "id"), token("+", "+"), token("+", "+")];
        let (outcome, result) = driver.parse(&tokens);
        assert!(matches!(result, Err(ParseError::NoAction(_, _))));
        assert!(!outcome.steps.is_empty());
    }

    #[test]
    fn lexical_error_token_rejects_before_parsing_starts() {
        let driver = driver_for("E ::= id");
        let tokens = vec![token("?", LEX_ERROR_KIND)];
        let (outcome, result) = driver.parse(&tokens);
        assert_eq!(result, Err(ParseError::LexicalError(Rc::from("?"))));
        assert!(outcome.steps.is_empty());
    }

    #[test]
    fn alias_table_translates_lexer_kinds_to_grammar_terminals() {
        let driver = driver_for("E ::= E + id | id");
        let tokens = vec![token("a", "id"), token("+", "plus"), token("b", "id")];
        let (outcome, result) = driver.parse(&tokens);
        assert_eq!(result, Ok(()));
        assert_eq!(outcome.steps.last().unwrap(), "accept");
    }

    #[test]
    fn reserved_word_lexemes_are_categorized_pr() {
        let driver = driver_for("S ::= if id | id");
        let tokens = vec![token("if", "if"), token("x", "id")];
        let (outcome, result) = driver.parse(&tokens);
        assert_eq!(result, Ok(()));
        let entries: Vec<_> = outcome.symbol_table.entries().collect();
        assert_eq!(entries[0].1, "if");
        assert_eq!(entries[0].2, Category::Reserved);
        assert_eq!(entries[1].2, Category::Id);
    }
}
