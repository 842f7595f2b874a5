//! # DFA serialization format (component D)
//! A line-oriented text encoding for a [Dfa]: state count, start state, accepting states, the sorted
//! alphabet, then one `src,symbol,dst` line per transition (§6 of the design this module implements).
//! Used to persist a pattern's directly built DFA to disk and reload it elsewhere, tagged with a token
//! kind, via [crate::lexer::tagged_nfa].
use crate::dfa::{Dfa, DfaState};
use nom::character::complete::{char as nom_char, digit1, line_ending, none_of};
use nom::combinator::{all_consuming, map, map_res, recognize};
use nom::multi::{many1, separated_list0};
use nom::sequence::{terminated, tuple};
use nom::{Finish, IResult};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerialError {
    #[error("could not parse DFA serialization: {0}")]
    Malformed(String),
    #[error("start state id {0} is out of range (numStates = {1})")]
    StartOutOfRange(usize, usize),
    #[error("accept state id {0} is out of range (numStates = {1})")]
    AcceptOutOfRange(usize, usize),
    #[error("transition references unknown state id {0}")]
    UnknownState(usize),
    #[error("transition references symbol {0:?} outside the declared alphabet")]
    UnknownSymbol(String),
    #[error("state {0} has more than one transition for symbol {1:?}")]
    DuplicateTransition(usize, String),
    #[error("state {0} is missing a transition for symbol {1:?}")]
    MissingTransition(usize, String),
}

/// Renders `dfa` in the on-disk format. The transition function is total (every state/symbol pair
/// appears, including the trap state's self-loops), matching how [crate::dfa::direct::build] produces
/// its DFAs.
pub fn write(dfa: &Dfa) -> String {
    let mut out = String::new();
    let states = dfa.states();

    out.push_str(&states.len().to_string());
    out.push('\n');
    out.push_str(&dfa.initial_state_index().to_string());
    out.push('\n');

    let mut accept_ids: Vec<usize> = states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_accepting())
        .map(|(i, _)| i)
        .collect();
    accept_ids.sort_unstable();
    out.push_str(&join(&accept_ids));
    out.push('\n');

    let mut symbols: Vec<String> = dfa.alphabet().iter().map(|s| s.to_string()).collect();
    symbols.sort_unstable();
    out.push_str(&symbols.join(","));
    out.push('\n');

    for (src, state) in states.iter().enumerate() {
        for (symbol_idx, &dst) in state.transitions().iter().enumerate() {
            out.push_str(&format!("{},{},{}\n", src, dfa.alphabet()[symbol_idx], dst));
        }
    }
    out
}

fn join(ids: &[usize]) -> String {
    ids.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses the on-disk format back into a [Dfa], rejecting anything that wouldn't be a total,
/// single-valued transition function over the declared alphabet.
pub fn read(input: &str) -> Result<Dfa, SerialError> {
    let trimmed = input.strip_suffix('\n').unwrap_or(input);
    let (_, raw) = all_consuming(parse_raw)(trimmed)
        .finish()
        .map_err(|e: nom::error::Error<&str>| SerialError::Malformed(e.to_string()))?;
    raw.try_into()
}

struct RawDfa {
    num_states: usize,
    start: usize,
    accepting: Vec<usize>,
    alphabet: Vec<String>,
    transitions: Vec<(usize, String, usize)>,
}

fn usize_field(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn usize_csv(input: &str) -> IResult<&str, Vec<usize>> {
    separated_list0(nom_char(','), usize_field)(input)
}

fn symbol(input: &str) -> IResult<&str, String> {
    map(recognize(many1(none_of(",\r\n"))), String::from)(input)
}

fn symbol_csv(input: &str) -> IResult<&str, Vec<String>> {
    separated_list0(nom_char(','), symbol)(input)
}

fn transition_line(input: &str) -> IResult<&str, (usize, String, usize)> {
    map(
        tuple((usize_field, nom_char(','), symbol, nom_char(','), usize_field)),
        |(src, _, sym, _, dst)| (src, sym, dst),
    )(input)
}

fn parse_raw(input: &str) -> IResult<&str, RawDfa> {
    map(
        tuple((
            terminated(usize_field, line_ending),
            terminated(usize_field, line_ending),
            terminated(usize_csv, line_ending),
            terminated(symbol_csv, line_ending),
            separated_list0(line_ending, transition_line),
        )),
        |(num_states, start, accepting, alphabet, transitions)| RawDfa {
            num_states,
            start,
            accepting,
            alphabet,
            transitions,
        },
    )(input)
}

impl TryFrom<RawDfa> for Dfa {
    type Error = SerialError;

    fn try_from(raw: RawDfa) -> Result<Self, Self::Error> {
        let RawDfa {
            num_states,
            start,
            accepting,
            alphabet,
            transitions,
        } = raw;

        if start >= num_states {
            return Err(SerialError::StartOutOfRange(start, num_states));
        }
        for &a in &accepting {
            if a >= num_states {
                return Err(SerialError::AcceptOutOfRange(a, num_states));
            }
        }
        let accepting_set: HashSet<usize> = accepting.into_iter().collect();
        let symbol_index: HashMap<&str, usize> = alphabet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut table: Vec<Vec<Option<usize>>> = vec![vec![None; alphabet.len()]; num_states];
        for (src, sym, dst) in &transitions {
            if *src >= num_states {
                return Err(SerialError::UnknownState(*src));
            }
            if *dst >= num_states {
                return Err(SerialError::UnknownState(*dst));
            }
            let &sym_idx = symbol_index
                .get(sym.as_str())
                .ok_or_else(|| SerialError::UnknownSymbol(sym.clone()))?;
            if table[*src][sym_idx].is_some() {
                return Err(SerialError::DuplicateTransition(*src, sym.clone()));
            }
            table[*src][sym_idx] = Some(*dst);
        }

        let mut states = Vec::with_capacity(num_states);
        for (idx, row) in table.into_iter().enumerate() {
            let mut resolved = Vec::with_capacity(alphabet.len());
            for (sym_idx, cell) in row.into_iter().enumerate() {
                resolved.push(
                    cell.ok_or_else(|| SerialError::MissingTransition(idx, alphabet[sym_idx].clone()))?,
                );
            }
            states.push(DfaState {
                name: Rc::from(idx.to_string()),
                initial: idx == start,
                accepting: accepting_set.contains(&idx),
                transitions: resolved,
            });
        }

        let rc_alphabet: Rc<[Rc<str>]> = alphabet.iter().map(|s| Rc::from(s.as_str())).collect::<Vec<_>>().into();

        Ok(Dfa {
            alphabet: rc_alphabet,
            states,
            initial_state: start,
        })
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
    fn round_trips_through_text() {
        let dfa = dfa_for("[a-zA-Z]([a-zA-Z]|[0-9])*");
        let text = write(&dfa);
        let parsed = read(&text).unwrap();
        assert!(parsed.accepts_graphemes("a1b2"));
        assert!(!parsed.accepts_graphemes("1ab"));
        assert_eq!(parsed.states().len(), dfa.states().len());
    }

    #[test]
    fn rejects_out_of_range_start() {
        let text = "1\n5\n\na\n0,a,0\n";
        assert_eq!(read(text), Err(SerialError::StartOutOfRange(5, 1)));
    }

    #[test]
    fn rejects_missing_transition() {
        let text = "2\n0\n1\na\n0,a,0\n";
        assert_eq!(
            read(text),
            Err(SerialError::MissingTransition(1, "a".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_symbol() {
        let text = "1\n0\n\na\n0,b,0\n";
        assert_eq!(read(text), Err(SerialError::UnknownSymbol("b".to_string())));
    }
}
