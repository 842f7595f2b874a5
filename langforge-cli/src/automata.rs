use crate::equivalence::EquivalenceResult;
use clap::ValueEnum;
use langforge::dfa::parse::DfaParseError;
use langforge::dfa::Dfa;
use langforge::nfa::parse::NfaParseError;
use langforge::nfa::Nfa;
use langforge::parser;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error<'a> {
    #[error("error loading file {0}: {1}")]
    File(&'a Path, io::Error),
    #[error("error parsing DFA: {0}")]
    DfaParse(nom::error::Error<&'a str>),
    #[error("error compiling DFA: {0}")]
    DfaCompile(DfaParseError<'a>),
    #[error("error parsing NFA: {0}")]
    NfaParse(nom::error::Error<&'a str>),
    #[error("error compiling NFA: {0}")]
    NfaCompile(NfaParseError<'a>),
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AutomataType {
    #[default]
    Dfa,
    Nfa,
}

impl AutomataType {
    pub fn to_string(self, multiple: bool) -> &'static str {
        match (self, multiple) {
            (AutomataType::Dfa, true) => "DFAs",
            (AutomataType::Dfa, false) => "DFA",
            (AutomataType::Nfa, true) => "NFAs",
            (AutomataType::Nfa, false) => "NFA",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Automata {
    Dfa(Dfa),
    Nfa(Nfa),
}

impl Automata {
    pub fn get_type(&self) -> AutomataType {
        match self {
            Automata::Dfa(_) => AutomataType::Dfa,
            Automata::Nfa(_) => AutomataType::Nfa,
        }
    }

    /// Loads an automaton of any type by reading and parsing it from a file.
    pub fn load_file(path: &Path, r#type: AutomataType) -> Result<Self, String> {
        let file = fs::read_to_string(path).map_err(|e| Error::File(path, e).to_string());
        file.and_then(|f| Self::load(&f, r#type).map_err(|e| e.to_string()))
    }

    /// Loads an automaton of any type by parsing it from a string.
    pub fn load(file: &str, r#type: AutomataType) -> Result<Self, Error<'_>> {
        match r#type {
            AutomataType::Dfa => {
                let dfa: Dfa = parser::dfa(file)
                    .map_err(Error::DfaParse)?
                    .try_into()
                    .map_err(Error::DfaCompile)?;
                Ok(Self::Dfa(dfa))
            }
            AutomataType::Nfa => {
                let nfa: Nfa = parser::nfa(file)
                    .map_err(Error::NfaParse)?
                    .try_into()
                    .map_err(Error::NfaCompile)?;
                Ok(Self::Nfa(nfa))
            }
        }
    }

    pub fn load_test(file: &str, r#type: AutomataType) -> Result<Self, EquivalenceResult> {
        match r#type {
            AutomataType::Dfa => {
                let dfa = parser::dfa(file)
                    .map_err(|e| EquivalenceResult::FailedToParse(e.to_string()))?
                    .try_into()
                    .map_err(|e: DfaParseError| EquivalenceResult::FailedToValidate(e.to_string()))?;
                Ok(Automata::Dfa(dfa))
            }
            AutomataType::Nfa => {
                let nfa = parser::nfa(file)
                    .map_err(|e| EquivalenceResult::FailedToParse(e.to_string()))?
                    .try_into()
                    .map_err(|e: NfaParseError| EquivalenceResult::FailedToValidate(e.to_string()))?;
                Ok(Automata::Nfa(nfa))
            }
        }
    }

    /// Converts to a minimized DFA if this isn't already a DFA; leaves an existing DFA unminimized.
    pub fn to_minimized_dfa_if_not_dfa(self) -> (Dfa, bool) {
        let (mut dfa, converted) = self.to_dfa();
        if converted {
            dfa.minimize();
        }
        (dfa, converted)
    }

    pub fn into_minimized_dfa(self) -> Self {
        let (mut dfa, _) = self.to_dfa();
        dfa.minimize();
        Self::Dfa(dfa)
    }

    pub fn to_dfa(self) -> (Dfa, bool) {
        match self {
            Automata::Dfa(dfa) => (dfa, false),
            Automata::Nfa(nfa) => (nfa.to_dfa(), true),
        }
    }

    pub fn to_dfa_automata(self) -> (Self, bool) {
        let (dfa, converted) = self.to_dfa();
        (Self::Dfa(dfa), converted)
    }

    pub fn borrow_dfa(&self) -> Option<&Dfa> {
        match self {
            Automata::Dfa(dfa) => Some(dfa),
            Automata::Nfa(_) => None,
        }
    }

    pub fn to_nfa(self) -> (Nfa, bool) {
        match self {
            Automata::Dfa(dfa) => (dfa.to_nfa(), true),
            Automata::Nfa(nfa) => (nfa, false),
        }
    }

    pub fn into_nfa(self) -> (Nfa, bool) {
        self.to_nfa()
    }

    pub fn to_nfa_automata(self) -> (Self, bool) {
        let (nfa, converted) = self.to_nfa();
        (Self::Nfa(nfa), converted)
    }

    pub fn borrow_nfa(&self) -> Option<&Nfa> {
        match self {
            Automata::Nfa(nfa) => Some(nfa),
            Automata::Dfa(_) => None,
        }
    }

    /// Converts to whichever representation compares fastest against `other`'s type: a DFA for a DFA,
    /// an NFA otherwise.
    pub fn prepare_to_compare_with(self, other: AutomataType) -> (Self, bool) {
        match other {
            AutomataType::Dfa => self.to_dfa_automata(),
            AutomataType::Nfa => self.to_nfa_automata(),
        }
    }

    pub fn test_equivalence(&self, other: Self, minimized: bool) -> EquivalenceResult {
        use AutomataType as T;
        use EquivalenceResult::*;
        match (self.get_type(), other.get_type()) {
            (T::Dfa, T::Dfa) => {
                let dfa1 = self.borrow_dfa().unwrap();
                let dfa2 = other.borrow_dfa().unwrap();
                if dfa1.equivalent_to(dfa2) {
                    if minimized && dfa1.states().len() != dfa2.states().len() {
                        NotMinimized
                    } else {
                        Equivalent
                    }
                } else {
                    NotEquivalent
                }
            }
            (T::Dfa, T::Nfa) => {
                if minimized {
                    eprintln!("can only check minimization if the tested type is a DFA");
                }
                let dfa1 = self.borrow_dfa().unwrap();
                let (dfa2, _) = other.to_dfa();
                if dfa1.equivalent_to(&dfa2) {
                    Equivalent
                } else {
                    NotEquivalent
                }
            }
            (T::Nfa, _) => {
                if minimized && other.get_type() != T::Dfa {
                    eprintln!("can only check minimization if the tested type is a DFA");
                }
                let nfa1 = self.borrow_nfa().unwrap();
                let (nfa2, _) = other.to_nfa();
                if nfa1.equivalent_to(&nfa2) {
                    Equivalent
                } else {
                    NotEquivalent
                }
            }
        }
    }

    pub fn table(&self) -> String {
        match self {
            Automata::Dfa(dfa) => dfa.to_table(),
            Automata::Nfa(nfa) => nfa.to_table(),
        }
    }
}
