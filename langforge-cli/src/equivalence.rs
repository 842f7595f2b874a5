use crate::automata::{Automata, AutomataType};
use crate::{last_n_components, EquivalenceArgs, MainArgs};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivalenceResult {
    FailedToRead(String),
    FailedToParse(String),
    FailedToValidate(String),
    NotEquivalent,
    NotMinimized,
    Equivalent,
}

impl Display for EquivalenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use EquivalenceResult::*;
        match self {
            FailedToRead(s) => write!(f, "failed to read ({s})"),
            FailedToParse(s) => write!(f, "failed to parse ({s})"),
            FailedToValidate(s) => write!(f, "failed to validate ({s})"),
            NotEquivalent => write!(f, "not equivalent"),
            NotMinimized => write!(f, "equivalent but not minimized"),
            Equivalent => write!(f, "equivalent"),
        }
    }
}

pub fn equivalence(main_args: &MainArgs, args: &EquivalenceArgs, file: &str) {
    run_equivalence(main_args, args, file).unwrap();
}

fn run_equivalence<'a>(main_args: &MainArgs, args: &EquivalenceArgs, file: &'a str) -> Result<(), String> {
    let tester = DandyTester::new(file, args)?;
    let log = |s: &str| {
        if !main_args.no_log {
            println!("{s}")
        }
    };
    macro_rules! log {
        ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
    }

    log!("Input loaded:");
    log!("{}", tester.input_automata().table());

    let start = SystemTime::now();
    let results = args
        .files
        .iter()
        .map(|path| (path, tester.test_equivalence(path)))
        .collect::<Vec<_>>();
    let duration = SystemTime::now().duration_since(start).unwrap_or_default();

    log!(
        "Testing of {} files done in {}ms. Results:",
        args.files.len(),
        duration.as_millis()
    );

    let successes = results.into_iter().fold(0usize, |acc, (path, result)| {
        let res = if args.bool {
            format!("{}", result == EquivalenceResult::Equivalent)
        } else {
            result.to_string()
        };
        if let Some(prefix) = last_n_components(path, args.path_length) {
            println!("{prefix}: {res}");
        } else {
            println!("{res}");
        }

        if result == EquivalenceResult::Equivalent {
            acc + 1
        } else {
            acc
        }
    });

    log!("{}/{} files passed", successes, args.files.len());

    Ok(())
}

struct DandyTester {
    input: Automata,
    minimized: bool,
    test_type: AutomataType,
}

impl DandyTester {
    fn input_automata(&self) -> &Automata {
        &self.input
    }

    fn new(file: &str, args: &EquivalenceArgs) -> Result<DandyTester, String> {
        let mut input =
            Automata::load(file, args.in_type.unwrap_or(args.r#type)).map_err(|e| e.to_string())?;

        let minimized = if args.minimized {
            if args.r#type == AutomataType::Dfa {
                input = input.into_minimized_dfa();
                true
            } else {
                return Err("--minimized option can only be used when testing DFAs".to_string());
            }
        } else {
            false
        };

        let (input, _) = input.prepare_to_compare_with(args.r#type);

        Ok(Self {
            input,
            minimized,
            test_type: args.r#type,
        })
    }

    fn test_equivalence(&self, file: &Path) -> EquivalenceResult {
        match fs::read_to_string(file) {
            Err(e) => EquivalenceResult::FailedToRead(e.to_string()),
            Ok(f) => match Automata::load_test(&f, self.test_type) {
                Ok(automata) => self.input.test_equivalence(automata, self.minimized),
                Err(res) => res,
            },
        }
    }
}
