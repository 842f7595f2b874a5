mod automata;
mod binary_op;
mod equivalence;
mod grammar_cli;
mod lex;
mod test_files;

use crate::automata::AutomataType;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "langforge", version, about = "Compiler front-end construction toolkit")]
struct Cli {
    #[command(flatten)]
    main_args: MainArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
pub struct MainArgs {
    /// Suppress informational logging, printing only the command's primary output.
    #[arg(long, global = true)]
    pub no_log: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print a DFA or NFA's transition table after loading and validating it.
    Table {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = AutomataType::Dfa)]
        r#type: AutomataType,
    },
    /// Check one automaton against several others for language equivalence.
    Equivalence(EquivalenceArgs),
    /// Test an automaton against files of example input, line by line or whole-file.
    TestFiles(TestFileArgs),
    /// Union of two DFAs/NFAs via product construction.
    Union(BinaryOpArgs),
    /// Intersection of two DFAs/NFAs via product construction.
    Intersection(BinaryOpArgs),
    /// Difference of two DFAs/NFAs via product construction.
    Difference(BinaryOpArgs),
    /// Symmetric difference of two DFAs/NFAs via product construction.
    SymmetricDifference(BinaryOpArgs),
    /// Build a lexer from pattern definitions and tokenize a file.
    Lex(LexArgs),
    /// Compile a grammar and print its productions and table size.
    Compile { grammar: PathBuf },
    /// Compile a grammar and drive its SLR(1) table over a token stream.
    Parse(ParseArgs),
}

#[derive(Args)]
pub struct EquivalenceArgs {
    /// The automaton to test every other file against.
    input: PathBuf,
    #[arg(long, value_enum, default_value_t = AutomataType::Dfa)]
    pub r#type: AutomataType,
    /// Overrides --type for parsing the input file only.
    #[arg(long, value_enum)]
    pub in_type: Option<AutomataType>,
    /// Require the input automaton to already be a minimized DFA.
    #[arg(long)]
    pub minimized: bool,
    /// Print `true`/`false` instead of a descriptive result.
    #[arg(long)]
    pub bool: bool,
    /// How many trailing path components to print per result (0 prints the full path).
    #[arg(long, default_value_t = 1)]
    pub path_length: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct TestFileArgs {
    pub automata: PathBuf,
    #[arg(long, value_enum, default_value_t = AutomataType::Dfa)]
    pub r#type: AutomataType,
    #[arg(long, value_enum, default_value_t = TestType::Lines)]
    pub test_type: TestType,
    pub files: Vec<PathBuf>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TestType {
    #[default]
    Lines,
    Whole,
}

#[derive(Args)]
pub struct BinaryOpArgs {
    pub first: PathBuf,
    pub second: PathBuf,
    #[arg(long, value_enum, default_value_t = AutomataType::Dfa)]
    pub r#type: AutomataType,
    /// Overrides --type for parsing the second file only.
    #[arg(long, value_enum)]
    pub second_type: Option<AutomataType>,
    /// Minimize the result (and each input, if it was already a DFA).
    #[arg(long)]
    pub minimized: bool,
    /// Check the result against a third automaton for equivalence.
    #[arg(long)]
    pub compare_against: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = AutomataType::Dfa)]
    pub compared_type: AutomataType,
}

#[derive(Clone, Copy, Debug)]
pub enum BinaryOperation {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl BinaryOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperation::Union => "Union",
            BinaryOperation::Intersection => "Intersection",
            BinaryOperation::Difference => "Difference",
            BinaryOperation::SymmetricDifference => "Symmetric difference",
        }
    }
}

impl Display for BinaryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Args)]
pub struct LexArgs {
    /// A file of `name: pattern` lines, highest priority first.
    pub definitions: PathBuf,
    pub input: PathBuf,
    /// Match each line as a single token instead of scanning the whole file.
    #[arg(long)]
    pub per_line: bool,
}

#[derive(Args)]
pub struct ParseArgs {
    pub grammar: PathBuf,
    /// A file of `lexeme kind` lines, one token per line.
    pub tokens: PathBuf,
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut output = |s: &str| println!("{s}");

    match &cli.command {
        Command::Table { file, r#type } => {
            let automata = automata::Automata::load_file(file, *r#type)?;
            output(&automata.table());
            Ok(())
        }
        Command::Equivalence(args) => {
            let file = fs::read_to_string(&args.input).map_err(|e| e.to_string())?;
            equivalence::equivalence(&cli.main_args, args, &file);
            Ok(())
        }
        Command::TestFiles(args) => test_files::test_files(&cli.main_args, args, &mut output),
        Command::Union(args) => binary_op::binary_op(&cli.main_args, args, BinaryOperation::Union, &mut output),
        Command::Intersection(args) => {
            binary_op::binary_op(&cli.main_args, args, BinaryOperation::Intersection, &mut output)
        }
        Command::Difference(args) => {
            binary_op::binary_op(&cli.main_args, args, BinaryOperation::Difference, &mut output)
        }
        Command::SymmetricDifference(args) => {
            binary_op::binary_op(&cli.main_args, args, BinaryOperation::SymmetricDifference, &mut output)
        }
        Command::Lex(args) => lex::lex(&cli.main_args, args, &mut output),
        Command::Compile { grammar } => grammar_cli::compile_and_dump(&cli.main_args, grammar, &mut output),
        Command::Parse(args) => grammar_cli::parse(&cli.main_args, args, &mut output),
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// The last `n` path components, joined back together; `n == 0` means the whole path.
pub fn last_n_components(path: &Path, n: usize) -> Option<String> {
    if n == 0 {
        return Some(path.display().to_string());
    }
    let components: Vec<_> = path.components().collect();
    let start = components.len().saturating_sub(n);
    let joined: PathBuf = components[start..].iter().collect();
    Some(joined.display().to_string())
}
