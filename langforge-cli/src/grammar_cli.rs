use crate::{MainArgs, ParseArgs};
use langforge::grammar::driver::{Driver, Token};
use langforge::grammar::{compile, slr::Action};
use std::fs;
use std::rc::Rc;

pub fn compile_and_dump(main_args: &MainArgs, grammar_path: &std::path::Path, output: &mut impl FnMut(&str)) -> Result<(), String> {
    let log = |s: &str| {
        if !main_args.no_log {
            println!("{s}")
        }
    };
    macro_rules! log {
        ($($t:tt)*) => (log(&format!($($t)*)))
    }
    macro_rules! output {
        ($($t:tt)*) => (output(&format!($($t)*)))
    }

    let source = fs::read_to_string(grammar_path).map_err(|e| e.to_string())?;
    let (grammar, table) = compile(&source).map_err(|e| e.to_string())?;
    log!("{} production(s), start symbol {:?}", grammar.productions.len(), grammar.start_symbol);

    for (index, production) in grammar.productions.iter().enumerate() {
        let rhs = if production.is_empty() {
            "ε".to_string()
        } else {
            production.rhs.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(" ")
        };
        output!("{index}: {} -> {rhs}", production.lhs);
    }

    let state_count = table.action.keys().chain(table.goto.keys()).max().map(|m| m + 1).unwrap_or(0);
    let shifts = table.action.values().flat_map(|row| row.values()).filter(|a| matches!(a, Action::Shift(_))).count();
    let reduces = table.action.values().flat_map(|row| row.values()).filter(|a| matches!(a, Action::Reduce(_))).count();
    log!("{state_count} state(s), {shifts} shift(s), {reduces} reduce(s)");

    Ok(())
}

pub fn parse(main_args: &MainArgs, args: &ParseArgs, output: &mut impl FnMut(&str)) -> Result<(), String> {
    let log = |s: &str| {
        if !main_args.no_log {
            println!("{s}")
        }
    };
    macro_rules! log {
        ($($t:tt)*) => (log(&format!($($t)*)))
    }
    macro_rules! output {
        ($($t:tt)*) => (output(&format!($($t)*)))
    }

    let source = fs::read_to_string(&args.grammar).map_err(|e| e.to_string())?;
    let (grammar, table) = compile(&source).map_err(|e| e.to_string())?;
    let driver = Driver::new(table, grammar.productions);

    let token_text = fs::read_to_string(&args.tokens).map_err(|e| e.to_string())?;
    let tokens: Vec<Token> = token_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let mut parts = line.splitn(2, char::is_whitespace);
            let lexeme = parts.next().unwrap_or("").trim();
            let kind = parts.next().map(str::trim).unwrap_or(lexeme);
            Token { lexeme: Rc::from(lexeme), kind: Rc::from(kind) }
        })
        .collect();
    log!("{} token(s) read from {}", tokens.len(), args.tokens.display());

    let (outcome, result) = driver.parse(&tokens);
    for step in &outcome.steps {
        log!("{step}");
    }
    for (index, lexeme, category) in outcome.symbol_table.entries() {
        output!("symbol table[{index}]: {lexeme:?} ({category:?})");
    }

    match result {
        Ok(()) => {
            output!("Sentence Accepted!");
            Ok(())
        }
        Err(e) => {
            log!("{e}");
            output!("Sentence Rejected!");
            Ok(())
        }
    }
}
