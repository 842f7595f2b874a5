use crate::{LexArgs, MainArgs};
use langforge::lexer::{Lexer, ERROR_KIND};
use std::fs;

pub fn lex(main_args: &MainArgs, args: &LexArgs, output: &mut impl FnMut(&str)) -> Result<(), String> {
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

    let definitions = fs::read_to_string(&args.definitions).map_err(|e| e.to_string())?;
    let lines: Vec<&str> = definitions
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    let lexer = Lexer::from_definitions(&lines).map_err(|e| e.to_string())?;
    log!("Lexer built from {} pattern(s)", lines.len());

    let input = fs::read_to_string(&args.input).map_err(|e| e.to_string())?;

    if args.per_line {
        let mut ok = 0;
        let mut total = 0;
        for line in input.lines() {
            total += 1;
            match lexer.match_line(line) {
                Ok(token) => {
                    ok += 1;
                    output!("[ OK ] {line:?} -> {} {:?}", token.kind, token.lexeme);
                }
                Err(e) => output!("[FAIL] {line:?} -> {e}"),
            }
        }
        log!("{ok}/{total} lines matched a single token");
        return Ok(());
    }

    let tokens = lexer.tokenize(&input);
    let mut errors = 0;
    for token in &tokens {
        if token.kind.as_ref() == ERROR_KIND {
            errors += 1;
        }
        output!("<{}, {}>", token.lexeme, token.kind);
    }
    log!("{} token(s), {errors} unrecognized", tokens.len());

    Ok(())
}
