//! # Pattern compiler
//! This module turns a named regular expression into a postfix token sequence ready for
//! [syntax tree construction](crate::syntax). It owns the entire front half of component A: character
//! class expansion, tokenization, explicit-concatenation insertion and the shunting-yard conversion to
//! postfix.
//!
//! ## Syntax
//! A pattern is built from printable characters plus the metacharacters `| * + ? ( ) [ ]` and `\` for
//! escaping. `-` is only meaningful inside a character class, where `x-y` denotes the inclusive range
//! from `x` to `y`. Any other character is a literal. A backslash followed by any character produces
//! that character as a literal, even if it would otherwise be a metacharacter — this commitment is made
//! once, here, and never revisited later in the pipeline.
//!
//! - `id: [a-zA-Z]([a-zA-Z]|[0-9])*` — an identifier: a letter, then any number of letters and digits
//! - `plus: \+` — the literal character `+`
//! - `lpar: \(` — the literal character `(`
//!
//! ## Postfix form
//! Every compiled pattern ends with `# .`: the end-marker position is concatenated onto the user's
//! pattern so a single distinguished position identifies accepting states once a DFA is built from the
//! tree (§4.B/4.C of the design this module implements).
use nom::bytes::complete::{tag, take_until};
use nom::combinator::rest;
use nom::sequence::separated_pair;
use nom::IResult;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// A single symbol of a postfix-ordered regular expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostfixToken {
    /// A literal grapheme to match, already resolved as literal (never an operator) at tokenize time.
    Literal(char),
    /// The unique end-of-pattern marker `#`, concatenated onto every compiled pattern.
    EndMarker,
    /// Explicit concatenation, `.`.
    Concat,
    /// Alternation, `|`.
    Alternation,
    /// Kleene star, `*`.
    Star,
    /// Kleene plus, `+`.
    Plus,
    /// Optional, `?`.
    Question,
}

/// A named pattern compiled to postfix form, ready to be built into a syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    pub postfix: Vec<PostfixToken>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegexError {
    #[error("unmatched '[' in character class")]
    UnclosedClass,
    #[error("nested character class is not permitted")]
    NestedClass,
    #[error("unmatched ')'")]
    UnmatchedCloseParen,
    #[error("unmatched '(' in pattern")]
    UnmatchedOpenParen,
    #[error("malformed range in character class: '{0}-{1}'")]
    MalformedRange(char, char),
    #[error("missing operand for operator '{0}'")]
    MissingOperand(char),
    #[error("pattern has no operand at all")]
    EmptyPattern,
    #[error("dangling escape character at end of pattern")]
    DanglingEscape,
    #[error("line is missing a ':' separating name from pattern")]
    MissingNameSeparator,
}

/// Splits a `name: pattern` line on its first `:`, the way [nfa/dfa transition tables](crate::parser)
/// are split into fields: a small `nom` combinator rather than a hand-rolled scan.
fn name_and_pattern(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_until(":"), tag(":"), rest)(input)
}

/// Compiles a `name: pattern` definition line (§4.A) into a [Pattern]. Leading/trailing whitespace
/// around both the name and the pattern is trimmed.
pub fn compile_definition(line: &str) -> Result<Pattern, RegexError> {
    let (_, (name, pattern)) = name_and_pattern(line).map_err(|_| RegexError::MissingNameSeparator)?;
    let postfix = compile_pattern(pattern.trim())?;
    Ok(Pattern {
        name: name.trim().to_string(),
        postfix,
    })
}

/// Compiles a bare pattern (no `name:` prefix) to its postfix token sequence, including the spliced
/// end-marker.
pub fn compile_pattern(pattern: &str) -> Result<Vec<PostfixToken>, RegexError> {
    let expanded = expand_classes(pattern)?;
    let tokens = tokenize(&expanded)?;
    let with_concat = insert_concatenation(tokens);
    let mut postfix = shunting_yard(with_concat)?;
    postfix.push(PostfixToken::EndMarker);
    postfix.push(PostfixToken::Concat);
    Ok(postfix)
}

/// Replaces every `[body]` with a parenthesized alternation of its members (§4.A step 1). Escapes
/// outside of classes are passed through untouched so [tokenize] can commit them.
fn expand_classes(pattern: &str) -> Result<String, RegexError> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or(RegexError::DanglingEscape)?;
                out.push('\\');
                out.push(escaped);
            }
            '[' => {
                let members = class_body(&mut chars)?;
                out.push('(');
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    if "\\|*+?()[]".contains(*m) {
                        out.push('\\');
                    }
                    out.push(*m);
                }
                out.push(')');
            }
            ']' => return Err(RegexError::UnclosedClass),
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn class_body(chars: &mut Peekable<Chars>) -> Result<Vec<char>, RegexError> {
    let mut members = Vec::new();
    loop {
        match chars.next() {
            None => return Err(RegexError::UnclosedClass),
            Some(']') => break,
            Some('[') => return Err(RegexError::NestedClass),
            Some(a) => {
                let is_range = chars.peek() == Some(&'-') && {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    matches!(lookahead.peek(), Some(&b) if b != ']')
                };
                if is_range {
                    chars.next(); // consume '-'
                    let b = chars.next().expect("lookahead confirmed a char follows '-'");
                    if a > b {
                        return Err(RegexError::MalformedRange(a, b));
                    }
                    for cp in (a as u32)..=(b as u32) {
                        if let Some(ch) = char::from_u32(cp) {
                            members.push(ch);
                        }
                    }
                } else {
                    members.push(a);
                }
            }
        }
    }
    Ok(members)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tok {
    Literal(char),
    LParen,
    RParen,
    Alternation,
    Star,
    Plus,
    Question,
    Concat,
}

/// Tokenizes the class-expanded pattern (§4.A step 2). Whitespace is discarded; an escape consumes
/// exactly two characters and always produces a literal.
fn tokenize(expanded: &str) -> Result<Vec<Tok>, RegexError> {
    let mut out = Vec::new();
    let mut chars = expanded.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        match c {
            '\\' => {
                let escaped = chars.next().ok_or(RegexError::DanglingEscape)?;
                out.push(Tok::Literal(escaped));
            }
            '(' => out.push(Tok::LParen),
            ')' => out.push(Tok::RParen),
            '|' => out.push(Tok::Alternation),
            '*' => out.push(Tok::Star),
            '+' => out.push(Tok::Plus),
            '?' => out.push(Tok::Question),
            other => out.push(Tok::Literal(other)),
        }
    }
    Ok(out)
}

fn is_concat_left(t: Tok) -> bool {
    matches!(
        t,
        Tok::Literal(_) | Tok::RParen | Tok::Star | Tok::Plus | Tok::Question
    )
}

fn is_concat_right(t: Tok) -> bool {
    matches!(t, Tok::Literal(_) | Tok::LParen)
}

/// Inserts explicit [Tok::Concat] tokens between adjacent operand-like tokens (§4.A step 3).
fn insert_concatenation(tokens: Vec<Tok>) -> Vec<Tok> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    for window in tokens.windows(2) {
        out.push(window[0]);
        if is_concat_left(window[0]) && is_concat_right(window[1]) {
            out.push(Tok::Concat);
        }
    }
    if let Some(&last) = tokens.last() {
        out.push(last);
    }
    out
}

fn precedence(t: Tok) -> u8 {
    match t {
        Tok::Star | Tok::Plus | Tok::Question => 3,
        Tok::Concat => 2,
        Tok::Alternation => 1,
        _ => 0,
    }
}

fn is_unary(t: Tok) -> bool {
    matches!(t, Tok::Star | Tok::Plus | Tok::Question)
}

fn op_char(t: Tok) -> char {
    match t {
        Tok::Concat => '.',
        Tok::Alternation => '|',
        Tok::Star => '*',
        Tok::Plus => '+',
        Tok::Question => '?',
        _ => '?',
    }
}

fn to_postfix(t: Tok) -> PostfixToken {
    match t {
        Tok::Literal(c) => PostfixToken::Literal(c),
        Tok::Concat => PostfixToken::Concat,
        Tok::Alternation => PostfixToken::Alternation,
        Tok::Star => PostfixToken::Star,
        Tok::Plus => PostfixToken::Plus,
        Tok::Question => PostfixToken::Question,
        Tok::LParen | Tok::RParen => unreachable!("parentheses never reach postfix output"),
    }
}

fn apply_op(t: Tok, output: &mut Vec<PostfixToken>, operand_count: &mut i32) -> Result<(), RegexError> {
    if is_unary(t) {
        if *operand_count < 1 {
            return Err(RegexError::MissingOperand(op_char(t)));
        }
    } else {
        if *operand_count < 2 {
            return Err(RegexError::MissingOperand(op_char(t)));
        }
        *operand_count -= 1;
    }
    output.push(to_postfix(t));
    Ok(())
}

/// Shunting-yard conversion to postfix (§4.A step 4). Precedences: `* + ?` = 3, `.` = 2, `|` = 1, all
/// left-associative, so equal-precedence operators (including postfix-vs-postfix) pop left to right.
fn shunting_yard(tokens: Vec<Tok>) -> Result<Vec<PostfixToken>, RegexError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Tok> = Vec::new();
    let mut operand_count = 0i32;

    for tok in tokens {
        match tok {
            Tok::Literal(_) => {
                output.push(to_postfix(tok));
                operand_count += 1;
            }
            Tok::LParen => ops.push(tok),
            Tok::RParen => loop {
                match ops.pop() {
                    Some(Tok::LParen) => break,
                    Some(top) => apply_op(top, &mut output, &mut operand_count)?,
                    None => return Err(RegexError::UnmatchedCloseParen),
                }
            },
            _ => {
                while let Some(&top) = ops.last() {
                    if top == Tok::LParen || precedence(top) < precedence(tok) {
                        break;
                    }
                    let top = ops.pop().unwrap();
                    apply_op(top, &mut output, &mut operand_count)?;
                }
                ops.push(tok);
            }
        }
    }

    while let Some(top) = ops.pop() {
        if top == Tok::LParen {
            return Err(RegexError::UnmatchedOpenParen);
        }
        apply_op(top, &mut output, &mut operand_count)?;
    }

    if operand_count != 1 {
        return Err(RegexError::EmptyPattern);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_concatenation() {
        let postfix = compile_pattern("ab").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal('a'),
                PostfixToken::Literal('b'),
                PostfixToken::Concat,
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn alternation_and_star() {
        let postfix = compile_pattern("a|b*").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal('a'),
                PostfixToken::Literal('b'),
                PostfixToken::Star,
                PostfixToken::Alternation,
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn character_class_expands_to_alternation() {
        let postfix = compile_pattern("[ab]").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal('a'),
                PostfixToken::Literal('b'),
                PostfixToken::Alternation,
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn character_class_range() {
        let postfix = compile_pattern("[a-c]").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal('a'),
                PostfixToken::Literal('b'),
                PostfixToken::Literal('c'),
                PostfixToken::Alternation,
                PostfixToken::Alternation,
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn escaped_metacharacter_is_a_literal() {
        let postfix = compile_pattern("\\+").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal('+'),
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn definition_line_splits_name_and_pattern() {
        let pattern = compile_definition("plus: \\+").unwrap();
        assert_eq!(pattern.name, "plus");
        assert_eq!(
            pattern.postfix,
            vec![
                PostfixToken::Literal('+'),
                PostfixToken::EndMarker,
                PostfixToken::Concat,
            ]
        );
    }

    #[test]
    fn unmatched_paren_is_rejected() {
        assert_eq!(compile_pattern("(a"), Err(RegexError::UnmatchedOpenParen));
        assert_eq!(compile_pattern("a)"), Err(RegexError::UnmatchedCloseParen));
    }

    #[test]
    fn missing_operand_is_rejected() {
        assert_eq!(compile_pattern("*"), Err(RegexError::MissingOperand('*')));
        assert_eq!(compile_pattern("|a"), Err(RegexError::MissingOperand('|')));
    }

    #[test]
    fn malformed_range_is_rejected() {
        assert_eq!(
            compile_pattern("[z-a]"),
            Err(RegexError::MalformedRange('z', 'a'))
        );
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert_eq!(
            compile_definition("plus \\+"),
            Err(RegexError::MissingNameSeparator)
        );
    }
}
