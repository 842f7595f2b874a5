use criterion::{black_box, criterion_group, criterion_main, Criterion};
use langforge::dfa::{direct, Dfa};
use langforge::lexer::Lexer;
use langforge::parser;
use langforge::regex;
use langforge::syntax;

const DFA_TABLE: &str = "
           a  b  c
    -> * s0 s1 s0 s2
         s1 s2 s1 s1
       * s2 s2 s2 s2
";

const OTHER_DFA_TABLE: &str = "
        a b c
    -> * x z x y
      * y y y y
        z y w z
        w y z w
";

const IDENTIFIER_PATTERN: &str = "[a-zA-Z_]([a-zA-Z_]|[0-9])*";

pub fn dfa_algebra(c: &mut Criterion) {
    let dfa1: Dfa = parser::dfa(DFA_TABLE).unwrap().try_into().unwrap();
    let dfa2: Dfa = parser::dfa(OTHER_DFA_TABLE).unwrap().try_into().unwrap();
    c.bench_function("union", |b| b.iter(|| dfa1.union(black_box(&dfa2))));
    c.bench_function("intersection", |b| {
        b.iter(|| dfa1.intersection(black_box(&dfa2)))
    });
    c.bench_function("difference", |b| {
        b.iter(|| dfa1.difference(black_box(&dfa2)))
    });
    c.bench_function("equivalence check", |b| {
        b.iter(|| dfa1.equivalent_to(black_box(&dfa2)))
    });
}

pub fn direct_dfa_construction(c: &mut Criterion) {
    let postfix = regex::compile_pattern(IDENTIFIER_PATTERN).unwrap();
    c.bench_function("syntax tree + followpos", |b| {
        b.iter(|| syntax::build(black_box(&postfix)).unwrap())
    });

    let tree = syntax::build(&postfix).unwrap();
    c.bench_function("direct DFA construction", |b| {
        b.iter(|| direct::build(black_box(&tree)))
    });
}

pub fn lexer_pipeline(c: &mut Criterion) {
    let definitions = [
        "IF: if",
        "ELSE: else",
        "WHILE: while",
        "IDENTIFIER: [a-zA-Z_]([a-zA-Z_]|[0-9])*",
        "NUMBER: [0-9]+",
        "SPACE: \\ +",
    ];
    c.bench_function("lexer construction", |b| {
        b.iter(|| Lexer::from_definitions(black_box(&definitions)).unwrap())
    });

    let lexer = Lexer::from_definitions(&definitions).unwrap();
    let source = "while foo123 else bar456 if baz";
    c.bench_function("tokenize", |b| b.iter(|| lexer.tokenize(black_box(source))));
}

criterion_group!(benches, dfa_algebra, direct_dfa_construction, lexer_pipeline);
criterion_main!(benches);
