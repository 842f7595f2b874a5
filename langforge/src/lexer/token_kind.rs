//! A named token kind carries its own priority instead of leaving the winner of a tie to be inferred
//! from NFA branch offsets.
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenKind {
    pub name: Rc<str>,
    /// Lower priority values win a longest-match tie; see [crate::lexer::runtime::resolve].
    pub priority: usize,
}

impl TokenKind {
    pub fn new(name: impl Into<Rc<str>>, priority: usize) -> Self {
        TokenKind {
            name: name.into(),
            priority,
        }
    }
}
