//! # Syntax tree and followpos
//! Builds the annotated parse tree of a postfix regex (component B) and computes the `nullable`,
//! `firstpos`, `lastpos` and `followpos` attributes used by the [direct DFA builder](crate::dfa::direct).
//!
//! The tree is built from the postfix token list with a scratch stack, exactly as the dragon-book
//! describes: operands push a leaf carrying a fresh position, unary operators pop one node, binary
//! operators pop two. Attribute computation is a single postorder pass; no fixed point is needed. Both
//! the tree build and the attribute walk are done iteratively with an explicit stack rather than by
//! recursion, since regex nesting depth is attacker-controlled input (§9 of the design this implements).
use crate::regex::PostfixToken;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub type Position = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Star,
    Plus,
    Question,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Concat,
    Alternation,
}

/// A node of the syntax tree, carrying its computed attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: LeafSymbol,
        position: Position,
    },
    Unary {
        op: UnaryOp,
        child: Box<Node>,
        nullable: bool,
        firstpos: Vec<Position>,
        lastpos: Vec<Position>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
        nullable: bool,
        firstpos: Vec<Position>,
        lastpos: Vec<Position>,
    },
}

/// What a leaf actually matches: either a literal character or the unique end-marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafSymbol {
    Literal(char),
    EndMarker,
}

impl Node {
    pub fn nullable(&self) -> bool {
        match self {
            Node::Leaf { .. } => false,
            Node::Unary { nullable, .. } | Node::Binary { nullable, .. } => *nullable,
        }
    }

    pub fn firstpos(&self) -> &[Position] {
        match self {
            Node::Leaf { position, .. } => std::slice::from_ref(position),
            Node::Unary { firstpos, .. } | Node::Binary { firstpos, .. } => firstpos,
        }
    }

    pub fn lastpos(&self) -> &[Position] {
        match self {
            Node::Leaf { position, .. } => std::slice::from_ref(position),
            Node::Unary { lastpos, .. } | Node::Binary { lastpos, .. } => lastpos,
        }
    }
}

/// The syntax tree of one compiled pattern, together with its followpos table and the position of
/// its end-marker leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    pub root: Node,
    pub followpos: HashMap<Position, HashSet<Position>>,
    pub end_marker_position: Position,
    pub leaf_symbols: HashMap<Position, LeafSymbol>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("postfix expression is malformed: stack had {0} node(s) at the end, expected exactly 1")]
    MalformedPostfix(usize),
    #[error("operator '{0:?}' found with an empty operand stack")]
    EmptyStack(PostfixToken),
    #[error("pattern contains no end-marker position")]
    MissingEndMarker,
}

enum ScratchEntry {
    Operand(Box<Node>),
}

/// Builds the syntax tree from a postfix token sequence and computes all attributes, including
/// followpos (§4.B).
pub fn build(postfix: &[PostfixToken]) -> Result<SyntaxTree, SyntaxError> {
    let mut next_position: Position = 1;
    let mut stack: Vec<ScratchEntry> = Vec::new();
    let mut leaf_symbols = HashMap::new();
    let mut followpos: HashMap<Position, HashSet<Position>> = HashMap::new();
    let mut end_marker_position = None;

    for &tok in postfix {
        match tok {
            PostfixToken::Literal(c) => {
                let position = next_position;
                next_position += 1;
                leaf_symbols.insert(position, LeafSymbol::Literal(c));
                followpos.insert(position, HashSet::new());
                stack.push(ScratchEntry::Operand(Box::new(Node::Leaf {
                    symbol: LeafSymbol::Literal(c),
                    position,
                })));
            }
            PostfixToken::EndMarker => {
                let position = next_position;
                next_position += 1;
                leaf_symbols.insert(position, LeafSymbol::EndMarker);
                followpos.insert(position, HashSet::new());
                end_marker_position = Some(position);
                stack.push(ScratchEntry::Operand(Box::new(Node::Leaf {
                    symbol: LeafSymbol::EndMarker,
                    position,
                })));
            }
            PostfixToken::Star | PostfixToken::Plus | PostfixToken::Question => {
                let ScratchEntry::Operand(child) =
                    stack.pop().ok_or(SyntaxError::EmptyStack(tok))?;
                let (nullable, firstpos, lastpos) = match tok {
                    PostfixToken::Star => (true, child.firstpos().to_vec(), child.lastpos().to_vec()),
                    PostfixToken::Plus => (
                        child.nullable(),
                        child.firstpos().to_vec(),
                        child.lastpos().to_vec(),
                    ),
                    PostfixToken::Question => {
                        (true, child.firstpos().to_vec(), child.lastpos().to_vec())
                    }
                    _ => unreachable!(),
                };
                if matches!(tok, PostfixToken::Star | PostfixToken::Plus) {
                    for &p in &lastpos {
                        followpos.entry(p).or_default().extend(firstpos.iter().copied());
                    }
                }
                let op = match tok {
                    PostfixToken::Star => UnaryOp::Star,
                    PostfixToken::Plus => UnaryOp::Plus,
                    PostfixToken::Question => UnaryOp::Question,
                    _ => unreachable!(),
                };
                stack.push(ScratchEntry::Operand(Box::new(Node::Unary {
                    op,
                    child,
                    nullable,
                    firstpos,
                    lastpos,
                })));
            }
            PostfixToken::Concat | PostfixToken::Alternation => {
                let ScratchEntry::Operand(right) =
                    stack.pop().ok_or(SyntaxError::EmptyStack(tok))?;
                let ScratchEntry::Operand(left) =
                    stack.pop().ok_or(SyntaxError::EmptyStack(tok))?;
                let (op, nullable, firstpos, lastpos) = match tok {
                    PostfixToken::Concat => {
                        let nullable = left.nullable() && right.nullable();
                        let firstpos = if !left.nullable() {
                            left.firstpos().to_vec()
                        } else {
                            union(left.firstpos(), right.firstpos())
                        };
                        let lastpos = if !right.nullable() {
                            right.lastpos().to_vec()
                        } else {
                            union(left.lastpos(), right.lastpos())
                        };
                        for &p in left.lastpos() {
                            followpos.entry(p).or_default().extend(right.firstpos().iter().copied());
                        }
                        (BinaryOp::Concat, nullable, firstpos, lastpos)
                    }
                    PostfixToken::Alternation => {
                        let nullable = left.nullable() || right.nullable();
                        let firstpos = union(left.firstpos(), right.firstpos());
                        let lastpos = union(left.lastpos(), right.lastpos());
                        (BinaryOp::Alternation, nullable, firstpos, lastpos)
                    }
                    _ => unreachable!(),
                };
                stack.push(ScratchEntry::Operand(Box::new(Node::Binary {
                    op,
                    left,
                    right,
                    nullable,
                    firstpos,
                    lastpos,
                })));
            }
        }
    }

    if stack.len() != 1 {
        return Err(SyntaxError::MalformedPostfix(stack.len()));
    }
    let ScratchEntry::Operand(root) = stack.pop().unwrap();
    let end_marker_position = end_marker_position.ok_or(SyntaxError::MissingEndMarker)?;

    Ok(SyntaxTree {
        root: *root,
        followpos,
        end_marker_position,
        leaf_symbols,
    })
}

fn union(a: &[Position], b: &[Position]) -> Vec<Position> {
    let mut set: HashSet<Position> = a.iter().copied().collect();
    set.extend(b.iter().copied());
    let mut v: Vec<Position> = set.into_iter().collect();
    v.sort_unstable();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::compile_pattern;

    #[test]
    fn single_literal_followpos_points_to_end_marker() {
        let postfix = compile_pattern("a").unwrap();
        let tree = build(&postfix).unwrap();
        // positions: 1 = 'a', 2 = '#'
        assert_eq!(tree.followpos[&1], HashSet::from([2]));
        assert!(tree.followpos[&2].is_empty());
        assert_eq!(tree.end_marker_position, 2);
    }

    #[test]
    fn star_feeds_back_into_itself() {
        let postfix = compile_pattern("a*").unwrap();
        let tree = build(&postfix).unwrap();
        // position 1 = 'a', position 2 = '#'
        assert_eq!(tree.followpos[&1], HashSet::from([1, 2]));
        let star_node = match &tree.root {
            Node::Binary { left, .. } => left.as_ref(),
            other => other,
        };
        assert!(star_node.nullable());
    }

    #[test]
    fn plus_requires_at_least_one_occurrence() {
        let postfix = compile_pattern("a+").unwrap();
        let tree = build(&postfix).unwrap();
        assert_eq!(tree.followpos[&1], HashSet::from([1, 2]));
        // a+ is not nullable even though its followpos looks like a*'s
        let plus_node = match &tree.root {
            Node::Binary { left, .. } => left.as_ref(),
            other => other,
        };
        assert!(!plus_node.nullable());
    }

    #[test]
    fn alternation_unions_first_and_last() {
        let postfix = compile_pattern("a|b").unwrap();
        let tree = build(&postfix).unwrap();
        // 1 = a, 2 = b, 3 = #
        assert_eq!(tree.followpos[&1], HashSet::from([3]));
        assert_eq!(tree.followpos[&2], HashSet::from([3]));
    }

    #[test]
    fn malformed_postfix_is_rejected() {
        let bad = vec![PostfixToken::Concat];
        assert_eq!(build(&bad), Err(SyntaxError::EmptyStack(PostfixToken::Concat)));
    }
}
