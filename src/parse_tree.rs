//! `ParseNode`: the tagged-variant parse tree produced by the parser, and
//! `ParseTree`, the owning container plus group/punctuation bookkeeping
//! threaded through from the scanner to the NFA builder.

use std::collections::{BTreeMap, BTreeSet};

use crate::charset::CharSet;
use crate::location::Location;
use crate::token::BackrefTarget;

/// A node in the rooted, exclusively-owned parse tree.
#[derive(Debug, Clone)]
pub enum ParseNode {
    Alternation(Box<ParseNode>, Box<ParseNode>),
    Concat(Box<ParseNode>, Box<ParseNode>),
    Repeat {
        child: Box<ParseNode>,
        lower: i64,
        upper: i64,
        loc: Location,
    },
    /// `name` is empty for an unnamed capturing group; non-capturing groups
    /// are represented by `Group { number: None, .. }`.
    Group {
        child: Box<ParseNode>,
        name: String,
        number: Option<u32>,
        loc: Location,
    },
    Character(char, Location),
    CharSet(CharSet, Location),
    Caret(Location),
    Dollar(Location),
    Backreference {
        target: BackrefTarget,
        group_loc: Location,
        loc: Location,
    },
    /// `(?#...)` and unrecognized `(?...)` extensions: transparent, lowers to
    /// a single epsilon edge. Also the root of an empty regex.
    Ignored(Location),
}

impl ParseNode {
    pub fn loc(&self) -> Location {
        match self {
            ParseNode::Alternation(a, _) => a.loc(),
            ParseNode::Concat(a, _) => a.loc(),
            ParseNode::Repeat { loc, .. }
            | ParseNode::Group { loc, .. }
            | ParseNode::Character(_, loc)
            | ParseNode::CharSet(_, loc)
            | ParseNode::Caret(loc)
            | ParseNode::Dollar(loc)
            | ParseNode::Backreference { loc, .. }
            | ParseNode::Ignored(loc) => *loc,
        }
    }
}

/// The parse tree plus the side tables the NFA builder and checker need:
/// group locations (for backreference binding) and the punctuation alphabet
/// observed while parsing (for the test generator's mutation catalog).
#[derive(Debug, Clone)]
pub struct ParseTree {
    pub root: ParseNode,
    pub group_locs_by_number: BTreeMap<u32, Location>,
    pub group_locs_by_name: BTreeMap<String, Location>,
    pub punct_marks: BTreeSet<char>,
}

impl ParseTree {
    pub fn get_punct_marks(&self) -> BTreeSet<char> {
        self.punct_marks.clone()
    }
}
