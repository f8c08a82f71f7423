//! Recursive-descent parser producing a `ParseTree`, following the grammar
//! below.
//!
//! ```text
//! expr    := concat '|' expr | concat '|' | '|' expr | '|' | concat
//! concat  := rep concat | rep
//! rep     := atom ('*' | '+' | '?' | '{n,m}')?
//! atom    := group | character | char_class | char_set | caret | dollar | backref
//! group   := '(' [ext] expr? ')'
//! char_set:= '[' ['^'] char_list ']'
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::charset::{CharSet, CharSetItem};
use crate::error::ParseError;
use crate::location::Location;
use crate::parse_tree::{ParseNode, ParseTree};
use crate::scanner::{class_as_charset, Scanner};
use crate::token::{BackrefTarget, GroupExt, TokenKind};

struct Parser {
    scanner: Scanner,
    next_group_num: u32,
    group_locs_by_number: BTreeMap<u32, Location>,
    group_locs_by_name: BTreeMap<String, Location>,
    punct_marks: BTreeSet<char>,
}

pub fn parse(regex: &str) -> Result<ParseTree, ParseError> {
    let scanner = Scanner::init(regex)?;
    let mut parser = Parser {
        scanner,
        next_group_num: 0,
        group_locs_by_number: BTreeMap::new(),
        group_locs_by_name: BTreeMap::new(),
        punct_marks: BTreeSet::new(),
    };
    let root_opt = parser.parse_expr()?;
    if !matches!(parser.scanner.current_token().kind, TokenKind::Err) {
        return Err(ParseError::UnexpectedToken {
            offset: parser.scanner.current_location().start.max(0) as usize,
        });
    }
    let root = root_opt.unwrap_or(ParseNode::Ignored(Location::NONE));
    Ok(ParseTree {
        root,
        group_locs_by_number: parser.group_locs_by_number,
        group_locs_by_name: parser.group_locs_by_name,
        punct_marks: parser.punct_marks,
    })
}

impl Parser {
    fn advance(&mut self) -> Result<(), ParseError> {
        self.scanner.advance().map_err(ParseError::from)
    }

    /// `expr := concat ('|' concat)*`, with empty branches allowed and the
    /// `a|`/`|a` → `a?` rewrite, and an all-empty chain rejected as
    /// "pointless alternation".
    fn parse_expr(&mut self) -> Result<Option<ParseNode>, ParseError> {
        let mut branches = vec![self.parse_concat()?];
        while matches!(self.scanner.current_token().kind, TokenKind::Alternation) {
            self.advance()?;
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            return Ok(branches.into_iter().next().flatten());
        }
        if branches.iter().all(|b| b.is_none()) {
            return Err(ParseError::PointlessAlternation);
        }
        let mut iter = branches.into_iter();
        let mut acc = iter.next().flatten();
        for branch in iter {
            acc = Some(Self::combine_alt(acc, branch));
        }
        Ok(acc)
    }

    fn combine_alt(left: Option<ParseNode>, right: Option<ParseNode>) -> ParseNode {
        match (left, right) {
            (Some(l), None) => {
                let loc = l.loc();
                ParseNode::Repeat {
                    child: Box::new(l),
                    lower: 0,
                    upper: 1,
                    loc,
                }
            }
            (None, Some(r)) => {
                let loc = r.loc();
                ParseNode::Repeat {
                    child: Box::new(r),
                    lower: 0,
                    upper: 1,
                    loc,
                }
            }
            (Some(l), Some(r)) => ParseNode::Alternation(Box::new(l), Box::new(r)),
            (None, None) => ParseNode::Ignored(Location::NONE),
        }
    }

    fn parse_concat(&mut self) -> Result<Option<ParseNode>, ParseError> {
        if !self.scanner.is_concat() {
            return Ok(None);
        }
        let mut node = self.parse_rep()?;
        while self.scanner.is_concat() {
            let next = self.parse_rep()?;
            node = ParseNode::Concat(Box::new(node), Box::new(next));
        }
        Ok(Some(node))
    }

    fn parse_rep(&mut self) -> Result<ParseNode, ParseError> {
        let atom = self.parse_atom()?;
        let loc = atom.loc();
        let kind = self.scanner.current_token().kind.clone();
        let node = match kind {
            TokenKind::Star => {
                self.advance()?;
                ParseNode::Repeat { child: Box::new(atom), lower: 0, upper: -1, loc }
            }
            TokenKind::Plus => {
                self.advance()?;
                ParseNode::Repeat { child: Box::new(atom), lower: 1, upper: -1, loc }
            }
            TokenKind::Question => {
                self.advance()?;
                ParseNode::Repeat { child: Box::new(atom), lower: 0, upper: 1, loc }
            }
            TokenKind::Repeat { lower, upper } => {
                self.advance()?;
                ParseNode::Repeat { child: Box::new(atom), lower, upper, loc }
            }
            _ => atom,
        };
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<ParseNode, ParseError> {
        let tok = self.scanner.current_token().clone();
        match tok.kind {
            TokenKind::LeftParen(GroupExt::Ignored) => {
                self.advance()?;
                Ok(ParseNode::Ignored(tok.loc))
            }
            TokenKind::LeftParen(ext) => self.parse_group(ext, tok.loc),
            TokenKind::LeftBracket { negated } => self.parse_bracket(negated, tok.loc),
            TokenKind::Character(c) => {
                self.advance()?;
                if c.is_ascii_punctuation() {
                    self.punct_marks.insert(c);
                }
                Ok(ParseNode::Character(c, tok.loc))
            }
            TokenKind::CharClass(k) => {
                self.advance()?;
                Ok(ParseNode::CharSet(class_as_charset(k), tok.loc))
            }
            TokenKind::Caret => {
                self.advance()?;
                Ok(ParseNode::Caret(tok.loc))
            }
            TokenKind::Dollar => {
                self.advance()?;
                Ok(ParseNode::Dollar(tok.loc))
            }
            TokenKind::WordBoundary => {
                // No dedicated ParseNode variant; treated as a transparent
                // zero-width node like an ignored extension.
                self.advance()?;
                Ok(ParseNode::Ignored(tok.loc))
            }
            TokenKind::Backreference(target) => {
                self.advance()?;
                let group_loc = match &target {
                    BackrefTarget::Number(n) => self.group_locs_by_number.get(n).copied(),
                    BackrefTarget::Name(n) => self.group_locs_by_name.get(n).copied(),
                };
                let group_loc = group_loc.ok_or_else(|| ParseError::UnresolvedBackref {
                    reference: match &target {
                        BackrefTarget::Number(n) => n.to_string(),
                        BackrefTarget::Name(n) => n.clone(),
                    },
                    offset: tok.loc.start.max(0) as usize,
                })?;
                Ok(ParseNode::Backreference { target, group_loc, loc: tok.loc })
            }
            _ => Err(ParseError::UnexpectedToken {
                offset: tok.loc.start.max(0) as usize,
            }),
        }
    }

    fn parse_group(&mut self, ext: GroupExt, start_loc: Location) -> Result<ParseNode, ParseError> {
        self.advance()?; // consume '(' token
        let number = match &ext {
            GroupExt::Capturing | GroupExt::Named(_) => {
                self.next_group_num += 1;
                Some(self.next_group_num)
            }
            GroupExt::NonCapturing | GroupExt::Ignored => None,
        };
        let name = match &ext {
            GroupExt::Named(n) => n.clone(),
            _ => String::new(),
        };
        let inner = self.parse_expr()?;
        let child = inner.unwrap_or(ParseNode::Ignored(Location::NONE));
        if !matches!(self.scanner.current_token().kind, TokenKind::RightParen) {
            return Err(ParseError::UnterminatedGroup {
                offset: start_loc.start.max(0) as usize,
            });
        }
        let end = self.scanner.current_location().end;
        self.advance()?; // consume ')'
        let full_loc = Location::new(start_loc.start.max(0) as usize, end.max(0) as usize);
        if let Some(n) = number {
            self.group_locs_by_number.insert(n, full_loc);
            if let GroupExt::Named(n2) = &ext {
                self.group_locs_by_name.insert(n2.clone(), full_loc);
            }
        }
        Ok(ParseNode::Group { child: Box::new(child), name, number, loc: full_loc })
    }

    fn parse_bracket(&mut self, negated: bool, start_loc: Location) -> Result<ParseNode, ParseError> {
        self.advance()?; // consume '[' (and leading '^' already absorbed by scanner)
        let mut items = Vec::new();
        loop {
            match self.scanner.current_token().kind.clone() {
                TokenKind::RightBracket => break,
                TokenKind::Hyphen => {
                    self.punct_marks.insert('-');
                    self.advance()?;
                    items.push(CharSetItem::Char('-'));
                }
                TokenKind::Character(c) => {
                    if self.scanner.is_char_range() {
                        self.advance()?; // past first char, now at HYPHEN
                        self.advance()?; // past hyphen, now at second char
                        let hi = match self.scanner.current_token().kind {
                            TokenKind::Character(c2) => c2,
                            _ => {
                                return Err(ParseError::UnexpectedToken {
                                    offset: self.scanner.current_location().start.max(0) as usize,
                                })
                            }
                        };
                        self.advance()?;
                        items.push(CharSetItem::Range(c, hi));
                    } else {
                        if c.is_ascii_punctuation() {
                            self.punct_marks.insert(c);
                        }
                        self.advance()?;
                        items.push(CharSetItem::Char(c));
                    }
                }
                TokenKind::CharClass(k) => {
                    self.advance()?;
                    items.push(CharSetItem::Class(k));
                }
                TokenKind::Err => {
                    return Err(ParseError::UnterminatedGroup {
                        offset: start_loc.start.max(0) as usize,
                    })
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        offset: self.scanner.current_location().start.max(0) as usize,
                    })
                }
            }
        }
        let end = self.scanner.current_location().end;
        self.advance()?; // consume ']'
        let loc = Location::new(start_loc.start.max(0) as usize, end.max(0) as usize);
        let cs = CharSet::new(items, negated);
        if let Some(c) = cs.as_single_char() {
            return Ok(ParseNode::Character(c, loc));
        }
        Ok(ParseNode::CharSet(cs, loc))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn empty_regex_is_ignored_node() {
        let tree = parse("").unwrap();
        assert!(matches!(tree.root, ParseNode::Ignored(_)));
    }

    #[test]
    fn pointless_alternation_is_fatal() {
        assert_eq!(parse("|"), Err(ParseError::PointlessAlternation));
        assert_eq!(parse("||"), Err(ParseError::PointlessAlternation));
    }

    #[test]
    fn trailing_right_alternation_is_optional() {
        let tree = parse("a|").unwrap();
        assert!(matches!(tree.root, ParseNode::Repeat { lower: 0, upper: 1, .. }));
    }

    #[test]
    fn single_char_bracket_rewritten() {
        let tree = parse("[a]").unwrap();
        assert!(matches!(tree.root, ParseNode::Character('a', _)));
    }

    #[test]
    fn unresolved_backref_is_fatal() {
        let err = parse(r"(ab)\2").unwrap_err();
        assert!(matches!(err, ParseError::UnresolvedBackref { .. }));
    }

    #[test]
    fn resolved_backref() {
        let tree = parse(r"(ab)\1").unwrap();
        assert!(matches!(tree.root, ParseNode::Concat(_, _)));
    }

    #[test]
    fn punct_marks_collected() {
        let tree = parse("a.,b").unwrap();
        assert!(tree.punct_marks.contains(&','));
    }
}
