//! Thompson-style construction from `ParseNode` to `Nfa`: each node builds a
//! `Fragment` (an isolated sub-NFA with its own entry/exit), and fragments
//! compose by shifting one fragment's state indices above the other's before
//! splicing their edge tables together.

use crate::charset::CharSet;
use crate::location::Location;
use crate::nfa::edge::{Backref, Edge, RegexLoop, RegexString};
use crate::nfa::Nfa;
use crate::parse_tree::{ParseNode, ParseTree};

/// A sub-automaton under construction: locally 0-based state numbering.
struct Fragment {
    size: usize,
    initial: usize,
    final_: usize,
    edges: Vec<(usize, usize, Edge, Location)>,
}

impl Fragment {
    fn leaf(edge: Edge, loc: Location) -> Fragment {
        Fragment {
            size: 2,
            initial: 0,
            final_: 1,
            edges: vec![(0, 1, edge, loc)],
        }
    }

    fn shifted(mut self, offset: usize) -> Fragment {
        self.initial += offset;
        self.final_ += offset;
        for (from, to, _, _) in self.edges.iter_mut() {
            *from += offset;
            *to += offset;
        }
        self
    }
}

fn build_concat(a: Fragment, b: Fragment) -> Fragment {
    let a_size = a.size;
    let b = b.shifted(a_size);
    let mut edges = a.edges;
    edges.extend(b.edges);
    edges.push((a.final_, b.initial, Edge::Epsilon, Location::NONE));
    Fragment {
        size: a_size + b.size,
        initial: a.initial,
        final_: b.final_,
        edges,
    }
}

fn build_alternation(a: Fragment, b: Fragment) -> Fragment {
    let a = a.shifted(1);
    let a_size = a.size;
    let b = b.shifted(1 + a_size);
    let final_state = 1 + a_size + b.size;
    let mut edges = vec![
        (0, a.initial, Edge::Epsilon, Location::NONE),
        (0, b.initial, Edge::Epsilon, Location::NONE),
    ];
    edges.extend(a.edges);
    edges.extend(b.edges);
    edges.push((a.final_, final_state, Edge::Epsilon, Location::NONE));
    edges.push((b.final_, final_state, Edge::Epsilon, Location::NONE));
    Fragment {
        size: final_state + 1,
        initial: 0,
        final_: final_state,
        edges,
    }
}

fn build_repeat(child: Fragment, lower: i64, upper: i64, loc: Location) -> Fragment {
    let child = child.shifted(1);
    let child_size = child.size;
    let final_state = 1 + child_size;
    let loop_rc = RegexLoop::new(lower, upper);
    let mut edges = vec![(0, child.initial, Edge::BeginLoop(loop_rc.clone()), loc)];
    edges.extend(child.edges);
    edges.push((child.final_, final_state, Edge::EndLoop(loop_rc), loc));
    Fragment {
        size: final_state + 1,
        initial: 0,
        final_: final_state,
        edges,
    }
}

/// Repetition specialization: a REPEAT over a CHAR_SET becomes a single
/// STRING edge when the quantifier is `*`/`+` and the set is a "string
/// candidate".
fn is_string_specialization(child: &ParseNode, lower: i64, upper: i64) -> Option<(CharSet, Location)> {
    if let ParseNode::CharSet(cs, loc) = child {
        if upper == -1 && (lower == 0 || lower == 1) && cs.is_string_candidate() {
            return Some((cs.clone(), *loc));
        }
    }
    None
}

fn build_node(node: &ParseNode) -> Fragment {
    match node {
        ParseNode::Alternation(a, b) => build_alternation(build_node(a), build_node(b)),
        ParseNode::Concat(a, b) => build_concat(build_node(a), build_node(b)),
        ParseNode::Repeat { child, lower, upper, loc } => {
            if let Some((cs, cloc)) = is_string_specialization(child, *lower, *upper) {
                let regex_string = RegexString::new(cs, *lower, *upper);
                return Fragment::leaf(
                    Edge::String(std::rc::Rc::new(std::cell::RefCell::new(regex_string))),
                    cloc,
                );
            }
            let child_frag = build_node(child);
            build_repeat(child_frag, *lower, *upper, *loc)
        }
        // Group is transparent: no states added.
        ParseNode::Group { child, .. } => build_node(child),
        ParseNode::Character(c, loc) => Fragment::leaf(Edge::Character(*c), *loc),
        ParseNode::CharSet(cs, loc) => Fragment::leaf(
            Edge::CharSet(std::rc::Rc::new(std::cell::RefCell::new(cs.clone()))),
            *loc,
        ),
        ParseNode::Caret(loc) => Fragment::leaf(Edge::Caret, *loc),
        ParseNode::Dollar(loc) => Fragment::leaf(Edge::Dollar, *loc),
        ParseNode::Backreference { group_loc, loc, .. } => {
            Fragment::leaf(Edge::Backreference(Backref::new(*group_loc)), *loc)
        }
        // Ignored group lowers to a single epsilon edge.
        ParseNode::Ignored(loc) => Fragment::leaf(Edge::Epsilon, *loc),
    }
}

/// Lowers a parse tree into an acyclic NFA.
pub fn build(tree: &ParseTree) -> Nfa {
    let frag = build_node(&tree.root);
    let mut nfa = Nfa::new(frag.size, frag.initial, frag.final_);
    for (from, to, edge, loc) in frag.edges {
        nfa.add_edge(from, to, edge, loc);
    }
    nfa
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::parser::parse;

    #[test]
    fn single_char_builds_two_state_nfa() {
        let tree = parse("a").unwrap();
        let nfa = build(&tree);
        assert_eq!(nfa.size, 2);
        assert_ne!(nfa.initial, nfa.final_state);
    }

    #[test]
    fn concat_chains_states() {
        let tree = parse("ab").unwrap();
        let nfa = build(&tree);
        assert_eq!(nfa.size, 4);
    }

    #[test]
    fn alternation_adds_glue_states() {
        let tree = parse("a|b").unwrap();
        let nfa = build(&tree);
        assert_eq!(nfa.size, 6);
    }

    #[test]
    fn star_over_word_class_becomes_string_edge() {
        let tree = parse(r"\w*").unwrap();
        let nfa = build(&tree);
        assert_eq!(nfa.size, 2);
        let (_, edge, _) = nfa.outgoing(nfa.initial).next().unwrap();
        assert!(matches!(edge, Edge::String(_)));
    }

    #[test]
    fn bounded_repeat_uses_loop_edges() {
        let tree = parse("a{3,5}").unwrap();
        let nfa = build(&tree);
        let (_, edge, _) = nfa.outgoing(nfa.initial).next().unwrap();
        assert!(matches!(edge, Edge::BeginLoop(_)));
    }
}
