//! `Path`: a traversed sequence of edges, plus the left-to-right processing
//! sweep that assigns every edge a stable substring and the min-iteration /
//! evil-mutation string generators that ride on it.

use std::collections::BTreeSet;

use crate::location::Location;
use crate::nfa::edge::{Edge, PathStep};

/// An edge whose location falls within a group's span contributes to that
/// group's captured substring when a backreference later resolves it.
fn within(loc: Location, group_loc: Location) -> bool {
    !loc.is_none() && !group_loc.is_none() && loc.start >= group_loc.start && loc.end <= group_loc.end
}

#[derive(Debug, Clone)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub test_string: String,
    pub evil_edges: Vec<usize>,
    processed: bool,
}

impl Path {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Path { steps, test_string: String::new(), evil_edges: Vec::new(), processed: false }
    }

    /// Left-to-right sweep assigning every character-set / string / loop /
    /// backreference edge a stable substring under the path's prefix, and
    /// selecting the evil-eligible edge indices.
    pub fn process_path(&mut self, base_substring: &str) {
        let mut s = String::new();
        let mut pieces: Vec<(Location, String)> = Vec::with_capacity(self.steps.len());
        let mut evil = Vec::new();
        // start index of the loop body currently open, keyed by nesting depth
        let mut loop_starts: Vec<usize> = Vec::new();

        for (i, step) in self.steps.iter().enumerate() {
            let is_evil = step.edge.is_evil_candidate();
            match &step.edge {
                Edge::Character(c) => {
                    s.push(*c);
                }
                Edge::CharSet(rc) => {
                    let mut cs = rc.borrow_mut();
                    cs.set_prefix(s.clone());
                    let pick = cs.pick_representative(base_substring).unwrap_or('a');
                    cs.set_substring(pick.to_string());
                    s.push(pick);
                }
                Edge::String(rc) => {
                    let mut rs = rc.borrow_mut();
                    rs.prefix = s.clone();
                    rs.substring = base_substring.to_string();
                    s.push_str(base_substring);
                }
                Edge::BeginLoop(rc) => {
                    rc.borrow_mut().prefix = s.clone();
                    loop_starts.push(s.len());
                }
                Edge::EndLoop(rc) => {
                    let start = loop_starts.pop().unwrap_or(s.len());
                    let mut loop_ref = rc.borrow_mut();
                    let unit = s[start..].to_string();
                    loop_ref.substring = unit.clone();
                    let mut count = if loop_ref.lower > 0 { loop_ref.lower } else { 1 };
                    if !loop_ref.is_unbounded() && count > loop_ref.upper {
                        count = loop_ref.upper;
                    }
                    loop_ref.chosen_count = count;
                    let expanded = unit.repeat(count.max(0) as usize);
                    loop_ref.expanded_len = expanded.len();
                    s.truncate(start);
                    s.push_str(&expanded);
                }
                Edge::Caret | Edge::Dollar | Edge::Epsilon => {}
                Edge::Backreference(rc) => {
                    let mut br = rc.borrow_mut();
                    br.prefix = s.clone();
                    let group_loc = br.group_loc;
                    let sub: String = pieces
                        .iter()
                        .filter(|(l, _)| within(*l, group_loc))
                        .map(|(_, p)| p.as_str())
                        .collect();
                    br.substring = sub.clone();
                    s.push_str(&sub);
                }
            }
            // Record the piece this step itself contributed, for later
            // backreference scans to find edges inside a group's span.
            pieces.push((step.loc, last_contribution(&step.edge)));
            if is_evil {
                evil.push(i);
            }
        }

        self.test_string = s;
        self.evil_edges = evil;
        self.processed = true;
    }

    /// Minimum-iteration string: reuses the substrings cached by
    /// `process_path`, repeating loop bodies `lower` times instead of the
    /// canonical chosen count. Must be called after `process_path`.
    pub fn gen_min_iter_string(&self) -> String {
        debug_assert!(self.processed, "gen_min_iter_string called before process_path");
        let mut s = String::new();
        let mut loop_starts: Vec<usize> = Vec::new();
        for step in &self.steps {
            match &step.edge {
                Edge::Character(c) => s.push(*c),
                Edge::CharSet(rc) => s.push_str(rc.borrow().substring()),
                Edge::String(rc) => {
                    let rs = rc.borrow();
                    // A regex-string edge's minimum match is a single
                    // representative character, not the full canonical run.
                    if rs.repeat_lower > 0 {
                        if let Some(c) = rs.substring.chars().next() {
                            s.push(c);
                        }
                    }
                }
                Edge::BeginLoop(_) => loop_starts.push(s.len()),
                Edge::EndLoop(rc) => {
                    let start = loop_starts.pop().unwrap_or(s.len());
                    let loop_ref = rc.borrow();
                    let unit = s[start..].to_string();
                    s.truncate(start);
                    if loop_ref.lower > 0 {
                        s.push_str(&unit.repeat(loop_ref.lower as usize));
                    }
                }
                Edge::Backreference(rc) => s.push_str(&rc.borrow().substring),
                Edge::Caret | Edge::Dollar | Edge::Epsilon => {}
            }
        }
        s
    }

    /// Evil mutations: for each evil edge, substitute a catalog-derived
    /// variant substring in place of that edge's canonical substring,
    /// splicing into the canonical `test_string`.
    pub fn gen_evil_strings(&self, punct_marks: &BTreeSet<char>) -> Vec<String> {
        debug_assert!(self.processed, "gen_evil_strings called before process_path");
        let mut out = Vec::new();
        for &i in &self.evil_edges {
            let step = &self.steps[i];
            match &step.edge {
                Edge::CharSet(rc) => {
                    if self.is_loop_wrapped_singleton(i) {
                        // Covered by the flanking BEGIN_LOOP's own catalog;
                        // skip to avoid overlapping splices (DESIGN.md).
                        continue;
                    }
                    let cs = rc.borrow();
                    let start = cs.prefix().len();
                    let end = start + cs.substring().len();
                    for variant in crate::generator::charset_mutations(&cs, punct_marks) {
                        out.push(splice(&self.test_string, start, end, &variant));
                    }
                }
                Edge::String(rc) => {
                    let rs = rc.borrow();
                    let start = rs.prefix.len();
                    let end = start + rs.substring.len();
                    for variant in crate::generator::regex_string_mutations(&rs, punct_marks) {
                        out.push(splice(&self.test_string, start, end, &variant));
                    }
                }
                Edge::BeginLoop(rc) => {
                    let loop_ref = rc.borrow();
                    let start = loop_ref.prefix.len();
                    let end = start + loop_ref.expanded_len;
                    for variant in crate::generator::loop_mutations(&loop_ref) {
                        out.push(splice(&self.test_string, start, end, &variant));
                    }
                }
                Edge::Backreference(rc) => {
                    let br = rc.borrow();
                    let start = br.prefix.len();
                    let end = start + br.substring.len();
                    for variant in crate::generator::backref_mutations(&br) {
                        out.push(splice(&self.test_string, start, end, &variant));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn is_loop_wrapped_singleton(&self, idx: usize) -> bool {
        let prev_is_begin = idx > 0 && matches!(self.steps[idx - 1].edge, Edge::BeginLoop(_));
        let next_is_end = idx + 1 < self.steps.len() && matches!(self.steps[idx + 1].edge, Edge::EndLoop(_));
        prev_is_begin && next_is_end
    }
}

/// Helper used only to populate the backref lookup table during the main
/// sweep; loop edges deliberately contribute nothing of their own (their
/// body edges already recorded individually).
fn last_contribution(edge: &Edge) -> String {
    match edge {
        Edge::Character(c) => c.to_string(),
        Edge::CharSet(rc) => rc.borrow().substring().to_string(),
        Edge::String(rc) => rc.borrow().substring.clone(),
        Edge::Backreference(rc) => rc.borrow().substring.clone(),
        Edge::BeginLoop(_) | Edge::EndLoop(_) | Edge::Caret | Edge::Dollar | Edge::Epsilon => String::new(),
    }
}

fn splice(original: &str, start: usize, end: usize, variant: &str) -> String {
    let start = start.min(original.len());
    let end = end.clamp(start, original.len());
    let mut out = String::with_capacity(original.len());
    out.push_str(&original[..start]);
    out.push_str(variant);
    out.push_str(&original[end..]);
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::nfa::builder::build;
    use crate::nfa::basis_paths::find_basis_paths;
    use crate::parser::parse;

    fn process_all(regex: &str, base: &str) -> Vec<Path> {
        let tree = parse(regex).unwrap();
        let nfa = build(&tree);
        let mut paths = find_basis_paths(&nfa);
        for p in &mut paths {
            p.process_path(base);
        }
        paths
    }

    #[test]
    fn canonical_string_for_charset_plus() {
        let paths = process_all("[a-z]+", "evil");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].test_string, "evil");
    }

    #[test]
    fn min_iter_for_charset_plus() {
        let paths = process_all("[a-z]+", "evil");
        assert_eq!(paths[0].gen_min_iter_string(), "e");
    }

    #[test]
    fn bounded_repeat_canonical_and_min() {
        let paths = process_all("a{3,5}", "evil");
        assert_eq!(paths[0].test_string, "aaa");
        assert_eq!(paths[0].gen_min_iter_string(), "aaa");
    }

    #[test]
    fn backreference_repeats_captured_group() {
        let paths = process_all(r"(ab)\1", "evil");
        assert_eq!(paths[0].test_string, "abab");
    }
}
