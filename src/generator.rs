//! Test-string synthesis: the three bands (canonical, minimum-iteration,
//! evil mutations), plus the per-edge-kind mutation catalogs.

use std::collections::{BTreeSet, VecDeque};

use crate::charset::CharSet;
use crate::nfa::edge::{Backref, RegexLoop, RegexString};
use crate::path::Path;
use crate::stats::Stats;

/// Evil-mutation catalog for a `CHAR_SET` edge: class-boundary samples, a
/// case-flip, and the empty string.
pub fn charset_mutations(cs: &CharSet, punct_marks: &BTreeSet<char>) -> Vec<String> {
    let mut variants = vec!["5".to_string(), "z".to_string(), " ".to_string(), "_".to_string()];
    if let Some(p) = punct_marks.iter().next() {
        variants.push(p.to_string());
    }
    if let Some(c) = cs.substring().chars().next() {
        variants.push(flip_case(c).to_string());
    }
    variants.push(String::new());
    variants
}

/// Evil-mutation catalog for a `STRING` (regex-string) edge: empty/injected
/// substitutions, a mid-string injection, case variants, and punctuation
/// from the base substring's alphabet when the set allows it.
pub fn regex_string_mutations(rs: &RegexString, punct_marks: &BTreeSet<char>) -> Vec<String> {
    let sub = rs.substring.as_str();
    let mut variants = vec![
        String::new(),
        "_".to_string(),
        "6".to_string(),
        " ".to_string(),
    ];
    if let Some(first) = sub.chars().next() {
        variants.push(first.to_string());
    }
    if sub.chars().count() >= 2 {
        let mid = byte_midpoint(sub);
        let (before, after) = sub.split_at(mid);
        for inject in ["4", " ", "_"] {
            variants.push(format!("{before}{inject}{after}"));
        }
    }
    variants.push(sub.to_uppercase());
    variants.push(sub.to_lowercase());
    variants.push(mixed_case(sub));
    if rs.char_set.allows_punctuation(punct_marks) {
        for p in punct_marks {
            variants.push(p.to_string());
        }
    }
    variants
}

/// Evil-mutation catalog for a loop's BEGIN_LOOP edge: boundary repeat
/// counts plus a "doubled" variant.
pub fn loop_mutations(loop_ref: &RegexLoop) -> Vec<String> {
    let unit = loop_ref.substring.as_str();
    let mut variants = Vec::new();
    // Zero repetitions always probes the lower bound: it's the canonical
    // match when lower == 0, and a guaranteed violation whenever lower > 0.
    variants.push(String::new());
    if loop_ref.lower > 0 {
        variants.push(unit.repeat((loop_ref.lower - 1).max(0) as usize));
    }
    if !loop_ref.is_unbounded() {
        variants.push(unit.repeat((loop_ref.upper + 1).max(0) as usize));
    }
    variants.push(unit.repeat(loop_ref.lower.max(0) as usize));
    let upper_like = if loop_ref.is_unbounded() { loop_ref.lower + 2 } else { loop_ref.upper };
    variants.push(unit.repeat(upper_like.max(0) as usize));
    variants.push(unit.repeat((loop_ref.chosen_count.max(0) as usize) * 2));
    variants
}

/// Evil-mutation catalog for a backreference edge: variants deliberately
/// differing from the captured substring.
pub fn backref_mutations(br: &Backref) -> Vec<String> {
    let sub = br.substring.as_str();
    let mut variants = vec![swap_case(sub)];
    if sub.chars().count() > 1 {
        let shortened: String = sub.chars().take(sub.chars().count() - 1).collect();
        variants.push(shortened);
    }
    variants.push(format!("{sub}x"));
    variants
}

fn flip_case(c: char) -> char {
    if c.is_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

fn swap_case(s: &str) -> String {
    s.chars().map(flip_case).collect()
}

fn mixed_case(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    if !chars.is_empty() {
        chars[0] = chars[0].to_ascii_lowercase();
    }
    if chars.len() > 1 {
        chars[1] = chars[1].to_ascii_uppercase();
    }
    chars.into_iter().collect()
}

fn byte_midpoint(s: &str) -> usize {
    let half = s.len() / 2;
    (0..=half).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

/// Drives the three-band test string synthesis across all basis paths.
pub struct TestGenerator<'a> {
    paths: &'a [Path],
    punct_marks: BTreeSet<char>,
    debug_mode: bool,
    num_gen_strings: usize,
}

impl<'a> TestGenerator<'a> {
    pub fn new(paths: &'a [Path], punct_marks: BTreeSet<char>, debug_mode: bool) -> Self {
        TestGenerator { paths, punct_marks, debug_mode, num_gen_strings: 0 }
    }

    pub fn gen_test_strings(&mut self) -> Vec<String> {
        let mut strings = Vec::new();

        for path in self.paths {
            strings.push(path.test_string.clone());
        }
        if self.debug_mode {
            tracing::info!(strings = ?strings, "initial test strings from basis paths");
        }

        for path in self.paths {
            let min_iter = path.gen_min_iter_string();
            if self.debug_mode {
                tracing::info!(%min_iter, "minimum iteration test string");
            }
            strings.push(min_iter);
        }

        for path in self.paths {
            strings.extend(path.gen_evil_strings(&self.punct_marks));
        }

        // Front-insertion dedup: keeps the first occurrence of each string,
        // but reverses accumulation order in the result.
        let mut seen: VecDeque<String> = VecDeque::new();
        for s in strings {
            if !seen.contains(&s) {
                seen.push_front(s);
            }
        }
        self.num_gen_strings = seen.len();
        seen.into_iter().collect()
    }

    pub fn add_stats(&self, stats: &mut Stats) {
        stats.add("PATHS", "Paths", self.paths.len() as i64);
        stats.add("PATHS", "Strings", self.num_gen_strings as i64);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::nfa::basis_paths::find_basis_paths;
    use crate::nfa::builder::build;
    use crate::parser::parse;

    #[test]
    fn dedup_has_no_repeats() {
        let tree = parse("[a-z]+").unwrap();
        let nfa = build(&tree);
        let mut paths = find_basis_paths(&nfa);
        for p in &mut paths {
            p.process_path("evil");
        }
        let mut gen = TestGenerator::new(&paths, tree.punct_marks.clone(), false);
        let out = gen.gen_test_strings();
        let unique: BTreeSet<&String> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn scenario_charset_plus_contains_expected_variants() {
        let tree = parse("[a-z]+").unwrap();
        let nfa = build(&tree);
        let mut paths = find_basis_paths(&nfa);
        for p in &mut paths {
            p.process_path("evil");
        }
        let mut gen = TestGenerator::new(&paths, tree.punct_marks.clone(), false);
        let out = gen.gen_test_strings();
        assert!(out.contains(&"evil".to_string()));
        assert!(out.contains(&"e".to_string()));
        assert!(out.contains(&String::new()));
    }
}
