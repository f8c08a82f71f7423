//! Structural diagnostics run over basis paths in check mode. Each rule here
//! is an independent pass over a `Path`'s steps that only ever reads state
//! and writes to the shared `AlertSink`.

use crate::alert::{Alert, AlertKind, AlertSink};
use crate::charset::{CharSet, CharSetItem};
use crate::location::Location;
use crate::nfa::edge::Edge;
use crate::path::Path;

const BRACE_CHARS: [char; 6] = ['(', ')', '{', '}', '[', ']'];

/// Runs the full rule suite over every path, plus the per-CharSet checks.
pub fn run_checks(paths: &[Path], sink: &mut AlertSink) {
    for path in paths {
        anchor_in_middle(path, sink);
        duplicate_punctuation_charsets(path, sink);
        optional_braces(path, sink);
        wild_punctuation(path, sink);
        repeat_punctuation(path, sink);
        digit_too_optional(path, sink);
        charset_structural_checks(path, sink);
    }
}

fn is_anchor(edge: &Edge) -> bool {
    matches!(edge, Edge::Caret | Edge::Dollar)
}

/// A `^` with a non-anchor edge somewhere before it, or a `$` with a
/// non-anchor edge somewhere after it, is almost certainly a mistake.
fn anchor_in_middle(path: &Path, sink: &mut AlertSink) {
    let mut seen_non_anchor = false;
    for (i, step) in path.steps.iter().enumerate() {
        if matches!(step.edge, Edge::Caret) && seen_non_anchor {
            if let Some(prev) = path.steps[..i].iter().rev().find(|s| !is_anchor(&s.edge)) {
                sink.add_alert(
                    Alert::new(
                        false,
                        AlertKind::AnchorMiddle,
                        "'^' appears after earlier non-anchored content",
                        step.loc,
                        prev.loc,
                    )
                    .with_example(path.test_string.clone()),
                );
            }
        }
        if !is_anchor(&step.edge) {
            seen_non_anchor = true;
        }
    }

    let mut seen_non_anchor_after = false;
    for (i, step) in path.steps.iter().enumerate().rev() {
        if matches!(step.edge, Edge::Dollar) && seen_non_anchor_after {
            if let Some(next) = path.steps[i + 1..].iter().find(|s| !is_anchor(&s.edge)) {
                sink.add_alert(
                    Alert::new(
                        false,
                        AlertKind::AnchorMiddle,
                        "'$' appears before later non-anchored content",
                        step.loc,
                        next.loc,
                    )
                    .with_example(path.test_string.clone()),
                );
            }
        }
        if !is_anchor(&step.edge) {
            seen_non_anchor_after = true;
        }
    }
}

/// A charset's "text key": the sorted, comma-joined textual form of its
/// items, used to recognize two occurrences as the same set written twice.
fn charset_key(cs: &CharSet) -> String {
    let mut parts: Vec<String> = cs
        .items()
        .iter()
        .map(|it| match it {
            CharSetItem::Char(c) => c.to_string(),
            CharSetItem::Range(lo, hi) => format!("{lo}-{hi}"),
            CharSetItem::Class(k) => format!("{k:?}"),
        })
        .collect();
    parts.sort();
    parts.join(",")
}

/// Both orderings of the plus/minus pair normalize to the same canonical
/// key, so they must be special-cased rather than compared pairwise.
const WHITELISTED_KEY: &str = "+,-";

/// Two or more punctuation-only charsets along the same path, textually
/// identical, are suspicious unless they're the `+-`/`-+` whitelist pair.
fn duplicate_punctuation_charsets(path: &Path, sink: &mut AlertSink) {
    let mut seen: Vec<(String, Location, char)> = Vec::new();
    for step in &path.steps {
        if let Edge::CharSet(rc) = &step.edge {
            let cs = rc.borrow();
            if !cs.is_punctuation_only() {
                continue;
            }
            let key = charset_key(&cs);
            if key == WHITELISTED_KEY {
                continue;
            }
            let pick = cs.substring().chars().next().unwrap_or('?');
            if let Some((_, first_loc, first_pick)) = seen.iter().find(|(k, _, _)| *k == key) {
                sink.add_alert(
                    Alert::new(
                        false,
                        AlertKind::DuplicatePunctuation,
                        format!(
                            "punctuation-only character set '{key}' repeats along this path \
                             (picked '{first_pick}' then '{pick}')"
                        ),
                        *first_loc,
                        step.loc,
                    )
                    .with_example(path.test_string.clone()),
                );
            } else {
                seen.push((key, step.loc, pick));
            }
        }
    }
}

#[derive(Clone, Copy)]
struct BraceSighting {
    ch: char,
    loc: Location,
}

/// Tracks whether each bracket/brace character appears inside a subgraph
/// whose governing loop has a zero lower bound (i.e. is entirely optional),
/// and emits an alert per pair or half-pair seen that way.
fn optional_braces(path: &Path, sink: &mut AlertSink) {
    let mut opt_depth = 0usize;
    let mut sightings: Vec<BraceSighting> = Vec::new();
    for step in &path.steps {
        match &step.edge {
            Edge::BeginLoop(rc) => {
                if rc.borrow().is_opt_repeat() {
                    opt_depth += 1;
                }
            }
            Edge::EndLoop(rc) => {
                if rc.borrow().is_opt_repeat() {
                    opt_depth = opt_depth.saturating_sub(1);
                }
            }
            Edge::Character(c) if opt_depth > 0 && BRACE_CHARS.contains(c) => {
                sightings.push(BraceSighting { ch: *c, loc: step.loc });
            }
            _ => {}
        }
    }

    for (open, close) in [('(', ')'), ('{', '}'), ('[', ']')] {
        let opens: Vec<&BraceSighting> = sightings.iter().filter(|s| s.ch == open).collect();
        let closes: Vec<&BraceSighting> = sightings.iter().filter(|s| s.ch == close).collect();
        if opens.is_empty() && closes.is_empty() {
            continue;
        }
        let loc1 = opens.first().map(|s| s.loc).unwrap_or(Location::NONE);
        let loc2 = closes.first().map(|s| s.loc).unwrap_or(Location::NONE);
        sink.add_alert(
            Alert::new(
                false,
                AlertKind::OptionalBraces,
                format!("'{open}'/'{close}' is made optional by an enclosing quantifier"),
                loc1,
                loc2,
            )
            .with_example(path.test_string.clone()),
        );
    }
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// A wildcard-like edge flanked by a literal punctuation character that the
/// wildcard can also match is redundant and usually a typo for a narrower set.
fn wild_punctuation(path: &Path, sink: &mut AlertSink) {
    for (i, step) in path.steps.iter().enumerate() {
        let Edge::CharSet(rc) = &step.edge else { continue };
        let cs = rc.borrow();
        if !(cs.is_wildcard() || cs.is_complement()) {
            continue;
        }
        let neighbors = [i.checked_sub(1), Some(i + 1).filter(|&n| n < path.steps.len())];
        for neighbor in neighbors.into_iter().flatten() {
            if let Edge::Character(c) = &path.steps[neighbor].edge {
                let c = *c;
                if is_punct(c) && cs.is_valid_character(c) {
                    sink.add_alert(
                        Alert::new(
                            false,
                            AlertKind::WildPunctuation,
                            format!("wildcard also matches the adjacent '{c}'"),
                            step.loc,
                            path.steps[neighbor].loc,
                        )
                        .with_suggest(format!("exclude '{c}' from the wildcard's character set")),
                    );
                }
            }
        }
    }
}

/// A loop whose single-character body is punctuation, repeated unboundedly
/// or at least twice, is a common source of catastrophic-backtracking-style
/// regexes in engines that do support backtracking; flagged regardless here.
fn repeat_punctuation(path: &Path, sink: &mut AlertSink) {
    for (i, step) in path.steps.iter().enumerate() {
        let Edge::BeginLoop(rc) = &step.edge else { continue };
        let loop_ref = rc.borrow();
        let allows_many = loop_ref.is_unbounded() || loop_ref.upper >= 2;
        if !allows_many {
            continue;
        }
        let Some(body) = path.steps.get(i + 1) else { continue };
        let punct_char = match &body.edge {
            Edge::CharSet(rc) => rc.borrow().get_repeat_punc_char(),
            Edge::Character(c) if is_punct(*c) => Some(*c),
            _ => None,
        };
        if let Some(c) = punct_char {
            sink.add_alert(
                Alert::new(
                    false,
                    AlertKind::RepeatPunctuation,
                    format!("'{c}' repeats {}", if loop_ref.is_unbounded() { "unboundedly" } else { "multiple times" }),
                    step.loc,
                    Location::NONE,
                )
                .with_example(path.test_string.clone()),
            );
        }
    }
}

fn could_match_digit(edge: &Edge) -> bool {
    match edge {
        Edge::Character(c) => c.is_ascii_digit(),
        Edge::CharSet(rc) => rc.borrow().is_valid_character('5'),
        Edge::String(rc) => rc.borrow().is_valid_character('5'),
        _ => false,
    }
}

/// A zero-lower-bound quantifier around an edge that could have matched a
/// digit, but whose minimum-iteration string contains none, means the digit
/// is effectively unreachable in the common case.
fn digit_too_optional(path: &Path, sink: &mut AlertSink) {
    let mut any_opt_digit = None;
    for (i, step) in path.steps.iter().enumerate() {
        let Edge::BeginLoop(rc) = &step.edge else { continue };
        if !rc.borrow().is_opt_repeat() {
            continue;
        }
        if let Some(body) = path.steps.get(i + 1) {
            if could_match_digit(&body.edge) {
                any_opt_digit = Some(step.loc);
                break;
            }
        }
    }
    if let Some(loc) = any_opt_digit {
        let min_iter = path.gen_min_iter_string();
        if !min_iter.chars().any(|c| c.is_ascii_digit()) {
            sink.add_alert(
                Alert::new(
                    false,
                    AlertKind::DigitTooOptional,
                    "an optional digit is absent from the minimum-iteration match",
                    loc,
                    Location::NONE,
                )
                .with_example(min_iter),
            );
        }
    }
}

/// Per-CharSet structural checks, fed through the same sink the path-level
/// rules use.
fn charset_structural_checks(path: &Path, sink: &mut AlertSink) {
    for step in &path.steps {
        if let Edge::CharSet(rc) = &step.edge {
            let cs = rc.borrow();
            for (lo, hi) in cs.bad_ranges() {
                sink.add_alert(Alert::new(
                    true,
                    AlertKind::BadCharRange,
                    format!("range '{lo}-{hi}' spans incompatible character classes"),
                    step.loc,
                    Location::NONE,
                ));
            }
            if cs.has_delimiter_confusion() {
                sink.add_alert(Alert::new(
                    true,
                    AlertKind::DelimiterConfusion,
                    "a ',' or '|' inside a character set rarely does what it looks like",
                    step.loc,
                    Location::NONE,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::alert::EngineOptions;
    use crate::nfa::builder::build;
    use crate::nfa::basis_paths::find_basis_paths;
    use crate::parser::parse;

    fn opts() -> EngineOptions {
        EngineOptions {
            check_mode: true,
            web_mode: false,
            debug_mode: false,
            stat_mode: false,
            base_substring: "evil".into(),
        }
    }

    fn checked_paths(regex: &str, base: &str) -> Vec<Path> {
        let tree = parse(regex).unwrap();
        let nfa = build(&tree);
        let mut paths = find_basis_paths(&nfa);
        for p in &mut paths {
            p.process_path(base);
        }
        paths
    }

    #[test]
    fn anchor_middle_flagged() {
        let paths = checked_paths("a^b", "evil");
        let mut sink = AlertSink::new("a^b", &opts());
        run_checks(&paths, &mut sink);
        assert!(sink.alerts().iter().any(|a| a.kind == AlertKind::AnchorMiddle));
    }

    #[test]
    fn clean_regex_has_no_anchor_alert() {
        let paths = checked_paths("abc", "evil");
        let mut sink = AlertSink::new("abc", &opts());
        run_checks(&paths, &mut sink);
        assert!(!sink.alerts().iter().any(|a| a.kind == AlertKind::AnchorMiddle));
    }

    #[test]
    fn bad_char_range_flagged() {
        let paths = checked_paths("[a-9]", "evil");
        let mut sink = AlertSink::new("[a-9]", &opts());
        run_checks(&paths, &mut sink);
        assert!(sink.alerts().iter().any(|a| a.kind == AlertKind::BadCharRange));
    }

    #[test]
    fn delimiter_confusion_flagged() {
        let paths = checked_paths("[a,b]", "evil");
        let mut sink = AlertSink::new("[a,b]", &opts());
        run_checks(&paths, &mut sink);
        assert!(sink.alerts().iter().any(|a| a.kind == AlertKind::DelimiterConfusion));
    }

    #[test]
    fn wild_punctuation_flagged() {
        let paths = checked_paths(r"\..", "evil");
        let mut sink = AlertSink::new(r"\..", &opts());
        run_checks(&paths, &mut sink);
        assert!(sink.alerts().iter().any(|a| a.kind == AlertKind::WildPunctuation));
    }
}
