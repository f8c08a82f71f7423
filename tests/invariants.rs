//! Structural invariants, exercised both as example-based assertions and
//! (behind the `slow_tests` feature) as property tests fuzzing the
//! scanner/parser/NFA pipeline for termination.

use egret::nfa::basis_paths::find_basis_paths;
use egret::nfa::builder::build;
use egret::parser::parse;

fn basis_paths_visit_every_state(regex: &str) -> bool {
    let Ok(tree) = parse(regex) else { return true };
    let nfa = build(&tree);
    let paths = find_basis_paths(&nfa);

    let mut visited = vec![false; nfa.size];
    for path in &paths {
        visited[nfa.initial] = true;
        for step in &path.steps {
            visited[step.dest] = true;
        }
    }
    visited.iter().all(|&v| v)
}

#[test]
fn basis_paths_cover_every_state_for_sample_regexes() {
    for regex in ["a", "ab", "a|b", "(a|b)(c|d)", "a*", "a+", "a?", "[a-z]+", "a{2,4}", r"(ab)\1"] {
        assert!(basis_paths_cover(regex), "regex {regex:?} left a state unvisited");
    }
}

fn basis_paths_cover(regex: &str) -> bool {
    basis_paths_visit_every_state(regex)
}

#[test]
fn dedup_produces_no_repeated_test_strings() {
    for regex in ["[a-z]+", "a{3,5}", r"(ab)\1", "a|b|c", r"\w*x\d+"] {
        let out = egret::run_engine(regex, "evil", false, false, false, false).unwrap();
        let begin = out.iter().position(|s| s == "BEGIN").unwrap();
        let strings = &out[begin + 1..];
        let unique: std::collections::BTreeSet<&String> = strings.iter().collect();
        assert_eq!(unique.len(), strings.len(), "duplicate test string for {regex:?}: {strings:?}");
    }
}

#[cfg(feature = "slow_tests")]
mod slow {
    use super::*;
    use proptest::prelude::*;

    fn arb_regex_fragment() -> impl Strategy<Value = String> {
        let atom = prop_oneof![
            Just("[a-z]".to_string()),
            Just("a".to_string()),
            Just("b".to_string()),
            Just(".".to_string()),
            Just(r"\d".to_string()),
            Just(r"\w".to_string()),
        ];
        prop::collection::vec(atom, 0..6).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn parser_and_builder_never_hang_or_panic(regex in arb_regex_fragment()) {
            if let Ok(tree) = parse(&regex) {
                let nfa = build(&tree);
                let _paths = find_basis_paths(&nfa);
            }
        }
    }
}
