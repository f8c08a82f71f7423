//! Boundary-behavior integration tests: empty regexes, lone alternation bars,
//! dangling backreferences, single-element brackets, and base-substring
//! validation.

use egret::parse_tree::ParseNode;
use egret::parser::parse;
use egret::{run_engine, EngineError};

#[test]
fn empty_regex_yields_single_empty_test_string() {
    let out = run_engine("", "evil", false, false, false, false).unwrap();
    let begin = out.iter().position(|s| s == "BEGIN").unwrap();
    let strings = &out[begin + 1..];
    assert_eq!(strings, &[String::new()]);
}

#[test]
fn empty_regex_parses_to_ignored_node() {
    let tree = parse("").unwrap();
    assert!(matches!(tree.root, ParseNode::Ignored(_)));
}

#[test]
fn lone_pipe_is_fatal_pointless_alternation() {
    let err = run_engine("|", "evil", false, false, false, false).unwrap_err();
    assert!(err.to_string().contains("pointless alternation"));
}

#[test]
fn backreference_to_missing_group_is_fatal() {
    let err = run_engine(r"a\1", "evil", false, false, false, false).unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
}

#[test]
fn single_element_bracket_is_rewritten_to_character() {
    let tree = parse("[a]").unwrap();
    assert!(matches!(tree.root, ParseNode::Character('a', _)));
}

#[test]
fn base_substring_too_short_is_fatal() {
    let err = run_engine("abc", "e", false, false, false, false).unwrap_err();
    assert!(matches!(err, EngineError::BadArguments { .. }));
}

#[test]
fn base_substring_with_digits_is_fatal() {
    let err = run_engine("abc", "ev1l", false, false, false, false).unwrap_err();
    assert!(matches!(err, EngineError::BadArguments { .. }));
}
