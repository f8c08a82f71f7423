//! Top-level pipeline orchestration: argument validation, stage order, and
//! mode dispatch, exposed as a pure library entry point.

pub use crate::alert::EngineOptions;
use crate::alert::AlertSink;
use crate::checker::run_checks;
use crate::error::{EngineError, EngineResult};
use crate::generator::TestGenerator;
use crate::nfa::basis_paths::find_basis_paths;
use crate::nfa::builder::build;
use crate::parser::parse;
use crate::stats::Stats;

/// Runs the full scanner → parser → NFA → basis-paths → path-processing →
/// {checker, generator} pipeline, returning the lines the original CLI would
/// print.
///
/// - In generate mode: alert messages, then `"BEGIN"`, then test strings.
/// - In check mode: alert messages, or `["No violations detected."]`.
pub fn run_engine(
    regex: &str,
    base_substring: &str,
    check_mode: bool,
    web_mode: bool,
    debug_mode: bool,
    stat_mode: bool,
) -> EngineResult<Vec<String>> {
    let span = tracing::debug_span!("run_engine", regex, base_substring, check_mode, web_mode);
    let _enter = span.enter();

    validate_base_substring(base_substring)?;

    let options = EngineOptions {
        check_mode,
        web_mode,
        debug_mode,
        stat_mode,
        base_substring: base_substring.to_string(),
    };
    let mut sink = AlertSink::new(regex, &options);
    let mut stats = Stats::new();

    let tree = {
        let _span = tracing::debug_span!("parser").entered();
        parse(regex)?
    };
    if debug_mode {
        tracing::info!(root = ?tree.root, "parsed tree");
    }

    let nfa = {
        let _span = tracing::debug_span!("nfa_builder").entered();
        build(&tree)
    };
    if debug_mode {
        tracing::info!(states = nfa.size, "built NFA");
    }
    if stat_mode {
        stats.add("NFA", "States", nfa.size as i64);
    }

    let mut paths = {
        let _span = tracing::debug_span!("basis_paths").entered();
        find_basis_paths(&nfa)
    };
    if stat_mode {
        stats.add("PATHS", "BasisPaths", paths.len() as i64);
    }

    {
        let _span = tracing::debug_span!("path_processing").entered();
        for path in &mut paths {
            path.process_path(base_substring);
        }
    }
    if debug_mode {
        for path in &paths {
            tracing::info!(test_string = %path.test_string, "path processed");
        }
    }

    if check_mode {
        let _span = tracing::debug_span!("checker").entered();
        run_checks(&paths, &mut sink);
    }

    let mut output = sink.get_alerts();

    if check_mode {
        if output.is_empty() {
            output.push("No violations detected.".to_string());
        }
        return Ok(output);
    }

    let punct_marks = tree.get_punct_marks();
    let mut generator = TestGenerator::new(&paths, punct_marks, debug_mode);
    let test_strings = {
        let _span = tracing::debug_span!("generator").entered();
        generator.gen_test_strings()
    };
    if stat_mode {
        generator.add_stats(&mut stats);
        tracing::info!(stats = %stats, "final stats");
    }

    output.push("BEGIN".to_string());
    output.extend(test_strings);
    Ok(output)
}

/// `base_substring` must have length >= 2 and consist only of alphabetic
/// characters.
fn validate_base_substring(base_substring: &str) -> EngineResult<()> {
    if base_substring.chars().count() < 2 || !base_substring.chars().all(|c| c.is_alphabetic()) {
        return Err(EngineError::BadArguments {
            message: format!(
                "base substring '{base_substring}' must be at least 2 alphabetic characters"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn bad_base_substring_is_fatal() {
        let err = run_engine("abc", "a1", false, false, false, false).unwrap_err();
        assert!(matches!(err, EngineError::BadArguments { .. }));
    }

    #[test]
    fn generate_mode_has_begin_sentinel() {
        let out = run_engine("[a-z]+", "evil", false, false, false, false).unwrap();
        assert!(out.contains(&"BEGIN".to_string()));
    }

    #[test]
    fn check_mode_reports_no_violations_for_clean_regex() {
        let out = run_engine("abc", "evil", true, false, false, false).unwrap();
        assert_eq!(out, vec!["No violations detected.".to_string()]);
    }

    #[test]
    fn check_mode_flags_anchor_middle() {
        let out = run_engine("a^b", "evil", true, false, false, false).unwrap();
        assert!(out.iter().any(|line| line.contains("anchor middle")));
    }

    #[test]
    fn check_mode_flags_repeat_punctuation() {
        let out = run_engine(",+", "evil", true, false, false, false).unwrap();
        assert!(out.iter().any(|line| line.contains("repeat punctuation")), "{out:?}");
    }
}
