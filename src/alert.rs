//! `Alert`, `AlertKind`, and the explicit `AlertSink` collaborator: an alert
//! carries its kind, message, optional suggestion/example, and the source
//! locations it refers to; the sink collects, dedups, and renders them for
//! one invocation rather than through a process-wide singleton.

use crate::location::Location;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    AnchorMiddle,
    DuplicatePunctuation,
    OptionalBraces,
    WildPunctuation,
    RepeatPunctuation,
    DigitTooOptional,
    BadCharRange,
    DelimiterConfusion,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertKind::AnchorMiddle => "anchor middle",
            AlertKind::DuplicatePunctuation => "duplicate punctuation charsets",
            AlertKind::OptionalBraces => "optional braces",
            AlertKind::WildPunctuation => "wild punctuation",
            AlertKind::RepeatPunctuation => "repeat punctuation",
            AlertKind::DigitTooOptional => "digit too optional",
            AlertKind::BadCharRange => "bad character range",
            AlertKind::DelimiterConfusion => "delimiter confusion",
        };
        f.write_str(s)
    }
}

/// An advisory record produced by the Checker. `warning` alerts are
/// suppressed in check mode; `loc1`/`loc2` point back into the original
/// regex source.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Alert {
    pub warning: bool,
    pub kind: AlertKind,
    pub message: String,
    pub suggest: Option<String>,
    pub example: Option<String>,
    pub loc1: Location,
    pub loc2: Location,
}

impl Alert {
    pub fn new(warning: bool, kind: AlertKind, message: impl Into<String>, loc1: Location, loc2: Location) -> Self {
        Alert { warning, kind, message: message.into(), suggest: None, example: None, loc1, loc2 }
    }

    pub fn with_suggest(mut self, suggest: impl Into<String>) -> Self {
        self.suggest = Some(suggest.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    fn dedup_key(&self) -> (AlertKind, i64) {
        (self.kind, self.loc1.start)
    }

    /// Renders this alert as one string: `TYPE (kind): message`, an
    /// excerpt of `regex` with `start`/`end` markers around each location,
    /// then optional suggested-fix / example lines.
    pub fn render(&self, regex: &str, web_mode: bool) -> String {
        let tag = if self.warning { "WARNING" } else { "VIOLATION" };
        let mut out = format!("{tag} ({}): {}", self.kind, self.message);
        out.push('\n');
        out.push_str(&highlight(regex, self.loc1, self.loc2, web_mode));
        if let Some(suggest) = &self.suggest {
            out.push('\n');
            out.push_str("Suggested fix: ");
            out.push_str(suggest);
        }
        if let Some(example) = &self.example {
            out.push('\n');
            out.push_str("Example accepted string: ");
            out.push_str(example);
        }
        out
    }
}

fn mark(open: bool, web_mode: bool) -> &'static str {
    match (open, web_mode) {
        (true, true) => "<mark>",
        (false, true) => "</mark>",
        (true, false) => "\x1b[1;31m",
        (false, false) => "\x1b[0m",
    }
}

fn newline(web_mode: bool) -> &'static str {
    if web_mode {
        "<br>"
    } else {
        "\n"
    }
}

/// Highlights `loc1` (and `loc2`, if set) inside `regex` with ANSI escapes
/// or HTML `<mark>` spans, in source order.
fn highlight(regex: &str, loc1: Location, loc2: Location, web_mode: bool) -> String {
    let chars: Vec<char> = regex.chars().collect();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    if let Some((s, e)) = loc1.range() {
        spans.push((s, e));
    }
    if let Some((s, e)) = loc2.range() {
        spans.push((s, e));
    }
    spans.sort_unstable();

    let mut out = String::new();
    let mut cursor = 0usize;
    for (start, end) in spans {
        let start = start.min(chars.len());
        let end = end.clamp(start, chars.len());
        out.extend(chars[cursor..start].iter());
        out.push_str(mark(true, web_mode));
        out.extend(chars[start..end].iter());
        out.push_str(mark(false, web_mode));
        cursor = end;
    }
    out.extend(chars[cursor..].iter());
    out.push_str(newline(web_mode));
    out
}

/// Options threaded through the engine for one invocation, passed explicitly
/// rather than read from process-wide state.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub check_mode: bool,
    pub web_mode: bool,
    pub debug_mode: bool,
    pub stat_mode: bool,
    pub base_substring: String,
}

/// Collects alerts for a single `run_engine` invocation: created fresh per
/// call, observed by `Path`/`CharSet` checks and the `Checker`, drained by
/// the entry point. Never a process-wide singleton.
pub struct AlertSink {
    regex: String,
    check_mode: bool,
    web_mode: bool,
    alerts: Vec<Alert>,
}

impl AlertSink {
    pub fn new(regex: impl Into<String>, options: &EngineOptions) -> Self {
        AlertSink {
            regex: regex.into(),
            check_mode: options.check_mode,
            web_mode: options.web_mode,
            alerts: Vec::new(),
        }
    }

    /// Adds an alert, applying check-mode warning suppression and
    /// `(kind, loc1.start)` dedup at insertion time.
    pub fn add_alert(&mut self, alert: Alert) {
        if alert.warning && self.check_mode {
            return;
        }
        let key = alert.dedup_key();
        if self.alerts.iter().any(|a| a.dedup_key() == key) {
            return;
        }
        tracing::debug!(kind = %alert.kind, warning = alert.warning, "alert raised");
        self.alerts.push(alert);
    }

    pub fn get_alerts(&self) -> Vec<String> {
        self.alerts.iter().map(|a| a.render(&self.regex, self.web_mode)).collect()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn opts(check_mode: bool) -> EngineOptions {
        EngineOptions {
            check_mode,
            web_mode: false,
            debug_mode: false,
            stat_mode: false,
            base_substring: "evil".into(),
        }
    }

    #[test]
    fn dedup_drops_second_alert_with_same_key() {
        let mut sink = AlertSink::new("a.,b", &opts(false));
        sink.add_alert(Alert::new(false, AlertKind::WildPunctuation, "m1", Location::new(0, 1), Location::NONE));
        sink.add_alert(Alert::new(false, AlertKind::WildPunctuation, "m2", Location::new(0, 1), Location::NONE));
        assert_eq!(sink.alerts().len(), 1);
    }

    #[test]
    fn warnings_suppressed_in_check_mode() {
        let mut sink = AlertSink::new("a.,b", &opts(true));
        sink.add_alert(Alert::new(true, AlertKind::BadCharRange, "m1", Location::new(0, 1), Location::NONE));
        assert!(sink.alerts().is_empty());
    }
}
