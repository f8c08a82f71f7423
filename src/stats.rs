//! A trivial counter table for `--stat` mode: kept minimal and emitted as a
//! single structured `tracing` event rather than printed directly.

#[derive(Debug, Clone, Default)]
pub struct Stats {
    entries: Vec<(String, String, i64)>,
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    pub fn add(&mut self, tag: impl Into<String>, name: impl Into<String>, value: i64) {
        self.entries.push((tag.into(), name.into(), value));
    }

    pub fn entries(&self) -> &[(String, String, i64)] {
        &self.entries
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (tag, name, value) in &self.entries {
            writeln!(f, "[{tag}] {name}: {value}")?;
        }
        Ok(())
    }
}
