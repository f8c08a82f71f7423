//! Source locations into the original regex text.

/// A half-open-ish pair of byte offsets `(start, end)` into the regex source.
///
/// Unlike `perl-position-tracking::ByteSpan`, which has no "absent" state,
/// `Location` carries an explicit sentinel because the checker routinely
/// needs to represent "no second location" for single-location alerts
/// without wrapping every call site in `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub start: i64,
    pub end: i64,
}

impl Location {
    pub const NONE: Location = Location { start: -1, end: -1 };

    pub fn new(start: usize, end: usize) -> Self {
        Location {
            start: start as i64,
            end: end as i64,
        }
    }

    pub fn is_none(&self) -> bool {
        self.start == -1 && self.end == -1
    }

    /// Byte range suitable for slicing the source, if this location is set.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.is_none() {
            None
        } else {
            Some((self.start as usize, self.end as usize))
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::NONE
    }
}
