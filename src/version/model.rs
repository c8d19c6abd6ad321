//! Lenient version parsing and ordering
//!
//! Image tags are rarely strict semver. Parsing here never fails: any
//! component that is missing or not numeric degrades to 0, so every tag
//! yields a comparable value.

use std::cmp::Ordering;

/// Structured components of a version string such as `v1.2.3-alpine`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Text after the first `-` (empty if none)
    pub suffix: String,
    /// True if the raw string starts with a single marker letter (e.g. `v`)
    pub uses_marker: bool,
}

impl ParsedVersion {
    /// Tuple used for ordering: (major, minor, patch, suffix)
    fn sort_key(&self) -> (u64, u64, u64, &str) {
        (self.major, self.minor, self.patch, &self.suffix)
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns the marker character if `raw` starts with exactly one letter
/// directly followed by a digit (`v1`, `r20`), otherwise None.
pub fn leading_marker(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    let first = chars.next()?;
    let second = chars.next()?;
    (first.is_ascii_alphabetic() && second.is_ascii_digit()).then_some(first)
}

/// Parse a version string into its components.
///
/// Examples:
/// - "" -> (0, 0, 0, "", false)
/// - "1.2.3-rc" -> (1, 2, 3, "rc", false)
/// - "v2.0" -> (2, 0, 0, "", true)
/// - "invalid1.2.3" -> (0, 2, 3, "", false)
pub fn parse_version(input: &str) -> ParsedVersion {
    let (uses_marker, rest) = match leading_marker(input) {
        Some(marker) => (true, &input[marker.len_utf8()..]),
        None => (false, input),
    };

    let (numeric, suffix) = rest.split_once('-').unwrap_or((rest, ""));

    let mut segments = numeric.split('.').map(|s| s.parse::<u64>().unwrap_or(0));

    ParsedVersion {
        major: segments.next().unwrap_or(0),
        minor: segments.next().unwrap_or(0),
        patch: segments.next().unwrap_or(0),
        suffix: suffix.to_string(),
        uses_marker,
    }
}

/// Compare two optional versions; an absent version sorts after any present one.
pub fn compare_optional(a: Option<&ParsedVersion>, b: Option<&ParsedVersion>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
