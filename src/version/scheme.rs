//! Version scheme matching
//!
//! A reference version is classified into a format family (segment count and
//! optional marker letter). Candidates only match if they belong to the same
//! family, carry the same suffix and, depending on [`UpdateMode`], share the
//! reference's leading numeric text.
//!
//! Matching is textual on purpose: `1.2` never matches `1.3.0`, so the format
//! written in the compose file is preserved when a tag is rewritten.

use std::sync::LazyLock;

use regex::Regex;

use crate::version::model::leading_marker;

static THREE_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+.*$").expect("valid regex"));
static TWO_SEGMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+.*$").expect("valid regex"));
static ONE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+.*$").expect("valid regex"));

/// Granularity at which a version may drift during an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Any higher version of the same format family
    #[default]
    Major,
    /// Major number must stay the same
    Minor,
    /// Major and minor numbers must stay the same
    Patch,
}

/// Structural shape of a version string, ordered from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeFamily {
    /// `1.2.3`, `1.2.3-alpine`
    BareMajorMinorPatch,
    /// `1.2`, `1.2-alpine`
    BareMajorMinor,
    /// `1`, `20230101`
    BareMajor,
    /// `v1.2.3`
    MarkedMajorMinorPatch,
    /// `v1.2`
    MarkedMajorMinor,
    /// `v1`
    MarkedMajor,
    /// Empty or unrecognized version; matches everything
    Any,
}

impl SchemeFamily {
    /// Number of numeric segments the family carries (0 for [`SchemeFamily::Any`])
    pub fn segments(&self) -> usize {
        match self {
            SchemeFamily::BareMajorMinorPatch | SchemeFamily::MarkedMajorMinorPatch => 3,
            SchemeFamily::BareMajorMinor | SchemeFamily::MarkedMajorMinor => 2,
            SchemeFamily::BareMajor | SchemeFamily::MarkedMajor => 1,
            SchemeFamily::Any => 0,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(
            self,
            SchemeFamily::MarkedMajorMinorPatch
                | SchemeFamily::MarkedMajorMinor
                | SchemeFamily::MarkedMajor
        )
    }
}

/// Classify a version string into its family and marker character.
///
/// Families are tested in priority order and the first match wins. The
/// three-segment pattern is tried before the two- and one-segment ones since
/// the shorter patterns also accept longer strings.
pub fn classify(version: &str) -> (SchemeFamily, Option<char>) {
    if THREE_SEGMENTS.is_match(version) {
        return (SchemeFamily::BareMajorMinorPatch, None);
    }
    if TWO_SEGMENTS.is_match(version) {
        return (SchemeFamily::BareMajorMinor, None);
    }
    if ONE_SEGMENT.is_match(version) {
        return (SchemeFamily::BareMajor, None);
    }

    if let Some(marker) = leading_marker(version) {
        let rest = &version[marker.len_utf8()..];
        if THREE_SEGMENTS.is_match(rest) {
            return (SchemeFamily::MarkedMajorMinorPatch, Some(marker));
        }
        if TWO_SEGMENTS.is_match(rest) {
            return (SchemeFamily::MarkedMajorMinor, Some(marker));
        }
        if ONE_SEGMENT.is_match(rest) {
            return (SchemeFamily::MarkedMajor, Some(marker));
        }
    }

    (SchemeFamily::Any, None)
}

/// Text after the first `-` of a version string, empty if none
fn suffix_of(version: &str) -> &str {
    version.split_once('-').map_or("", |(_, suffix)| suffix)
}

/// Predicate over candidate version strings derived from a reference version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScheme {
    family: SchemeFamily,
    marker: Option<char>,
    suffix: String,
    /// Literal text every candidate must start with (e.g. `v1` or `1.2`)
    prefix: Option<String>,
}

impl MatchScheme {
    /// Build the scheme for `reference` under the given update mode
    pub fn new(reference: &str, mode: UpdateMode) -> Self {
        let (family, marker) = classify(reference);
        let prefix = numeric_prefix(reference, family, marker, mode);

        Self {
            family,
            marker,
            suffix: suffix_of(reference).to_string(),
            prefix,
        }
    }

    pub fn family(&self) -> SchemeFamily {
        self.family
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check whether `candidate` belongs to this scheme
    pub fn matches(&self, candidate: &str) -> bool {
        if self.family == SchemeFamily::Any {
            return true;
        }

        if classify(candidate) != (self.family, self.marker) {
            return false;
        }

        // Exact comparison; a suffix prefix or substring is not enough
        if suffix_of(candidate) != self.suffix {
            return false;
        }

        match &self.prefix {
            Some(prefix) => starts_with_component(candidate, prefix),
            None => true,
        }
    }
}

/// Leading text a candidate must share with the reference in Minor/Patch mode.
///
/// Single-segment families have no minor component, so only the suffix filter
/// applies to them regardless of mode.
fn numeric_prefix(
    reference: &str,
    family: SchemeFamily,
    marker: Option<char>,
    mode: UpdateMode,
) -> Option<String> {
    let keep = match mode {
        UpdateMode::Major => return None,
        UpdateMode::Minor => 1,
        UpdateMode::Patch => 2,
    };
    if family.segments() < 2 {
        return None;
    }

    let body = match marker {
        Some(m) => &reference[m.len_utf8()..],
        None => reference,
    };
    let numeric = body.split('-').next().unwrap_or(body);
    let segments: Vec<&str> = numeric.split('.').take(keep).collect();

    let mut prefix = String::new();
    if let Some(m) = marker {
        prefix.push(m);
    }
    prefix.push_str(&segments.join("."));
    Some(prefix)
}

/// `candidate` starts with `prefix` and the prefix ends on a component
/// boundary, so `1` matches `1.4.0` but not `10.0.0`.
fn starts_with_component(candidate: &str, prefix: &str) -> bool {
    candidate
        .strip_prefix(prefix)
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", SchemeFamily::BareMajorMinorPatch, None)]
    #[case("1.0.0-alpine", SchemeFamily::BareMajorMinorPatch, None)]
    #[case("1.2.3.4", SchemeFamily::BareMajorMinorPatch, None)]
    #[case("1.2", SchemeFamily::BareMajorMinor, None)]
    #[case("1.2-alpine", SchemeFamily::BareMajorMinor, None)]
    #[case("8", SchemeFamily::BareMajor, None)]
    #[case("8-slim", SchemeFamily::BareMajor, None)]
    #[case("v1.2.3", SchemeFamily::MarkedMajorMinorPatch, Some('v'))]
    #[case("v1.2", SchemeFamily::MarkedMajorMinor, Some('v'))]
    #[case("v1", SchemeFamily::MarkedMajor, Some('v'))]
    #[case("r1.2", SchemeFamily::MarkedMajorMinor, Some('r'))]
    #[case("", SchemeFamily::Any, None)]
    #[case("latest", SchemeFamily::Any, None)]
    #[case("alpine", SchemeFamily::Any, None)]
    #[case("vv1.0", SchemeFamily::Any, None)]
    fn classify_uses_most_specific_family(
        #[case] version: &str,
        #[case] family: SchemeFamily,
        #[case] marker: Option<char>,
    ) {
        assert_eq!(classify(version), (family, marker));
    }

    #[rstest]
    // Same family, same (empty) suffix
    #[case("1.0.0", UpdateMode::Major, "2.5.1", true)]
    #[case("1.0.0", UpdateMode::Major, "2.5", false)]
    #[case("1.0", UpdateMode::Major, "1.3.0", false)]
    #[case("1.0", UpdateMode::Major, "2.1", true)]
    #[case("1.0.0", UpdateMode::Major, "v2.0.0", false)]
    #[case("v1.0.0", UpdateMode::Major, "2.0.0", false)]
    #[case("v1.0.0", UpdateMode::Major, "r2.0.0", false)]
    #[case("v1.0.0", UpdateMode::Major, "v2.0.0", true)]
    // Suffix must match exactly
    #[case("1.0.0-suffix", UpdateMode::Major, "2.0.0-nomatch", false)]
    #[case("1.0.0-alpine", UpdateMode::Major, "2.0.0-alpine3.18", false)]
    #[case("1.0.0-alpine", UpdateMode::Major, "2.0.0-alpine", true)]
    #[case("1.0.0", UpdateMode::Major, "2.0.0-rc", false)]
    #[case("1.0.0-Alpine", UpdateMode::Major, "2.0.0-alpine", false)]
    // Minor mode keeps the major number
    #[case("1.0.0", UpdateMode::Minor, "2.0.0", false)]
    #[case("1.0.0", UpdateMode::Minor, "1.9.3", true)]
    #[case("1.0.0", UpdateMode::Minor, "10.0.0", false)]
    #[case("1.0", UpdateMode::Minor, "1.7", true)]
    #[case("v1.2.0", UpdateMode::Minor, "v1.5.0", true)]
    #[case("v1.2.0", UpdateMode::Minor, "v2.0.0", false)]
    // Patch mode keeps major and minor
    #[case("1.2.3", UpdateMode::Patch, "1.2.9", true)]
    #[case("1.2.3", UpdateMode::Patch, "1.3.0", false)]
    #[case("1.2.3", UpdateMode::Patch, "1.20.0", false)]
    #[case("v1.2.3-alpine", UpdateMode::Patch, "v1.2.7-alpine", true)]
    #[case("v1.2.3-alpine", UpdateMode::Patch, "v1.3.0-alpine", false)]
    // Single segment: suffix only, whatever the mode
    #[case("8", UpdateMode::Patch, "9", true)]
    #[case("8-slim", UpdateMode::Minor, "11-slim", true)]
    #[case("8-slim", UpdateMode::Minor, "11", false)]
    #[case("v8", UpdateMode::Patch, "v12", true)]
    #[case("8", UpdateMode::Major, "8.1", false)]
    // Fallback matches everything
    #[case("", UpdateMode::Major, "anything", true)]
    #[case("stable", UpdateMode::Patch, "1.0.0", true)]
    fn matches_returns_expected(
        #[case] reference: &str,
        #[case] mode: UpdateMode,
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        let scheme = MatchScheme::new(reference, mode);
        assert_eq!(scheme.matches(candidate), expected);
    }

    #[rstest]
    #[case("1.2.3", UpdateMode::Major, None)]
    #[case("1.2.3", UpdateMode::Minor, Some("1"))]
    #[case("1.2.3", UpdateMode::Patch, Some("1.2"))]
    #[case("v1.2.3-rc", UpdateMode::Patch, Some("v1.2"))]
    #[case("v1.2", UpdateMode::Minor, Some("v1"))]
    #[case("7", UpdateMode::Patch, None)]
    #[case("", UpdateMode::Patch, None)]
    fn prefix_depends_on_mode(
        #[case] reference: &str,
        #[case] mode: UpdateMode,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(MatchScheme::new(reference, mode).prefix(), expected);
    }

    #[test]
    fn reference_always_matches_itself() {
        for reference in ["1.2.3", "1.2", "3", "v1.2.3-rc", "v2", "1.0-alpine"] {
            for mode in [UpdateMode::Major, UpdateMode::Minor, UpdateMode::Patch] {
                assert!(
                    MatchScheme::new(reference, mode).matches(reference),
                    "{reference} under {mode:?}"
                );
            }
        }
    }
}
