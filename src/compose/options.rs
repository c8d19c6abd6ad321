//! Per-service options from `impose:` comment annotations

use crate::config::ANNOTATION_PREFIX;
use crate::version::scheme::UpdateMode;

/// Options attached to a service's `image` key through comments
///
/// ```yaml
/// services:
///   db:
///     # impose:minor impose:warnMinor
///     image: mariadb:10.5.13-jammy # impose:warnPatch
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Skip the service entirely
    pub ignore: bool,
    /// Only update within the current major version
    pub only_minor: bool,
    /// Only update within the current major.minor version
    pub only_patch: bool,
    pub warn_major: bool,
    pub warn_minor: bool,
    pub warn_patch: bool,
    /// Warn on any change of the version string, suffix included
    pub warn_all: bool,
}

impl ServiceOptions {
    /// Resolve options from the head comment above the `image` key and the
    /// line comment after its value.
    pub fn from_comments(head_comment: &str, line_comment: &str) -> Self {
        let comment = format!("{}{}", head_comment, line_comment);

        Self {
            ignore: contains_option(&comment, "ignore"),
            only_minor: contains_option(&comment, "minor"),
            only_patch: contains_option(&comment, "patch"),
            warn_major: contains_option(&comment, "warnMajor"),
            warn_minor: contains_option(&comment, "warnMinor"),
            warn_patch: contains_option(&comment, "warnPatch"),
            warn_all: contains_option(&comment, "warnAll"),
        }
    }

    /// Update mode implied by the options; `patch` wins over `minor`
    pub fn update_mode(&self) -> UpdateMode {
        if self.only_patch {
            UpdateMode::Patch
        } else if self.only_minor {
            UpdateMode::Minor
        } else {
            UpdateMode::Major
        }
    }
}

fn contains_option(comment: &str, option: &str) -> bool {
    comment.contains(&format!("{}{}", ANNOTATION_PREFIX, option))
}
