//! Latest version selection among registry tags

use std::collections::HashSet;

use tracing::debug;

use crate::version::error::UpdateError;
use crate::version::image::VersionedImage;
use crate::version::scheme::{MatchScheme, UpdateMode};

/// Tags that are never selected, whatever their shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDenylist {
    tags: HashSet<String>,
}

impl TagDenylist {
    /// Create a denylist containing exactly the given tags
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Add more tags on top of the current ones
    pub fn extend<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl Default for TagDenylist {
    fn default() -> Self {
        Self::new(["latest"])
    }
}

/// Select the highest candidate tag that fits the reference's scheme.
///
/// Candidates in the denylist or outside the scheme are dropped; the rest are
/// parsed and the maximum is returned. On equal versions the later candidate
/// wins.
pub fn select_latest(
    reference: &VersionedImage,
    candidates: &[String],
    mode: UpdateMode,
    denylist: &TagDenylist,
) -> Result<VersionedImage, UpdateError> {
    let scheme = MatchScheme::new(reference.version_str(), mode);

    let latest = candidates
        .iter()
        .filter(|tag| !denylist.contains(tag) && scheme.matches(tag))
        .map(|tag| reference.with_version(tag))
        .max_by(|a, b| a.version().cmp(b.version()));

    match latest {
        Some(image) => {
            debug!(
                "Selected {} for {} ({:?}, {} candidates)",
                image,
                reference,
                mode,
                candidates.len()
            );
            Ok(image)
        }
        None => Err(UpdateError::NoMatchingVersion(reference.to_string())),
    }
}
