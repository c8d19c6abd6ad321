//! Image reference with a parsed version

use std::fmt;

use crate::version::error::UpdateError;
use crate::version::model::{ParsedVersion, parse_version};

/// Namespace prepended to bare image names (Docker Hub official images)
pub const DEFAULT_NAMESPACE: &str = "library";

/// An image name together with its (possibly empty) version tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedImage {
    name: String,
    version_str: String,
    version: ParsedVersion,
}

impl VersionedImage {
    /// Build an image from a name and raw version string.
    ///
    /// Fails with [`UpdateError::InvalidName`] if the name is empty.
    pub fn new(name: &str, version: &str) -> Result<Self, UpdateError> {
        if name.is_empty() {
            return Err(UpdateError::InvalidName);
        }
        Ok(Self {
            name: name.to_string(),
            version_str: version.to_string(),
            version: parse_version(version),
        })
    }

    /// Parse an image reference such as `nginx:1.25`, `bitnami/redis:7.2.4-debian-12`
    /// or `registry:5000/app:1.0`.
    ///
    /// The tag separator is the last `:` after the last `/`, so a registry port
    /// is kept as part of the name.
    pub fn parse(reference: &str) -> Result<Self, UpdateError> {
        let (name, version) = split_reference(reference);
        Self::new(name, version)
    }

    /// Derive a new image with the same name and a different version
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            name: self.name.clone(),
            version_str: version.to_string(),
            version: parse_version(version),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw version string as written (empty if the reference had no tag)
    pub fn version_str(&self) -> &str {
        &self.version_str
    }

    pub fn version(&self) -> &ParsedVersion {
        &self.version
    }

    /// Name used for registry lookups (`nginx` -> `library/nginx`)
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn is_same_version(&self, other: &VersionedImage) -> bool {
        self.version_str == other.version_str
    }

    pub fn is_same_major(&self, other: &VersionedImage) -> bool {
        self.version.major == other.version.major
    }

    pub fn is_same_minor(&self, other: &VersionedImage) -> bool {
        self.is_same_major(other) && self.version.minor == other.version.minor
    }

    pub fn is_same_patch(&self, other: &VersionedImage) -> bool {
        self.is_same_minor(other) && self.version.patch == other.version.patch
    }
}

impl fmt::Display for VersionedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version_str.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.version_str)
        }
    }
}

/// Prefix bare names with the default namespace; names that already contain a
/// `/` and the empty name are returned unchanged.
pub fn normalize_name(name: &str) -> String {
    if name.is_empty() || name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", DEFAULT_NAMESPACE, name)
    }
}

fn split_reference(reference: &str) -> (&str, &str) {
    let last_slash = reference.rfind('/').map_or(0, |p| p + 1);
    match reference[last_slash..].rfind(':') {
        Some(pos) => {
            let colon = last_slash + pos;
            (&reference[..colon], &reference[colon + 1..])
        }
        None => (reference, ""),
    }
}
