//! A compose service tracked for image updates

use std::ops::Range;

use crate::compose::options::ServiceOptions;
use crate::version::image::VersionedImage;
use crate::version::scheme::UpdateMode;

/// A service and the image it runs
///
/// `current` is the image as read from the file. `latest` is filled in by the
/// update run and is written back to `span` when the document is updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    name: String,
    current: VersionedImage,
    latest: Option<VersionedImage>,
    options: ServiceOptions,
    span: Range<usize>,
    line: usize,
}

impl Service {
    pub fn new(
        name: &str,
        current: VersionedImage,
        options: ServiceOptions,
        span: Range<usize>,
        line: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            current,
            latest: None,
            options,
            span,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> &VersionedImage {
        &self.current
    }

    /// Image selected by the last update run, if any
    pub fn latest(&self) -> Option<&VersionedImage> {
        self.latest.as_ref()
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Line of the image reference in the source (0-indexed)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.options.update_mode()
    }

    pub fn set_latest(&mut self, image: VersionedImage) {
        self.latest = Some(image);
    }

    pub(crate) fn span(&self) -> &Range<usize> {
        &self.span
    }

    pub(crate) fn set_span(&mut self, span: Range<usize>) {
        self.span = span;
    }

    pub fn version_has_changed(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| !self.current.is_same_version(latest))
    }

    pub fn major_has_changed(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| !self.current.is_same_major(latest))
    }

    pub fn minor_has_changed(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| !self.current.is_same_minor(latest))
    }

    pub fn patch_has_changed(&self) -> bool {
        self.latest
            .as_ref()
            .is_some_and(|latest| !self.current.is_same_patch(latest))
    }

    /// Whether the change requires attention according to the warn options
    pub fn needs_attention(&self) -> bool {
        !self.options.ignore
            && ((self.options.warn_all && self.version_has_changed())
                || (self.options.warn_major && self.major_has_changed())
                || (self.options.warn_minor && self.minor_has_changed())
                || (self.options.warn_patch && self.patch_has_changed()))
    }
}
