//! Registry trait for fetching image tags from remote sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching the tags of an image repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches all tag names for an image
    ///
    /// # Arguments
    /// * `image_name` - The normalized repository name (e.g., "library/nginx")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tag names in no particular order (may be empty)
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_tag_names(&self, image_name: &str) -> Result<Vec<String>, RegistryError>;
}
