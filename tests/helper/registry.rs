//! Registry test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use impose::version::error::RegistryError;
use impose::version::registry::Registry;

/// Mock registry serving fixed tag lists per image
#[derive(Default)]
pub struct MockRegistry {
    tags: HashMap<String, Vec<String>>,
    requests: Mutex<Vec<String>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, image: &str, tags: Vec<&str>) -> Self {
        self.tags.insert(
            image.to_string(),
            tags.into_iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Image names requested so far, sorted
    pub fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_tag_names(&self, image_name: &str) -> Result<Vec<String>, RegistryError> {
        self.requests.lock().unwrap().push(image_name.to_string());
        match self.tags.get(image_name) {
            Some(tags) => Ok(tags.clone()),
            None => Err(RegistryError::NotFound(image_name.to_string())),
        }
    }
}
