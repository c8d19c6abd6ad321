//! Docker Hub tags API registry implementation

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_REGISTRY_URL, FETCH_TIMEOUT_MS, RegistryConfig,
};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// One page of the Docker Hub tags listing
#[derive(Debug, Deserialize)]
struct TagPage {
    next: Option<String>,
    results: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Basic auth credentials for the registry
#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    username: String,
    password: String,
}

/// Registry implementation for the Docker Hub v2 repositories API
pub struct DockerHubRegistry {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
    page_size: u32,
    max_pages: u32,
}

impl DockerHubRegistry {
    /// Creates a new DockerHubRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("impose")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Creates a registry from the `registry` section of the configuration
    pub fn from_config(config: &RegistryConfig) -> Self {
        let registry = Self::with_timeout(&config.url, Duration::from_millis(config.timeout_ms))
            .with_page_size(config.page_size)
            .with_max_pages(config.max_pages);

        match (&config.username, &config.password) {
            (Some(username), Some(password)) => registry.with_credentials(username, password),
            _ => registry,
        }
    }

    /// Authenticate every request with HTTP basic auth.
    ///
    /// Empty usernames or passwords are ignored.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        if !username.is_empty() && !password.is_empty() {
            self.credentials = Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            });
        }
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn first_page_url(&self, image_name: &str) -> String {
        format!(
            "{}/v2/repositories/{}/tags/?ordering=last_updated&page=1&page_size={}",
            self.base_url, image_name, self.page_size
        )
    }

    async fn fetch_page(&self, url: &str, image_name: &str) -> Result<TagPage, RegistryError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json");
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(image_name.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Docker Hub returned status {}: {}", status, url);
            return Err(RegistryError::UnexpectedStatus(status.as_u16()));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Docker Hub tags response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for DockerHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for DockerHubRegistry {
    async fn fetch_tag_names(&self, image_name: &str) -> Result<Vec<String>, RegistryError> {
        let mut tags = Vec::new();
        let mut url = self.first_page_url(image_name);

        for page in 1..=self.max_pages {
            let tag_page = self.fetch_page(&url, image_name).await?;
            tags.extend(tag_page.results.into_iter().map(|t| t.name));

            match tag_page.next {
                Some(next) if page < self.max_pages => url = next,
                Some(_) => {
                    debug!(
                        "Stopping after {} pages of tags for {}",
                        self.max_pages, image_name
                    );
                    break;
                }
                None => break,
            }
        }

        debug!("Fetched {} tags for {}", tags.len(), image_name);
        Ok(tags)
    }
}
