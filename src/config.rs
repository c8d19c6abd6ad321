use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Defaults
// =============================================================================

/// Default Docker Hub API endpoint
pub const DEFAULT_REGISTRY_URL: &str = "https://hub.docker.com";

/// Compose file used when no `--file` is given
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Tags requested per page (Docker Hub maximum)
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound of tag pages fetched per image
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Timeout for a single registry request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Prefix of the comment annotations understood in compose files
pub const ANNOTATION_PREFIX: &str = "impose:";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub registry: RegistryConfig,
    /// Tags that are never selected, in addition to `latest`
    pub deny_tags: Vec<String>,
}

/// Registry connection settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            username: None,
            password: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

/// Error raised while loading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Config {
    /// Load the configuration from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration from an explicit path, or from the default
    /// location if it exists. Falls back to defaults otherwise.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_path();
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Returns the path to the config directory for impose.
/// Uses $XDG_CONFIG_HOME/impose if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/impose,
/// or ./impose if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("impose")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "registry": {
                "url": "https://registry.example.com"
            }
        }))
        .unwrap();

        assert_eq!(result.registry.url, "https://registry.example.com");
        assert_eq!(result.registry.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(result.registry.max_pages, DEFAULT_MAX_PAGES);
        assert!(result.deny_tags.is_empty());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "registry": {
                "url": "https://registry.example.com",
                "username": "user",
                "password": "secret",
                "pageSize": 50,
                "maxPages": 2,
                "timeoutMs": 1000
            },
            "denyTags": ["edge", "nightly"]
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                registry: RegistryConfig {
                    url: "https://registry.example.com".to_string(),
                    username: Some("user".to_string()),
                    password: Some("secret".to_string()),
                    page_size: 50,
                    max_pages: 2,
                    timeout_ms: 1000,
                },
                deny_tags: vec!["edge".to_string(), "nightly".to_string()],
            }
        );
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"denyTags": ["edge"]}}"#).unwrap();

        let result = Config::from_file(file.path()).unwrap();

        assert_eq!(result.deny_tags, vec!["edge".to_string()]);
        assert_eq!(result.registry, RegistryConfig::default());
    }

    #[test]
    fn from_file_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn load_fails_for_missing_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn config_dir_with_env_uses_xdg_config_home_when_set() {
        let path = config_dir_with_env(
            Some("/tmp/test-config".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-config/impose"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_home_config() {
        let path = config_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.config/impose"));
    }

    #[test]
    fn config_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = config_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./impose"));
    }
}
