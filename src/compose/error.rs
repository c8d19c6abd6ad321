use std::path::PathBuf;

use thiserror::Error;

use crate::version::error::UpdateError;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    #[error("Invalid YAML content: {0}")]
    InvalidYaml(String),

    #[error("No key 'services' found in YAML")]
    MissingServices,

    #[error("Invalid image for service '{service}' at line {line}: {source}")]
    InvalidImage {
        service: String,
        line: usize,
        source: UpdateError,
    },

    #[error("No original file given")]
    NoOriginalFile,
}
