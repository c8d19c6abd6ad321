//! Compose file test utilities

use std::path::PathBuf;

use tempfile::TempDir;

/// Write `content` to a docker-compose.yml in a fresh temporary directory
pub fn create_compose_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("docker-compose.yml");
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}
