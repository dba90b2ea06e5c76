//! Test utilities for groupcast
//!
//! Temporary directories, sized media files on disk and error assertions
//! shared by the unit tests.

use crate::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Examples
///
/// ```ignore
/// let dir = temp_dir();
/// let path = dir.path();
/// ```
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a file of exactly `size` bytes
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_media_file(dir: &TempDir, name: &str, size: u64) -> PathBuf {
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).expect("Failed to create test file");
    file.set_len(size).expect("Failed to size test file");
    path
}

/// Assert that an error's message chain contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok or no message in the chain matches
pub fn assert_error_contains<T: std::fmt::Debug>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected error containing '{}', got Ok({:?})", expected, value),
        Err(e) => {
            let chain = format!("{:#}", e);
            assert!(
                chain.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                chain
            );
        }
    }
}

/// Configuration pointing the backend at `base_url`
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.backend.base_url = base_url.to_string();
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_media_file_has_exact_size() {
        let dir = temp_dir();
        let path = create_media_file(&dir, "clip.mp4", 2048);
        assert_eq!(std::fs::metadata(path).unwrap().len(), 2048);
    }

    #[test]
    fn test_config_override_validates() {
        let config = test_config("https://bot.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_panics_on_ok() {
        assert_error_contains(Ok::<(), anyhow::Error>(()), "anything");
    }
}
