// fitcrop/src/processors/loader.rs
use crate::core::{ResizeError, Result};
use std::collections::HashMap;
use std::path::Path;

const FILE_SCHEME: &str = "file://";

/// Turns a source location into raw image bytes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Reads sources from the local filesystem. Accepts plain paths and
/// `file://` locations; every other scheme is refused.
#[derive(Clone, Default)]
pub struct Loader {
    max_file_size: Option<u64>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_file_size: None,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: Option<u64>) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn resolve<'a>(&self, location: &'a str) -> Result<&'a Path> {
        if let Some(path) = location.strip_prefix(FILE_SCHEME) {
            return Ok(Path::new(path));
        }

        if location.contains("://") {
            return Err(ResizeError::InvalidParameter(format!(
                "Unsupported location scheme: {}",
                location
            )));
        }

        Ok(Path::new(location))
    }

    fn validate_path(&self, path: &Path) -> Result<u64> {
        if !path.is_file() {
            return Err(ResizeError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let size = path.metadata()?.len();
        if size == 0 {
            return Err(ResizeError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        if let Some(max_size) = self.max_file_size {
            if size > max_size {
                return Err(ResizeError::MemoryLimitExceeded(format!(
                    "File size {} exceeds limit {}",
                    size, max_size
                )));
            }
        }

        Ok(size)
    }
}

impl Fetcher for Loader {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.resolve(location)?;
        let size = self.validate_path(path)?;

        log::debug!("Loading {} bytes from: {}", size, path.display());

        Ok(std::fs::read(path)?)
    }
}

/// Serves bytes that were fetched elsewhere, keyed by location.
#[derive(Clone, Default)]
pub struct MemoryFetcher {
    sources: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(location, bytes);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, bytes: Vec<u8>) {
        self.sources.insert(location.into(), bytes);
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.sources.get(location).cloned().ok_or_else(|| {
            ResizeError::InvalidParameter(format!("No source registered for {}", location))
        })
    }
}
