//! Artifact delivery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PageError, Result};

/// Receives the exported document.
pub trait ArtifactSink {
    fn deliver(&mut self, file_name: &str, text: &str) -> Result<()>;
}

/// Writes artifacts as files into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `file_name` will be written.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, text: &str) -> Result<()> {
        let path = self.path_for(file_name);
        fs::create_dir_all(&self.dir).map_err(|source| PageError::ArtifactWrite {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| PageError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "wrote artifact");
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(String, String)>,
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, file_name: &str, text: &str) -> Result<()> {
        self.artifacts.push((file_name.to_string(), text.to_string()));
        Ok(())
    }
}
