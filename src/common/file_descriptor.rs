use serde::Serialize;
use std::path::Path;

use crate::error::AppError;

/// A candidate file as handed over by the intake collaborator.
/// Immutable once built; the pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    name: String,
    size_bytes: u64,
    mime_type: String,
}

impl FileDescriptor {
    pub fn new(
        name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> Result<Self, AppError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::InvalidDescriptor(
                "file name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            size_bytes,
            mime_type: mime_type.into(),
        })
    }

    /// Builds a descriptor for a file on disk. The size comes from the file
    /// metadata and the MIME type is guessed from the extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(AppError::InvalidDescriptor(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        Self::new(name, metadata.len(), mime_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}
