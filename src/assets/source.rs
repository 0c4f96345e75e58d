use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ColorWalkError, ColorWalkResult};

/// Per-slot input cap; larger inputs are rejected before any decode.
pub const MAX_SOURCE_BYTES: u64 = 15 * 1024 * 1024;

/// Reject inputs larger than [`MAX_SOURCE_BYTES`].
pub fn check_source_size(len: u64) -> ColorWalkResult<()> {
    if len > MAX_SOURCE_BYTES {
        return Err(ColorWalkError::FileTooLarge {
            size: len,
            limit: MAX_SOURCE_BYTES,
        });
    }
    Ok(())
}

/// Encoded image bytes selected for one slot.
///
/// Cloning shares the underlying buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageSource {
    bytes: Arc<[u8]>,
    label: Option<String>,
}

impl ImageSource {
    /// Wrap encoded bytes, enforcing the size cap.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> ColorWalkResult<Self> {
        let bytes = bytes.into();
        check_source_size(bytes.len() as u64)?;
        Ok(Self { bytes, label: None })
    }

    /// Read a file, checking its size from metadata before reading it.
    pub fn from_path(path: impl AsRef<Path>) -> ColorWalkResult<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("stat image '{}'", path.display()))?;
        check_source_size(meta.len())?;
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self::from_bytes(bytes)?.with_label_opt(label))
    }

    /// Attach a human-readable label (usually the file name).
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_label_opt(Some(label.into()))
    }

    fn with_label_opt(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the source holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Label attached at ingestion, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("label", &self.label)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
