/// Convenience result type used across colorwalk.
pub type ColorWalkResult<T> = Result<T, ColorWalkError>;

/// Top-level error taxonomy used by the ingestion, composition and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum ColorWalkError {
    /// Selected input exceeds the per-slot size cap; rejected before any decode.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected input in bytes.
        size: u64,
        /// Configured cap in bytes.
        limit: u64,
    },

    /// Bytes are not a readable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Image decoded but its geometry cannot be fitted (e.g. zero height).
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Composition requested on a grid with no filled slot.
    #[error("grid is empty: fill at least one slot before composing")]
    EmptyGrid,

    /// Fatal pipeline failure; partial output is discarded.
    #[error("composition error: {0}")]
    Composition(String),

    /// Encoding the finished canvas failed.
    #[error("export error: {0}")]
    Export(String),

    /// The run was cancelled between cells.
    #[error("composition cancelled after {processed} of {total} cells")]
    Cancelled {
        /// Cells fully processed before cancellation was observed.
        processed: usize,
        /// Cells in the grid.
        total: usize,
    },

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ColorWalkError {
    /// Build a [`ColorWalkError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ColorWalkError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Build a [`ColorWalkError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`ColorWalkError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`ColorWalkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the compositor renders this error as an error-colored cell instead of aborting.
    pub fn is_recoverable_in_cell(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::InvalidImage(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
