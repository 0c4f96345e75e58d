use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the compositor drew into a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellOutcome {
    /// Empty slot filled with the placeholder color.
    Placeholder,
    /// Image decoded and drawn with cover fit.
    Drawn {
        /// Source width before fitting.
        source_width: u32,
        /// Source height before fitting.
        source_height: u32,
    },
    /// Image could not be drawn; cell filled with the error color.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl CellOutcome {
    /// Whether the cell fell back to the error fill.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for CellOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placeholder => f.write_str("placeholder"),
            Self::Drawn {
                source_width,
                source_height,
            } => write!(f, "drawn ({source_width}x{source_height})"),
            Self::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

/// Emitted once per cell, after the cell is on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Index of the cell just processed.
    pub cell: usize,
    /// Cells processed so far, including this one.
    pub processed: usize,
    /// Cells in the run.
    pub total: usize,
    /// `round(100 * processed / total)`.
    pub percent: u8,
    /// What was drawn.
    pub outcome: CellOutcome,
}

/// Observer for per-cell progress.
///
/// Ordering contract: updates arrive in cell order with strictly increasing `processed`.
pub trait ProgressSink {
    /// Called after each cell.
    fn on_progress(&mut self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressUpdate),
{
    fn on_progress(&mut self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Sink that discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _update: &ProgressUpdate) {}
}

/// In-memory sink for tests and debugging.
#[derive(Clone, Debug, Default)]
pub struct ProgressLog {
    updates: Vec<ProgressUpdate>,
}

impl ProgressLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured updates in arrival order.
    pub fn updates(&self) -> &[ProgressUpdate] {
        &self.updates
    }

    /// Captured percentages in arrival order.
    pub fn percents(&self) -> Vec<u8> {
        self.updates.iter().map(|u| u.percent).collect()
    }
}

impl ProgressSink for ProgressLog {
    fn on_progress(&mut self, update: &ProgressUpdate) {
        self.updates.push(update.clone());
    }
}

/// Shared flag the compositor checks between cells.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; in-flight runs stop before their next cell.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/progress.rs"]
mod tests;
