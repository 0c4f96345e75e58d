use std::path::Path;
use std::time::Instant;

use crate::assets::decode::{ImageDecoder, RasterDecoder, probe_dimensions};
use crate::assets::source::ImageSource;
use crate::export::encoder::{ExportSettings, ExportedImage, export};
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::grid::state::{Grid, check_index};
use crate::layout::config::LayoutConfig;
use crate::render::compositor::Compositor;
use crate::render::progress::{CellOutcome, ProgressSink, ProgressUpdate};
use crate::session::notice::NoticeBoard;

/// User-facing text for an error surfaced by the session.
pub fn notice_text(err: &ColorWalkError) -> String {
    match err {
        ColorWalkError::FileTooLarge { .. } => {
            "Image file is too large, please choose a smaller image".to_string()
        }
        ColorWalkError::Decode(_) | ColorWalkError::InvalidImage(_) => {
            "Could not read the image".to_string()
        }
        ColorWalkError::EmptyGrid => "Add at least one photo first".to_string(),
        ColorWalkError::Composition(_) | ColorWalkError::Export(_) => {
            "Saving failed, please try again".to_string()
        }
        ColorWalkError::Cancelled { .. } => "Generation cancelled".to_string(),
        ColorWalkError::Validation(msg) => msg.clone(),
        ColorWalkError::Other(_) => "Could not read the image".to_string(),
    }
}

/// Headless state behind the collage editor: grid, preview and notices.
///
/// Every fallible operation either succeeds and updates state, or posts a notice and leaves
/// state as it was.
#[derive(Debug)]
pub struct Session<D = RasterDecoder> {
    grid: Grid,
    layout: LayoutConfig,
    export_settings: ExportSettings,
    compositor: Compositor<D>,
    preview: Option<ExportedImage>,
    notices: NoticeBoard,
    progress: u8,
    last_outcomes: Vec<CellOutcome>,
}

impl Default for Session<RasterDecoder> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Session<RasterDecoder> {
    /// Empty session using `layout` and the built-in decoder.
    pub fn new(layout: LayoutConfig) -> Self {
        Self::with_compositor(layout, Compositor::new())
    }
}

impl<D: ImageDecoder> Session<D> {
    /// Empty session driving a custom compositor.
    pub fn with_compositor(layout: LayoutConfig, compositor: Compositor<D>) -> Self {
        Self {
            grid: Grid::new(),
            layout,
            export_settings: ExportSettings::default(),
            compositor,
            preview: None,
            notices: NoticeBoard::new(),
            progress: 0,
            last_outcomes: Vec::new(),
        }
    }

    /// Return the session with different export settings.
    pub fn with_export_settings(mut self, settings: ExportSettings) -> Self {
        self.export_settings = settings;
        self
    }

    /// Replace the board, e.g. to change its timeout.
    pub fn with_notice_board(mut self, notices: NoticeBoard) -> Self {
        self.notices = notices;
        self
    }

    /// Put `bytes` into slot `index`.
    ///
    /// Oversized or unreadable input is rejected before the grid changes.
    pub fn select(
        &mut self,
        index: usize,
        bytes: Vec<u8>,
        label: Option<String>,
        now: Instant,
    ) -> ColorWalkResult<()> {
        let res = check_index(index)
            .and_then(|_| ImageSource::from_bytes(bytes))
            .map(|src| match label {
                Some(label) => src.with_label(label),
                None => src,
            });
        self.accept(index, res, now)
    }

    /// Read a file into slot `index`, checking its size before reading.
    pub fn select_path(
        &mut self,
        index: usize,
        path: impl AsRef<Path>,
        now: Instant,
    ) -> ColorWalkResult<()> {
        let res = check_index(index).and_then(|_| ImageSource::from_path(path));
        self.accept(index, res, now)
    }

    fn accept(
        &mut self,
        index: usize,
        source: ColorWalkResult<ImageSource>,
        now: Instant,
    ) -> ColorWalkResult<()> {
        let res = source.and_then(|src| {
            let (w, h) = probe_dimensions(src.bytes())?;
            tracing::debug!(
                slot = index,
                width = w,
                height = h,
                bytes = src.len(),
                label = ?src.label(),
                "slot selected"
            );
            self.grid.with_slot(index, src)
        });
        match res {
            Ok(grid) => {
                self.grid = grid;
                Ok(())
            }
            Err(e) => Err(self.report(e, now)),
        }
    }

    /// Empty slot `index`.
    pub fn remove(&mut self, index: usize) -> ColorWalkResult<()> {
        self.grid = self.grid.with_cleared(index)?;
        Ok(())
    }

    /// Clear every slot and the preview if `confirm` agrees. Returns whether anything was reset.
    pub fn reset_all(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            return false;
        }
        self.grid = self.grid.cleared();
        self.preview = None;
        self.progress = 0;
        self.last_outcomes.clear();
        true
    }

    /// Compose and encode the current grid, storing the result as the preview.
    ///
    /// On failure the previous preview is kept and a notice is posted.
    pub fn generate(
        &mut self,
        progress: &mut dyn ProgressSink,
        now: Instant,
    ) -> ColorWalkResult<&ExportedImage> {
        self.progress = 0;
        let mut last = 0;
        let composed = {
            let mut track = |u: &ProgressUpdate| {
                last = u.percent;
                progress.on_progress(u);
            };
            self.compositor.compose(&self.grid, &self.layout, &mut track)
        };
        self.progress = last;

        let res =
            composed.and_then(|out| Ok((export(&out.frame, &self.export_settings)?, out.cells)));
        match res {
            Ok((image, cells)) => {
                self.last_outcomes = cells;
                Ok(&*self.preview.insert(image))
            }
            Err(e) => Err(self.report(e, now)),
        }
    }

    /// Drop the preview.
    pub fn close_preview(&mut self) -> Option<ExportedImage> {
        self.preview.take()
    }

    /// Expire the notice if its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.notices.tick(now)
    }

    /// Current grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Layout used by [`Session::generate`].
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Last generated collage.
    pub fn preview(&self) -> Option<&ExportedImage> {
        self.preview.as_ref()
    }

    /// Notice board.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Last progress value reached by [`Session::generate`].
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Per-cell outcomes of the last successful generation.
    pub fn last_outcomes(&self) -> &[CellOutcome] {
        &self.last_outcomes
    }

    fn report(&mut self, err: ColorWalkError, now: Instant) -> ColorWalkError {
        tracing::warn!(error = %err, "session operation failed");
        self.notices.post(notice_text(&err), now);
        err
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/app.rs"]
mod tests;
