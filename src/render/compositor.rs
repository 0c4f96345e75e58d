use rayon::prelude::*;

use crate::assets::decode::{DecodedImage, ImageDecoder, RasterDecoder};
use crate::foundation::core::GRID_CELLS;
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::foundation::math::progress_percent;
use crate::grid::state::{Grid, GridSlot};
use crate::layout::cells::{CellGeometry, cell_geometry};
use crate::layout::config::LayoutConfig;
use crate::render::canvas::{CollageCanvas, RenderedFrame};
use crate::render::progress::{CancelToken, CellOutcome, ProgressSink, ProgressUpdate};

/// Options controlling a composition run.
#[derive(Clone, Debug, Default)]
pub struct ComposeOpts {
    /// Decode every filled slot up front on a rayon pool. Drawing and progress stay sequential.
    pub parallel_decode: bool,
    /// Override the number of decode threads (parallel mode only). `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Checked before each cell; a cancelled run fails with [`ColorWalkError::Cancelled`].
    pub cancel: Option<CancelToken>,
}

/// Output of a successful run.
#[derive(Clone, Debug)]
pub struct CompositionResult {
    /// The rendered collage.
    pub frame: RenderedFrame,
    /// Per-cell outcome in index order.
    pub cells: Vec<CellOutcome>,
    /// Last reported progress value (100 on success).
    pub progress: u8,
}

impl CompositionResult {
    /// Indices of cells that fell back to the error fill.
    pub fn failed_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_failed())
            .map(|(i, _)| i)
            .collect()
    }
}

type Predecoded = Vec<Option<ColorWalkResult<DecodedImage>>>;

/// Draws a [`Grid`] onto a fresh canvas, one cell at a time.
#[derive(Clone, Debug, Default)]
pub struct Compositor<D = RasterDecoder> {
    decoder: D,
    opts: ComposeOpts,
}

impl Compositor<RasterDecoder> {
    /// Compositor using the built-in raster decoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: ImageDecoder> Compositor<D> {
    /// Compositor using a custom decoder.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            opts: ComposeOpts::default(),
        }
    }

    /// Return the compositor with `opts` applied.
    pub fn with_opts(mut self, opts: ComposeOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Compose `grid` under `cfg`, reporting progress after each cell.
    ///
    /// An all-empty grid fails with [`ColorWalkError::EmptyGrid`] before anything is allocated.
    /// Decode and fit failures are recovered per cell (error fill); anything else aborts the run
    /// and discards the partial canvas. `grid` is never modified.
    #[tracing::instrument(skip_all, fields(filled = grid.filled_count(), extent = cfg.canvas_extent()))]
    pub fn compose(
        &self,
        grid: &Grid,
        cfg: &LayoutConfig,
        progress: &mut dyn ProgressSink,
    ) -> ColorWalkResult<CompositionResult> {
        if grid.is_empty() {
            return Err(ColorWalkError::EmptyGrid);
        }
        cfg.validate()?;
        self.check_cancel(0)?;

        let mut predecoded = if self.opts.parallel_decode {
            self.decode_ahead(grid)?
        } else {
            (0..GRID_CELLS).map(|_| None).collect()
        };

        let mut canvas = CollageCanvas::new(cfg.canvas_extent(), cfg.background)?;
        let mut cells = Vec::with_capacity(GRID_CELLS);
        let mut last_percent = 0;

        for (idx, slot) in grid.slots().iter().enumerate() {
            self.check_cancel(idx)?;

            let cell = cell_geometry(idx, cfg);
            let outcome = match slot {
                GridSlot::Empty => {
                    canvas.fill_cell(&cell, cfg.placeholder);
                    CellOutcome::Placeholder
                }
                GridSlot::Filled(source) => {
                    let decoded = match predecoded.get_mut(idx).and_then(Option::take) {
                        Some(res) => res,
                        None => self.decoder.decode(source),
                    };
                    self.draw_filled(&mut canvas, &cell, cfg, decoded)?
                }
            };

            let processed = idx + 1;
            last_percent = progress_percent(processed, GRID_CELLS);
            tracing::debug!(cell = idx, percent = last_percent, outcome = %outcome, "cell composed");
            let update = ProgressUpdate {
                cell: idx,
                processed,
                total: GRID_CELLS,
                percent: last_percent,
                outcome,
            };
            progress.on_progress(&update);
            cells.push(update.outcome);
        }

        let frame = canvas.finish()?;
        Ok(CompositionResult {
            frame,
            cells,
            progress: last_percent,
        })
    }

    fn draw_filled(
        &self,
        canvas: &mut CollageCanvas,
        cell: &CellGeometry,
        cfg: &LayoutConfig,
        decoded: ColorWalkResult<DecodedImage>,
    ) -> ColorWalkResult<CellOutcome> {
        let drawn = match decoded {
            Ok(img) => canvas
                .draw_cell_image(cell, &img)
                .map(|_| (img.width(), img.height())),
            Err(e) if e.is_recoverable_in_cell() => Err(e),
            // Whatever the decoder failed with, the slot is unreadable.
            Err(e) => Err(ColorWalkError::decode(e.to_string())),
        };
        match drawn {
            Ok((source_width, source_height)) => Ok(CellOutcome::Drawn {
                source_width,
                source_height,
            }),
            Err(e) if e.is_recoverable_in_cell() => {
                tracing::warn!(cell = cell.index, error = %e, "cell falls back to error fill");
                canvas.fill_cell(cell, cfg.error_fill);
                Ok(CellOutcome::Failed {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn check_cancel(&self, processed: usize) -> ColorWalkResult<()> {
        match &self.opts.cancel {
            Some(token) if token.is_cancelled() => Err(ColorWalkError::Cancelled {
                processed,
                total: GRID_CELLS,
            }),
            _ => Ok(()),
        }
    }

    fn decode_ahead(&self, grid: &Grid) -> ColorWalkResult<Predecoded> {
        let pool = build_thread_pool(self.opts.threads)?;
        let decoder = &self.decoder;
        Ok(pool.install(|| {
            grid.slots()
                .as_slice()
                .par_iter()
                .map(|slot| slot.source().map(|src| decoder.decode(src)))
                .collect()
        }))
    }
}

fn build_thread_pool(threads: Option<usize>) -> ColorWalkResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ColorWalkError::validation(
            "compose 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ColorWalkError::composition(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
