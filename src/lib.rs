//! colorwalk composes up to nine photos into a single square "color walk" collage.
//!
//! The collage is a 3x3 grid of rounded-corner cells. Each filled cell shows its photo scaled with
//! cover semantics (fills the cell, preserves aspect, crops the excess); empty cells get a
//! placeholder fill and unreadable photos get an error fill.
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: bytes or files become an [`ImageSource`] (15 MiB cap, checked before reading)
//!    held in a [`Grid`].
//! 2. **Layout**: a [`LayoutConfig`] yields one [`CellGeometry`] per cell index.
//! 3. **Compose**: the [`Compositor`] decodes, cover-fits and clips each cell in order onto a CPU
//!    canvas, reporting a [`ProgressUpdate`] after every cell.
//! 4. **Export**: the [`RenderedFrame`] is encoded to PNG or JPEG as an [`ExportedImage`].
//!
//! [`Session`] wraps the steps above with the state an editor needs: slot selection, confirmed
//! reset, the last preview, and auto-dismissing [`Notice`]s.
//!
//! Canvas pixels are premultiplied RGBA8 internally and un-premultiplied on export.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod export;
mod foundation;
mod grid;
mod layout;
mod render;
mod session;

pub use assets::decode::{
    DEFAULT_MAX_DECODE_ALLOC, DecodedImage, ImageDecoder, RasterDecoder, probe_dimensions,
};
pub use assets::source::{ImageSource, MAX_SOURCE_BYTES, check_source_size};
pub use export::encoder::{ExportFormat, ExportSettings, ExportedImage, export};
pub use foundation::core::{
    Affine, BezPath, GRID_CELLS, GRID_COLUMNS, Point, Rect, Rgba8, RoundedRect, Vec2,
};
pub use foundation::error::{ColorWalkError, ColorWalkResult};
pub use grid::manifest::{GridManifest, load_grid};
pub use grid::state::{Grid, GridSlot};
pub use layout::cells::{CellGeometry, cell_geometries, cell_geometry, try_cell_geometry};
pub use layout::config::{
    CornerRadius, LayoutConfig, LayoutPreset, MAX_CANVAS_EXTENT, MAX_CANVAS_PIXELS,
};
pub use layout::fit::{CoverFit, SourceWindow, cover_fit};
pub use render::canvas::RenderedFrame;
pub use render::compositor::{ComposeOpts, CompositionResult, Compositor};
pub use render::progress::{
    CancelToken, CellOutcome, NoProgress, ProgressLog, ProgressSink, ProgressUpdate,
};
pub use session::app::{Session, notice_text};
pub use session::notice::{NOTICE_TIMEOUT, Notice, NoticeBoard};
