use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{GRID_COLUMNS, Rgba8};
use crate::foundation::error::{ColorWalkError, ColorWalkResult};

/// Largest canvas edge the raster backend can allocate.
pub const MAX_CANVAS_EXTENT: u32 = u16::MAX as u32;

/// Largest canvas area accepted, in pixels (10000 x 10000, about 400 MB of RGBA8).
pub const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Corner radius of each cell, either absolute or relative to the cell size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRadius {
    /// Fixed radius in pixels.
    Px(f64),
    /// Radius as a fraction of the cell size (`0.06` gives 30 px on a 500 px cell).
    Ratio(f64),
}

impl CornerRadius {
    /// Resolve to pixels for `cell_size`, clamped to half the cell.
    pub fn resolve(self, cell_size: u32) -> f64 {
        let size = f64::from(cell_size);
        let raw = match self {
            Self::Px(px) => px,
            Self::Ratio(r) => r * size,
        };
        raw.clamp(0.0, size * 0.5)
    }

    fn raw(self) -> f64 {
        match self {
            Self::Px(v) | Self::Ratio(v) => v,
        }
    }
}

/// Built-in layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreset {
    /// 500 px cells, 20 px gaps on every side, radius 30.
    Classic,
    /// 600 px cells, 30 px gaps, 80 px outer margin, radius 40.
    Framed,
}

impl LayoutPreset {
    /// Every preset, in display order.
    pub const ALL: [LayoutPreset; 2] = [LayoutPreset::Classic, LayoutPreset::Framed];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Framed => "framed",
        }
    }

    /// Layout configuration for this preset.
    pub fn config(self) -> LayoutConfig {
        match self {
            Self::Classic => LayoutConfig::classic(),
            Self::Framed => LayoutConfig::framed(),
        }
    }
}

/// Immutable parameters of one composition run.
///
/// The canvas is square with edge `2 * margin + 3 * cell_size + 2 * gap`. Setting
/// `margin == gap` yields the layout where a gap precedes every cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Edge length of each square cell in pixels.
    pub cell_size: u32,
    /// Space between adjacent cells in pixels.
    pub gap: u32,
    /// Space between the canvas edge and the outer cells in pixels.
    pub margin: u32,
    /// Cell corner rounding.
    pub corner_radius: CornerRadius,
    /// Canvas fill behind the cells.
    pub background: Rgba8,
    /// Fill for empty slots.
    pub placeholder: Rgba8,
    /// Fill for slots whose image could not be drawn.
    pub error_fill: Rgba8,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl LayoutConfig {
    const BACKGROUND: Rgba8 = Rgba8::WHITE;
    const PLACEHOLDER: Rgba8 = Rgba8::opaque(0xF8, 0xFA, 0xFC);
    const ERROR_FILL: Rgba8 = Rgba8::opaque(0xFE, 0xE2, 0xE2);

    /// The compact layout: equal gap and margin.
    pub fn classic() -> Self {
        Self {
            cell_size: 500,
            gap: 20,
            margin: 20,
            corner_radius: CornerRadius::Px(30.0),
            background: Self::BACKGROUND,
            placeholder: Self::PLACEHOLDER,
            error_fill: Self::ERROR_FILL,
        }
    }

    /// The framed layout: larger cells inside a wide outer margin.
    pub fn framed() -> Self {
        Self {
            cell_size: 600,
            gap: 30,
            margin: 80,
            corner_radius: CornerRadius::Px(40.0),
            background: Self::BACKGROUND,
            placeholder: Self::PLACEHOLDER,
            error_fill: Self::ERROR_FILL,
        }
    }

    /// Parse a layout from a JSON reader. Missing fields take the `classic` values.
    pub fn from_reader<R: std::io::Read>(r: R) -> ColorWalkResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ColorWalkError::validation(format!("parse layout JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a layout from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ColorWalkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ColorWalkError::validation(format!("open layout JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Canvas edge length in pixels (the canvas is square).
    pub fn canvas_extent(&self) -> u64 {
        let cols = GRID_COLUMNS as u64;
        2 * u64::from(self.margin) + cols * u64::from(self.cell_size) + (cols - 1) * u64::from(self.gap)
    }

    /// Resolved corner radius in pixels.
    pub fn radius_px(&self) -> f64 {
        self.corner_radius.resolve(self.cell_size)
    }

    /// Reject layouts the compositor cannot render.
    pub fn validate(&self) -> ColorWalkResult<()> {
        if self.cell_size == 0 {
            return Err(ColorWalkError::validation("cell_size must be > 0"));
        }
        let r = self.corner_radius.raw();
        if !r.is_finite() || r < 0.0 {
            return Err(ColorWalkError::validation(
                "corner_radius must be finite and >= 0",
            ));
        }
        let extent = self.canvas_extent();
        if extent > u64::from(MAX_CANVAS_EXTENT) {
            return Err(ColorWalkError::validation(format!(
                "canvas extent {extent}px exceeds the {MAX_CANVAS_EXTENT}px limit"
            )));
        }
        let pixels = extent * extent;
        if pixels > MAX_CANVAS_PIXELS {
            return Err(ColorWalkError::validation(format!(
                "canvas of {extent}x{extent}px exceeds the {MAX_CANVAS_PIXELS} pixel limit"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/config.rs"]
mod tests;
