use kurbo::Shape;

use crate::foundation::core::{BezPath, GRID_CELLS, GRID_COLUMNS, Rect, RoundedRect};
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::layout::config::LayoutConfig;

/// Flattening tolerance for corner arcs, in pixels.
const ARC_TOLERANCE: f64 = 0.1;

/// Placement of one cell on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    /// Cell index, row-major.
    pub index: usize,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Edge length of the square cell.
    pub size: f64,
    /// Corner radius in pixels.
    pub radius: f64,
}

impl CellGeometry {
    /// Grid row of this cell.
    pub fn row(&self) -> usize {
        self.index / GRID_COLUMNS
    }

    /// Grid column of this cell.
    pub fn col(&self) -> usize {
        self.index % GRID_COLUMNS
    }

    /// Bounding square of the cell.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.size, self.y + self.size)
    }

    /// Rounded cell shape.
    pub fn rounded_rect(&self) -> RoundedRect {
        RoundedRect::from_rect(self.rect(), self.radius)
    }

    /// Outline used both to fill and to clip the cell: straight edges inset by `radius` from
    /// each corner, joined by quarter arcs.
    pub fn outline(&self) -> BezPath {
        self.rounded_rect().to_path(ARC_TOLERANCE)
    }
}

/// Geometry of cell `index` (row-major, `0..9`) under `cfg`.
///
/// Indices past the last cell wrap into further rows; use [`try_cell_geometry`] when the index
/// comes from user input.
pub fn cell_geometry(index: usize, cfg: &LayoutConfig) -> CellGeometry {
    let row = index / GRID_COLUMNS;
    let col = index % GRID_COLUMNS;
    let pitch = f64::from(cfg.cell_size) + f64::from(cfg.gap);
    let margin = f64::from(cfg.margin);
    CellGeometry {
        index,
        x: margin + (col as f64) * pitch,
        y: margin + (row as f64) * pitch,
        size: f64::from(cfg.cell_size),
        radius: cfg.radius_px(),
    }
}

/// Checked variant of [`cell_geometry`].
pub fn try_cell_geometry(index: usize, cfg: &LayoutConfig) -> ColorWalkResult<CellGeometry> {
    if index >= GRID_CELLS {
        return Err(ColorWalkError::validation(format!(
            "cell index {index} out of range (0..{GRID_CELLS})"
        )));
    }
    Ok(cell_geometry(index, cfg))
}

/// Geometry of every cell in index order.
pub fn cell_geometries(cfg: &LayoutConfig) -> [CellGeometry; GRID_CELLS] {
    std::array::from_fn(|i| cell_geometry(i, cfg))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cells.rs"]
mod tests;
