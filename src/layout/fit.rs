use crate::foundation::core::{Affine, Rect, Vec2};
use crate::foundation::error::{ColorWalkError, ColorWalkResult};

/// Integer region of the source image that lands inside the cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceWindow {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Width in source pixels, at least 1.
    pub width: u32,
    /// Height in source pixels, at least 1.
    pub height: u32,
}

impl SourceWindow {
    /// Whether the window is the whole `src_w` x `src_h` source.
    pub fn covers(&self, src_w: u32, src_h: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == src_w && self.height == src_h
    }
}

/// Where to draw a source image so it covers a square cell.
///
/// Offsets are relative to the cell origin and never positive: the overflow is split evenly on
/// both sides of the cropped axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Drawn width in pixels.
    pub draw_width: f64,
    /// Drawn height in pixels.
    pub draw_height: f64,
    /// Horizontal offset from the cell's left edge.
    pub offset_x: f64,
    /// Vertical offset from the cell's top edge.
    pub offset_y: f64,
}

impl CoverFit {
    /// Drawn rectangle in canvas coordinates for a cell at `(cell_x, cell_y)`.
    pub fn placed_at(&self, cell_x: f64, cell_y: f64) -> Rect {
        let x0 = cell_x + self.offset_x;
        let y0 = cell_y + self.offset_y;
        Rect::new(x0, y0, x0 + self.draw_width, y0 + self.draw_height)
    }

    /// Transform mapping source pixel space (`src_w` x `src_h`) onto the drawn rectangle.
    pub fn source_transform(&self, cell_x: f64, cell_y: f64, src_w: u32, src_h: u32) -> Affine {
        let dst = self.placed_at(cell_x, cell_y);
        Affine::translate(Vec2::new(dst.x0, dst.y0))
            * Affine::scale_non_uniform(
                self.draw_width / f64::from(src_w.max(1)),
                self.draw_height / f64::from(src_h.max(1)),
            )
    }

    /// The part of a `src_w` x `src_h` source that stays visible after cropping to the cell.
    ///
    /// Edges are rounded outward to whole pixels, so the window may include a sliver of the
    /// cropped-away area.
    pub fn visible_window(&self, src_w: u32, src_h: u32) -> SourceWindow {
        let (x, width) = visible_span(-self.offset_x, self.draw_width, src_w);
        let (y, height) = visible_span(-self.offset_y, self.draw_height, src_h);
        SourceWindow {
            x,
            y,
            width,
            height,
        }
    }
}

// `hidden` is the drawn length cut off before the cell edge; the same length is cut after it.
fn visible_span(hidden: f64, drawn: f64, src: u32) -> (u32, u32) {
    let src = f64::from(src.max(1));
    let scale = drawn / src;
    let cell = drawn - 2.0 * hidden;
    let start = (hidden / scale).floor().clamp(0.0, src - 1.0);
    let end = ((hidden + cell) / scale).ceil().clamp(start + 1.0, src);
    (start as u32, (end - start) as u32)
}

/// Cover-fit a `source_width` x `source_height` image into a square of `cell_size`.
///
/// Landscape sources (`aspect > 1`) keep the cell height and crop left/right; everything else
/// keeps the cell width and crops top/bottom.
pub fn cover_fit(source_width: u32, source_height: u32, cell_size: f64) -> ColorWalkResult<CoverFit> {
    if source_height == 0 || source_width == 0 {
        return Err(ColorWalkError::invalid_image(format!(
            "cannot fit a {source_width}x{source_height} image"
        )));
    }
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(ColorWalkError::invalid_image(format!(
            "cannot fit into a cell of size {cell_size}"
        )));
    }

    let aspect = f64::from(source_width) / f64::from(source_height);
    let fit = if aspect > 1.0 {
        let draw_width = cell_size * aspect;
        CoverFit {
            draw_width,
            draw_height: cell_size,
            offset_x: -(draw_width - cell_size) / 2.0,
            offset_y: 0.0,
        }
    } else {
        let draw_height = cell_size / aspect;
        CoverFit {
            draw_width: cell_size,
            draw_height,
            offset_x: 0.0,
            offset_y: -(draw_height - cell_size) / 2.0,
        }
    };
    Ok(fit)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
