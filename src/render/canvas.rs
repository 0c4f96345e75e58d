use std::borrow::Cow;
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::layout::cells::CellGeometry;
use crate::layout::fit::{CoverFit, cover_fit};

/// A finished collage as RGBA8 pixels.
///
/// Frames read back from the canvas are **premultiplied alpha**; the flag makes this explicit at
/// API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl RenderedFrame {
    /// Pixel at `(x, y)` as stored, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Output surface exclusively owned by one composition run.
///
/// Drawing is recorded into a `vello_cpu` context and rasterized once in [`CollageCanvas::finish`].
pub(crate) struct CollageCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl CollageCanvas {
    /// Allocate a square canvas and paint the background.
    pub(crate) fn new(extent: u64, background: Rgba8) -> ColorWalkResult<Self> {
        let side: u16 = extent.try_into().map_err(|_| {
            ColorWalkError::composition(format!("canvas extent {extent}px exceeds u16"))
        })?;
        if side == 0 {
            return Err(ColorWalkError::composition("canvas extent must be > 0"));
        }
        let mut ctx = vello_cpu::RenderContext::new(side, side);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(side),
            f64::from(side),
        ));
        Ok(Self {
            ctx,
            width: side,
            height: side,
        })
    }

    /// Fill the rounded cell outline with a solid color.
    pub(crate) fn fill_cell(&mut self, cell: &CellGeometry, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&bezpath_to_cpu(&cell.outline()));
    }

    /// Draw `image` cover-fitted into the cell, clipped to the rounded outline.
    ///
    /// Only the visible window of the source is cropped out and, when larger than its drawn size,
    /// downsampled to it.
    ///
    /// Fit and paint preparation happen before the clip is pushed, so a failure leaves the canvas
    /// untouched and the caller free to fill the cell instead.
    pub(crate) fn draw_cell_image(
        &mut self,
        cell: &CellGeometry,
        image: &DecodedImage,
    ) -> ColorWalkResult<CoverFit> {
        let fit = cover_fit(image.width(), image.height(), cell.size)?;
        let window = fit.visible_window(image.width(), image.height());
        let visible = if window.covers(image.width(), image.height()) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(image.cropped(window.x, window.y, window.width, window.height))
        };
        let scale_x = fit.draw_width / f64::from(image.width());
        let scale_y = fit.draw_height / f64::from(image.height());
        let target_w = (f64::from(window.width) * scale_x).ceil().max(1.0) as u32;
        let target_h = (f64::from(window.height) * scale_y).ceil().max(1.0) as u32;
        let src = if visible.width() > target_w || visible.height() > target_h {
            Cow::Owned(visible.resized(target_w, target_h))
        } else {
            visible
        };
        let paint = image_paint(&src)?;
        // Pixmap space -> source window -> canvas.
        let transform = fit.source_transform(cell.x, cell.y, image.width(), image.height())
            * Affine::translate((f64::from(window.x), f64::from(window.y)))
            * Affine::scale_non_uniform(
                f64::from(window.width) / f64::from(src.width()),
                f64::from(window.height) / f64::from(src.height()),
            );

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&bezpath_to_cpu(&cell.outline()));
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(src.width()),
            f64::from(src.height()),
        ));
        self.ctx.pop_layer();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(fit)
    }

    /// Rasterize everything drawn so far and read the pixels back.
    pub(crate) fn finish(mut self) -> ColorWalkResult<RenderedFrame> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let width = u32::from(self.width);
        let height = u32::from(self.height);
        let data = pixmap.data_as_u8_slice().to_vec();
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(ColorWalkError::composition("canvas readback size mismatch"));
        }
        Ok(RenderedFrame {
            width,
            height,
            data,
            premultiplied: true,
        })
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn image_paint(image: &DecodedImage) -> ColorWalkResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&image.to_premul_bytes(), image.width(), image.height())?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ColorWalkResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ColorWalkError::invalid_image(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ColorWalkError::invalid_image(format!("image height {height} exceeds u16")))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ColorWalkError::invalid_image("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
