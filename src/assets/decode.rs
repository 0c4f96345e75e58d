use std::io::Cursor;

use image::imageops::FilterType;

use crate::assets::source::ImageSource;
use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Default cap on decoder allocations for a single image.
pub const DEFAULT_MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

/// Decoded bitmap in straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    rgba: image::RgbaImage,
}

impl DecodedImage {
    /// Wrap an already decoded RGBA buffer.
    pub fn from_rgba(rgba: image::RgbaImage) -> Self {
        Self { rgba }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Straight-alpha pixels.
    pub fn as_rgba(&self) -> &image::RgbaImage {
        &self.rgba
    }

    /// Resample to `width` x `height` with a triangle filter.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self {
            rgba: image::imageops::resize(&self.rgba, width.max(1), height.max(1), FilterType::Triangle),
        }
    }

    /// Copy of the `width` x `height` region starting at `(x, y)`, clamped to the bitmap.
    pub fn cropped(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            rgba: image::imageops::crop_imm(&self.rgba, x, y, width, height).to_image(),
        }
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn to_premul_bytes(&self) -> Vec<u8> {
        let mut bytes = self.rgba.as_raw().clone();
        premultiply_rgba8_in_place(&mut bytes);
        bytes
    }
}

/// Turns an [`ImageSource`] into a [`DecodedImage`].
///
/// Implementations must be shareable across threads so decoding can run ahead of drawing.
pub trait ImageDecoder: Send + Sync {
    /// Decode `source`, failing with [`ColorWalkError::Decode`] on unreadable bytes.
    fn decode(&self, source: &ImageSource) -> ColorWalkResult<DecodedImage>;
}

impl<F> ImageDecoder for F
where
    F: Fn(&ImageSource) -> ColorWalkResult<DecodedImage> + Send + Sync,
{
    fn decode(&self, source: &ImageSource) -> ColorWalkResult<DecodedImage> {
        self(source)
    }
}

/// Decoder backed by the `image` crate; the format is sniffed from the bytes.
#[derive(Clone, Copy, Debug)]
pub struct RasterDecoder {
    max_alloc: Option<u64>,
}

impl Default for RasterDecoder {
    fn default() -> Self {
        Self {
            max_alloc: Some(DEFAULT_MAX_DECODE_ALLOC),
        }
    }
}

impl RasterDecoder {
    /// Decoder with a custom allocation cap (`None` disables it).
    pub fn with_max_alloc(max_alloc: Option<u64>) -> Self {
        Self { max_alloc }
    }
}

impl ImageDecoder for RasterDecoder {
    fn decode(&self, source: &ImageSource) -> ColorWalkResult<DecodedImage> {
        let mut reader = image::ImageReader::new(Cursor::new(source.bytes()))
            .with_guessed_format()
            .map_err(|e| ColorWalkError::decode(format!("sniff image format: {e}")))?;
        if reader.format().is_none() {
            return Err(ColorWalkError::decode("unrecognized image format"));
        }
        let mut limits = image::Limits::default();
        limits.max_alloc = self.max_alloc;
        reader.limits(limits);

        let dyn_img = reader
            .decode()
            .map_err(|e| ColorWalkError::decode(format!("decode image: {e}")))?;
        let rgba = dyn_img.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(ColorWalkError::invalid_image(format!(
                "decoded image is {}x{}",
                rgba.width(),
                rgba.height()
            )));
        }
        Ok(DecodedImage::from_rgba(rgba))
    }
}

/// Read only the header of `bytes` and return `(width, height)`.
///
/// Used at ingestion time to reject unreadable files without a full decode.
pub fn probe_dimensions(bytes: &[u8]) -> ColorWalkResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ColorWalkError::decode(format!("sniff image format: {e}")))?;
    if reader.format().is_none() {
        return Err(ColorWalkError::decode("unrecognized image format"));
    }
    let (w, h) = reader
        .into_dimensions()
        .map_err(|e| ColorWalkError::decode(format!("read image header: {e}")))?;
    if w == 0 || h == 0 {
        return Err(ColorWalkError::invalid_image(format!("image is {w}x{h}")));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
