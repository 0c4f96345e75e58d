use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::codecs::jpeg::JpegEncoder;

use crate::foundation::error::{ColorWalkError, ColorWalkResult};
use crate::foundation::math::{premul_rgba8, unpremultiply_rgba8_in_place};
use crate::render::canvas::RenderedFrame;

/// Encoded output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG; alpha is flattened over white.
    Jpeg,
}

impl ExportFormat {
    /// MIME type used in data URLs.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Guess the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// How to encode a finished frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality in `1..=100`; ignored for PNG.
    pub quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 90,
        }
    }
}

impl ExportSettings {
    /// PNG settings.
    pub fn png() -> Self {
        Self::default()
    }

    /// JPEG settings with the given quality.
    pub fn jpeg(quality: u8) -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality,
        }
    }

    /// Reject out-of-range quality.
    pub fn validate(&self) -> ColorWalkResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(ColorWalkError::validation(format!(
                "export quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// An encoded collage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// `data:<mime>;base64,<payload>` form of the encoded bytes.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            BASE64_STANDARD.encode(&self.bytes)
        )
    }

    /// Write the encoded bytes to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: impl AsRef<Path>) -> ColorWalkResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write {} '{}'", self.format.extension(), path.display()))?;
        Ok(())
    }
}

/// Encode `frame` according to `settings`.
#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn export(frame: &RenderedFrame, settings: &ExportSettings) -> ColorWalkResult<ExportedImage> {
    settings.validate()?;
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(ColorWalkError::export(format!(
            "frame data is {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let bytes = match settings.format {
        ExportFormat::Png => encode_png(frame)?,
        ExportFormat::Jpeg => encode_jpeg(frame, settings.quality)?,
    };
    tracing::debug!(bytes = bytes.len(), format = ?settings.format, "collage encoded");
    Ok(ExportedImage {
        format: settings.format,
        width: frame.width,
        height: frame.height,
        bytes,
    })
}

fn encode_png(frame: &RenderedFrame) -> ColorWalkResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| ColorWalkError::export("frame buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ColorWalkError::export(format!("encode png: {e}")))?;
    Ok(buf)
}

fn encode_jpeg(frame: &RenderedFrame, quality: u8) -> ColorWalkResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity((frame.width as usize) * (frame.height as usize) * 3);
    for px in frame.data.chunks_exact(4) {
        // Source-over onto white: premultiplied color plus the uncovered share of white.
        let a = px[3];
        let [r, g, b] = if frame.premultiplied {
            [px[0], px[1], px[2]]
        } else {
            let premul = premul_rgba8([px[0], px[1], px[2], a]);
            [premul[0], premul[1], premul[2]]
        };
        let white = 255 - a;
        rgb.extend_from_slice(&[
            r.saturating_add(white),
            g.saturating_add(white),
            b.saturating_add(white),
        ]);
    }
    let img = image::RgbImage::from_raw(frame.width, frame.height, rgb)
        .ok_or_else(|| ColorWalkError::export("frame buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&img)
        .map_err(|e| ColorWalkError::export(format!("encode jpeg: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/export/encoder.rs"]
mod tests;
