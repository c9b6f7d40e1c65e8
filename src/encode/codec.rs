//! Image encoding backed by the `image` crate.
//!
//! [`RasterEncoder`] is the seam the generation pipeline encodes through;
//! [`ImageCodec`] is the production implementation.

use std::fmt;
use std::io::Cursor;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG. Output size follows the quality setting.
    #[default]
    Jpeg,
    /// Lossless PNG. Effort selects the compression level.
    Png,
    /// Lossless WebP.
    WebP,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Parses a format from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Matching `image` crate format.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-call encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    /// Quality, 1-100. Only lossy formats use it.
    pub quality: u8,
    /// Effort, 0 (fastest, largest output) to 6 (slowest). Only PNG uses it.
    pub effort: u8,
}

impl EncodeSettings {
    /// Settings with the given quality and minimum effort.
    pub fn fastest(quality: u8) -> Self {
        Self { quality, effort: 0 }
    }
}

/// Encodes an RGBA raster into a compressed byte buffer.
pub trait RasterEncoder: Send + Sync {
    /// Format of the produced bytes.
    fn format(&self) -> OutputFormat;

    /// Encodes `image` with the given settings.
    fn encode(&self, image: &RgbaImage, settings: EncodeSettings) -> Result<Vec<u8>>;
}

/// [`RasterEncoder`] on top of the `image` crate codecs.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    format: OutputFormat,
}

impl ImageCodec {
    /// Creates a codec for `format`.
    ///
    /// Fails with CAPABILITY_UNAVAILABLE when the `image` crate was built
    /// without a writer for that format.
    pub fn new(format: OutputFormat) -> Result<Self> {
        if !format.image_format().writing_enabled() {
            return Err(GenerationError::capability_unavailable(format));
        }
        Ok(Self { format })
    }
}

impl RasterEncoder for ImageCodec {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn encode(&self, image: &RgbaImage, settings: EncodeSettings) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        let mut bytes = Cursor::new(Vec::new());

        let encoded = match self.format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb: RgbImage = image.convert();
                let quality = settings.quality.clamp(1, 100);
                JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)
            }
            OutputFormat::Png => {
                let compression = png_compression(settings.effort);
                PngEncoder::new_with_quality(&mut bytes, compression, FilterType::Adaptive)
                    .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            }
            OutputFormat::WebP => WebPEncoder::new_lossless(&mut bytes).encode(
                image.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        };

        encoded.map_err(|e| {
            GenerationError::encode_failure(
                format!("{} {}x{}", self.format, width, height),
                e,
            )
        })?;

        Ok(bytes.into_inner())
    }
}

fn png_compression(effort: u8) -> CompressionType {
    match effort {
        0 => CompressionType::Fast,
        1..=3 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
