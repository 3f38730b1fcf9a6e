// fitcrop/src/processors/compressor.rs
use crate::core::{ResizeError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;

/// Encodes finished images to bytes.
pub struct Compressor {
    quality: u8,
    optimize_png: bool,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            optimize_png: true,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn compress_to_bytes(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} image as {:?}, quality: {}",
            image.height(),
            image.width(),
            format,
            self.quality
        );

        let bytes = match format {
            ImageFormat::Jpeg => self.encode_jpeg(image)?,
            ImageFormat::Png => self.encode_png(image)?,
            ImageFormat::WebP => encode_generic(&rgb_or_rgba(image), format)?,
            _ => encode_generic(image, format)?,
        };

        log::debug!("Encoded {} bytes", bytes.len());
        Ok(bytes)
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        // JPEG carries neither alpha nor 16-bit samples.
        let flattened = match image.color() {
            ColorType::L8 | ColorType::Rgb8 => None,
            ColorType::L16 | ColorType::La8 | ColorType::La16 => {
                Some(DynamicImage::ImageLuma8(image.to_luma8()))
            }
            _ => Some(DynamicImage::ImageRgb8(image.to_rgb8())),
        };
        let image = flattened.as_ref().unwrap_or(image);

        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        image.write_with_encoder(encoder)?;
        Ok(buffer.into_inner())
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let data = encode_generic(image, ImageFormat::Png)?;
        if self.optimize_png {
            return optimize_png_bytes(&data);
        }
        Ok(data)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(85)
    }
}

fn encode_generic(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}

fn rgb_or_rgba(image: &DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::Rgb8 | ColorType::Rgba8 => image.clone(),
        color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

fn optimize_png_bytes(data: &[u8]) -> Result<Vec<u8>> {
    optimize_from_memory(data, &Options::default())
        .map_err(|e| ResizeError::ProcessingError(format!("PNG optimization failed: {}", e)))
}
