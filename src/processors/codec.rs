// fitcrop/src/processors/codec.rs
//! The pixel-level collaborator.
//!
//! The resize engine never touches pixels itself. It asks an [`ImageCodec`]
//! to probe, decode, scale, crop and encode, so the geometry can be tested
//! against a recording mock and the production codec can be swapped.
//!
//! | Operation | `ImageCrateCodec` |
//! |---|---|
//! | probe | `ImageReader::with_guessed_format` + `into_dimensions` |
//! | decode | `ImageReader::decode` |
//! | scale | `DynamicImage::resize_exact` with the configured filter |
//! | crop | `DynamicImage::crop_imm` |
//! | encode | [`Compressor`] |

use super::compressor::Compressor;
use crate::core::{CodecError, ImageInfo, ResizeAlgorithm};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// A decoded image and the format it was decoded from. Transforms always
/// return a new `SourceImage`.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
    format: ImageFormat,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, format: ImageFormat) -> Self {
        Self { pixels, format }
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn color(&self) -> ColorType {
        self.pixels.color()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// New image carrying these pixels under the same format tag.
    pub fn with_pixels(&self, pixels: DynamicImage) -> Self {
        Self {
            pixels,
            format: self.format,
        }
    }
}

pub trait ImageCodec: Send + Sync {
    /// Reads format and pixel size from the header without decoding pixels.
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, CodecError>;

    fn scale(
        &self,
        image: &SourceImage,
        height: u32,
        width: u32,
        filter: ResizeAlgorithm,
    ) -> Result<SourceImage, CodecError>;

    /// Cuts the `height x width` region whose top-left corner is `(x, y)`.
    fn crop(
        &self,
        image: &SourceImage,
        x: u32,
        y: u32,
        height: u32,
        width: u32,
    ) -> Result<SourceImage, CodecError>;

    fn encode(&self, image: &SourceImage, format: ImageFormat) -> Result<Vec<u8>, CodecError>;
}

pub fn filter_type(algorithm: ResizeAlgorithm) -> FilterType {
    match algorithm {
        ResizeAlgorithm::Nearest => FilterType::Nearest,
        ResizeAlgorithm::Bilinear => FilterType::Triangle,
        ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
        ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Production codec backed by the `image` crate.
pub struct ImageCrateCodec {
    compressor: Compressor,
}

impl ImageCrateCodec {
    pub fn new(quality: u8) -> Self {
        Self {
            compressor: Compressor::new(quality),
        }
    }

    fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, CodecError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::new(85)
    }
}

impl ImageCodec for ImageCrateCodec {
    fn probe(&self, bytes: &[u8]) -> Result<ImageInfo, CodecError> {
        let reader = Self::reader(bytes)?;
        let format = reader
            .format()
            .ok_or_else(|| CodecError::Decode("unrecognised image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(CodecError::Decode("image has zero area".to_string()));
        }

        Ok(ImageInfo {
            height,
            width,
            format,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, CodecError> {
        let reader = Self::reader(bytes)?;
        let format = reader
            .format()
            .ok_or_else(|| CodecError::Decode("unrecognised image format".to_string()))?;
        let pixels = reader
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CodecError::Decode("image has zero area".to_string()));
        }

        log::info!(
            "Decoded image: {}x{} pixels (h x w), format: {:?}, color: {:?}",
            pixels.height(),
            pixels.width(),
            format,
            pixels.color()
        );

        Ok(SourceImage::new(pixels, format))
    }

    fn scale(
        &self,
        image: &SourceImage,
        height: u32,
        width: u32,
        filter: ResizeAlgorithm,
    ) -> Result<SourceImage, CodecError> {
        if height == 0 || width == 0 {
            return Err(CodecError::Scale {
                height,
                width,
                reason: "target has zero area".to_string(),
            });
        }

        let scaled = image
            .pixels()
            .resize_exact(width, height, filter_type(filter));
        Ok(image.with_pixels(scaled))
    }

    fn crop(
        &self,
        image: &SourceImage,
        x: u32,
        y: u32,
        height: u32,
        width: u32,
    ) -> Result<SourceImage, CodecError> {
        let fits_x = x.checked_add(width).is_some_and(|right| right <= image.width());
        let fits_y = y.checked_add(height).is_some_and(|bottom| bottom <= image.height());
        if !fits_x || !fits_y {
            return Err(CodecError::Crop(format!(
                "region {}x{} at ({}, {}) exceeds image {}x{}",
                height,
                width,
                x,
                y,
                image.height(),
                image.width()
            )));
        }

        Ok(image.with_pixels(image.pixels().crop_imm(x, y, width, height)))
    }

    fn encode(&self, image: &SourceImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
        self.compressor
            .compress_to_bytes(image.pixels(), format)
            .map_err(|e| CodecError::Encode {
                format,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    /// Colour every image produced by [`RecordingCodec`] is filled with.
    pub const SOURCE_COLOR: Rgb<u8> = Rgb([200, 10, 10]);

    /// Codec that fabricates solid-colour images of the requested sizes and
    /// records each call. Uses Mutex so it stays `Sync`.
    pub struct RecordingCodec {
        info: Option<ImageInfo>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Probe,
        Decode,
        Scale { height: u32, width: u32 },
        Crop { x: u32, y: u32, height: u32, width: u32 },
        Encode(ImageFormat),
    }

    impl RecordingCodec {
        pub fn new(info: ImageInfo) -> Self {
            Self {
                info: Some(info),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn undecodable() -> Self {
            Self {
                info: None,
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }

        fn solid(&self, height: u32, width: u32, format: ImageFormat) -> SourceImage {
            SourceImage::new(
                DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, SOURCE_COLOR)),
                format,
            )
        }
    }

    impl ImageCodec for RecordingCodec {
        fn probe(&self, _bytes: &[u8]) -> Result<ImageInfo, CodecError> {
            self.record(RecordedOp::Probe);
            self.info
                .ok_or_else(|| CodecError::Decode("mock: undecodable".to_string()))
        }

        fn decode(&self, _bytes: &[u8]) -> Result<SourceImage, CodecError> {
            self.record(RecordedOp::Decode);
            let info = self
                .info
                .ok_or_else(|| CodecError::Decode("mock: undecodable".to_string()))?;
            Ok(self.solid(info.height, info.width, info.format))
        }

        fn scale(
            &self,
            image: &SourceImage,
            height: u32,
            width: u32,
            _filter: ResizeAlgorithm,
        ) -> Result<SourceImage, CodecError> {
            self.record(RecordedOp::Scale { height, width });
            Ok(self.solid(height, width, image.format()))
        }

        fn crop(
            &self,
            image: &SourceImage,
            x: u32,
            y: u32,
            height: u32,
            width: u32,
        ) -> Result<SourceImage, CodecError> {
            self.record(RecordedOp::Crop { x, y, height, width });
            Ok(image.with_pixels(image.pixels().crop_imm(x, y, width, height)))
        }

        fn encode(&self, image: &SourceImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
            self.record(RecordedOp::Encode(format));
            Ok(image.pixels().as_bytes().to_vec())
        }
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn probe_reads_header_dimensions() {
        let bytes = png_bytes(&DynamicImage::new_rgb8(30, 20));
        let info = ImageCrateCodec::default().probe(&bytes).unwrap();
        assert_eq!((info.height, info.width), (20, 30));
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.mime_type(), "image/png");
    }

    #[test]
    fn probe_rejects_garbage() {
        let result = ImageCrateCodec::default().probe(b"definitely not an image");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn decode_keeps_source_format() {
        let bytes = png_bytes(&DynamicImage::new_luma8(7, 5));
        let image = ImageCrateCodec::default().decode(&bytes).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.color(), ColorType::L8);
        assert_eq!((image.height(), image.width()), (5, 7));
    }

    #[test]
    fn scale_produces_exact_size() {
        let codec = ImageCrateCodec::default();
        let image = SourceImage::new(DynamicImage::new_rgb8(40, 10), ImageFormat::Jpeg);
        let scaled = codec.scale(&image, 3, 17, ResizeAlgorithm::Nearest).unwrap();
        assert_eq!((scaled.height(), scaled.width()), (3, 17));
        assert_eq!(scaled.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn crop_out_of_bounds_is_an_error() {
        let codec = ImageCrateCodec::default();
        let image = SourceImage::new(DynamicImage::new_rgb8(10, 10), ImageFormat::Png);
        assert!(codec.crop(&image, 5, 0, 10, 6).is_err());
        assert!(codec.crop(&image, u32::MAX, 0, 1, 1).is_err());

        let cropped = codec.crop(&image, 2, 3, 7, 8).unwrap();
        assert_eq!((cropped.height(), cropped.width()), (7, 8));
    }

    #[test]
    fn filters_map_to_image_crate() {
        assert_eq!(filter_type(ResizeAlgorithm::Nearest), FilterType::Nearest);
        assert_eq!(filter_type(ResizeAlgorithm::Bicubic), FilterType::CatmullRom);
    }
}
