// fitcrop/src/core/mod.rs
pub mod processor;
mod types;

use crate::validation::ValidationErrors;
use image::ImageFormat;
use thiserror::Error;

pub use processor::ImageProcessor;
pub use types::{
    BackgroundColor, DimensionSpec, ImageInfo, ResizeMode, ResizeResult, ResizeSpec, SizeBounds,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    /// Point sampling.
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    #[default]
    SameAsInput,
}

impl OutputFormat {
    pub fn resolve(self, input: ImageFormat) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::SameAsInput => input,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResizeConfig {
    /// Range a requested `size` must fall within.
    pub bounds: SizeBounds,
    /// Largest source image accepted, inclusive on both axes.
    pub max_source: DimensionSpec,
    /// Source formats accepted. Empty means any decodable format.
    pub allowed_formats: Vec<ImageFormat>,
    pub algorithm: ResizeAlgorithm,
    pub quality: u8,
    pub output_format: OutputFormat,
    pub max_file_size: Option<u64>,
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub processed_count: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
    /// `(source, message)` for every request that failed.
    pub errors: Vec<(String, String)>,
}

impl ProcessingStats {
    pub fn merge(&mut self, other: ProcessingStats) {
        self.processed_count += other.processed_count;
        self.total_size_before += other.total_size_before;
        self.total_size_after += other.total_size_after;
        self.errors.extend(other.errors);
    }

    /// Percentage of source bytes saved, never negative.
    pub fn savings_percent(&self) -> f64 {
        if self.total_size_before == 0 {
            return 0.0;
        }

        let savings = (self.total_size_before as f64 - self.total_size_after as f64)
            / self.total_size_before as f64
            * 100.0;
        savings.max(0.0)
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            bounds: SizeBounds::default(),
            max_source: DimensionSpec::DEFAULT_MAX_SOURCE,
            allowed_formats: vec![ImageFormat::Jpeg],
            algorithm: ResizeAlgorithm::default(),
            quality: 85,
            output_format: OutputFormat::default(),
            max_file_size: None,
        }
    }
}

impl ResizeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ResizeError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if self.max_file_size == Some(0) {
            return Err(ResizeError::InvalidParameter(
                "Maximum file size must be greater than zero".to_string(),
            ));
        }

        for format in &self.allowed_formats {
            if !format.reading_enabled() {
                return Err(ResizeError::InvalidParameter(format!(
                    "Format {:?} cannot be decoded by this build",
                    format
                )));
            }
        }

        Ok(())
    }
}

/// Failures raised by the image codec collaborator. These are fatal for the
/// request that triggered them.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("scale to {height}x{width} failed: {reason}")]
    Scale {
        height: u32,
        width: u32,
        reason: String,
    },

    #[error("crop failed: {0}")]
    Crop(String),

    #[error("encode to {format:?} failed: {reason}")]
    Encode { format: ImageFormat, reason: String },
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, ResizeError>;

pub fn validate_config(config: &ResizeConfig) -> Result<()> {
    config.validate()
}
