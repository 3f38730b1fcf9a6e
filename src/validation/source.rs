// fitcrop/src/validation/source.rs
use super::ValidationErrorKind;
use crate::core::{DimensionSpec, ImageInfo, ResizeConfig};
use image::ImageFormat;

/// A constraint on a probed source image. Rules are handed to the
/// [`Validator`](super::Validator) as an explicit list and run in order.
pub trait ImageRule: Send + Sync {
    fn check(&self, info: &ImageInfo) -> Result<(), RuleFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub kind: ValidationErrorKind,
    pub message: String,
}

/// Rejects sources whose format is not in the allow-list. An empty list
/// accepts every decodable format.
#[derive(Debug, Clone)]
pub struct AllowedTypes {
    formats: Vec<ImageFormat>,
}

impl AllowedTypes {
    pub fn new(formats: Vec<ImageFormat>) -> Self {
        Self { formats }
    }

    fn describe(&self) -> String {
        self.formats
            .iter()
            .flat_map(|format| format.extensions_str().iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ImageRule for AllowedTypes {
    fn check(&self, info: &ImageInfo) -> Result<(), RuleFailure> {
        if self.formats.is_empty() || self.formats.contains(&info.format) {
            return Ok(());
        }

        Err(RuleFailure {
            kind: ValidationErrorKind::Type,
            message: format!(
                "type {} is not allowed, allowed file types: {}",
                info.mime_type(),
                self.describe()
            ),
        })
    }
}

/// Rejects sources larger than `max` on either axis. Equal to max passes.
#[derive(Debug, Clone, Copy)]
pub struct MaxDimensions {
    max: DimensionSpec,
}

impl MaxDimensions {
    pub fn new(max: DimensionSpec) -> Self {
        Self { max }
    }
}

impl ImageRule for MaxDimensions {
    fn check(&self, info: &ImageInfo) -> Result<(), RuleFailure> {
        if info.height <= self.max.height() && info.width <= self.max.width() {
            return Ok(());
        }

        Err(RuleFailure {
            kind: ValidationErrorKind::SizeExceeded,
            message: format!(
                "image size {}x{} must not exceed {}",
                info.height, info.width, self.max
            ),
        })
    }
}

/// The rule list implied by a configuration: type allow-list, then size.
pub fn default_rules(config: &ResizeConfig) -> Vec<Box<dyn ImageRule>> {
    vec![
        Box::new(AllowedTypes::new(config.allowed_formats.clone())),
        Box::new(MaxDimensions::new(config.max_source)),
    ]
}
