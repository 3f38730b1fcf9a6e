// fitcrop/src/validation/mod.rs
//! Request validation.
//!
//! Raw parameters arrive as unparsed strings, the way a query string would
//! deliver them. [`Validator::validate`] checks every field in a fixed order
//! (`url`, `size`, `cropping`, `background`), collecting one error per failing
//! field. Callers normally report only [`ValidationErrors::first`].

mod mode;
mod size;
mod source;

use crate::core::{ImageInfo, ResizeConfig, ResizeSpec, SizeBounds};
use crate::processors::{Fetcher, ImageCodec};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use mode::{parse_background, parse_cropping, CROPPING_VALUES};
pub use size::{parse_dimensions, Axis, SizeError};
pub use source::{default_rules, AllowedTypes, ImageRule, MaxDimensions, RuleFailure};

pub const FIELD_URL: &str = "url";
pub const FIELD_SIZE: &str = "size";
pub const FIELD_CROPPING: &str = "cropping";
pub const FIELD_BACKGROUND: &str = "background";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Required,
    Unfetchable,
    Format,
    Range,
    Enum,
    Decode,
    Type,
    SizeExceeded,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, kind: ValidationErrorKind, detail: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message: format!("{} - {}", field, detail),
        }
    }

    fn required(field: &str) -> Self {
        Self::new(field, ValidationErrorKind::Required, "required parameter is missing")
    }
}

/// Field-ordered list of failures. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationError>);

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

impl ValidationErrors {
    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `{"error": "..."}` envelope carrying the first message.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ErrorEnvelope {
            error: &self.first().message,
        })
    }

    /// Every failure with its field and kind, for diagnostics.
    pub fn details_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first())
    }
}

impl std::error::Error for ValidationErrors {}

/// Unparsed request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub url: Option<String>,
    pub size: Option<String>,
    pub cropping: Option<String>,
    pub background: Option<String>,
}

impl RawParams {
    /// Builds parameters from key/value pairs. Unknown keys are ignored and a
    /// repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                FIELD_URL => &mut params.url,
                FIELD_SIZE => &mut params.size,
                FIELD_CROPPING => &mut params.cropping,
                FIELD_BACKGROUND => &mut params.background,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }
}

/// A request that passed every check, with its source bytes already fetched.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub source: Vec<u8>,
    pub info: ImageInfo,
    pub spec: ResizeSpec,
}

pub struct Validator {
    bounds: SizeBounds,
    image_rules: Vec<Box<dyn ImageRule>>,
}

impl Validator {
    pub fn new(bounds: SizeBounds, image_rules: Vec<Box<dyn ImageRule>>) -> Self {
        Self {
            bounds,
            image_rules,
        }
    }

    pub fn from_config(config: &ResizeConfig) -> Self {
        Self::new(config.bounds, default_rules(config))
    }

    pub fn validate(
        &self,
        params: &RawParams,
        fetcher: &dyn Fetcher,
        codec: &dyn ImageCodec,
    ) -> Result<ValidatedRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let source = self
            .check_source(params.url.as_deref(), fetcher, codec)
            .map_err(|e| errors.push(e))
            .ok();

        let target = match non_empty(params.size.as_deref()) {
            None => {
                errors.push(ValidationError::required(FIELD_SIZE));
                None
            }
            Some(raw) => parse_dimensions(raw, &self.bounds)
                .map_err(|e| errors.push(size_error(e)))
                .ok(),
        };

        let mode = parse_cropping(params.cropping.as_deref());
        if mode.is_none() {
            errors.push(ValidationError::new(
                FIELD_CROPPING,
                ValidationErrorKind::Enum,
                format!("value must be one of {}", CROPPING_VALUES.join(", ")),
            ));
        }

        let background = parse_background(params.background.as_deref());
        if background.is_none() {
            errors.push(ValidationError::new(
                FIELD_BACKGROUND,
                ValidationErrorKind::Format,
                "color must be in RGB format: 255,255,255",
            ));
        }

        match (source, target, mode, background) {
            (Some((bytes, info)), Some(target), Some(mode), Some(background)) => {
                Ok(ValidatedRequest {
                    source: bytes,
                    info,
                    spec: ResizeSpec::new(target, mode).with_background(background),
                })
            }
            _ => {
                let errors = ValidationErrors(errors);
                if let Ok(details) = errors.details_json() {
                    log::debug!("Request rejected: {}", details);
                }
                Err(errors)
            }
        }
    }

    fn check_source(
        &self,
        url: Option<&str>,
        fetcher: &dyn Fetcher,
        codec: &dyn ImageCodec,
    ) -> Result<(Vec<u8>, ImageInfo), ValidationError> {
        let location = non_empty(url).ok_or_else(|| ValidationError::required(FIELD_URL))?;

        let bytes = fetcher.fetch(location).map_err(|e| {
            ValidationError::new(
                FIELD_URL,
                ValidationErrorKind::Unfetchable,
                format!("image could not be fetched: {}", e),
            )
        })?;

        let info = codec.probe(&bytes).map_err(|e| {
            log::debug!("Probe of {} failed: {}", location, e);
            ValidationError::new(
                FIELD_URL,
                ValidationErrorKind::Decode,
                "the resource is not a readable image",
            )
        })?;

        for rule in &self.image_rules {
            rule.check(&info)
                .map_err(|f| ValidationError::new(FIELD_URL, f.kind, f.message))?;
        }

        Ok((bytes, info))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn size_error(error: SizeError) -> ValidationError {
    let kind = match error {
        SizeError::Format => ValidationErrorKind::Format,
        SizeError::Range { .. } => ValidationErrorKind::Range,
    };
    ValidationError::new(FIELD_SIZE, kind, error)
}
