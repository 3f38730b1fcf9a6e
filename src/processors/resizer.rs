// fitcrop/src/processors/resizer.rs
//! The resize engine.
//!
//! [`plan`] turns a source size and a [`ResizeSpec`] into a [`Geometry`]
//! using integer arithmetic only. [`Resizer::resize`] then asks the codec to
//! realise that geometry: scale, then crop (Fill) or composite (Fit).

use super::codec::{ImageCodec, SourceImage};
use super::compositor;
use crate::core::{CodecError, DimensionSpec, ResizeAlgorithm, ResizeMode, ResizeSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Scale to `scaled`, then centre on the target canvas at the offsets.
    Fit {
        scaled: DimensionSpec,
        offset_x: i64,
        offset_y: i64,
    },
    /// Scale to `scaled`, then cut the target out at `(crop_x, crop_y)`.
    Fill {
        scaled: DimensionSpec,
        crop_x: u32,
        crop_y: u32,
    },
}

impl Geometry {
    pub fn scaled(&self) -> DimensionSpec {
        match self {
            Geometry::Fit { scaled, .. } | Geometry::Fill { scaled, .. } => *scaled,
        }
    }
}

fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    numerator.div_ceil(denominator)
}

/// Halves round up. The remainder is below `denominator`, so doubling it
/// cannot overflow.
fn round_div(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    quotient + u64::from(2 * remainder >= denominator)
}

fn to_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Largest size with the source's aspect ratio that fits inside `target`.
///
/// The axis with the tighter ratio matches the target exactly; the other is
/// rounded up, so it never exceeds its bound and falls short by less than one
/// pixel of the exact proportional value.
pub fn fit_dimensions(source: DimensionSpec, target: DimensionSpec) -> DimensionSpec {
    let (old_h, old_w) = (u64::from(source.height()), u64::from(source.width()));
    let (max_h, max_w) = (u64::from(target.height()), u64::from(target.width()));

    // max_w / old_w * old_h < max_h, cross-multiplied.
    let (new_h, new_w) = if max_w * old_h < max_h * old_w {
        (ceil_div(max_w * old_h, old_w), max_w)
    } else {
        (max_h, ceil_div(max_h * old_w, old_h))
    };

    DimensionSpec::new(to_u32(new_h), to_u32(new_w)).unwrap_or(target)
}

/// Smallest size with the source's aspect ratio that covers `target`.
///
/// The axis with the larger ratio matches the target exactly; the other is
/// rounded to nearest but never below its target.
pub fn fill_dimensions(source: DimensionSpec, target: DimensionSpec) -> DimensionSpec {
    let (old_h, old_w) = (u64::from(source.height()), u64::from(source.width()));
    let (max_h, max_w) = (u64::from(target.height()), u64::from(target.width()));

    let (new_h, new_w) = if max_w * old_h > max_h * old_w {
        (round_div(max_w * old_h, old_w).max(max_h), max_w)
    } else {
        (max_h, round_div(max_h * old_w, old_h).max(max_w))
    };

    DimensionSpec::new(to_u32(new_h), to_u32(new_w)).unwrap_or(target)
}

pub fn plan(source: DimensionSpec, spec: &ResizeSpec) -> Geometry {
    let target = spec.target;

    match spec.mode {
        ResizeMode::Fit => {
            let scaled = fit_dimensions(source, target);
            Geometry::Fit {
                scaled,
                offset_x: compositor::centre_offset(target.width(), scaled.width()),
                offset_y: compositor::centre_offset(target.height(), scaled.height()),
            }
        }
        ResizeMode::Fill => {
            let scaled = fill_dimensions(source, target);
            Geometry::Fill {
                scaled,
                crop_x: (scaled.width() - target.width()) / 2,
                crop_y: (scaled.height() - target.height()) / 2,
            }
        }
    }
}

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Produces an image of exactly `spec.target`. Fails only if the codec
    /// does.
    pub fn resize(
        &self,
        codec: &dyn ImageCodec,
        source: &SourceImage,
        spec: ResizeSpec,
    ) -> Result<SourceImage, CodecError> {
        let source_size = DimensionSpec::new(source.height(), source.width())
            .ok_or_else(|| CodecError::Decode("source image has zero area".to_string()))?;

        let geometry = plan(source_size, &spec);
        log::debug!(
            "Resizing {} to {} ({:?}): {:?}",
            source_size,
            spec.target,
            spec.mode,
            geometry
        );

        let scaled = self.scale(codec, source, source_size, geometry.scaled())?;

        match geometry {
            Geometry::Fit { .. } => Ok(compositor::compose(spec.target, spec.background, &scaled)),
            Geometry::Fill { crop_x, crop_y, .. } => {
                if geometry.scaled() == spec.target {
                    return Ok(scaled);
                }
                codec.crop(
                    &scaled,
                    crop_x,
                    crop_y,
                    spec.target.height(),
                    spec.target.width(),
                )
            }
        }
    }

    fn scale(
        &self,
        codec: &dyn ImageCodec,
        source: &SourceImage,
        source_size: DimensionSpec,
        scaled: DimensionSpec,
    ) -> Result<SourceImage, CodecError> {
        if scaled == source_size {
            log::debug!("Image dimensions unchanged, skipping scale");
            return Ok(source.clone());
        }

        codec.scale(source, scaled.height(), scaled.width(), self.algorithm)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}
