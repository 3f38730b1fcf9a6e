// fitcrop/src/validation/size.rs
use crate::core::{DimensionSpec, SizeBounds};
use thiserror::Error;

const SEPARATOR: char = 'x';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Height,
    Width,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Height => "height",
            Axis::Width => "width",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("must be in the format 512x512 (height x width)")]
    Format,

    #[error("{} must be between {min} and {max}, got {value}", .axis.name())]
    Range {
        axis: Axis,
        value: u64,
        min: u32,
        max: u32,
    },
}

/// Parses `"<height>x<width>"` and checks each axis against `bounds`.
///
/// Both parts must be plain ASCII digit runs: no sign, no whitespace.
/// Height is checked before width. A literal too large for `u32` is
/// reported as out of range rather than malformed.
pub fn parse_dimensions(input: &str, bounds: &SizeBounds) -> Result<DimensionSpec, SizeError> {
    let (height, width) = split_parts(input)?;

    check_axis(Axis::Height, height, bounds.min().height(), bounds.max().height())?;
    check_axis(Axis::Width, width, bounds.min().width(), bounds.max().width())?;

    // Both axes are >= min >= 1 at this point.
    DimensionSpec::new(height as u32, width as u32).ok_or(SizeError::Format)
}

fn split_parts(input: &str) -> Result<(u64, u64), SizeError> {
    let parts: Vec<&str> = input.split(SEPARATOR).collect();
    let [height, width] = parts.as_slice() else {
        return Err(SizeError::Format);
    };

    Ok((parse_literal(height)?, parse_literal(width)?))
}

fn parse_literal(part: &str) -> Result<u64, SizeError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SizeError::Format);
    }

    // All digits; the only possible failure left is overflow.
    Ok(part.parse::<u64>().unwrap_or(u64::MAX))
}

fn check_axis(axis: Axis, value: u64, min: u32, max: u32) -> Result<(), SizeError> {
    if value < u64::from(min) || value > u64::from(max) {
        return Err(SizeError::Range {
            axis,
            value,
            min,
            max,
        });
    }
    Ok(())
}
