// fitcrop/src/core/types.rs
use image::ImageFormat;
use std::fmt;

/// A validated target size, always `height x width` with both axes positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionSpec {
    height: u32,
    width: u32,
}

impl DimensionSpec {
    pub const DEFAULT_MIN_TARGET: Self = Self { height: 256, width: 256 };
    pub const DEFAULT_MAX_TARGET: Self = Self { height: 1024, width: 1024 };
    pub const DEFAULT_MAX_SOURCE: Self = Self { height: 2048, width: 2048 };

    /// Returns `None` when either axis is zero.
    pub fn new(height: u32, width: u32) -> Option<Self> {
        if height == 0 || width == 0 {
            return None;
        }
        Some(Self { height, width })
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

impl fmt::Display for DimensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Inclusive per-axis bounds a requested size must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    min: DimensionSpec,
    max: DimensionSpec,
}

impl SizeBounds {
    /// Returns `None` if `min` exceeds `max` on either axis.
    pub fn new(min: DimensionSpec, max: DimensionSpec) -> Option<Self> {
        if min.height > max.height || min.width > max.width {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn min(&self) -> DimensionSpec {
        self.min
    }

    pub fn max(&self) -> DimensionSpec {
        self.max
    }

    pub fn contains_height(&self, height: u32) -> bool {
        (self.min.height..=self.max.height).contains(&height)
    }

    pub fn contains_width(&self, width: u32) -> bool {
        (self.min.width..=self.max.width).contains(&width)
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min: DimensionSpec::DEFAULT_MIN_TARGET,
            max: DimensionSpec::DEFAULT_MAX_TARGET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Keep the whole source, pad the rest of the box with the background.
    #[default]
    Fit,
    /// Cover the whole box, cropping whatever overflows.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl BackgroundColor {
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.red, self.green, self.blue, 255])
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

/// Everything the resize engine needs to know about one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    pub target: DimensionSpec,
    pub mode: ResizeMode,
    pub background: BackgroundColor,
}

impl ResizeSpec {
    pub fn new(target: DimensionSpec, mode: ResizeMode) -> Self {
        Self {
            target,
            mode,
            background: BackgroundColor::default(),
        }
    }

    pub fn with_background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }
}

/// Header-level facts about an encoded image, read without a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub height: u32,
    pub width: u32,
    pub format: ImageFormat,
}

impl ImageInfo {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Encoded output of one request. Its dimensions always equal the target.
#[derive(Debug, Clone)]
pub struct ResizeResult {
    pub bytes: Vec<u8>,
    pub dimensions: DimensionSpec,
    pub format: ImageFormat,
}

impl ResizeResult {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}
