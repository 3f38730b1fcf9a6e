// fitcrop/src/processors/compositor.rs
use super::codec::SourceImage;
use crate::core::{BackgroundColor, DimensionSpec};
use image::{imageops, ColorType, DynamicImage, RgbaImage};

/// Offset that centres `foreground` along an axis of length `canvas`:
/// `round(canvas/2 - foreground/2)`, halves rounded away from zero.
pub fn centre_offset(canvas: u32, foreground: u32) -> i64 {
    let slack = i64::from(canvas) - i64::from(foreground);
    (slack + slack.signum()) / 2
}

/// Places `foreground` in the middle of a `canvas_size` canvas filled with
/// `background`. Pixels are overwritten, not blended. The canvas takes the
/// foreground's colour type and format, and is always exactly `canvas_size`.
pub fn compose(
    canvas_size: DimensionSpec,
    background: BackgroundColor,
    foreground: &SourceImage,
) -> SourceImage {
    let x = centre_offset(canvas_size.width(), foreground.width());
    let y = centre_offset(canvas_size.height(), foreground.height());

    log::debug!(
        "Compositing {}x{} onto {} canvas at ({}, {}), background {}",
        foreground.height(),
        foreground.width(),
        canvas_size,
        x,
        y,
        background
    );

    let mut canvas = blank_canvas(canvas_size, background, foreground.color());
    paste(&mut canvas, foreground.pixels(), x, y);
    foreground.with_pixels(canvas)
}

fn blank_canvas(
    size: DimensionSpec,
    background: BackgroundColor,
    color: ColorType,
) -> DynamicImage {
    let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        size.width(),
        size.height(),
        background.to_rgba(),
    ));

    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(rgba.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(rgba.to_luma_alpha8()),
        ColorType::Rgba8 => rgba,
        ColorType::L16 => DynamicImage::ImageLuma16(rgba.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(rgba.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(rgba.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(rgba.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(rgba.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(rgba.to_rgba32f()),
        _ => DynamicImage::ImageRgb8(rgba.to_rgb8()),
    }
}

fn paste(canvas: &mut DynamicImage, foreground: &DynamicImage, x: i64, y: i64) {
    match (canvas, foreground) {
        (DynamicImage::ImageLuma8(c), DynamicImage::ImageLuma8(f)) => imageops::replace(c, f, x, y),
        (DynamicImage::ImageLumaA8(c), DynamicImage::ImageLumaA8(f)) => {
            imageops::replace(c, f, x, y)
        }
        (DynamicImage::ImageRgb8(c), DynamicImage::ImageRgb8(f)) => imageops::replace(c, f, x, y),
        (DynamicImage::ImageRgba8(c), DynamicImage::ImageRgba8(f)) => imageops::replace(c, f, x, y),
        (DynamicImage::ImageLuma16(c), DynamicImage::ImageLuma16(f)) => {
            imageops::replace(c, f, x, y)
        }
        (DynamicImage::ImageRgb16(c), DynamicImage::ImageRgb16(f)) => imageops::replace(c, f, x, y),
        (DynamicImage::ImageLumaA16(c), DynamicImage::ImageLumaA16(f)) => {
            imageops::replace(c, f, x, y)
        }
        (DynamicImage::ImageRgba16(c), DynamicImage::ImageRgba16(f)) => {
            imageops::replace(c, f, x, y)
        }
        (DynamicImage::ImageRgb32F(c), DynamicImage::ImageRgb32F(f)) => {
            imageops::replace(c, f, x, y)
        }
        (DynamicImage::ImageRgba32F(c), DynamicImage::ImageRgba32F(f)) => {
            imageops::replace(c, f, x, y)
        }
        // Remaining layouts go through the 8-bit RGBA view.
        (canvas, foreground) => imageops::replace(canvas, foreground, x, y),
    }
}
