// fitcrop/src/validation/mode.rs
use crate::core::{BackgroundColor, ResizeMode};

pub const CROPPING_VALUES: [&str; 2] = ["0", "1"];

const RGB_DELIMITER: char = ',';

/// Maps the raw cropping token onto a mode. A missing or empty token means
/// Fit; any other value than `"0"` or `"1"` is rejected with `None`.
pub fn parse_cropping(token: Option<&str>) -> Option<ResizeMode> {
    match token {
        None | Some("") | Some("0") => Some(ResizeMode::Fit),
        Some("1") => Some(ResizeMode::Fill),
        Some(_) => None,
    }
}

/// Parses `"R,G,B"` with each channel a plain digit run in `0..=255`.
/// A missing or empty value yields white.
pub fn parse_background(value: Option<&str>) -> Option<BackgroundColor> {
    let value = match value {
        None | Some("") => return Some(BackgroundColor::default()),
        Some(value) => value,
    };

    let channels: Vec<u8> = value
        .split(RGB_DELIMITER)
        .map(parse_channel)
        .collect::<Option<_>>()?;

    match channels.as_slice() {
        [red, green, blue] => Some(BackgroundColor::new(*red, *green, *blue)),
        _ => None,
    }
}

fn parse_channel(part: &str) -> Option<u8> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
