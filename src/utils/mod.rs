// fitcrop/src/utils/mod.rs
use crate::core::{DimensionSpec, OutputFormat};
use image::ImageFormat;
use std::path::{Path, PathBuf};

const SUPPORTED_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

/// Output file name for `input` once encoded as `format`: the input's own
/// name, with the extension swapped when the format is overridden.
pub fn output_file_name(input: &Path, format: OutputFormat) -> Option<String> {
    let stem = input.file_stem()?.to_str()?;
    let extension = output_extension(input, format)?;
    Some(format!("{}.{}", stem, extension))
}

/// `<stem>_<HxW>.<ext>` next to `input`, with a counter appended until the
/// name is free.
pub fn generate_output_path(input: &Path, size: DimensionSpec, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let extension = output_extension(input, format).unwrap_or_else(|| "jpg".to_string());

    let mut candidate = input.with_file_name(format!("{}_{}.{}", stem, size, extension));
    let mut counter = 1;
    while candidate.exists() {
        candidate = input.with_file_name(format!("{}_{}_{}.{}", stem, size, counter, extension));
        counter += 1;
    }
    candidate
}

fn output_extension(input: &Path, format: OutputFormat) -> Option<String> {
    let forced = match format {
        OutputFormat::Jpeg => Some(ImageFormat::Jpeg),
        OutputFormat::Png => Some(ImageFormat::Png),
        OutputFormat::WebP => Some(ImageFormat::WebP),
        OutputFormat::SameAsInput => None,
    };

    match forced {
        Some(format) => format.extensions_str().first().map(|ext| ext.to_string()),
        None => input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase()),
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn image_format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WebP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Bmp => "BMP",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn supported_formats_are_case_insensitive() {
        assert!(is_supported_format(Path::new("a/photo.JPG")));
        assert!(is_supported_format(Path::new("scan.tif")));
        assert!(!is_supported_format(Path::new("notes.txt")));
        assert!(!is_supported_format(Path::new("no_extension")));
    }

    #[test]
    fn output_name_follows_format_override() {
        let input = Path::new("in/photo.JPEG");
        assert_eq!(
            output_file_name(input, OutputFormat::SameAsInput).as_deref(),
            Some("photo.jpeg")
        );
        assert_eq!(
            output_file_name(input, OutputFormat::Png).as_deref(),
            Some("photo.png")
        );
    }

    #[test]
    fn generated_path_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cat.jpg");
        let size = DimensionSpec::new(256, 512).unwrap();

        let first = generate_output_path(&input, size, OutputFormat::SameAsInput);
        assert_eq!(first, dir.path().join("cat_256x512.jpg"));

        std::fs::write(&first, b"taken").unwrap();
        let second = generate_output_path(&input, size, OutputFormat::SameAsInput);
        assert_eq!(second, dir.path().join("cat_256x512_1.jpg"));
    }
}
