// fitcrop/src/cli.rs
use crate::core::{DimensionSpec, OutputFormat, ResizeAlgorithm, ResizeConfig, SizeBounds};
use crate::validation::RawParams;
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::ImageFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitcrop")]
#[command(about = "Resize images into a fixed box, padding or cropping to fit", long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resize a single image
    Resize {
        /// Source image, a path or file:// location
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        request: RequestArgs,

        /// Output file (default: <stem>_<HxW>.<ext> next to the source)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Resize every image in a directory
    Batch {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        request: RequestArgs,

        /// Number of threads (0 = all cores)
        #[arg(short = 'j', long, default_value_t = 0)]
        threads: usize,

        /// Walk subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show image information
    Info {
        /// Image file
        input: PathBuf,
    },
}

/// The per-request parameters, passed through unparsed so the validator
/// sees them exactly as given.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Target size as HEIGHTxWIDTH, e.g. 512x1024
    #[arg(short, long)]
    pub size: Option<String>,

    /// 0 pads the image into the box, 1 crops it to fill the box
    #[arg(short, long)]
    pub cropping: Option<String>,

    /// Padding colour as R,G,B
    #[arg(short, long)]
    pub background: Option<String>,
}

impl RequestArgs {
    pub fn to_params(&self, url: Option<String>) -> RawParams {
        RawParams {
            url,
            size: self.size.clone(),
            cropping: self.cropping.clone(),
            background: self.background.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Smallest accepted target size
    #[arg(long, value_parser = parse_size_flag, default_value = "256x256")]
    pub min_size: DimensionSpec,

    /// Largest accepted target size
    #[arg(long, value_parser = parse_size_flag, default_value = "1024x1024")]
    pub max_size: DimensionSpec,

    /// Largest accepted source image
    #[arg(long, value_parser = parse_size_flag, default_value = "2048x2048")]
    pub max_source: DimensionSpec,

    /// Accepted source type, by extension (repeatable, default: jpeg)
    #[arg(long = "allow-type", value_parser = parse_format_flag)]
    pub allow_types: Vec<ImageFormat>,

    /// Resampling filter
    #[arg(short, long, value_enum, default_value_t = Algorithm::Nearest)]
    pub algorithm: Algorithm,

    /// Encoder quality (1-100)
    #[arg(short, long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Same)]
    pub format: Format,

    /// Refuse source files larger than this many bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,
}

impl ConfigArgs {
    pub fn into_config(self) -> crate::Result<ResizeConfig> {
        let bounds = SizeBounds::new(self.min_size, self.max_size).ok_or_else(|| {
            crate::ResizeError::InvalidParameter(format!(
                "--min-size {} exceeds --max-size {}",
                self.min_size, self.max_size
            ))
        })?;

        let defaults = ResizeConfig::default();
        let allowed_formats = if self.allow_types.is_empty() {
            defaults.allowed_formats
        } else {
            self.allow_types
        };

        let config = ResizeConfig {
            bounds,
            max_source: self.max_source,
            allowed_formats,
            algorithm: self.algorithm.into(),
            quality: self.quality,
            output_format: self.format.into(),
            max_file_size: self.max_file_size,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_size_flag(value: &str) -> Result<DimensionSpec, String> {
    let (height, width) = value
        .split_once('x')
        .ok_or_else(|| format!("expected HEIGHTxWIDTH, got {value}"))?;
    let height = height.parse::<u32>().map_err(|e| e.to_string())?;
    let width = width.parse::<u32>().map_err(|e| e.to_string())?;
    DimensionSpec::new(height, width).ok_or_else(|| "dimensions must be positive".to_string())
}

fn parse_format_flag(value: &str) -> Result<ImageFormat, String> {
    ImageFormat::from_extension(value).ok_or_else(|| format!("unknown image type: {value}"))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(alg: Algorithm) -> Self {
        match alg {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Jpeg,
    Png,
    Webp,
    /// Keep the source's format
    Same,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Png => OutputFormat::Png,
            Format::Webp => OutputFormat::WebP,
            Format::Same => OutputFormat::SameAsInput,
        }
    }
}
