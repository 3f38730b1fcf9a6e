pub mod cli;
pub mod core;
pub mod processors;
pub mod utils;
pub mod validation;

pub use cli::{Algorithm, Cli, Commands, Format};
pub use core::{
    validate_config, BackgroundColor, CodecError, DimensionSpec, ImageInfo, ImageProcessor,
    OutputFormat, ProcessingStats, ResizeAlgorithm, ResizeConfig, ResizeError, ResizeMode,
    ResizeResult, ResizeSpec, Result, SizeBounds,
};
pub use processors::{
    BatchProcessor, Compressor, Fetcher, ImageCodec, ImageCrateCodec, Loader, Resizer, SourceImage,
};
pub use utils::{format_file_size, generate_output_path, is_supported_format};
pub use validation::{RawParams, ValidationError, ValidationErrorKind, ValidationErrors, Validator};

pub mod prelude {
    pub use crate::{
        BatchProcessor, ImageProcessor, RawParams, ResizeAlgorithm, ResizeConfig, ResizeMode,
        Resizer,
    };
}
