// fitcrop/src/core/processor.rs
use super::{ImageInfo, ProcessingStats, ResizeConfig, ResizeError, ResizeResult, Result};
use crate::processors::{Fetcher, ImageCodec, ImageCrateCodec, Loader, Resizer};
use crate::validation::{RawParams, ValidatedRequest, ValidationErrors, Validator};
use std::path::Path;

/// Runs one request end to end: validate, fetch, decode, resize, encode.
///
/// Holds no per-request state, so a single processor can serve many
/// requests from many threads at once.
pub struct ImageProcessor {
    config: ResizeConfig,
    fetcher: Box<dyn Fetcher>,
    codec: Box<dyn ImageCodec>,
    validator: Validator,
    resizer: Resizer,
}

impl ImageProcessor {
    pub fn new(config: ResizeConfig) -> Self {
        let fetcher = Loader::new().with_max_file_size(config.max_file_size);
        let codec = ImageCrateCodec::new(config.quality);
        let validator = Validator::from_config(&config);
        let resizer = Resizer::new(config.algorithm);

        Self {
            config,
            fetcher: Box::new(fetcher),
            codec: Box::new(codec),
            validator,
            resizer,
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_codec(mut self, codec: impl ImageCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    pub fn validate(
        &self,
        params: &RawParams,
    ) -> std::result::Result<ValidatedRequest, ValidationErrors> {
        self.validator
            .validate(params, self.fetcher.as_ref(), self.codec.as_ref())
    }

    pub fn process(&self, params: &RawParams) -> Result<ResizeResult> {
        let request = self.validate(params)?;
        self.execute(request)
    }

    /// Resizes an already validated request.
    pub fn execute(&self, request: ValidatedRequest) -> Result<ResizeResult> {
        let source = self.codec.decode(&request.source)?;
        let resized = self.resizer.resize(self.codec.as_ref(), &source, request.spec)?;

        let target = request.spec.target;
        if resized.height() != target.height() || resized.width() != target.width() {
            return Err(ResizeError::ProcessingError(format!(
                "Resized image is {}x{}, expected {}",
                resized.height(),
                resized.width(),
                target
            )));
        }

        let format = self.config.output_format.resolve(source.format());
        let bytes = self.codec.encode(&resized, format)?;

        log::info!(
            "Resized {}x{} {:?} to {} {:?} ({:?} mode, {} bytes)",
            request.info.height,
            request.info.width,
            request.info.format,
            target,
            format,
            request.spec.mode,
            bytes.len()
        );

        Ok(ResizeResult {
            bytes,
            dimensions: target,
            format,
        })
    }

    /// Processes `params` and writes the encoded image to `output_path`,
    /// creating parent directories as needed.
    pub fn process_to_file<P: AsRef<Path>>(
        &self,
        params: &RawParams,
        output_path: P,
    ) -> Result<ProcessingStats> {
        let output_path = output_path.as_ref();

        let request = self.validate(params)?;
        let size_before = request.source.len() as u64;
        let result = self.execute(request)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, &result.bytes)?;

        log::info!(
            "Saved image: {} ({} bytes)",
            output_path.display(),
            result.bytes.len()
        );

        Ok(ProcessingStats {
            processed_count: 1,
            total_size_before: size_before,
            total_size_after: result.bytes.len() as u64,
            errors: Vec::new(),
        })
    }

    /// Fetches and probes a source without resizing it.
    pub fn inspect(&self, location: &str) -> Result<(ImageInfo, u64)> {
        let bytes = self.fetcher.fetch(location)?;
        let info = self.codec.probe(&bytes)?;
        Ok((info, bytes.len() as u64))
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ResizeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImageInfo, OutputFormat, ResizeMode, SizeBounds};
    use crate::processors::codec::tests::{RecordedOp, RecordingCodec};
    use crate::processors::MemoryFetcher;
    use crate::validation::ValidationErrorKind;
    use image::ImageFormat;

    const SOURCE: &str = "memory://source.jpg";

    fn processor(height: u32, width: u32) -> ImageProcessor {
        ImageProcessor::default()
            .with_fetcher(MemoryFetcher::new().with(SOURCE, vec![0xFF, 0xD8]))
            .with_codec(RecordingCodec::new(ImageInfo {
                height,
                width,
                format: ImageFormat::Jpeg,
            }))
    }

    fn params(size: &str, cropping: &str) -> RawParams {
        RawParams::from_pairs([("url", SOURCE), ("size", size), ("cropping", cropping)])
    }

    #[test]
    fn process_returns_target_geometry() {
        let result = processor(1600, 1200).process(&params("256x256", "0")).unwrap();
        assert_eq!(result.dimensions.to_string(), "256x256");
        assert_eq!(result.format, ImageFormat::Jpeg);
        assert_eq!(result.mime_type(), "image/jpeg");
        // The recording codec encodes raw RGB8 samples.
        assert_eq!(result.bytes.len(), 256 * 256 * 3);
    }

    #[test]
    fn fill_request_runs_scale_and_crop() {
        let processor = ImageProcessor::default()
            .with_fetcher(MemoryFetcher::new().with(SOURCE, vec![1]));
        let codec = RecordingCodec::new(ImageInfo {
            height: 2000,
            width: 1500,
            format: ImageFormat::Jpeg,
        });
        let request = processor
            .validator
            .validate(&params("512x1024", "1"), processor.fetcher.as_ref(), &codec)
            .unwrap();
        assert_eq!(request.spec.mode, ResizeMode::Fill);

        let source = codec.decode(&request.source).unwrap();
        processor.resizer.resize(&codec, &source, request.spec).unwrap();

        let ops = codec.get_operations();
        assert!(matches!(ops.last(), Some(RecordedOp::Crop { height: 512, width: 1024, .. })));
    }

    #[test]
    fn validation_failure_stops_before_decode() {
        let err = processor(100, 100)
            .process(&params("256,256", "0"))
            .unwrap_err();

        match err {
            ResizeError::Validation(errors) => {
                assert_eq!(errors.first().field, "size");
                assert_eq!(errors.first().kind, ValidationErrorKind::Format);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn output_format_override_is_applied() {
        let config = ResizeConfig {
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let processor = ImageProcessor::new(config)
            .with_fetcher(MemoryFetcher::new().with(SOURCE, vec![1]))
            .with_codec(RecordingCodec::new(ImageInfo {
                height: 300,
                width: 300,
                format: ImageFormat::Jpeg,
            }));

        let result = processor.process(&params("256x256", "1")).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let png_source = ImageInfo {
            height: 300,
            width: 300,
            format: ImageFormat::Png,
        };
        let strict = processor(0, 0).with_codec(RecordingCodec::new(png_source));
        let err = strict.process(&params("256x256", "0")).unwrap_err();
        assert!(matches!(err, ResizeError::Validation(_)));

        let relaxed = strict.with_validator(Validator::new(SizeBounds::default(), Vec::new()));
        let result = relaxed.process(&params("256x256", "0")).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
    }

    #[test]
    fn inspect_reports_probe_and_size() {
        let (info, bytes) = processor(40, 30).inspect(SOURCE).unwrap();
        assert_eq!((info.height, info.width), (40, 30));
        assert_eq!(bytes, 2);
    }
}
