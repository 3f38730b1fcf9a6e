use crate::core::processor::ImageProcessor;
use crate::core::{ProcessingStats, ResizeConfig, ResizeError, Result};
use crate::utils::{is_supported_format, output_file_name};
use crate::validation::RawParams;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Applies one resize request to every image in a directory, one worker per
/// image.
pub struct BatchProcessor {
    processor: ImageProcessor,
    thread_pool: Option<rayon::ThreadPool>,
}

impl BatchProcessor {
    pub fn new(config: ResizeConfig, max_threads: usize) -> Result<Self> {
        Self::with_processor(ImageProcessor::new(config), max_threads)
    }

    /// `max_threads == 0` uses rayon's global pool.
    pub fn with_processor(processor: ImageProcessor, max_threads: usize) -> Result<Self> {
        let thread_pool = if max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build()
                .map_err(|e| {
                    ResizeError::ProcessingError(format!("Failed to create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            processor,
            thread_pool,
        })
    }

    /// Resizes every supported image under `input_dir` into `output_dir`.
    /// `template` supplies `size`, `cropping` and `background`; its `url` is
    /// replaced by each file's path. Per-file failures are collected in the
    /// returned stats rather than aborting the batch.
    ///
    /// Outputs mirror the input layout below `output_dir`. Two inputs that
    /// map to the same output (e.g. `a.jpg` and `a.png` under a forced
    /// format) are reported as errors instead of overwriting each other.
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        recursive: bool,
        template: &RawParams,
    ) -> Result<ProcessingStats> {
        self.validate_paths(input_dir, output_dir)?;

        let image_paths = self.collect_image_paths(input_dir, recursive);

        if image_paths.is_empty() {
            log::warn!("No image files found in {}", input_dir.display());
            return Ok(ProcessingStats::default());
        }

        log::info!(
            "Processing {} images from {}",
            image_paths.len(),
            input_dir.display()
        );

        std::fs::create_dir_all(output_dir)?;

        let (jobs, rejected) = self.plan_outputs(input_dir, output_dir, image_paths);
        let pb = self.create_progress_bar(jobs.len());

        let process_all = || -> Vec<ProcessingStats> {
            jobs.par_iter()
                .progress_with(pb.clone())
                .map(|(input_path, output_path)| {
                    self.process_one(input_path, output_path, template)
                })
                .collect()
        };

        let results = match &self.thread_pool {
            Some(pool) => pool.install(process_all),
            None => process_all(),
        };

        let mut stats = rejected;
        for result in results {
            stats.merge(result);
        }

        pb.finish_with_message(format!(
            "Processed {} images ({:.1}% size reduction)",
            stats.processed_count,
            stats.savings_percent()
        ));

        Ok(stats)
    }

    /// Pairs every input with its output path. Inputs whose output name is
    /// unusable or already claimed by an earlier input are returned as
    /// failures.
    fn plan_outputs(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        image_paths: Vec<PathBuf>,
    ) -> (Vec<(PathBuf, PathBuf)>, ProcessingStats) {
        let format = self.processor.config().output_format;
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut jobs = Vec::with_capacity(image_paths.len());
        let mut rejected = ProcessingStats::default();

        for input_path in image_paths {
            let source = input_path.display().to_string();

            let output_path = input_path
                .strip_prefix(input_dir)
                .ok()
                .zip(output_file_name(&input_path, format))
                .map(|(relative, file_name)| {
                    output_dir.join(relative).with_file_name(file_name)
                });

            let message = match output_path {
                None => format!("Invalid file name: {}", source),
                Some(output_path) => match claimed.get(&output_path) {
                    Some(owner) => format!(
                        "Output {} is already produced from {}",
                        output_path.display(),
                        owner.display()
                    ),
                    None => {
                        claimed.insert(output_path.clone(), input_path.clone());
                        jobs.push((input_path, output_path));
                        continue;
                    }
                },
            };

            log::warn!("Skipping {}: {}", source, message);
            rejected.errors.push((source, message));
        }

        (jobs, rejected)
    }

    fn process_one(
        &self,
        input_path: &Path,
        output_path: &Path,
        template: &RawParams,
    ) -> ProcessingStats {
        let source = input_path.display().to_string();
        let params = RawParams {
            url: Some(source.clone()),
            ..template.clone()
        };

        match self.processor.process_to_file(&params, output_path) {
            Ok(stats) => stats,
            Err(e) => {
                let message = match &e {
                    ResizeError::Validation(errors) => errors.first().message.clone(),
                    other => other.to_string(),
                };
                log::warn!("Skipping {}: {}", source, message);
                ProcessingStats {
                    errors: vec![(source, message)],
                    ..Default::default()
                }
            }
        }
    }

    fn collect_image_paths(&self, input_dir: &Path, recursive: bool) -> Vec<PathBuf> {
        let walker = if recursive {
            WalkDir::new(input_dir)
        } else {
            WalkDir::new(input_dir).max_depth(1)
        };

        let mut paths: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        paths.sort();
        paths
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    pub fn validate_paths(&self, input_dir: &Path, output_dir: &Path) -> Result<()> {
        if !input_dir.is_dir() {
            return Err(ResizeError::InvalidParameter(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ResizeError::InvalidParameter(format!(
                "Output path exists but is not a directory: {}",
                output_dir.display()
            )));
        }

        if input_dir == output_dir {
            return Err(ResizeError::InvalidParameter(
                "Input and output directories cannot be the same".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OutputFormat;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save_with_format(path, ImageFormat::Jpeg)
            .unwrap();
    }

    fn template(size: &str) -> RawParams {
        RawParams::from_pairs([("size", size), ("cropping", "1")])
    }

    #[test]
    fn processes_every_image_and_collects_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_jpeg(&input.path().join("a.jpg"), 400, 300);
        write_jpeg(&input.path().join("b.jpg"), 300, 500);
        write_jpeg(&input.path().join("huge.jpg"), 2100, 10);
        std::fs::write(input.path().join("notes.txt"), "ignored").unwrap();

        let batch = BatchProcessor::new(ResizeConfig::default(), 2).unwrap();
        let stats = batch
            .process_directory(input.path(), output.path(), false, &template("256x256"))
            .unwrap();

        assert_eq!(stats.processed_count, 2);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].0.ends_with("huge.jpg"));
        assert!(stats.errors[0].1.starts_with("url - "));

        let out = image::open(output.path().join("a.jpg")).unwrap();
        assert_eq!((out.width(), out.height()), (256, 256));
        assert!(!output.path().join("huge.jpg").exists());
    }

    #[test]
    fn recursive_batch_keeps_subdirectories_apart() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for dir in ["a", "b"] {
            std::fs::create_dir(input.path().join(dir)).unwrap();
            write_jpeg(&input.path().join(dir).join("x.jpg"), 300, 300);
        }

        let batch = BatchProcessor::new(ResizeConfig::default(), 2).unwrap();
        let stats = batch
            .process_directory(input.path(), output.path(), true, &template("256x256"))
            .unwrap();

        assert_eq!(stats.processed_count, 2);
        assert!(stats.errors.is_empty());
        assert!(output.path().join("a/x.jpg").is_file());
        assert!(output.path().join("b/x.jpg").is_file());
        assert!(!output.path().join("x.jpg").exists());
    }

    #[test]
    fn clashing_output_names_are_reported() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_jpeg(&input.path().join("a.jpg"), 300, 300);
        DynamicImage::ImageRgb8(RgbImage::new(300, 300))
            .save_with_format(input.path().join("a.png"), ImageFormat::Png)
            .unwrap();

        let config = ResizeConfig {
            allowed_formats: vec![ImageFormat::Jpeg, ImageFormat::Png],
            output_format: OutputFormat::Png,
            ..Default::default()
        };
        let batch = BatchProcessor::new(config, 2).unwrap();
        let stats = batch
            .process_directory(input.path(), output.path(), false, &template("256x256"))
            .unwrap();

        assert_eq!(stats.processed_count, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].0.ends_with("a.png"));
        assert!(stats.errors[0].1.contains("already produced from"));
        assert!(output.path().join("a.png").is_file());
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let batch = BatchProcessor::new(ResizeConfig::default(), 0).unwrap();
        let stats = batch
            .process_directory(input.path(), output.path(), true, &template("256x256"))
            .unwrap();
        assert_eq!(stats.processed_count, 0);
    }

    #[test]
    fn same_input_and_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchProcessor::new(ResizeConfig::default(), 0).unwrap();
        assert!(batch.validate_paths(dir.path(), dir.path()).is_err());
        assert!(batch
            .validate_paths(&dir.path().join("missing"), dir.path())
            .is_err());
    }
}
