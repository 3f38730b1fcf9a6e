use anyhow::Context;
use clap::Parser;
use fitcrop::cli::{Cli, Commands, ConfigArgs, RequestArgs};
use fitcrop::utils::{format_file_size, generate_output_path, image_format_to_string};
use fitcrop::{BatchProcessor, ImageProcessor, Loader};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Resize {
            url,
            request,
            output,
            config,
        } => process_resize(url, request, output, config),
        Commands::Batch {
            input,
            output,
            request,
            threads,
            recursive,
            config,
        } => process_batch(&input, &output, request, threads, recursive, config),
        Commands::Info { input } => process_info(&input),
    }
}

fn process_resize(
    url: Option<String>,
    request: RequestArgs,
    output: Option<PathBuf>,
    config: ConfigArgs,
) -> anyhow::Result<ExitCode> {
    let config = config.into_config()?;
    let output_format = config.output_format;
    let processor = ImageProcessor::new(config);

    let params = request.to_params(url);
    let validated = match processor.validate(&params) {
        Ok(validated) => validated,
        Err(errors) => {
            println!("{}", errors.to_json()?);
            return Ok(ExitCode::FAILURE);
        }
    };

    let output_path = match output {
        Some(path) => path,
        None => {
            let location = params.url.as_deref().unwrap_or_default();
            let source = Loader::new().resolve(location)?;
            generate_output_path(source, validated.spec.target, output_format)
        }
    };

    let result = processor.execute(validated)?;
    std::fs::write(&output_path, &result.bytes)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "Resized image ({}, {}) saved to: {}",
        result.dimensions,
        result.mime_type(),
        output_path.display()
    );

    Ok(ExitCode::SUCCESS)
}

fn process_batch(
    input: &Path,
    output: &Path,
    request: RequestArgs,
    threads: usize,
    recursive: bool,
    config: ConfigArgs,
) -> anyhow::Result<ExitCode> {
    let processor = BatchProcessor::new(config.into_config()?, threads)?;
    let stats = processor.process_directory(input, output, recursive, &request.to_params(None))?;

    println!(
        "Batch processing complete. Processed {} images to: {} ({} -> {})",
        stats.processed_count,
        output.display(),
        format_file_size(stats.total_size_before),
        format_file_size(stats.total_size_after)
    );

    if stats.errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("{} images failed:", stats.errors.len());
    for (source, message) in &stats.errors {
        eprintln!("  {}: {}", source, message);
    }
    Ok(ExitCode::FAILURE)
}

fn process_info(input: &Path) -> anyhow::Result<ExitCode> {
    let location = input.to_string_lossy();
    let (info, file_size) = ImageProcessor::default()
        .inspect(&location)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(file_size));
    println!("Dimensions: {} x {} pixels (height x width)", info.height, info.width);
    println!("Format: {}", image_format_to_string(info.format));
    println!("MIME type: {}", info.mime_type());

    Ok(ExitCode::SUCCESS)
}
