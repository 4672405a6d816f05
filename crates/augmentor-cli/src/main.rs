// =============================================================================
// augmentor — generate augmented training images from a directory of sources
// =============================================================================
//
// Usage:
//   augmentor --input photos/ --output results/ --count 100 --config pipeline.json
//   augmentor -i photos/ -o results/ -n 10 -c pipeline.json --seed 42 -v
//
// The pipeline description is JSON (see `augmentor::PipelineConfig`):
//
//   { "seed": 42, "steps": [ { "op": "rotate", "min_degree": -15, "max_degree": 15 } ] }

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use augmentor::{Augmentor, FileCodec, ImageFolder, PipelineConfig, SamplerConfig};

/// Generate randomized augmentations of a folder of images.
#[derive(Parser, Debug)]
#[command(name = "augmentor")]
#[command(version)]
#[command(about = "Randomized image augmentation for synthetic training data", long_about = None)]
struct Cli {
    /// Directory holding the source images
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the augmented images are written to
    #[arg(short, long)]
    output: PathBuf,

    /// Number of augmented images to produce
    #[arg(short = 'n', long, default_value = "10")]
    count: usize,

    /// JSON pipeline description
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for source selection and, when the config has none, the pipeline (0 = time)
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output encoder quality (0-100)
    #[arg(short, long, default_value = "95")]
    quality: u8,

    /// Output file name prefix
    #[arg(long, default_value = "output_")]
    prefix: String,

    /// Output file extension (selects the encoder)
    #[arg(long, default_value = "jpg")]
    extension: String,

    /// Source extensions to accept
    #[arg(long, value_delimiter = ',', default_value = "jpg,jpeg")]
    accept: Vec<String>,

    /// Scan the input directory recursively
    #[arg(long, default_value = "false")]
    recursive: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut pipeline_config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("reading pipeline config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if pipeline_config.seed == 0 {
        pipeline_config.seed = cli.seed;
    }
    let pipeline = pipeline_config
        .build()
        .context("building the augmentation pipeline")?;
    if pipeline.is_empty() {
        warn!("pipeline has no steps; sources will only be re-encoded");
    }

    let candidates = ImageFolder::new(&cli.input)
        .extensions(&cli.accept)
        .recursive(cli.recursive)
        .build()
        .with_context(|| format!("scanning {}", cli.input.display()))?;

    let config = SamplerConfig::default()
        .output_dir(&cli.output)
        .prefix(cli.prefix)
        .extension(cli.extension)
        .quality(cli.quality)
        .seed(cli.seed);

    info!(
        candidates = candidates.len(),
        steps = pipeline.len(),
        count = cli.count,
        "starting"
    );
    let mut augmentor = Augmentor::new(candidates, pipeline, FileCodec, config);
    let records = augmentor.sample(cli.count).context("sampling failed")?;

    for rec in &records {
        info!(
            "{} <- {}",
            rec.output.display(),
            rec.source.display()
        );
    }
    Ok(())
}
