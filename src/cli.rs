//! CLI argument parser.
//!
//! Maps command-line flags onto a [`GenerationRequest`] and overrides for
//! the environment-derived [`GeneratorConfig`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::GeneratorConfig;
use crate::encode::OutputFormat;
use crate::types::{
    GenerationRequest, DEFAULT_HEIGHT, DEFAULT_MAX_SIZE_KB, DEFAULT_MIN_SIZE_KB, DEFAULT_QUALITY,
    DEFAULT_WIDTH,
};

/// Output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Lossy JPEG; size tracks encoder quality
    Jpeg,
    /// Lossless PNG
    Png,
    /// Lossless WebP
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::WebP,
        }
    }
}

/// synthimg: synthetic images that land inside a target file-size range
#[derive(Parser, Debug)]
#[command(name = "synthimg")]
#[command(about = "Generate synthetic images whose encoded size lands in a KB range")]
#[command(version)]
pub struct Cli {
    /// Image width in pixels (>= 100)
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Image height in pixels (>= 100)
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Minimum encoded size in KB
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE_KB)]
    pub min_kb: u32,

    /// Maximum encoded size in KB
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE_KB)]
    pub max_kb: u32,

    /// Encoder quality hint (1-100)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    pub quality: u32,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of images to generate
    #[arg(short = 'n', long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub count: u32,

    /// Output format (defaults to SYNTHIMG_FORMAT or jpeg)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file path (single image only, not valid with --count > 1)
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory to write images into, named by content id
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Number of texture layers per image
    #[arg(long)]
    pub layers: Option<usize>,

    /// Worker threads for batch generation
    #[arg(short = 'j', long)]
    pub threads: Option<u32>,

    /// Print a JSON summary per image to stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The generation request described by the flags.
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            width: self.width,
            height: self.height,
            min_size_kb: self.min_kb,
            max_size_kb: self.max_kb,
            quality: self.quality,
            seed: self.seed,
        }
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply_to(&self, config: &mut GeneratorConfig) {
        if let Some(format) = self.format {
            config.format = format.into();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(layers) = self.layers {
            config.texture_layers = layers;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
    }

    /// Returns true if a single image goes to an explicit file path.
    pub fn writes_single_file(&self) -> bool {
        self.output.is_some() && self.count == 1
    }
}
