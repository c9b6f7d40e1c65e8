//! Generator configuration module.
//!
//! Contains the runtime configuration for synthimg: output location,
//! output format, synthesis parameters and worker threads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encode::OutputFormat;
use crate::generation::synth::{
    SynthParams, DEFAULT_EXTRA_GRADIENTS, DEFAULT_NOISE_INTENSITY, DEFAULT_TEXTURE_LAYERS,
};

/// Runtime configuration for the generator.
///
/// This configuration is typically loaded from environment variables at
/// startup and then overridden by command-line arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory generated images are written to.
    /// If None, uses the platform-specific default location.
    pub output_dir: Option<PathBuf>,

    /// Encoded output format.
    pub format: OutputFormat,

    /// Number of tiled texture layers per image.
    pub texture_layers: usize,

    /// Number of extra radial gradients on the base layer.
    pub extra_gradients: usize,

    /// Luminance scale of the soft-light noise layer (0.0-1.0).
    pub noise_intensity: f32,

    /// Number of rayon worker threads.
    /// If None, rayon picks (typically number of CPU cores).
    pub threads: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: OutputFormat::default(),
            texture_layers: DEFAULT_TEXTURE_LAYERS,
            extra_gradients: DEFAULT_EXTRA_GRADIENTS,
            noise_intensity: DEFAULT_NOISE_INTENSITY,
            threads: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new GeneratorConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a GeneratorConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SYNTHIMG_OUTPUT_DIR` - Directory for generated images
    /// - `SYNTHIMG_FORMAT` - Output format (jpeg, png, webp)
    /// - `SYNTHIMG_TEXTURE_LAYERS` - Texture layers per image (1-32)
    /// - `SYNTHIMG_NOISE_INTENSITY` - Noise layer intensity (0.0-1.0)
    /// - `SYNTHIMG_THREADS` - Number of worker threads
    ///
    /// Falls back to defaults for unset or invalid variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("SYNTHIMG_OUTPUT_DIR") {
            config.output_dir = Some(PathBuf::from(path));
        }

        if let Some(format) = lookup("SYNTHIMG_FORMAT").and_then(|s| OutputFormat::parse(&s)) {
            config.format = format;
        }

        if let Some(layers_str) = lookup("SYNTHIMG_TEXTURE_LAYERS") {
            if let Ok(layers) = layers_str.parse::<usize>() {
                if (1..=32).contains(&layers) {
                    config.texture_layers = layers;
                }
            }
        }

        if let Some(intensity_str) = lookup("SYNTHIMG_NOISE_INTENSITY") {
            if let Ok(intensity) = intensity_str.parse::<f32>() {
                if (0.0..=1.0).contains(&intensity) {
                    config.noise_intensity = intensity;
                }
            }
        }

        if let Some(threads_str) = lookup("SYNTHIMG_THREADS") {
            if let Ok(threads) = threads_str.parse::<u32>() {
                if threads > 0 {
                    config.threads = Some(threads);
                }
            }
        }

        config
    }

    /// Returns the effective output directory, using platform defaults if not specified.
    pub fn effective_output_dir(&self) -> PathBuf {
        if let Some(ref path) = self.output_dir {
            path.clone()
        } else {
            default_output_dir()
        }
    }

    /// Synthesis parameters taken from this configuration.
    pub fn synth_params(&self) -> SynthParams {
        SynthParams {
            texture_layers: self.texture_layers,
            extra_gradients: self.extra_gradients,
            noise_intensity: self.noise_intensity,
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.texture_layers > 32 {
            return Some(format!(
                "texture_layers too high: {} (max 32)",
                self.texture_layers
            ));
        }

        if !(0.0..=1.0).contains(&self.noise_intensity) {
            return Some(format!(
                "noise_intensity must be between 0.0 and 1.0, got {}",
                self.noise_intensity
            ));
        }

        if let Some(threads) = self.threads {
            if threads == 0 {
                return Some("threads must be > 0".to_string());
            }
            if threads > 256 {
                return Some(format!("threads too high: {} (max 256)", threads));
            }
        }

        None
    }
}

/// Returns the platform-specific default output path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/synthimg/images
/// - Linux: ~/.cache/synthimg/images
/// - Windows: C:\Users\<user>\AppData\Local\synthimg\cache\images
fn default_output_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "synthimg") {
        proj_dirs.cache_dir().join("images")
    } else {
        // Fallback to current directory
        PathBuf::from("./output")
    }
}
