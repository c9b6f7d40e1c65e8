//! GenerationRequest type and its validation.
//!
//! A request is immutable once built. It is validated before any synthesis
//! work begins, and the target size is drawn from it exactly once per run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Default lower bound of the size range in KB.
pub const DEFAULT_MIN_SIZE_KB: u32 = 50;

/// Default upper bound of the size range in KB.
pub const DEFAULT_MAX_SIZE_KB: u32 = 200;

/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 1200;

/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 900;

/// Default encoder quality hint.
pub const DEFAULT_QUALITY: u32 = 90;

/// Smallest accepted width or height.
pub const MIN_DIMENSION: u32 = 100;

/// Largest width or height a request or a tier 2 upscale may use.
pub const MAX_DIMENSION: u32 = 16_384;

/// A request for one synthetic image landing inside a size range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Requested width in pixels (>= 100).
    pub width: u32,

    /// Requested height in pixels (>= 100).
    pub height: u32,

    /// Lower bound of the accepted encoded size in KB (>= 1).
    pub min_size_kb: u32,

    /// Upper bound of the accepted encoded size in KB (>= min_size_kb).
    pub max_size_kb: u32,

    /// Encoder quality hint (1-100).
    pub quality: u32,

    /// Random seed. If None, a random seed is drawn per run.
    pub seed: Option<u64>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_size_kb: DEFAULT_MIN_SIZE_KB,
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            quality: DEFAULT_QUALITY,
            seed: None,
        }
    }
}

impl GenerationRequest {
    /// Creates a request for the given dimensions with default size range and quality.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Sets the accepted size range in KB.
    pub fn with_size_range(mut self, min_size_kb: u32, max_size_kb: u32) -> Self {
        self.min_size_kb = min_size_kb;
        self.max_size_kb = max_size_kb;
        self
    }

    /// Sets the encoder quality hint.
    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Fixes the random seed for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates request parameters.
    ///
    /// Pure: has no side effects and always returns the same outcome
    /// for the same request.
    pub fn validate(&self) -> Result<()> {
        if self.min_size_kb < 1 {
            return Err(GenerationError::invalid_parameter(format!(
                "min_size_kb must be at least 1, got {}",
                self.min_size_kb
            )));
        }

        if self.max_size_kb < self.min_size_kb {
            return Err(GenerationError::invalid_parameter(format!(
                "max_size_kb ({}) is smaller than min_size_kb ({})",
                self.max_size_kb, self.min_size_kb
            )));
        }

        if self.width < MIN_DIMENSION || self.height < MIN_DIMENSION {
            return Err(GenerationError::invalid_parameter(format!(
                "dimensions must be at least {}x{}, got {}x{}",
                MIN_DIMENSION, MIN_DIMENSION, self.width, self.height
            )));
        }

        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(GenerationError::invalid_parameter(format!(
                "dimensions must be at most {}x{}, got {}x{}",
                MAX_DIMENSION, MAX_DIMENSION, self.width, self.height
            )));
        }

        if !(1..=100).contains(&self.quality) {
            return Err(GenerationError::invalid_parameter(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }

        Ok(())
    }

    /// Draws the target size in KB uniformly from `[min_size_kb, max_size_kb]`.
    ///
    /// Called once per run; the result stays fixed for every escalation tier.
    pub fn draw_target_kb<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min_size_kb..=self.max_size_kb)
    }
}
