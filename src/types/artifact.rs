//! EncodedArtifact type representing a finished image.
//!
//! The artifact owns the encoded bytes and the facts about how they were
//! produced. It is handed to the caller, which decides where to persist it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::encode::OutputFormat;

/// Escalation tier that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Layered gradient/texture/noise composite.
    Composite,
    /// Composite plus 2x2 block noise.
    BlockNoise,
    /// Nearest-neighbour upscale of the block-noise raster.
    Upscale,
}

impl Tier {
    /// Returns the tier number (0, 1 or 2).
    pub fn index(&self) -> u8 {
        match self {
            Tier::Composite => 0,
            Tier::BlockNoise => 1,
            Tier::Upscale => 2,
        }
    }

    /// Returns the encoder quality used for this tier.
    pub fn quality(&self) -> u8 {
        match self {
            Tier::Composite => 90,
            Tier::BlockNoise => 95,
            Tier::Upscale => 100,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Composite => "composite",
            Tier::BlockNoise => "block noise",
            Tier::Upscale => "upscale",
        };
        write!(f, "tier {} ({})", self.index(), name)
    }
}

/// An encoded image produced by one generation run.
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,

    /// Format of `bytes`.
    pub format: OutputFormat,

    /// Pixel width of the encoded image. Larger than requested after an upscale.
    pub width: u32,

    /// Pixel height of the encoded image.
    pub height: u32,

    /// Target size in KB drawn for this run.
    pub target_kb: u32,

    /// Seed the synthesis RNG was started from, when known.
    pub seed: Option<u64>,

    /// Highest tier that ran.
    pub tier: Tier,
}

impl EncodedArtifact {
    /// Final size in whole KB (`floor(len / 1024)`).
    pub fn size_kb(&self) -> u64 {
        size_kb(self.bytes.len())
    }

    /// Returns true if the artifact reached its target size.
    pub fn meets_target(&self) -> bool {
        self.size_kb() >= u64::from(self.target_kb)
    }

    /// Content-derived identifier for naming output files.
    pub fn artifact_id(&self) -> String {
        compute_artifact_id(&self.bytes)
    }

    /// Suggested file name: `{artifact_id}.{extension}`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.artifact_id(), self.format.extension())
    }

    /// Everything but the bytes, for reporting.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            artifact_id: self.artifact_id(),
            format: self.format,
            width: self.width,
            height: self.height,
            size_kb: self.size_kb(),
            size_bytes: self.bytes.len() as u64,
            target_kb: self.target_kb,
            seed: self.seed,
            tier: self.tier,
        }
    }
}

/// Serializable description of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// 16 hex characters, see [`compute_artifact_id`].
    pub artifact_id: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub size_kb: u64,
    pub size_bytes: u64,
    pub target_kb: u32,
    pub seed: Option<u64>,
    pub tier: Tier,
}

/// Whole kilobytes in `len` bytes, rounded down.
pub fn size_kb(len: usize) -> u64 {
    (len / 1024) as u64
}

/// Computes a content ID from encoded bytes.
///
/// First 8 bytes of the SHA256 digest, hex encoded (16 characters).
pub fn compute_artifact_id(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
