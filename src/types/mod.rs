//! Core types for synthimg.
//!
//! - [`GenerationRequest`]: validated input for one image
//! - [`EncodedArtifact`]: the encoded image plus how it was produced
//! - [`Tier`]: escalation stage that produced an artifact

mod artifact;
mod request;

pub use artifact::{compute_artifact_id, size_kb, ArtifactSummary, EncodedArtifact, Tier};
pub use request::{
    GenerationRequest, DEFAULT_HEIGHT, DEFAULT_MAX_SIZE_KB, DEFAULT_MIN_SIZE_KB, DEFAULT_QUALITY,
    DEFAULT_WIDTH, MAX_DIMENSION, MIN_DIMENSION,
};
