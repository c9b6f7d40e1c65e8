//! Image output module.
//!
//! Provides encoding of synthesized rasters and artifact persistence.

pub mod codec;
pub mod file;

// Re-export commonly used items
pub use codec::{EncodeSettings, ImageCodec, OutputFormat, RasterEncoder};
pub use file::{write_artifact, write_artifact_to_dir};
