//! synthimg: synthetic images that land inside a target file-size range.
//!
//! Generates images for upload load tests. Given pixel dimensions and a KB
//! range, it draws a target size, synthesizes hard-to-compress content and
//! escalates (block noise, then upscaling) until the encoded image reaches
//! the target. Bytes are never padded after encoding.
//!
//! # Modules
//!
//! - [`types`]: Request and artifact types (GenerationRequest, EncodedArtifact)
//! - [`generation`]: Layer synthesis, compositing and the escalation pipeline
//! - [`encode`]: Encoder seam, `image`-backed codec and artifact persistence
//! - [`config`]: Runtime configuration (GeneratorConfig)
//! - [`error`]: Error types and codes (GenerationError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use synthimg::{
//!     encode::{ImageCodec, OutputFormat},
//!     generation::{generate, SynthParams},
//!     GenerationRequest,
//! };
//!
//! let codec = ImageCodec::new(OutputFormat::Jpeg)?;
//! let request = GenerationRequest::new(800, 600)
//!     .with_size_range(50, 200)
//!     .with_seed(42); // seed for reproducibility
//!
//! let artifact = generate(&request, &codec, &SynthParams::default())?;
//! assert!(artifact.size_kb() >= 50 || artifact.width > 800);
//! ```

pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod generation;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::GeneratorConfig;
pub use encode::{ImageCodec, OutputFormat, RasterEncoder};
pub use error::{ErrorCode, GenerationError, Result};
pub use generation::{generate, generate_batch, SynthParams};
pub use types::{ArtifactSummary, EncodedArtifact, GenerationRequest, Tier};
