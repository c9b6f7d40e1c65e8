//! Image generation module.
//!
//! Provides layer synthesis, compositing and the size-escalation pipeline.

pub mod batch;
pub mod compositor;
pub mod draw;
pub mod pipeline;
pub mod synth;

// Re-export commonly used items
pub use batch::{expand_request, generate_batch};
pub use compositor::{BlendMode, Compositor, Layer};
pub use pipeline::{generate, generate_with_progress, generate_with_rng, upscaled_dimensions};
pub use synth::{synthesize_layers, SynthParams};
