//! Size-escalation pipeline.
//!
//! Synthesizes and encodes an image, then escalates through at most two
//! further tiers until the encoded size reaches the target drawn for the
//! run:
//!
//! 0. layered composite, encoded at quality 90
//! 1. 2x2 block noise overlaid on the composite, quality 95
//! 2. nearest-neighbour upscale of the tier 1 raster, quality 100
//!
//! Every tier runs at most once, so a run performs at most three encodes.
//! Falling short after tier 2 is still a success.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use super::compositor::Compositor;
use super::synth::{block_noise_layer, synthesize_layers, SynthParams};
use crate::encode::{EncodeSettings, RasterEncoder};
use crate::error::Result;
use crate::types::{size_kb, EncodedArtifact, GenerationRequest, Tier, MAX_DIMENSION};

/// Generates an image for `request`.
///
/// Uses `request.seed` when set, otherwise a random seed. The seed is
/// recorded on the returned artifact.
///
/// # Example
///
/// ```ignore
/// use synthimg::encode::{ImageCodec, OutputFormat};
/// use synthimg::generation::{generate, SynthParams};
/// use synthimg::GenerationRequest;
///
/// let codec = ImageCodec::new(OutputFormat::Jpeg)?;
/// let request = GenerationRequest::new(800, 600).with_size_range(50, 200);
/// let artifact = generate(&request, &codec, &SynthParams::default())?;
/// ```
pub fn generate(
    request: &GenerationRequest,
    encoder: &dyn RasterEncoder,
    params: &SynthParams,
) -> Result<EncodedArtifact> {
    generate_with_progress(request, encoder, params, |_, _| {})
}

/// Generates an image, calling `on_tier(tier, size_kb)` after every encode.
pub fn generate_with_progress<F>(
    request: &GenerationRequest,
    encoder: &dyn RasterEncoder,
    params: &SynthParams,
    on_tier: F,
) -> Result<EncodedArtifact>
where
    F: Fn(Tier, u64),
{
    let seed = request.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut artifact = generate_with_rng(request, &mut rng, encoder, params, on_tier)?;
    artifact.seed = Some(seed);
    Ok(artifact)
}

/// Generates an image drawing all randomness from `rng`.
///
/// `request.seed` is ignored and the artifact carries no seed.
pub fn generate_with_rng<R, F>(
    request: &GenerationRequest,
    rng: &mut R,
    encoder: &dyn RasterEncoder,
    params: &SynthParams,
    on_tier: F,
) -> Result<EncodedArtifact>
where
    R: Rng + ?Sized,
    F: Fn(Tier, u64),
{
    request.validate()?;

    let (width, height) = (request.width, request.height);
    let target_kb = request.draw_target_kb(rng);
    info!(width, height, target_kb, "generating image");

    // Tier 0
    let layers = synthesize_layers(width, height, params, rng);
    let mut canvas = Compositor::composite(width, height, &layers);
    drop(layers);

    let mut tier = Tier::Composite;
    let mut bytes = encode_tier(encoder, &canvas, tier)?;
    let mut current_kb = size_kb(bytes.len());
    debug!(%tier, size_kb = current_kb, "encoded");
    on_tier(tier, current_kb);

    if current_kb < u64::from(target_kb) {
        tier = Tier::BlockNoise;
        let noise = block_noise_layer(width, height, rng);
        let mut compositor = Compositor::from_canvas(canvas);
        compositor.blend(&noise);
        canvas = compositor.into_canvas();

        bytes = encode_tier(encoder, &canvas, tier)?;
        current_kb = size_kb(bytes.len());
        debug!(%tier, size_kb = current_kb, "encoded");
        on_tier(tier, current_kb);
    }

    if current_kb < u64::from(target_kb) {
        tier = Tier::Upscale;
        let (new_width, new_height) = upscaled_dimensions(width, height, target_kb, current_kb);
        canvas = imageops::resize(&canvas, new_width, new_height, FilterType::Nearest);

        bytes = encode_tier(encoder, &canvas, tier)?;
        current_kb = size_kb(bytes.len());
        debug!(%tier, size_kb = current_kb, new_width, new_height, "encoded");
        on_tier(tier, current_kb);

        if current_kb < u64::from(target_kb) {
            warn!(size_kb = current_kb, target_kb, "target not reached after upscale");
        }
    }

    let (width, height) = canvas.dimensions();
    info!(size_kb = current_kb, target_kb, width, height, %tier, "image generated");

    Ok(EncodedArtifact {
        bytes,
        format: encoder.format(),
        width,
        height,
        target_kb,
        seed: None,
        tier,
    })
}

/// Dimensions for the tier 2 upscale.
///
/// Scales both sides by `sqrt(target_kb / current_kb)`, rounding down.
/// A zero `current_kb` counts as 1. The factor is reduced so that neither
/// side exceeds [`MAX_DIMENSION`], keeping the aspect ratio. Never shrinks.
pub fn upscaled_dimensions(width: u32, height: u32, target_kb: u32, current_kb: u64) -> (u32, u32) {
    let wanted = (f64::from(target_kb) / current_kb.max(1) as f64).sqrt();
    let limit = (f64::from(MAX_DIMENSION) / f64::from(width.max(1)))
        .min(f64::from(MAX_DIMENSION) / f64::from(height.max(1)));
    let scale = wanted.min(limit);

    if wanted > limit {
        warn!(wanted, applied = scale, "upscale clamped to maximum dimension");
    }

    let scaled = |side: u32| -> u32 {
        let grown = (f64::from(side) * scale).floor().min(f64::from(MAX_DIMENSION)) as u32;
        grown.max(side)
    };
    (scaled(width), scaled(height))
}

fn encode_tier(encoder: &dyn RasterEncoder, canvas: &RgbaImage, tier: Tier) -> Result<Vec<u8>> {
    encoder
        .encode(canvas, EncodeSettings::fastest(tier.quality()))
        .map_err(|e| {
            error!(%tier, error = %e, "encode failed");
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upscale_follows_square_root() {
        // 400 / 100 -> scale 2
        assert_eq!(upscaled_dimensions(800, 600, 400, 100), (1600, 1200));
        // 500 / 20 -> scale 5
        assert_eq!(upscaled_dimensions(100, 100, 500, 20), (500, 500));
    }

    #[test]
    fn upscale_rounds_down() {
        // sqrt(3) = 1.732...
        assert_eq!(upscaled_dimensions(100, 100, 3, 1), (173, 173));
    }

    #[test]
    fn upscale_treats_zero_size_as_one() {
        assert_eq!(upscaled_dimensions(100, 100, 4, 0), (200, 200));
    }

    #[test]
    fn upscale_never_shrinks() {
        assert_eq!(upscaled_dimensions(100, 100, 1, 50), (100, 100));
    }

    fn assert_same_aspect(original: (u32, u32), scaled: (u32, u32)) {
        let before = f64::from(original.0) / f64::from(original.1);
        let after = f64::from(scaled.0) / f64::from(scaled.1);
        assert!(
            (before - after).abs() / before < 0.01,
            "{:?} -> {:?}",
            original,
            scaled
        );
    }

    #[test]
    fn upscale_cap_keeps_aspect_ratio() {
        let (w, h) = upscaled_dimensions(1200, 900, 1_000_000, 100);
        assert!(w <= MAX_DIMENSION && h <= MAX_DIMENSION);
        assert!(w >= MAX_DIMENSION - 1);
        assert_same_aspect((1200, 900), (w, h));

        let (w, h) = upscaled_dimensions(10_000, 100, 1_000_000, 1);
        assert!(w <= MAX_DIMENSION && w >= MAX_DIMENSION - 1);
        assert!((163..=164).contains(&h), "height {}", h);
    }

    #[test]
    fn upscale_cap_applies_to_tall_images() {
        let (w, h) = upscaled_dimensions(900, 1200, 1_000_000, 100);
        assert!(h <= MAX_DIMENSION && h >= MAX_DIMENSION - 1);
        assert_same_aspect((900, 1200), (w, h));
    }

    #[test]
    fn upscale_at_cap_stays_put() {
        assert_eq!(
            upscaled_dimensions(MAX_DIMENSION, 100, 400, 1),
            (MAX_DIMENSION, 100)
        );
    }
}
