//! Layer synthesis.
//!
//! Produces the content layers the compositor merges: a smooth gradient
//! base, tiled low-opacity texture layers, and per-pixel noise. The texture
//! and noise layers carry the high local entropy that keeps encoded output
//! large.

use std::f32::consts::PI;

use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::compositor::{BlendMode, Layer};
use super::draw::{self, random_color, Stop};

/// Default number of texture layers.
pub const DEFAULT_TEXTURE_LAYERS: usize = 8;

/// Default number of extra radial discs on the base layer.
pub const DEFAULT_EXTRA_GRADIENTS: usize = 5;

/// Default luminance scale of the finishing noise layer.
pub const DEFAULT_NOISE_INTENSITY: f32 = 0.3;

/// Edge length of a block in the high-frequency noise pass.
pub const NOISE_BLOCK_SIZE: u32 = 2;

/// Knobs for layer synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthParams {
    /// Number of tiled texture layers.
    pub texture_layers: usize,
    /// Number of extra radial discs drawn on the base gradient.
    pub extra_gradients: usize,
    /// Noise layer luminance scale, 0.0-1.0.
    pub noise_intensity: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            texture_layers: DEFAULT_TEXTURE_LAYERS,
            extra_gradients: DEFAULT_EXTRA_GRADIENTS,
            noise_intensity: DEFAULT_NOISE_INTENSITY,
        }
    }
}

/// Shape drawn into each populated tile of a texture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Square,
    Polygon { sides: usize },
    Lines,
}

impl ShapeKind {
    /// Shape used by the texture layer at `index`.
    pub fn for_layer(index: usize) -> Self {
        match index % 4 {
            0 => ShapeKind::Circle,
            1 => ShapeKind::Square,
            2 => ShapeKind::Polygon {
                sides: 3 + index % 5,
            },
            _ => ShapeKind::Lines,
        }
    }

    /// Opacity every shape of this kind is drawn with.
    pub fn opacity(&self) -> f32 {
        match self {
            ShapeKind::Circle => 0.10,
            ShapeKind::Square => 0.08,
            ShapeKind::Polygon { .. } => 0.05,
            ShapeKind::Lines => 0.03,
        }
    }
}

/// Tile edge length for the texture layer at `index`.
pub fn tile_size(index: usize) -> u32 {
    20 + index as u32 * 5
}

/// Synthesizes every layer for one image, in compositing order:
/// base gradient, texture layers by index, noise.
///
/// Texture layers are rendered in parallel, each from its own RNG seeded
/// from `rng` in index order, so output is fixed for a fixed `rng` state.
pub fn synthesize_layers<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    params: &SynthParams,
    rng: &mut R,
) -> Vec<Layer> {
    let mut layers = Vec::with_capacity(params.texture_layers + 2);
    layers.push(base_gradient_layer(width, height, params.extra_gradients, rng));

    let seeds: Vec<u64> = (0..params.texture_layers).map(|_| rng.gen()).collect();
    let textures: Vec<Layer> = seeds
        .into_par_iter()
        .enumerate()
        .map(|(index, seed)| {
            let mut layer_rng = ChaCha8Rng::seed_from_u64(seed);
            texture_layer(width, height, index, &mut layer_rng)
        })
        .collect();
    layers.extend(textures);

    layers.push(noise_layer(width, height, params.noise_intensity, rng));
    layers
}

/// Opaque base: a three-stop diagonal gradient, one large radial disc and
/// `extra` smaller radial discs.
pub fn base_gradient_layer<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    extra: usize,
    rng: &mut R,
) -> Layer {
    let mut layer = Layer::new("base-gradient", width, height);
    let (w, h) = (width as f32, height as f32);

    let stops = [
        Stop::new(0.0, random_color(rng), 1.0),
        Stop::new(rng.gen::<f32>(), random_color(rng), 1.0),
        Stop::new(1.0, random_color(rng), 1.0),
    ];
    draw::fill_diagonal_gradient(&mut layer.image, &stops);

    let inner = Stop::new(0.0, random_color(rng), 0.7);
    let outer = Stop::new(1.0, random_color(rng), 0.3);
    let (cx, cy) = (rng.gen::<f32>() * w, rng.gen::<f32>() * h);
    draw::fill_radial_gradient(&mut layer.image, cx, cy, w / 3.0, inner, outer);

    for _ in 0..extra {
        let (cx, cy) = (rng.gen::<f32>() * w, rng.gen::<f32>() * h);
        let r = rng.gen::<f32>() * (w / 4.0) + 50.0;
        let inner = Stop::new(0.0, random_color(rng), 0.5);
        let outer = Stop::new(1.0, random_color(rng), 0.1);
        draw::fill_radial_gradient(&mut layer.image, cx, cy, r, inner, outer);
    }

    layer
}

/// Tiled shapes over a transparent layer, blended with overlay.
///
/// About 30% of tiles are left empty.
pub fn texture_layer<R: Rng + ?Sized>(width: u32, height: u32, index: usize, rng: &mut R) -> Layer {
    let mut layer =
        Layer::new(format!("texture-{index}"), width, height).with_blend_mode(BlendMode::Overlay);
    let size = tile_size(index);
    let kind = ShapeKind::for_layer(index);

    for x in (0..width).step_by(size as usize) {
        for y in (0..height).step_by(size as usize) {
            if rng.gen::<f32>() > 0.3 {
                draw_shape(&mut layer.image, kind, x as f32, y as f32, size as f32, rng);
            }
        }
    }

    layer
}

fn draw_shape<R: Rng + ?Sized>(
    image: &mut RgbaImage,
    kind: ShapeKind,
    x: f32,
    y: f32,
    size: f32,
    rng: &mut R,
) {
    let opacity = kind.opacity();
    let (cx, cy) = (x + size / 2.0, y + size / 2.0);

    match kind {
        ShapeKind::Circle => {
            draw::fill_circle(image, cx, cy, size / 2.0, random_color(rng), opacity);
        }
        ShapeKind::Square => {
            let color = random_color(rng);
            let edge = size as u32;
            draw::fill_rect(image, x as i64, y as i64, edge, edge, color, opacity);
        }
        ShapeKind::Polygon { sides } => {
            // Jittered vertex radii break the regularity encoders exploit
            let points: Vec<(f32, f32)> = (0..sides)
                .map(|i| {
                    let angle = i as f32 * 2.0 * PI / sides as f32;
                    let radius = size / 2.0 * (0.7 + rng.gen::<f32>() * 0.3);
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect();
            draw::fill_polygon(image, &points, random_color(rng), opacity);
        }
        ShapeKind::Lines => {
            let count = rng.gen_range(5..15);
            for _ in 0..count {
                let from = (x + rng.gen::<f32>() * size, y + rng.gen::<f32>() * size);
                let to = (x + rng.gen::<f32>() * size, y + rng.gen::<f32>() * size);
                draw::draw_line(image, from, to, random_color(rng), opacity);
            }
        }
    }
}

/// Opaque grey noise, `floor(rand * 255 * intensity)` per pixel, blended
/// with soft-light.
pub fn noise_layer<R: Rng + ?Sized>(width: u32, height: u32, intensity: f32, rng: &mut R) -> Layer {
    let mut layer = Layer::new("noise", width, height).with_blend_mode(BlendMode::SoftLight);
    let scale = 255.0 * intensity.clamp(0.0, 1.0);

    for pixel in layer.image.pixels_mut() {
        let v = (rng.gen::<f32>() * scale).floor() as u8;
        *pixel = Rgba([v, v, v, 255]);
    }

    layer
}

/// High-frequency pass: 2x2 blocks, half of them drawn, each black or
/// white at an opacity in `[0.05, 0.15)`. Blended with overlay.
pub fn block_noise_layer<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Layer {
    let mut layer = Layer::new("block-noise", width, height).with_blend_mode(BlendMode::Overlay);
    let blocks_x = width.div_ceil(NOISE_BLOCK_SIZE);
    let blocks_y = height.div_ceil(NOISE_BLOCK_SIZE);

    for bx in 0..blocks_x {
        for by in 0..blocks_y {
            if rng.gen::<f32>() <= 0.5 {
                continue;
            }
            let v = if rng.gen::<f32>() > 0.5 { 255 } else { 0 };
            let opacity = 0.05 + rng.gen::<f32>() * 0.1;
            let alpha = (opacity * 255.0).round() as u8;

            for y in by * NOISE_BLOCK_SIZE..((by + 1) * NOISE_BLOCK_SIZE).min(height) {
                for x in bx * NOISE_BLOCK_SIZE..((bx + 1) * NOISE_BLOCK_SIZE).min(width) {
                    layer.image.put_pixel(x, y, Rgba([v, v, v, alpha]));
                }
            }
        }
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn shape_kind_cycles_with_index() {
        assert_eq!(ShapeKind::for_layer(0), ShapeKind::Circle);
        assert_eq!(ShapeKind::for_layer(1), ShapeKind::Square);
        assert_eq!(ShapeKind::for_layer(2), ShapeKind::Polygon { sides: 5 });
        assert_eq!(ShapeKind::for_layer(3), ShapeKind::Lines);
        assert_eq!(ShapeKind::for_layer(6), ShapeKind::Polygon { sides: 4 });
    }

    #[test]
    fn shape_opacity_stays_low() {
        for index in 0..8 {
            let opacity = ShapeKind::for_layer(index).opacity();
            assert!((0.03..=0.10).contains(&opacity));
        }
    }

    #[test]
    fn tile_size_grows_by_five() {
        assert_eq!(tile_size(0), 20);
        assert_eq!(tile_size(7), 55);
    }

    #[test]
    fn layer_order_and_blend_modes() {
        let params = SynthParams::default();
        let layers = synthesize_layers(120, 100, &params, &mut rng(1));

        assert_eq!(layers.len(), params.texture_layers + 2);
        assert_eq!(layers[0].name, "base-gradient");
        assert_eq!(layers[0].blend_mode, BlendMode::Normal);
        for (i, layer) in layers[1..=params.texture_layers].iter().enumerate() {
            assert_eq!(layer.name, format!("texture-{i}"));
            assert_eq!(layer.blend_mode, BlendMode::Overlay);
        }
        let noise = layers.last().unwrap();
        assert_eq!(noise.name, "noise");
        assert_eq!(noise.blend_mode, BlendMode::SoftLight);
        assert!(layers.iter().all(|l| l.image.dimensions() == (120, 100)));
    }

    #[test]
    fn synthesis_is_deterministic_for_seed() {
        let params = SynthParams::default();
        let a = synthesize_layers(100, 100, &params, &mut rng(5));
        let b = synthesize_layers(100, 100, &params, &mut rng(5));
        for (la, lb) in a.iter().zip(&b) {
            assert_eq!(la.image, lb.image, "{}", la.name);
        }
    }

    #[test]
    fn base_gradient_is_opaque() {
        let layer = base_gradient_layer(150, 100, 5, &mut rng(2));
        assert!(layer.image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn texture_leaves_some_tiles_empty() {
        // 100x100 with 20px tiles: 25 tiles, ~30% skipped
        let layer = texture_layer(100, 100, 1, &mut rng(11));
        let transparent = layer.image.pixels().filter(|p| p[3] == 0).count();
        let painted = layer.image.pixels().filter(|p| p[3] > 0).count();
        assert!(transparent > 0);
        assert!(painted > 0);
        assert!(layer.image.pixels().all(|p| p[3] <= 26));
    }

    #[test]
    fn noise_respects_intensity() {
        let layer = noise_layer(50, 50, 0.3, &mut rng(4));
        assert!(layer.image.pixels().all(|p| p[0] <= 76 && p[3] == 255));
        assert!(layer.image.pixels().any(|p| p[0] > 0));
    }

    #[test]
    fn block_noise_uses_two_pixel_blocks() {
        let layer = block_noise_layer(101, 100, &mut rng(8));
        let img = &layer.image;

        for by in 0..50 {
            for bx in 0..50 {
                let (x, y) = (bx * 2, by * 2);
                let p = img.get_pixel(x, y);
                assert_eq!(img.get_pixel(x + 1, y), p);
                assert_eq!(img.get_pixel(x, y + 1), p);
                assert_eq!(img.get_pixel(x + 1, y + 1), p);
            }
        }

        let drawn: Vec<_> = img.pixels().filter(|p| p[3] > 0).collect();
        assert!(!drawn.is_empty());
        assert!(drawn.iter().all(|p| (p[0] == 0 || p[0] == 255) && (13..=39).contains(&p[3])));
    }
}
