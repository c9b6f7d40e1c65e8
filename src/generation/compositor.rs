//! Layer composition.
//!
//! Blends synthesized layers, in the order given, onto a single canvas.

use image::RgbaImage;
use rayon::prelude::*;

/// Blend mode a layer is composited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over alpha blending
    #[default]
    Normal,
    /// Multiplies dark backdrop areas and screens light ones
    Overlay,
    /// Gentle darken/lighten driven by the layer
    SoftLight,
}

impl BlendMode {
    /// Blends one normalized channel of `src` over `backdrop`.
    fn channel(&self, backdrop: f32, src: f32) -> f32 {
        match self {
            BlendMode::Normal => src,
            BlendMode::Overlay => {
                if backdrop <= 0.5 {
                    2.0 * backdrop * src
                } else {
                    1.0 - 2.0 * (1.0 - backdrop) * (1.0 - src)
                }
            }
            BlendMode::SoftLight => {
                if src <= 0.5 {
                    backdrop - (1.0 - 2.0 * src) * backdrop * (1.0 - backdrop)
                } else {
                    let d = if backdrop <= 0.25 {
                        ((16.0 * backdrop - 12.0) * backdrop + 4.0) * backdrop
                    } else {
                        backdrop.sqrt()
                    };
                    backdrop + (2.0 * src - 1.0) * (d - backdrop)
                }
            }
        }
    }
}

/// A synthesized raster layer.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name, for logging
    pub name: String,
    /// Layer pixels
    pub image: RgbaImage,
    /// Blend mode
    pub blend_mode: BlendMode,
}

impl Layer {
    /// Create a fully transparent layer
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            image: RgbaImage::new(width, height),
            blend_mode: BlendMode::Normal,
        }
    }

    /// Set blend mode
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }
}

/// Accumulates layers onto a canvas it owns.
pub struct Compositor {
    canvas: RgbaImage,
}

impl Compositor {
    /// Create a compositor over a transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    /// Continue compositing onto an existing canvas
    pub fn from_canvas(canvas: RgbaImage) -> Self {
        Self { canvas }
    }

    /// Composite `layers` in order onto a transparent canvas
    pub fn composite(width: u32, height: u32, layers: &[Layer]) -> RgbaImage {
        let mut compositor = Self::new(width, height);
        for layer in layers {
            compositor.blend(layer);
        }
        compositor.into_canvas()
    }

    /// The canvas so far
    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Give up the canvas
    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }

    /// Blend a layer onto the canvas, anchored at the top-left corner.
    ///
    /// Only the region both images cover is touched.
    pub fn blend(&mut self, layer: &Layer) {
        let width = self.canvas.width().min(layer.image.width()) as usize;
        let height = self.canvas.height().min(layer.image.height()) as usize;
        let canvas_stride = self.canvas.width() as usize * 4;
        let layer_stride = layer.image.width() as usize * 4;
        let src = layer.image.as_raw();
        let mode = layer.blend_mode;

        if width == 0 || height == 0 {
            return;
        }

        self.canvas
            .par_chunks_mut(canvas_stride)
            .take(height)
            .enumerate()
            .for_each(|(y, row)| {
                let src_row = &src[y * layer_stride..y * layer_stride + width * 4];
                for (dst, s) in row[..width * 4]
                    .chunks_exact_mut(4)
                    .zip(src_row.chunks_exact(4))
                {
                    let out = blend_pixels(
                        [s[0], s[1], s[2], s[3]],
                        [dst[0], dst[1], dst[2], dst[3]],
                        mode,
                    );
                    dst.copy_from_slice(&out);
                }
            });
    }
}

/// Blend `src` over `dst` with `mode`.
pub fn blend_pixels(src: [u8; 4], dst: [u8; 4], mode: BlendMode) -> [u8; 4] {
    let src_a = f32::from(src[3]) / 255.0;
    if src_a <= 0.0 {
        return dst;
    }

    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let channel = |i: usize| -> u8 {
        let s = f32::from(src[i]) / 255.0;
        let d = f32::from(dst[i]) / 255.0;
        let mixed = mode.channel(d, s);
        let out = src_a * (1.0 - dst_a) * s + src_a * dst_a * mixed + (1.0 - src_a) * dst_a * d;
        ((out / out_a) * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn filled(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn normal_over_transparent_copies_layer() {
        let mut base = Layer::new("base", 4, 4);
        base.image = filled(4, 4, [10, 20, 30, 255]);

        let canvas = Compositor::composite(4, 4, &[base]);
        assert!(canvas.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn transparent_source_leaves_backdrop() {
        let dst = [120, 130, 140, 255];
        for mode in [BlendMode::Normal, BlendMode::Overlay, BlendMode::SoftLight] {
            assert_eq!(blend_pixels([255, 255, 255, 0], dst, mode), dst);
        }
    }

    #[test]
    fn overlay_darkens_dark_and_lightens_light() {
        let black = [0, 0, 0, 255];
        let white = [255, 255, 255, 255];
        let dark = blend_pixels(black, [100, 100, 100, 255], BlendMode::Overlay);
        let light = blend_pixels(white, [200, 200, 200, 255], BlendMode::Overlay);
        assert_eq!(dark[0], 0);
        assert_eq!(light[0], 255);
    }

    #[test]
    fn soft_light_mid_grey_is_neutral() {
        let dst = [60, 128, 200, 255];
        let out = blend_pixels([128, 128, 128, 255], dst, BlendMode::SoftLight);
        for i in 0..3 {
            assert!((i32::from(out[i]) - i32::from(dst[i])).abs() <= 1);
        }
        assert_eq!(out[3], 255);
    }

    #[test]
    fn soft_light_dark_source_darkens() {
        let out = blend_pixels([0, 0, 0, 255], [128, 128, 128, 255], BlendMode::SoftLight);
        assert!(out[0] < 128);
    }

    #[test]
    fn partial_opacity_mixes_with_backdrop() {
        let out = blend_pixels([255, 255, 255, 128], [0, 0, 0, 255], BlendMode::Normal);
        assert!((120..=135).contains(&out[0]));
        assert_eq!(out[3], 255);
    }

    #[test]
    fn blend_clips_to_canvas() {
        let mut compositor = Compositor::from_canvas(filled(4, 4, [0, 0, 0, 255]));
        let mut big = Layer::new("big", 8, 2);
        big.image = filled(8, 2, [255, 255, 255, 255]);

        compositor.blend(&big);

        let canvas = compositor.canvas();
        assert_eq!(canvas.get_pixel(3, 1).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(3, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn order_matters() {
        let mut red = Layer::new("red", 1, 1);
        red.image = filled(1, 1, [255, 0, 0, 255]);
        let mut blue = Layer::new("blue", 1, 1);
        blue.image = filled(1, 1, [0, 0, 255, 255]);

        let a = Compositor::composite(1, 1, &[red.clone(), blue.clone()]);
        let b = Compositor::composite(1, 1, &[blue, red]);
        assert_eq!(a.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(b.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
