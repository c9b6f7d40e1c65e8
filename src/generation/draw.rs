//! Raster primitives for layer synthesis.
//!
//! Shapes are filled at pixel centres and blended source-over onto the
//! target buffer, so overlapping low-opacity shapes accumulate.

use image::{Rgba, RgbaImage};
use rand::Rng;

/// An RGB colour.
pub type Color = [u8; 3];

/// Colours shapes and gradients are drawn from.
pub const PALETTE: [Color; 20] = [
    [0xFF, 0x6B, 0x6B],
    [0x4E, 0xCD, 0xC4],
    [0x45, 0xB7, 0xD1],
    [0x96, 0xCE, 0xB4],
    [0xFF, 0xEA, 0xA7],
    [0xDD, 0xA0, 0xDD],
    [0x98, 0xD8, 0xC8],
    [0xF7, 0xDC, 0x6F],
    [0xBB, 0x8F, 0xCE],
    [0x85, 0xC1, 0xE9],
    [0xF8, 0xC4, 0x71],
    [0x82, 0xE0, 0xAA],
    [0xF1, 0x94, 0x8A],
    [0x85, 0xC1, 0xE9],
    [0xD7, 0xBD, 0xE2],
    [0xA3, 0xE4, 0xD7],
    [0xF9, 0xE7, 0x9F],
    [0xD2, 0xB4, 0xDE],
    [0xA9, 0xCC, 0xE3],
    [0xFA, 0xD7, 0xA0],
];

/// Picks a palette colour.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    PALETTE[rng.gen_range(0..PALETTE.len())]
}

/// A colour stop along a gradient, `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f32,
    pub color: Color,
    pub alpha: f32,
}

impl Stop {
    pub fn new(offset: f32, color: Color, alpha: f32) -> Self {
        Self {
            offset,
            color,
            alpha,
        }
    }
}

/// Source-over blends `color` at `alpha` onto the pixel at (x, y).
///
/// Coordinates outside the image are ignored.
pub fn blend_pixel(image: &mut RgbaImage, x: i64, y: i64, color: Color, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    let src_a = alpha.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = image.get_pixel_mut(x as u32, y as u32);
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for c in 0..3 {
        let s = f32::from(color[c]);
        let d = f32::from(dst[c]);
        dst[c] = ((s * src_a + d * dst_a * (1.0 - src_a)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Fills the axis-aligned rectangle with top-left (x, y).
pub fn fill_rect(image: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Color, alpha: f32) {
    for py in y..y + i64::from(h) {
        for px in x..x + i64::from(w) {
            blend_pixel(image, px, py, color, alpha);
        }
    }
}

/// Fills a disc centred on (cx, cy).
pub fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, r: f32, color: Color, alpha: f32) {
    let (x0, y0, x1, y1) = bounds(cx - r, cy - r, cx + r, cy + r);
    let r2 = r * r;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(image, px, py, color, alpha);
            }
        }
    }
}

/// Fills a disc whose colour and opacity run from `inner` at the centre
/// to `outer` at the rim.
pub fn fill_radial_gradient(
    image: &mut RgbaImage,
    cx: f32,
    cy: f32,
    r: f32,
    inner: Stop,
    outer: Stop,
) {
    if r <= 0.0 {
        return;
    }
    let (x0, y0, x1, y1) = bounds(cx - r, cy - r, cx + r, cy + r);
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d > r {
                continue;
            }
            let t = d / r;
            let color = lerp_color(inner.color, outer.color, t);
            let alpha = inner.alpha + (outer.alpha - inner.alpha) * t;
            blend_pixel(image, px, py, color, alpha);
        }
    }
}

/// Fills a polygon with the even-odd rule.
pub fn fill_polygon(image: &mut RgbaImage, points: &[(f32, f32)], color: Color, alpha: f32) {
    if points.len() < 3 {
        return;
    }
    let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

    let mut crossings = Vec::with_capacity(points.len());
    for py in min_y.floor() as i64..=max_y.ceil() as i64 {
        let sy = py as f32 + 0.5;
        crossings.clear();

        for i in 0..points.len() {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % points.len()];
            if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil() as i64;
            let end = (span[1] - 0.5).ceil() as i64;
            for px in start..end {
                blend_pixel(image, px, py, color, alpha);
            }
        }
    }
}

/// Draws a one-pixel line with Bresenham's algorithm.
pub fn draw_line(
    image: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    color: Color,
    alpha: f32,
) {
    let (mut x, mut y) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        blend_pixel(image, x, y, color, alpha);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Fills the whole image with an opaque top-left to bottom-right gradient.
///
/// `stops` must be sorted by offset and non-empty.
pub fn fill_diagonal_gradient(image: &mut RgbaImage, stops: &[Stop]) {
    let (w, h) = image.dimensions();
    let (fw, fh) = (w.max(1) as f32, h.max(1) as f32);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let t = ((x as f32 + 0.5) / fw + (y as f32 + 0.5) / fh) / 2.0;
        let c = sample_stops(stops, t);
        *pixel = Rgba([c[0], c[1], c[2], 255]);
    }
}

/// Colour at `t` along sorted `stops`, clamped to the end stops.
pub fn sample_stops(stops: &[Stop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return [0, 0, 0];
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return lerp_color(a.color, b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

fn bounds(x0: f32, y0: f32, x1: f32, y1: f32) -> (i64, i64, i64, i64) {
    (
        x0.floor() as i64,
        y0.floor() as i64,
        x1.ceil() as i64,
        y1.ceil() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RED: Color = [255, 0, 0];

    fn blank(w: u32, h: u32) -> RgbaImage {
        RgbaImage::new(w, h)
    }

    #[test]
    fn opaque_blend_replaces_pixel() {
        let mut img = blank(2, 2);
        blend_pixel(&mut img, 1, 1, RED, 1.0);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn translucent_blend_accumulates_alpha() {
        let mut img = blank(1, 1);
        blend_pixel(&mut img, 0, 0, RED, 0.1);
        let once = img.get_pixel(0, 0)[3];
        blend_pixel(&mut img, 0, 0, RED, 0.1);
        assert!(img.get_pixel(0, 0)[3] > once);
        assert_eq!(img.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut img = blank(2, 2);
        blend_pixel(&mut img, -1, 0, RED, 1.0);
        blend_pixel(&mut img, 0, 5, RED, 1.0);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn circle_covers_centre_not_corners() {
        let mut img = blank(20, 20);
        fill_circle(&mut img, 10.0, 10.0, 5.0, RED, 1.0);
        assert_eq!(img.get_pixel(10, 10)[3], 255);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(19, 19)[3], 0);
    }

    #[test]
    fn rect_is_clipped() {
        let mut img = blank(10, 10);
        fill_rect(&mut img, 8, 8, 5, 5, RED, 1.0);
        let covered = img.pixels().filter(|p| p[3] > 0).count();
        assert_eq!(covered, 4);
    }

    #[test]
    fn polygon_fills_square_exactly() {
        let mut img = blank(10, 10);
        let square = [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)];
        fill_polygon(&mut img, &square, RED, 1.0);
        let covered = img.pixels().filter(|p| p[3] > 0).count();
        assert_eq!(covered, 16);
        assert_eq!(img.get_pixel(2, 2)[3], 255);
        assert_eq!(img.get_pixel(6, 6)[3], 0);
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut img = blank(10, 10);
        draw_line(&mut img, (1.0, 1.0), (8.0, 5.0), RED, 1.0);
        assert_eq!(img.get_pixel(1, 1)[3], 255);
        assert_eq!(img.get_pixel(8, 5)[3], 255);
    }

    #[test]
    fn stops_interpolate_and_clamp() {
        let stops = [
            Stop::new(0.0, [0, 0, 0], 1.0),
            Stop::new(0.5, [100, 100, 100], 1.0),
            Stop::new(1.0, [200, 200, 200], 1.0),
        ];
        assert_eq!(sample_stops(&stops, -1.0), [0, 0, 0]);
        assert_eq!(sample_stops(&stops, 0.25), [50, 50, 50]);
        assert_eq!(sample_stops(&stops, 0.75), [150, 150, 150]);
        assert_eq!(sample_stops(&stops, 2.0), [200, 200, 200]);
    }

    #[test]
    fn diagonal_gradient_is_opaque() {
        let mut img = blank(16, 8);
        let stops = [Stop::new(0.0, RED, 1.0), Stop::new(1.0, [0, 0, 255], 1.0)];
        fill_diagonal_gradient(&mut img, &stops);
        assert!(img.pixels().all(|p| p[3] == 255));
        assert!(img.get_pixel(0, 0)[0] > img.get_pixel(15, 7)[0]);
    }

    #[test]
    fn radial_gradient_fades_outwards() {
        let mut img = blank(21, 21);
        fill_radial_gradient(
            &mut img,
            10.5,
            10.5,
            10.0,
            Stop::new(0.0, RED, 0.7),
            Stop::new(1.0, RED, 0.3),
        );
        assert!(img.get_pixel(10, 10)[3] > img.get_pixel(10, 1)[3]);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn random_color_comes_from_palette() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(PALETTE.contains(&random_color(&mut rng)));
        }
    }
}
