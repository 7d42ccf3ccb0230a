//! Speech-bubble label image
//!
//! The bubble body, pointer and border are rasterized here from distance
//! fields; text is drawn on top by the platform layer.

use glam::Vec2;

use crate::sim::sdf::{BubbleShape, sd_bubble};

/// Label canvas size in pixels
pub const BUBBLE_WIDTH: u32 = 200;
pub const BUBBLE_HEIGHT: u32 = 100;

/// Bubble fill, straight alpha
pub const FILL_RGBA: [f32; 4] = [0.0, 20.0 / 255.0, 50.0 / 255.0, 0.7];
/// Border color (#0088ff)
pub const BORDER_RGB: [f32; 3] = [0.0, 136.0 / 255.0, 1.0];
/// Border stroke width in pixels
pub const BORDER_WIDTH: f32 = 2.0;
/// Text style for the platform text pass
pub const LABEL_FONT: &str = "bold 20px Arial";

/// Where the bubble parts sit on the canvas
#[derive(Debug, Clone, Copy)]
pub struct BubbleLayout {
    pub shape: BubbleShape,
    /// Center of the text line
    pub text_center: Vec2,
}

impl BubbleLayout {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let margin = 5.0;
        let pointer_height = 20.0;
        let body_size = Vec2::new(width as f32 - 2.0 * margin, height as f32 - 30.0);
        let body_bottom = margin + body_size.y;
        let mid = width as f32 / 2.0;

        Self {
            shape: BubbleShape {
                body_min: Vec2::splat(margin),
                body_size,
                corner_radius: 10.0,
                pointer: [
                    Vec2::new(mid - 10.0, body_bottom),
                    Vec2::new(mid, body_bottom + pointer_height),
                    Vec2::new(mid + 10.0, body_bottom),
                ],
            },
            text_center: Vec2::new(mid, margin + body_size.y / 2.0),
        }
    }
}

impl Default for BubbleLayout {
    fn default() -> Self {
        Self::for_canvas(BUBBLE_WIDTH, BUBBLE_HEIGHT)
    }
}

/// RGBA8 image, straight alpha, rows top to bottom
#[derive(Debug, Clone)]
pub struct BubbleImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub layout: BubbleLayout,
}

impl BubbleImage {
    /// Rasterize the empty bubble
    pub fn rasterize(width: u32, height: u32) -> Self {
        let layout = BubbleLayout::for_canvas(width, height);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);

        let half_border = BORDER_WIDTH * 0.5;
        for y in 0..height {
            for x in 0..width {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = sd_bubble(p, &layout.shape);

                let fill_cov = (0.5 - d).clamp(0.0, 1.0);
                let stroke_cov = (half_border + 0.5 - d.abs()).clamp(0.0, 1.0);

                // Stroke over fill, premultiplied
                let fill_a = FILL_RGBA[3] * fill_cov;
                let out_a = stroke_cov + fill_a * (1.0 - stroke_cov);
                let mut rgb = [0.0f32; 3];
                for (c, out) in rgb.iter_mut().enumerate() {
                    let premul = BORDER_RGB[c] * stroke_cov + FILL_RGBA[c] * fill_a * (1.0 - stroke_cov);
                    *out = if out_a > 0.0 { premul / out_a } else { 0.0 };
                }

                pixels.extend_from_slice(&[
                    to_u8(rgb[0]),
                    to_u8(rgb[1]),
                    to_u8(rgb[2]),
                    to_u8(out_a),
                ]);
            }
        }

        let mut image = Self {
            width,
            height,
            pixels,
            layout,
        };
        image.bleed_transparent();
        image
    }

    /// Give fully transparent texels the border color so linear filtering
    /// at the outline does not pull in black
    pub fn bleed_transparent(&mut self) {
        let border = BORDER_RGB.map(to_u8);
        for px in self.pixels.chunks_exact_mut(4) {
            if px[3] == 0 {
                px[..3].copy_from_slice(&border);
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

impl Default for BubbleImage {
    fn default() -> Self {
        Self::rasterize(BUBBLE_WIDTH, BUBBLE_HEIGHT)
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
