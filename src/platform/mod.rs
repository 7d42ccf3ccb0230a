//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Label text rasterization (2D canvas on web, bubble only on native)
//! - Seeds from wall-clock time
//! - Pointer tracking for the orbit controls

pub mod input;

pub use input::{OrbitGesture, PointerTracker};

use crate::renderer::bubble::{BUBBLE_HEIGHT, BUBBLE_WIDTH, BubbleImage};

/// Bubble image with `text` drawn in its body
#[cfg(target_arch = "wasm32")]
pub fn label_image(text: &str) -> BubbleImage {
    let mut image = BubbleImage::rasterize(BUBBLE_WIDTH, BUBBLE_HEIGHT);
    match web::draw_text(&image, text) {
        Ok(pixels) => {
            image.pixels = pixels;
            image.bleed_transparent();
        }
        Err(e) => log::warn!("Label text '{}' not drawn: {:?}", text, e),
    }
    image
}

/// Bubble image; native builds have no text rasterizer
#[cfg(not(target_arch = "wasm32"))]
pub fn label_image(text: &str) -> BubbleImage {
    log::debug!("Label '{}' rendered without text on native", text);
    BubbleImage::rasterize(BUBBLE_WIDTH, BUBBLE_HEIGHT)
}

/// Seed derived from the current time
#[cfg(target_arch = "wasm32")]
pub fn time_seed() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{Clamped, JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

    use crate::renderer::bubble::{BubbleImage, LABEL_FONT};

    /// Composite white text over the bubble on an offscreen canvas
    pub fn draw_text(image: &BubbleImage, text: &str) -> Result<Vec<u8>, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(image.width);
        canvas.set_height(image.height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let bubble = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&image.pixels[..]),
            image.width,
            image.height,
        )?;
        ctx.put_image_data(&bubble, 0.0, 0.0)?;

        ctx.set_font(LABEL_FONT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str("#ffffff");
        let center = image.layout.text_center;
        ctx.fill_text(text, center.x as f64, center.y as f64)?;

        let out = ctx.get_image_data(0.0, 0.0, image.width as f64, image.height as f64)?;
        Ok(out.data().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_label_image_is_plain_bubble() {
        let image = label_image("SKU");
        assert_eq!(image.width, BUBBLE_WIDTH);
        assert_eq!(image.height, BUBBLE_HEIGHT);
        assert_eq!(image.pixels, BubbleImage::default().pixels);
    }

    #[test]
    fn test_time_seed_moves() {
        assert!(time_seed() > 0);
    }
}
