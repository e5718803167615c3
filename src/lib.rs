//! Dominant ("theme") color of an image, plus whether that color is dark.
//!
//! The kernel is a plain frequency count over decoded RGBA pixels. It is
//! exposed three ways: as a Rust library, as `wasm_bindgen` exports for the
//! browser, and (feature `server`) as an HTTP upload endpoint.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod darkness;
pub mod error;
pub mod tally;

#[cfg(feature = "server")]
pub mod server;

pub use color::Rgb;
pub use darkness::{ContrastScheme, is_dark};
pub use error::ThemeColorError;
pub use tally::{AlphaPolicy, ColorTally, DominantColor, PixelBuffer, SIGNIFICANCE_THRESHOLD};

/// Knobs for one theme color computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColorOptions {
    /// Minimum occurrence count (exclusive) for a color to be considered.
    pub threshold: u32,
    pub alpha: AlphaPolicy,
}

impl Default for ThemeColorOptions {
    fn default() -> Self {
        Self {
            threshold: SIGNIFICANCE_THRESHOLD,
            alpha: AlphaPolicy::Include,
        }
    }
}

/// The dominant color of an image and its darkness classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(serde::Serialize))]
#[cfg_attr(feature = "server", serde(rename_all = "camelCase"))]
pub struct ColorResult {
    pub color: Rgb,
    pub is_dark: bool,
    /// How many pixels carry `color`.
    #[cfg_attr(feature = "server", serde(skip))]
    pub count: u32,
}

impl From<DominantColor> for ColorResult {
    fn from(DominantColor { color, count }: DominantColor) -> Self {
        Self {
            color,
            is_dark: is_dark(color),
            count,
        }
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into RGBA pixels.
pub fn decode_pixels(input: &[u8]) -> Result<PixelBuffer, ThemeColorError> {
    let img = image::load_from_memory(input).inspect_err(|e| {
        tracing::debug!(error = %e, bytes = input.len(), "image decode failed");
    })?;
    Ok(PixelBuffer::from_image(&img))
}

/// Tally `pixels`, pick the dominant color and classify it.
pub fn theme_color_pixels(
    pixels: &PixelBuffer,
    options: &ThemeColorOptions,
) -> Result<ColorResult, ThemeColorError> {
    let tally = ColorTally::from_pixels(pixels, options.alpha);
    let best = tally.dominant(options.threshold)?;

    tracing::info!(
        color = %best.color,
        count = best.count,
        pixels = pixels.pixel_count(),
        "theme color found"
    );

    Ok(best.into())
}

/// Decode `input` and compute its theme color.
pub fn theme_color_bytes(
    input: &[u8],
    options: &ThemeColorOptions,
) -> Result<ColorResult, ThemeColorError> {
    let pixels = decode_pixels(input)?;
    theme_color_pixels(&pixels, options)
}

// ------------------------------------------------------------
// Browser bindings
// ------------------------------------------------------------

fn alpha_policy(skip_transparent: bool) -> AlphaPolicy {
    if skip_transparent {
        AlphaPolicy::SkipTransparent
    } else {
        AlphaPolicy::Include
    }
}

/// Default options, optionally leaving out fully transparent pixels.
fn browser_options(skip_transparent: bool) -> ThemeColorOptions {
    ThemeColorOptions {
        alpha: alpha_policy(skip_transparent),
        ..Default::default()
    }
}

/// Theme color of raw canvas RGBA data, with the browser exports' defaults.
pub fn theme_color_raw_rgba(
    rgba: Vec<u8>,
    skip_transparent: bool,
) -> Result<ColorResult, ThemeColorError> {
    let pixels = PixelBuffer::from_raw(rgba)?;
    theme_color_pixels(&pixels, &browser_options(skip_transparent))
}

fn to_js_error(e: ThemeColorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn result_to_js(result: &ColorResult) -> Result<Object, JsValue> {
    let out = Object::new();
    Reflect::set(&out, &JsValue::from_str("color"), &JsValue::from_str(&result.color.to_string()))?;
    Reflect::set(&out, &JsValue::from_str("isDark"), &JsValue::from_bool(result.is_dark))?;
    Reflect::set(&out, &JsValue::from_str("count"), &JsValue::from_f64(result.count as f64))?;
    Ok(out)
}

/// Theme color of an encoded image file.
///
/// Returns `{ color: "rgb(r,g,b)", isDark, count }` or throws a string.
#[wasm_bindgen]
pub fn theme_color(input: Vec<u8>, skip_transparent: bool) -> Result<Object, JsValue> {
    let result = theme_color_bytes(&input, &browser_options(skip_transparent)).map_err(to_js_error)?;
    result_to_js(&result)
}

/// Theme color of raw RGBA data, such as `CanvasRenderingContext2D.getImageData().data`.
#[wasm_bindgen]
pub fn theme_color_rgba(rgba: Vec<u8>, skip_transparent: bool) -> Result<Object, JsValue> {
    let result = theme_color_raw_rgba(rgba, skip_transparent).map_err(to_js_error)?;
    result_to_js(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(img: RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn flat_png_is_dark_theme() {
        let bytes = png(RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 255])));
        let result = theme_color_bytes(&bytes, &ThemeColorOptions::default()).unwrap();
        assert_eq!(result, ColorResult { color: Rgb::new(10, 20, 30), is_dark: true, count: 400 });
    }

    #[test]
    fn light_background_with_dark_spot() {
        let img = RgbaImage::from_fn(30, 30, |x, y| {
            if x < 5 && y < 5 { Rgba([0, 0, 0, 255]) } else { Rgba([240, 240, 230, 255]) }
        });
        let result = theme_color_bytes(&png(img), &ThemeColorOptions::default()).unwrap();
        assert_eq!(result.color, Rgb::new(240, 240, 230));
        assert_eq!(result.count, 900 - 25);
        assert!(!result.is_dark);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = theme_color_bytes(b"definitely not an image", &ThemeColorOptions::default()).unwrap_err();
        assert!(matches!(err, ThemeColorError::Decode(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn tiny_image_has_no_theme_color() {
        let bytes = png(RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255])));
        let err = theme_color_bytes(&bytes, &ThemeColorOptions::default()).unwrap_err();
        assert!(matches!(err, ThemeColorError::NoDominantColor { threshold: 100 }));

        let lenient = ThemeColorOptions { threshold: 10, ..Default::default() };
        assert_eq!(theme_color_bytes(&bytes, &lenient).unwrap().count, 25);
    }

    #[test]
    fn dominant_converts_into_classified_result() {
        let dark: ColorResult = DominantColor { color: Rgb::new(0, 0, 0), count: 101 }.into();
        assert_eq!(dark, ColorResult { color: Rgb::new(0, 0, 0), is_dark: true, count: 101 });

        let light: ColorResult = DominantColor { color: Rgb::new(255, 255, 255), count: 7 }.into();
        assert!(!light.is_dark);
    }

    #[test]
    fn raw_rgba_must_be_whole_pixels() {
        let err = theme_color_raw_rgba(vec![0; 401], false).unwrap_err();
        assert!(matches!(err, ThemeColorError::MalformedBuffer { len: 401 }));
        assert!(err.to_string().contains("401 bytes"));
    }

    #[test]
    fn raw_rgba_follows_transparency_flag() {
        // 150 transparent white pixels, 120 opaque teal ones.
        let mut rgba = [255u8, 255, 255, 0].repeat(150);
        rgba.extend_from_slice(&[0, 128, 128, 255].repeat(120));

        let all = theme_color_raw_rgba(rgba.clone(), false).unwrap();
        assert_eq!((all.color, all.count), (Rgb::new(255, 255, 255), 150));

        let opaque = theme_color_raw_rgba(rgba, true).unwrap();
        assert_eq!((opaque.color, opaque.count), (Rgb::new(0, 128, 128), 120));
        assert!(opaque.is_dark);
    }

    #[test]
    fn skip_transparent_changes_the_winner() {
        // 300 transparent white pixels, 200 opaque navy ones.
        let img = RgbaImage::from_fn(25, 20, |x, _| {
            if x < 15 { Rgba([255, 255, 255, 0]) } else { Rgba([0, 0, 128, 255]) }
        });
        let pixels = PixelBuffer::from_rgba(img);

        let all = theme_color_pixels(&pixels, &ThemeColorOptions::default()).unwrap();
        assert_eq!(all.color, Rgb::new(255, 255, 255));

        let opaque = ThemeColorOptions { alpha: AlphaPolicy::SkipTransparent, ..Default::default() };
        let result = theme_color_pixels(&pixels, &opaque).unwrap();
        assert_eq!(result.color, Rgb::new(0, 0, 128));
        assert!(result.is_dark);
    }
}
