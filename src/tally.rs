use std::cmp::Ordering;
use std::collections::HashMap;

use image::{DynamicImage, RgbaImage};

use crate::color::Rgb;
use crate::error::ThemeColorError;

/// A color has to show up strictly more often than this to count as dominant.
///
/// Large photographs with smooth gradients produce huge numbers of colors
/// that each occur a handful of times; only a flat region of a single color
/// should win. Images with fewer than 101 pixels can therefore never yield
/// a result at this threshold.
pub const SIGNIFICANCE_THRESHOLD: u32 = 100;

/// How pixels are treated based on their alpha value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaPolicy {
    /// Alpha is ignored entirely: every pixel is tallied by its RGB.
    #[default]
    Include,
    /// Fully transparent pixels (alpha == 0) are left out of the tally.
    SkipTransparent,
}

// ------------------------------------------------------------
// Pixel buffer
// ------------------------------------------------------------

/// Interleaved RGBA8 raster data. The length is always a multiple of 4.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    raw: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, e.g. from a canvas `getImageData` call.
    pub fn from_raw(raw: Vec<u8>) -> Result<Self, ThemeColorError> {
        if raw.len() % 4 != 0 {
            return Err(ThemeColorError::MalformedBuffer { len: raw.len() });
        }
        Ok(Self { raw })
    }

    pub fn from_rgba(img: RgbaImage) -> Self {
        // `RgbaImage` always holds 4 channels per pixel.
        Self { raw: img.into_raw() }
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        Self::from_rgba(img.to_rgba8())
    }

    pub fn pixel_count(&self) -> usize {
        self.raw.len() / 4
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

// ------------------------------------------------------------
// Tally
// ------------------------------------------------------------

/// A color together with how many pixels carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DominantColor {
    pub color: Rgb,
    pub count: u32,
}

/// Higher count wins; on equal counts the lexicographically smaller RGB wins.
fn strength(a: &DominantColor, b: &DominantColor) -> Ordering {
    a.count.cmp(&b.count).then_with(|| b.color.cmp(&a.color))
}

/// Occurrence count per exact RGB triple.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorTally {
    counts: HashMap<Rgb, u32>,
}

impl ColorTally {
    /// Count every pixel by its (R, G, B), dropping the alpha byte.
    ///
    /// Colors are compared with plain integer equality; no bucketing of
    /// nearby shades takes place.
    pub fn from_pixels(pixels: &PixelBuffer, alpha: AlphaPolicy) -> Self {
        let mut counts: HashMap<Rgb, u32> = HashMap::new();

        for chunk in pixels.as_bytes().chunks_exact(4) {
            if alpha == AlphaPolicy::SkipTransparent && chunk[3] == 0 {
                continue;
            }
            let rgb = Rgb::new(chunk[0], chunk[1], chunk[2]);
            *counts.entry(rgb).or_insert(0) += 1;
        }

        Self { counts }
    }

    pub fn get(&self, color: Rgb) -> Option<u32> {
        self.counts.get(&color).copied()
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of tallied pixels.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rgb, u32)> + '_ {
        self.counts.iter().map(|(&color, &count)| (color, count))
    }

    fn significant(&self, threshold: u32) -> impl Iterator<Item = DominantColor> + '_ {
        self.iter()
            .filter(move |&(_, count)| count > threshold)
            .map(|(color, count)| DominantColor { color, count })
    }

    /// The most frequent color occurring more than `threshold` times.
    pub fn dominant(&self, threshold: u32) -> Result<DominantColor, ThemeColorError> {
        let best = self
            .significant(threshold)
            .max_by(strength)
            .ok_or(ThemeColorError::NoDominantColor { threshold })?;

        tracing::debug!(
            color = %best.color,
            count = best.count,
            distinct = self.len(),
            "most appearing color"
        );
        Ok(best)
    }

    /// Every color above `threshold`, strongest first.
    pub fn ranked(&self, threshold: u32) -> Vec<DominantColor> {
        let mut colors: Vec<DominantColor> = self.significant(threshold).collect();
        colors.sort_by(|a, b| strength(b, a));
        colors
    }
}
