use palette::{IntoColor, Lab, Srgb};

use crate::color::Rgb;

/// Colors whose perceived brightness falls below this value are dark.
pub const DARK_BRIGHTNESS_CUTOFF: f32 = 128.0;

/// Perceived brightness in `0.0..=255.0` using the YIQ luma weights
/// (W3C accessibility formula).
pub fn brightness(color: Rgb) -> f32 {
    let c: Srgb<u8> = color.into();
    let weighted = c.red as u32 * 299 + c.green as u32 * 587 + c.blue as u32 * 114;
    weighted as f32 / 1000.0
}

/// Whether `color` should be treated as dark, i.e. wants light text on top.
///
/// Total over every RGB triple.
pub fn is_dark(color: Rgb) -> bool {
    brightness(color) < DARK_BRIGHTNESS_CUTOFF
}

/// CIE L* lightness in `0.0..=100.0`. Informational only.
pub fn lightness(color: Rgb) -> f32 {
    let lab: Lab = color.to_srgb().into_linear().into_color();
    lab.l
}

/// Background and text colors that contrast with a theme color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContrastScheme {
    pub background: Rgb,
    pub foreground: Rgb,
}

const LIGHT_GRAY: Rgb = Rgb::new(0xEE, 0xEE, 0xEE);
const DARK_GRAY: Rgb = Rgb::new(0x33, 0x33, 0x33);

impl ContrastScheme {
    /// A dark theme color is shown on a light page and vice versa.
    pub fn for_color(color: Rgb) -> Self {
        if is_dark(color) {
            Self { background: LIGHT_GRAY, foreground: DARK_GRAY }
        } else {
            Self { background: DARK_GRAY, foreground: LIGHT_GRAY }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_is_dark_white_is_light() {
        assert!(is_dark(Rgb::new(0, 0, 0)));
        assert!(!is_dark(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn near_black_is_dark() {
        assert!(is_dark(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn brightness_bounds() {
        assert_eq!(brightness(Rgb::new(0, 0, 0)), 0.0);
        assert_eq!(brightness(Rgb::new(255, 255, 255)), 255.0);
    }

    #[test]
    fn green_weighs_more_than_blue() {
        // Pure green is light, pure blue is dark.
        assert!(!is_dark(Rgb::new(0, 255, 0)));
        assert!(is_dark(Rgb::new(0, 0, 255)));
        assert!(is_dark(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn cutoff_boundary() {
        // Gray 128 has brightness exactly 128, which is not dark; 127 is.
        assert!(!is_dark(Rgb::new(128, 128, 128)));
        assert!(is_dark(Rgb::new(127, 127, 127)));
    }

    #[test]
    fn lightness_tracks_gray_level() {
        assert!(lightness(Rgb::new(0, 0, 0)).abs() < 0.5);
        assert!((lightness(Rgb::new(255, 255, 255)) - 100.0).abs() < 0.5);
        assert!(lightness(Rgb::new(60, 60, 60)) < lightness(Rgb::new(200, 200, 200)));
    }

    #[test]
    fn contrast_scheme_flips() {
        let dark = ContrastScheme::for_color(Rgb::new(0, 0, 0));
        assert_eq!(dark.background, Rgb::new(0xEE, 0xEE, 0xEE));
        assert_eq!(dark.foreground, Rgb::new(0x33, 0x33, 0x33));

        let light = ContrastScheme::for_color(Rgb::new(250, 250, 250));
        assert_eq!(light.background, dark.foreground);
        assert_eq!(light.foreground, dark.background);
    }
}
