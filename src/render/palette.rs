use std::collections::HashMap;

use crate::audio::BAND_COUNT;
use crate::error::{ConfigError, Result};

/// A color scheme: one base hue per frequency band plus global
/// saturation and brightness
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Base hue in degrees for each band, low to high
    pub hues: [f32; BAND_COUNT],
    pub saturation: f32,
    pub brightness: f32,
}

impl Palette {
    /// Color for a band at the given hue offset and value scale
    ///
    /// The hue offset drifts over the course of the track so no band is
    /// pinned to a single color.
    pub fn band_color(&self, band: usize, hue_offset: f32, value: f32) -> [u8; 3] {
        let hue = (self.hues[band % BAND_COUNT] + hue_offset).rem_euclid(360.0);
        hsv_to_rgb(hue, self.saturation, self.brightness * value.clamp(0.0, 1.0))
    }
}

/// Registry of the built-in color palettes, keyed by name
///
/// Lookup is case-insensitive.
pub struct PaletteRegistry {
    palettes: HashMap<String, Palette>,
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteRegistry {
    pub fn new() -> Self {
        let mut palettes = HashMap::new();

        let mut register = |name: &str, hues: [f32; BAND_COUNT], saturation: f32, brightness: f32| {
            palettes.insert(
                name.to_string(),
                Palette {
                    hues,
                    saturation,
                    brightness,
                },
            );
        };

        register(
            "rainbow",
            [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0],
            1.0,
            1.0,
        );
        register(
            "spring",
            [80.0, 100.0, 120.0, 140.0, 280.0, 300.0, 320.0, 340.0],
            0.8,
            0.95,
        );
        register(
            "summer",
            [30.0, 45.0, 60.0, 180.0, 200.0, 220.0, 240.0, 260.0],
            1.0,
            1.0,
        );
        register(
            "autumn",
            [0.0, 15.0, 30.0, 35.0, 40.0, 25.0, 20.0, 10.0],
            0.9,
            0.85,
        );
        register(
            "winter",
            [180.0, 200.0, 220.0, 240.0, 260.0, 200.0, 190.0, 210.0],
            0.7,
            0.9,
        );
        register(
            "ice",
            [180.0, 190.0, 200.0, 210.0, 220.0, 200.0, 195.0, 205.0],
            0.5,
            1.0,
        );
        register(
            "fire",
            [0.0, 10.0, 20.0, 30.0, 40.0, 25.0, 15.0, 35.0],
            1.0,
            0.95,
        );
        register(
            "water",
            [160.0, 170.0, 180.0, 190.0, 150.0, 165.0, 175.0, 185.0],
            0.8,
            0.9,
        );
        register(
            "earth",
            [25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0],
            0.6,
            0.7,
        );

        Self { palettes }
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Look up a palette or fail with the list of valid names
    pub fn resolve(&self, name: &str) -> Result<Palette> {
        self.get(name).cloned().ok_or_else(|| {
            ConfigError::UnknownPalette {
                name: name.to_string(),
                available: self.available_names().join(", "),
            }
            .into()
        })
    }

    /// All registered palette names, sorted
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.palettes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// HSV to RGB with a vibrancy boost
///
/// Hue in degrees, saturation and value in [0, 1]. Channels get a 1.2x
/// boost before clamping so colors read saturated even at low value.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let hue = hue.rem_euclid(360.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);

    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let boost = |ch: f32| (((ch + m) * 1.2).min(1.0) * 255.0).round() as u8;
    [boost(r), boost(g), boost(b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_palettes() {
        let registry = PaletteRegistry::new();
        for name in [
            "rainbow", "spring", "summer", "autumn", "winter", "ice", "fire", "water", "earth",
        ] {
            assert!(registry.get(name).is_some(), "missing palette {name}");
        }
        assert_eq!(registry.available_names().len(), 9);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let registry = PaletteRegistry::new();
        assert!(registry.get("Rainbow").is_some());
        assert!(registry.get("FIRE").is_some());
    }

    #[test]
    fn test_unknown_palette_errors() {
        let registry = PaletteRegistry::new();
        assert!(registry.resolve("plasma").is_err());
    }

    #[test]
    fn test_hsv_primaries() {
        // Boost saturates the dominant channel for full-value primaries
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0, 0, 255]);
    }

    #[test]
    fn test_hsv_zero_value_is_black() {
        assert_eq!(hsv_to_rgb(180.0, 1.0, 0.0), [0, 0, 0]);
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(-90.0, 1.0, 1.0), hsv_to_rgb(270.0, 1.0, 1.0));
    }

    #[test]
    fn test_band_color_hue_offset_shifts() {
        let registry = PaletteRegistry::new();
        let palette = registry.get("rainbow").unwrap();
        let base = palette.band_color(0, 0.0, 1.0);
        let shifted = palette.band_color(0, 120.0, 1.0);
        assert_ne!(base, shifted);
        // Offset by a full band step lands on the next band's color
        assert_eq!(palette.band_color(0, 45.0, 1.0), palette.band_color(1, 0.0, 1.0));
    }
}
