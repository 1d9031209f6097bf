//! # Frame Synthesis Module
//!
//! The deterministic rendering engine: a mutable [`SceneState`] advanced
//! once per video frame from the audio feature stream, a fixed chain of
//! layer renderers painting into a shared [`Frame`], and the
//! [`FrameSynthesizer`] orchestrating the whole loop.
//!
//! Compositing order is fixed: starfield, waveforms, cover/rings, text.
//! Given the same sample buffer and configuration, the produced frame
//! sequence is bit-identical across runs.

pub mod draw;
pub mod frame;
pub mod layers;
pub mod palette;
pub mod scene;
pub mod synthesizer;

pub use frame::Frame;
pub use palette::{Palette, PaletteRegistry};
pub use scene::SceneState;
pub use synthesizer::FrameSynthesizer;

use image::RgbImage;

use crate::config::{
    Config, CoverShape, RingShape, RotationAxis, SceneConfig, SpinDirection,
};
use crate::error::{ConfigError, Result};

/// Immutable, fully resolved render configuration
///
/// Built once before synthesis from the user-facing [`Config`] plus any
/// loaded assets (palette, cover image, font); read-only for the lifetime
/// of a render.
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub palette: Palette,
    pub waveform_rotation: RotationAxis,
    pub ring_rotation: RotationAxis,
    pub starfield_rotation: SpinDirection,
    pub cover: Option<RgbImage>,
    pub cover_shape: CoverShape,
    pub cover_size: f32,
    pub kaleidoscope_segments: Option<u32>,
    pub ring_shape: RingShape,
    pub text: Option<String>,
    pub font: Option<fontdue::Font>,
    pub rings_enabled: bool,
    pub starfield_enabled: bool,
    pub preview_seconds: Option<f64>,
    pub scene: SceneConfig,
}

impl RenderConfig {
    /// Resolve the user configuration into the immutable render record
    ///
    /// `--proof` halves the output resolution here; it is purely a
    /// configuration transform, not a separate render path.
    pub fn resolve(
        config: &Config,
        palette: Palette,
        cover: Option<RgbImage>,
        font: Option<fontdue::Font>,
    ) -> Self {
        let (mut width, mut height) = config.visual.resolution;
        if config.visual.proof {
            width = (width / 2).max(2);
            height = (height / 2).max(2);
        }

        Self {
            width,
            height,
            fps: config.visual.fps,
            palette,
            waveform_rotation: config.visual.waveform_rotation,
            ring_rotation: config.visual.ring_rotation,
            starfield_rotation: config.visual.starfield_rotation,
            cover,
            cover_shape: config.visual.cover_shape,
            cover_size: config.visual.cover_size,
            kaleidoscope_segments: config.visual.kaleidoscope_segments,
            ring_shape: config.visual.ring_shape,
            text: config.visual.text.clone(),
            font,
            rings_enabled: !config.visual.disable_rings,
            starfield_enabled: !config.visual.disable_starfield,
            preview_seconds: config.visual.preview_seconds,
            scene: config.scene.clone(),
        }
    }

    /// Check internal consistency before any frame is produced
    pub fn validate(&self) -> Result<()> {
        if self.fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "fps".to_string(),
                value: self.fps.to_string(),
            }
            .into());
        }

        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "resolution".to_string(),
                value: format!("{}x{}", self.width, self.height),
            }
            .into());
        }

        Ok(())
    }

    /// Frame center in pixel coordinates
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Base size of the cover/ring cluster, scaled by the size multiplier
    pub fn cover_base_size(&self) -> f32 {
        self.width.min(self.height) as f32 * 0.525 * self.cover_size
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> RenderConfig {
    let config = Config::default();
    let registry = PaletteRegistry::new();
    let palette = registry.get("rainbow").unwrap().clone();
    let mut render = RenderConfig::resolve(&config, palette, None, None);
    render.width = 160;
    render.height = 90;
    render
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_halves_resolution() {
        let mut config = Config::default();
        config.visual.resolution = (1280, 720);
        config.visual.proof = true;

        let registry = PaletteRegistry::new();
        let palette = registry.get("rainbow").unwrap().clone();
        let render = RenderConfig::resolve(&config, palette, None, None);

        assert_eq!((render.width, render.height), (640, 360));
    }

    #[test]
    fn test_validation_rejects_zero_fps() {
        let mut render = test_config();
        render.fps = 0.0;
        assert!(render.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_resolution() {
        let mut render = test_config();
        render.height = 0;
        assert!(render.validate().is_err());
    }
}
