use crate::audio::FeatureSample;
use crate::error::Result;
use crate::render::draw;
use crate::render::frame::Frame;
use crate::render::layers::LayerRenderer;
use crate::render::scene::SceneState;
use crate::render::RenderConfig;

/// Background starfield: particles streaming outward from the center,
/// accelerating with volume
///
/// Stars brighten and grow as they travel outward, reading as depth.
pub struct StarfieldLayer;

impl LayerRenderer for StarfieldLayer {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn render(
        &self,
        frame: &mut Frame,
        scene: &SceneState,
        sample: &FeatureSample,
        _config: &RenderConfig,
    ) -> Result<()> {
        let center = (frame.width() as f32 / 2.0, frame.height() as f32 / 2.0);
        let max_radius = scene.max_radius();

        for star in &scene.stars {
            let depth = (star.radius / max_radius).clamp(0.0, 1.0);
            let x = center.0 + star.angle.cos() * star.radius;
            let y = center.1 + star.angle.sin() * star.radius;

            let brightness = (0.3 + 0.7 * depth) * (0.6 + 0.4 * sample.volume);
            let level = (brightness.clamp(0.0, 1.0) * 255.0) as u8;
            let size = star.size * (0.5 + 0.5 * depth);
            let color = [level, level, level];

            draw::glow(frame, x, y, size * 2.5, color, 0.2);
            draw::disc(frame, x, y, size, color, 0.9);
        }

        Ok(())
    }
}
