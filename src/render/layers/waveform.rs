use crate::audio::FeatureSample;
use crate::error::Result;
use crate::render::draw;
use crate::render::frame::Frame;
use crate::render::layers::LayerRenderer;
use crate::render::scene::SceneState;
use crate::render::RenderConfig;

/// Waveform rings with an afterimage trail
///
/// Draws every generation in the trail oldest-first with ramped opacity,
/// so past frames linger as ghosts behind the current one. Each
/// generation is drawn with the hue offset it was generated under.
pub struct WaveformLayer;

impl LayerRenderer for WaveformLayer {
    fn name(&self) -> &'static str {
        "waveform"
    }

    fn render(
        &self,
        frame: &mut Frame,
        scene: &SceneState,
        _sample: &FeatureSample,
        config: &RenderConfig,
    ) -> Result<()> {
        let depth = scene.trail.len();

        for (age, generation) in scene.trail.iter().enumerate() {
            let newest = age + 1 == depth;
            // Oldest generation faintest, newest fully opaque
            let ramp = (age + 1) as f32 / depth as f32;
            let alpha = if newest { 1.0 } else { ramp * 0.55 };
            let width = if newest { 2.0 } else { 1.2 };

            for (band, ring) in generation.rings.iter().enumerate() {
                let energy = generation.bands[band];
                let color = config.palette.band_color(
                    band,
                    generation.hue_offset,
                    0.35 + 0.65 * energy,
                );
                draw::polyline(frame, ring, true, width, color, alpha);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BAND_COUNT;
    use crate::render::test_config;

    fn sample(level: f32) -> FeatureSample {
        FeatureSample {
            time: 0.0,
            bands: [level; BAND_COUNT],
            volume: level,
            beat: false,
        }
    }

    #[test]
    fn test_empty_trail_draws_nothing() {
        let config = test_config();
        let scene = SceneState::new(&config);
        let mut frame = Frame::new(config.width, config.height);

        WaveformLayer
            .render(&mut frame, &scene, &sample(0.5), &config)
            .unwrap();
        assert!(frame.is_black());
    }

    #[test]
    fn test_trail_paints_after_advance() {
        let config = test_config();
        let mut scene = SceneState::new(&config);
        scene.advance(&sample(0.8), &config);

        let mut frame = Frame::new(config.width, config.height);
        WaveformLayer
            .render(&mut frame, &scene, &sample(0.8), &config)
            .unwrap();
        assert!(!frame.is_black());
    }

    #[test]
    fn test_deeper_trail_adds_ghosts() {
        let config = test_config();

        let mut shallow = SceneState::new(&config);
        shallow.advance(&sample(0.8), &config);
        let mut frame_one = Frame::new(config.width, config.height);
        WaveformLayer
            .render(&mut frame_one, &shallow, &sample(0.8), &config)
            .unwrap();

        let mut deep = SceneState::new(&config);
        for _ in 0..config.scene.trail_depth {
            deep.advance(&sample(0.8), &config);
        }
        let mut frame_many = Frame::new(config.width, config.height);
        WaveformLayer
            .render(&mut frame_many, &deep, &sample(0.8), &config)
            .unwrap();

        let lit = |f: &Frame| {
            (0..f.height())
                .flat_map(|y| (0..f.width()).map(move |x| (x, y)))
                .filter(|&(x, y)| f.pixel(x, y) != [0, 0, 0])
                .count()
        };
        assert!(lit(&frame_many) > lit(&frame_one));
    }
}
