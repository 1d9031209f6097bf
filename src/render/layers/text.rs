use crate::audio::FeatureSample;
use crate::error::Result;
use crate::render::frame::Frame;
use crate::render::layers::LayerRenderer;
use crate::render::scene::SceneState;
use crate::render::RenderConfig;

/// Title text overlay, pulsing with the music
///
/// Opacity follows volume with a beat kick; glyphs get a small drop
/// shadow so they stay readable over bright waveforms. Sits below the
/// cover when one is shown, otherwise at 70% frame height.
pub struct TextLayer;

impl LayerRenderer for TextLayer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(
        &self,
        frame: &mut Frame,
        scene: &SceneState,
        sample: &FeatureSample,
        config: &RenderConfig,
    ) -> Result<()> {
        let (Some(text), Some(font)) = (&config.text, &config.font) else {
            return Ok(());
        };

        let px = (config.height as f32 * 0.055).max(12.0);
        let opacity = (0.3 + 0.7 * sample.volume + 0.2 * scene.beat_boost).clamp(0.0, 1.0);

        let total_width: f32 = text
            .chars()
            .map(|ch| font.metrics(ch, px).advance_width)
            .sum();

        let baseline_y = if config.cover.is_some() {
            let cover_half = config.cover_base_size() * 0.62 / 2.0;
            config.center().1 + cover_half + px * 1.4
        } else {
            config.height as f32 * 0.7
        };
        let start_x = config.center().0 - total_width / 2.0;

        draw_text(frame, font, text, px, (start_x + 2.0, baseline_y + 2.0), [0, 0, 0], opacity * 0.6);
        draw_text(frame, font, text, px, (start_x, baseline_y), [255, 255, 255], opacity);

        Ok(())
    }
}

fn draw_text(
    frame: &mut Frame,
    font: &fontdue::Font,
    text: &str,
    px: f32,
    origin: (f32, f32),
    color: [u8; 3],
    opacity: f32,
) {
    let mut pen_x = origin.0;
    for ch in text.chars() {
        let (metrics, bitmap) = font.rasterize(ch, px);
        let glyph_left = pen_x + metrics.xmin as f32;
        let glyph_top = origin.1 - metrics.height as f32 - metrics.ymin as f32;

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let coverage = bitmap[row * metrics.width + col];
                if coverage == 0 {
                    continue;
                }
                let alpha = coverage as f32 / 255.0 * opacity;
                frame.blend_over(
                    (glyph_left + col as f32) as i32,
                    (glyph_top + row as f32) as i32,
                    color,
                    alpha,
                );
            }
        }

        pen_x += metrics.advance_width;
    }
}
