use crate::audio::FeatureSample;
use crate::config::{CoverShape, RingShape};
use crate::error::Result;
use crate::render::draw;
use crate::render::frame::Frame;
use crate::render::layers::LayerRenderer;
use crate::render::scene::{transform_point, SceneState};
use crate::render::RenderConfig;

/// Points sampled along each ring outline
const RING_POINTS: usize = 96;

/// Number of concentric rings around the cover
const RING_COUNT: usize = 3;

/// Center-piece layer: the optional cover art framed by pulsing rings
///
/// Rings expand with the beat boost and breathe with volume; the
/// configured rotation axis squeezes them into ellipses as the phase
/// advances. The cover itself can be masked square or round, or refracted
/// through a kaleidoscope.
pub struct CoverRingLayer;

impl LayerRenderer for CoverRingLayer {
    fn name(&self) -> &'static str {
        "cover_ring"
    }

    fn render(
        &self,
        frame: &mut Frame,
        scene: &SceneState,
        sample: &FeatureSample,
        config: &RenderConfig,
    ) -> Result<()> {
        if let Some(cover) = &config.cover {
            blit_cover(frame, cover, scene, config);
        }
        if config.rings_enabled {
            draw_rings(frame, scene, sample, config);
        }
        Ok(())
    }
}

fn draw_rings(frame: &mut Frame, scene: &SceneState, sample: &FeatureSample, config: &RenderConfig) {
    let center = config.center();
    let base = config.cover_base_size();

    for ring_idx in 0..RING_COUNT {
        let radius = base
            * (0.4 + 0.2 * ring_idx as f32)
            * (1.0 + scene.beat_boost)
            * (1.0 + sample.volume * 0.15);

        let outline: Vec<(f32, f32)> = (0..RING_POINTS)
            .map(|p| {
                let t = p as f32 / RING_POINTS as f32;
                let point = match config.ring_shape {
                    RingShape::Circle => {
                        let theta = t * std::f32::consts::TAU;
                        (theta.cos() * radius, theta.sin() * radius)
                    }
                    RingShape::Square => square_perimeter(t, radius),
                };
                let (x, y) = transform_point(point, config.ring_rotation, scene.ring_phase);
                (center.0 + x, center.1 + y)
            })
            .collect();

        let energy = sample.bands[ring_idx * 2];
        let color = config
            .palette
            .band_color(ring_idx * 2, scene.hue_offset, 0.5 + 0.5 * energy);

        // Halo pass under the crisp outline
        draw::polyline(frame, &outline, true, 5.0, color, 0.18);
        draw::polyline(frame, &outline, true, 2.0, color, 0.9);
    }
}

/// Map t in [0, 1) onto the perimeter of an axis-aligned square with
/// half-side `radius`, starting at the top-right corner
fn square_perimeter(t: f32, radius: f32) -> (f32, f32) {
    let side = t * 4.0;
    let offset = radius * (2.0 * side.fract() - 1.0);
    match side as u32 {
        0 => (radius, offset),
        1 => (-offset, radius),
        2 => (-radius, -offset),
        _ => (offset, -radius),
    }
}

fn blit_cover(
    frame: &mut Frame,
    cover: &image::RgbImage,
    scene: &SceneState,
    config: &RenderConfig,
) {
    let center = config.center();
    // Round covers breathe with the music; square covers stay fixed
    let reactive = match config.cover_shape {
        CoverShape::Round => 1.0 + 0.1 * scene.volume + 0.15 * scene.beat_boost,
        CoverShape::Square => 1.0,
    };
    let side = config.cover_base_size() * 0.62 * reactive;
    let half = side / 2.0;

    let left = (center.0 - half).floor() as i32;
    let top = (center.1 - half).floor() as i32;
    let extent = side.ceil() as i32;

    for dy in 0..extent {
        for dx in 0..extent {
            let x = left + dx;
            let y = top + dy;
            let px = x as f32 + 0.5 - center.0;
            let py = y as f32 + 0.5 - center.1;

            let (u, v) = match config.kaleidoscope_segments {
                Some(segments) if segments >= 2 => {
                    let r = (px * px + py * py).sqrt();
                    if r > half {
                        continue;
                    }
                    let folded = fold_angle(py.atan2(px), segments);
                    (
                        0.5 + folded.cos() * r / side,
                        0.5 + folded.sin() * r / side,
                    )
                }
                _ => {
                    if matches!(config.cover_shape, CoverShape::Round)
                        && px * px + py * py > half * half
                    {
                        continue;
                    }
                    (0.5 + px / side, 0.5 + py / side)
                }
            };

            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }
            let sx = (u * cover.width() as f32) as u32;
            let sy = (v * cover.height() as f32) as u32;
            let pixel = cover
                .get_pixel(sx.min(cover.width() - 1), sy.min(cover.height() - 1))
                .0;
            frame.blend_over(x, y, pixel, 1.0);
        }
    }
}

/// Fold an angle into the first mirrored kaleidoscope segment
fn fold_angle(theta: f32, segments: u32) -> f32 {
    let segment = std::f32::consts::TAU / segments as f32;
    let wrapped = theta.rem_euclid(segment);
    // Mirror the second half of each segment back onto the first
    if wrapped > segment / 2.0 {
        segment - wrapped
    } else {
        wrapped
    }
}
