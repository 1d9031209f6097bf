use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::audio::{FeatureSample, BAND_COUNT};
use crate::config::{RotationAxis, SpinDirection};
use crate::render::RenderConfig;

/// One particle of the background starfield, tracked in polar
/// coordinates around the frame center
#[derive(Debug, Clone)]
pub struct Star {
    pub angle: f32,
    pub radius: f32,
    pub speed: f32,
    pub size: f32,
}

/// One frame's waveform point sets, kept in the trail ring buffer
///
/// Points are final screen coordinates, already axis-transformed; the
/// hue offset is frozen at generation time so old generations keep the
/// color they were born with.
#[derive(Debug, Clone)]
pub struct WaveformGeneration {
    pub rings: [Vec<(f32, f32)>; BAND_COUNT],
    pub hue_offset: f32,
    pub bands: [f32; BAND_COUNT],
}

/// The mutable animation state advanced exactly once per video frame
///
/// All randomness comes from the seeded generator, so the same feature
/// stream and configuration always produce the same state sequence.
pub struct SceneState {
    pub stars: Vec<Star>,
    pub trail: VecDeque<WaveformGeneration>,
    pub waveform_phase: f32,
    pub ring_phase: f32,
    pub hue_offset: f32,
    pub beat_boost: f32,
    pub volume: f32,
    width: f32,
    height: f32,
    rng: SmallRng,
}

impl SceneState {
    pub fn new(config: &RenderConfig) -> Self {
        let width = config.width as f32;
        let height = config.height as f32;
        let max_radius = (width * width + height * height).sqrt() / 2.0;

        let mut rng = SmallRng::seed_from_u64(config.scene.seed);
        let stars = (0..config.scene.star_count)
            .map(|_| Star {
                angle: rng.gen_range(0.0..std::f32::consts::TAU),
                radius: rng.gen_range(0.0..max_radius),
                speed: rng.gen_range(0.5..2.0),
                size: rng.gen_range(1.0..3.0),
            })
            .collect();

        Self {
            stars,
            trail: VecDeque::with_capacity(config.scene.trail_depth + 1),
            waveform_phase: 0.0,
            ring_phase: 0.0,
            hue_offset: 0.0,
            beat_boost: 0.0,
            volume: 0.0,
            width,
            height,
            rng,
        }
    }

    /// Radius past which a star leaves the frame from any direction
    pub fn max_radius(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt() / 2.0
    }

    /// Advance the scene by one frame using the current audio features
    pub fn advance(&mut self, sample: &FeatureSample, config: &RenderConfig) {
        let scene = &config.scene;
        self.volume = sample.volume;

        let rotation =
            scene.base_rotation_speed + sample.volume * scene.volume_rotation_multiplier;
        self.waveform_phase = (self.waveform_phase + rotation).rem_euclid(std::f32::consts::TAU);
        // Rings counter-rotate at twice the waveform rate
        self.ring_phase = (self.ring_phase - 2.0 * rotation).rem_euclid(std::f32::consts::TAU);

        self.hue_offset =
            (self.hue_offset + scene.hue_shift_base + sample.volume).rem_euclid(360.0);

        if sample.beat {
            self.beat_boost = scene.beat_boost_max;
        } else {
            self.beat_boost *= scene.beat_boost_decay;
        }

        self.advance_stars(sample.volume, config);

        let generation = self.generate_waveform(sample, config);
        self.trail.push_back(generation);
        while self.trail.len() > scene.trail_depth {
            self.trail.pop_front();
        }
    }

    fn advance_stars(&mut self, volume: f32, config: &RenderConfig) {
        let scene = &config.scene;
        let max_radius = self.max_radius();
        let speed_scale =
            scene.star_base_speed * (1.0 + volume * scene.star_volume_multiplier);
        let spin = match config.starfield_rotation {
            SpinDirection::None => 0.0,
            SpinDirection::Cw => scene.base_rotation_speed + volume * scene.volume_rotation_multiplier,
            SpinDirection::Ccw => {
                -(scene.base_rotation_speed + volume * scene.volume_rotation_multiplier)
            }
        };

        for star in &mut self.stars {
            star.radius += star.speed * speed_scale;
            star.angle = (star.angle + spin).rem_euclid(std::f32::consts::TAU);

            if star.radius > max_radius {
                // Recycle: back to the center with fresh parameters
                star.radius = 0.0;
                star.angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                star.speed = self.rng.gen_range(0.5..2.0);
                star.size = self.rng.gen_range(1.0..3.0);
            }
        }
    }

    /// Build this frame's waveform rings: one closed point loop per band,
    /// radius modulated by the band's energy, then axis-transformed
    fn generate_waveform(&self, sample: &FeatureSample, config: &RenderConfig) -> WaveformGeneration {
        let center = (self.width / 2.0, self.height / 2.0);
        let base_unit = self.width.min(self.height);
        let points = config.scene.waveform_points;

        let rings = std::array::from_fn(|band| {
            let energy = sample.bands[band];
            let base_radius = base_unit * (0.14 + 0.045 * band as f32);
            let lobes = (band + 3) as f32;

            (0..points)
                .map(|p| {
                    let theta = p as f32 / points as f32 * std::f32::consts::TAU;
                    let wobble =
                        0.5 + 0.5 * (theta * lobes + self.waveform_phase * 3.0).sin();
                    let radius = base_radius * (1.0 + energy * 0.4 * wobble);
                    let point = (theta.cos() * radius, theta.sin() * radius);
                    let (x, y) =
                        transform_point(point, config.waveform_rotation, self.waveform_phase);
                    (center.0 + x, center.1 + y)
                })
                .collect()
        });

        WaveformGeneration {
            rings,
            hue_offset: self.hue_offset,
            bands: sample.bands,
        }
    }
}

/// Apply an axis rotation to a point relative to the frame center
///
/// Rotation about the z axis is a plain 2D rotation; rotation about the
/// x or y axis projects as a squeeze of the vertical or horizontal
/// extent by |cos phase|.
pub fn transform_point(point: (f32, f32), axis: RotationAxis, phase: f32) -> (f32, f32) {
    match axis {
        RotationAxis::None => point,
        RotationAxis::Z => {
            let (sin, cos) = phase.sin_cos();
            (
                point.0 * cos - point.1 * sin,
                point.0 * sin + point.1 * cos,
            )
        }
        RotationAxis::X => (point.0, point.1 * phase.cos().abs()),
        RotationAxis::Y => (point.0 * phase.cos().abs(), point.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_config;

    fn sample(volume: f32, beat: bool) -> FeatureSample {
        FeatureSample {
            time: 0.0,
            bands: [volume; BAND_COUNT],
            volume,
            beat,
        }
    }

    #[test]
    fn test_same_seed_same_evolution() {
        let config = test_config();
        let mut a = SceneState::new(&config);
        let mut b = SceneState::new(&config);

        for i in 0..100 {
            let s = sample(0.7, i % 20 == 0);
            a.advance(&s, &config);
            b.advance(&s, &config);
        }

        assert_eq!(a.hue_offset, b.hue_offset);
        assert_eq!(a.waveform_phase, b.waveform_phase);
        for (sa, sb) in a.stars.iter().zip(&b.stars) {
            assert_eq!(sa.radius, sb.radius);
            assert_eq!(sa.angle, sb.angle);
        }
    }

    #[test]
    fn test_stars_drift_outward_and_respawn() {
        let config = test_config();
        let mut scene = SceneState::new(&config);
        let max_radius = scene.max_radius();

        let before: Vec<f32> = scene.stars.iter().map(|s| s.radius).collect();
        scene.advance(&sample(1.0, false), &config);

        for (star, &old) in scene.stars.iter().zip(&before) {
            // Either moved outward, or wrapped back to the center
            assert!(
                star.radius > old || star.radius == 0.0,
                "star neither advanced nor respawned: {} -> {}",
                old,
                star.radius
            );
            assert!(star.radius <= max_radius);
        }
    }

    #[test]
    fn test_star_respawn_boundary() {
        let config = test_config();
        let mut scene = SceneState::new(&config);
        let max_radius = scene.max_radius();

        // At volume 0 the per-frame step is speed * star_base_speed
        scene.stars[0].radius = max_radius - 0.001;
        scene.stars[0].speed = 1.0;
        scene.stars[1].radius = max_radius - 10.0;
        scene.stars[1].speed = 1.0;

        scene.advance(&sample(0.0, false), &config);

        assert_eq!(scene.stars[0].radius, 0.0);
        assert!(scene.stars[1].radius > 0.0);
        assert!(scene.stars[1].radius < max_radius);
    }

    #[test]
    fn test_beat_boost_set_then_decays() {
        let config = test_config();
        let mut scene = SceneState::new(&config);

        scene.advance(&sample(0.5, true), &config);
        assert_eq!(scene.beat_boost, config.scene.beat_boost_max);

        scene.advance(&sample(0.5, false), &config);
        let expected = config.scene.beat_boost_max * config.scene.beat_boost_decay;
        assert!((scene.beat_boost - expected).abs() < 1e-6);
    }

    #[test]
    fn test_trail_capped_at_depth() {
        let config = test_config();
        let mut scene = SceneState::new(&config);

        for _ in 0..config.scene.trail_depth * 3 {
            scene.advance(&sample(0.5, false), &config);
        }
        assert_eq!(scene.trail.len(), config.scene.trail_depth);
    }

    #[test]
    fn test_trail_generations_keep_their_hue() {
        let config = test_config();
        let mut scene = SceneState::new(&config);

        scene.advance(&sample(0.5, false), &config);
        scene.advance(&sample(0.5, false), &config);

        let hues: Vec<f32> = scene.trail.iter().map(|g| g.hue_offset).collect();
        assert_eq!(hues.len(), 2);
        assert_ne!(hues[0], hues[1]);
    }

    #[test]
    fn test_z_rotation_preserves_distance() {
        let p = (10.0, 0.0);
        let (x, y) = transform_point(p, RotationAxis::Z, 1.0);
        let dist = (x * x + y * y).sqrt();
        assert!((dist - 10.0).abs() < 1e-4);
        assert_ne!((x, y), p);
    }

    #[test]
    fn test_x_rotation_squeezes_vertical() {
        let phase = std::f32::consts::FRAC_PI_3;
        let (x, y) = transform_point((4.0, 8.0), RotationAxis::X, phase);
        assert_eq!(x, 4.0);
        assert!(y.abs() < 8.0);
        assert!((y - 8.0 * phase.cos()).abs() < 1e-5);
    }

    #[test]
    fn test_y_rotation_squeezes_horizontal() {
        let phase = std::f32::consts::FRAC_PI_3;
        let (x, y) = transform_point((4.0, 8.0), RotationAxis::Y, phase);
        assert_eq!(y, 8.0);
        assert!(x.abs() < 4.0);
    }

    #[test]
    fn test_waveform_rings_have_configured_points() {
        let config = test_config();
        let mut scene = SceneState::new(&config);
        scene.advance(&sample(0.8, false), &config);

        let generation = scene.trail.back().unwrap();
        for ring in &generation.rings {
            assert_eq!(ring.len(), config.scene.waveform_points);
        }
    }
}
