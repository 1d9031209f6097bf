use std::collections::VecDeque;

use crate::audio::analyzer::HopFeatures;
use crate::config::AnalysisConfig;

/// Low-band slice used for transient detection: sub-bass through low-mid
/// (20-200 Hz)
const LOW_BANDS: std::ops::Range<usize> = 0..4;

/// Transient detector flagging sudden low-band energy increases
///
/// Keeps a rolling average of combined low-band energy; a frame is a beat
/// when its instantaneous energy exceeds the rolling average by the
/// sensitivity ratio, with a cooldown so a single transient's decay cannot
/// retrigger. Processing is strictly sequential: the rolling window and
/// cooldown counter carry state across frames.
pub struct BeatDetector {
    sensitivity: f32,
    smoothing_frames: usize,
    cooldown_frames: usize,
}

impl BeatDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            sensitivity: config.beat_sensitivity,
            smoothing_frames: config.beat_smoothing_frames,
            cooldown_frames: config.beat_cooldown_frames,
        }
    }

    /// Produce one beat flag per hop, in order
    ///
    /// The first `smoothing_frames` hops never flag: there is no baseline
    /// to compare against yet. This is deterministic, not an error.
    pub fn detect(&self, hops: &[HopFeatures]) -> Vec<bool> {
        let mut flags = vec![false; hops.len()];
        let mut history: VecDeque<f32> = VecDeque::with_capacity(self.smoothing_frames);
        let mut history_sum = 0.0f32;
        let mut cooldown = 0usize;

        for (i, hop) in hops.iter().enumerate() {
            let low_energy: f32 = hop.bands[LOW_BANDS].iter().sum();

            if history.len() >= self.smoothing_frames {
                let rolling_mean = history_sum / history.len() as f32;
                if cooldown == 0
                    && rolling_mean > f32::EPSILON
                    && low_energy > rolling_mean * self.sensitivity
                {
                    flags[i] = true;
                    cooldown = self.cooldown_frames;
                }
            }

            if cooldown > 0 {
                cooldown -= 1;
            }

            history_sum += low_energy;
            history.push_back(low_energy);
            if history.len() > self.smoothing_frames {
                if let Some(evicted) = history.pop_front() {
                    history_sum -= evicted;
                }
            }
        }

        let beat_count = flags.iter().filter(|&&f| f).count();
        tracing::debug!(
            "Beat detection: {} beats over {} frames (sensitivity {:.2}, cooldown {})",
            beat_count,
            hops.len(),
            self.sensitivity,
            self.cooldown_frames
        );

        flags
    }
}
