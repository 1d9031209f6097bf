use crate::audio::analyzer::HopFeatures;

/// Number of tracked frequency bands
pub const BAND_COUNT: usize = 8;

/// Fixed band edges in Hz, low to high: sub-bass through presence
pub const FREQUENCY_BANDS: [(f32, f32); BAND_COUNT] = [
    (20.0, 40.0),
    (40.0, 80.0),
    (80.0, 100.0),
    (100.0, 200.0),
    (200.0, 400.0),
    (400.0, 600.0),
    (600.0, 800.0),
    (800.0, 1000.0),
];

/// One analysis frame's worth of audio features
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSample {
    /// Timestamp in seconds (hop index x hop size / sample rate)
    pub time: f64,

    /// Per-band energy, each normalized to [0, 1] against that band's
    /// track maximum
    pub bands: [f32; BAND_COUNT],

    /// Overall volume in [0, 1], normalized across the track
    pub volume: f32,

    /// Whether this frame was flagged as a beat
    pub beat: bool,
}

/// The immutable, time-indexed feature stream consumed by rendering
///
/// Timestamps increase monotonically; every video frame time maps to
/// exactly one sample via nearest-previous lookup, so renderers never
/// read audio features from the future.
#[derive(Debug, Clone)]
pub struct FeatureTrack {
    samples: Vec<FeatureSample>,
    duration: f64,
}

impl FeatureTrack {
    /// Combine per-hop band energies and beat flags into the final track
    pub fn assemble(
        hops: Vec<HopFeatures>,
        beats: Vec<bool>,
        hop_size: usize,
        sample_rate: u32,
    ) -> Self {
        debug_assert_eq!(hops.len(), beats.len());

        let hop_seconds = hop_size as f64 / sample_rate as f64;
        let samples: Vec<FeatureSample> = hops
            .into_iter()
            .zip(beats)
            .enumerate()
            .map(|(i, (hop, beat))| FeatureSample {
                time: i as f64 * hop_seconds,
                bands: hop.bands,
                volume: hop.volume,
                beat,
            })
            .collect();

        let duration = samples.len() as f64 * hop_seconds;
        Self { samples, duration }
    }

    /// Number of analysis frames
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Analyzed duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// All samples in time order
    pub fn samples(&self) -> &[FeatureSample] {
        &self.samples
    }

    /// Look up the sample whose timestamp is closest without exceeding
    /// `time` (nearest-previous semantics)
    ///
    /// Times before the first sample return the first sample. A lookup
    /// past the end of the track is a caller contract violation; release
    /// builds clamp to the last sample.
    pub fn sample_at(&self, time: f64) -> &FeatureSample {
        debug_assert!(!self.samples.is_empty(), "lookup on empty FeatureTrack");
        debug_assert!(
            time <= self.duration + f64::EPSILON,
            "feature lookup past end of track: {time} > {}",
            self.duration
        );

        let idx = self.samples.partition_point(|s| s.time <= time);
        &self.samples[idx.saturating_sub(1)]
    }
}
