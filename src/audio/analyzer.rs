use rayon::prelude::*;
use realfft::RealFftPlanner;

use crate::audio::features::{BAND_COUNT, FREQUENCY_BANDS};
use crate::config::AnalysisConfig;
use crate::error::{AudioError, Result};

/// Per-band gain base: energy in band b is scaled by BAND_GAIN_BASE^b so
/// the higher bands, which carry proportionally less raw energy, stay
/// perceptually comparable after normalization.
const BAND_GAIN_BASE: f32 = 1.4;

/// Raw spectral features for one analysis hop, before beat detection
#[derive(Debug, Clone, PartialEq)]
pub struct HopFeatures {
    /// Per-band energy, normalized to [0, 1] against the band's track max
    pub bands: [f32; BAND_COUNT],

    /// Overall volume in [0, 1], normalized across the track
    pub volume: f32,
}

/// Windowed short-time spectral analyzer producing per-hop band energies
///
/// Hops are independent, so the per-hop transform runs in parallel; the
/// normalization pass over the whole track is sequential.
pub struct SpectralAnalyzer {
    config: AnalysisConfig,
}

impl SpectralAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze a mono sample buffer into one `HopFeatures` per hop
    ///
    /// A track shorter than one window is treated as a single zero-padded
    /// window. A fully silent track yields all-zero energies, not an error.
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<HopFeatures>> {
        let window_size = self.config.window_size;
        let hop_size = self.config.hop_size;
        let hop_count = samples.len().div_ceil(hop_size).max(1);

        let hann = hann_window(window_size);
        let freq_resolution = sample_rate as f32 / window_size as f32;
        let band_bins = band_bin_ranges(freq_resolution, window_size / 2 + 1);

        tracing::debug!(
            "Spectral analysis: {} hops, window {} / hop {} ({:.1} ms resolution)",
            hop_count,
            window_size,
            hop_size,
            hop_size as f64 * 1000.0 / sample_rate as f64
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| AudioError::AnalysisFailed {
                reason: format!("failed to build analysis thread pool: {e}"),
            })?;

        let raw: Vec<RawHop> = pool.install(|| {
            (0..hop_count)
                .into_par_iter()
                .map(|hop_idx| {
                    // Per-task planner: the FFT plan is not shareable across
                    // rayon workers
                    let mut planner = RealFftPlanner::<f32>::new();
                    let fft = planner.plan_fft_forward(window_size);
                    let mut input = fft.make_input_vec();
                    let mut spectrum = fft.make_output_vec();

                    let start = hop_idx * hop_size;
                    for (i, slot) in input.iter_mut().enumerate() {
                        let sample = samples.get(start + i).copied().unwrap_or(0.0);
                        *slot = sample * hann[i];
                    }

                    // realfft only fails on length mismatch, which the
                    // planner-made buffers rule out
                    fft.process(&mut input, &mut spectrum)
                        .expect("FFT buffers sized by planner");

                    let magnitudes: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();

                    let mut bands = [0.0f32; BAND_COUNT];
                    for (band_idx, &(low_bin, high_bin)) in band_bins.iter().enumerate() {
                        if low_bin >= high_bin {
                            continue;
                        }
                        let sum: f32 = magnitudes[low_bin..high_bin].iter().map(|&m| m * m).sum();
                        let mean = sum / (high_bin - low_bin) as f32;
                        bands[band_idx] = mean * BAND_GAIN_BASE.powi(band_idx as i32);
                    }

                    let volume = (magnitudes.iter().map(|&m| m * m).sum::<f32>()
                        / magnitudes.len() as f32)
                        .sqrt();

                    RawHop { bands, volume }
                })
                .collect()
        });

        Ok(normalize(raw))
    }
}

struct RawHop {
    bands: [f32; BAND_COUNT],
    volume: f32,
}

/// Normalize each band's energy series, and the volume series, to [0, 1]
/// against its own track maximum. A band that is silent for the whole
/// track stays at zero rather than dividing by zero.
fn normalize(raw: Vec<RawHop>) -> Vec<HopFeatures> {
    let mut band_max = [0.0f32; BAND_COUNT];
    let mut volume_max = 0.0f32;
    for hop in &raw {
        for (max, &value) in band_max.iter_mut().zip(&hop.bands) {
            *max = max.max(value);
        }
        volume_max = volume_max.max(hop.volume);
    }

    raw.into_iter()
        .map(|hop| {
            let mut bands = [0.0f32; BAND_COUNT];
            for ((out, value), &max) in bands.iter_mut().zip(hop.bands).zip(&band_max) {
                if max > f32::EPSILON {
                    *out = (value / max).min(1.0);
                }
            }
            let volume = if volume_max > f32::EPSILON {
                (hop.volume / volume_max).min(1.0)
            } else {
                0.0
            };
            HopFeatures { bands, volume }
        })
        .collect()
}

/// Map each band's Hz range onto FFT bin indices, clamped to the spectrum
fn band_bin_ranges(freq_resolution: f32, bin_count: usize) -> [(usize, usize); BAND_COUNT] {
    let mut ranges = [(0usize, 0usize); BAND_COUNT];
    for (i, &(low_hz, high_hz)) in FREQUENCY_BANDS.iter().enumerate() {
        let low = (low_hz / freq_resolution).ceil() as usize;
        let high = ((high_hz / freq_resolution).ceil() as usize).min(bin_count);
        ranges[i] = (low.min(bin_count), high);
    }
    ranges
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        (0..(sample_rate as f32 * seconds) as usize)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn test_silence_yields_zero_energy() {
        let samples = vec![0.0f32; 44100];
        let analyzer = SpectralAnalyzer::new(AnalysisConfig::default());
        let hops = analyzer.analyze(&samples, 44100).unwrap();

        assert!(!hops.is_empty());
        for hop in &hops {
            assert!(hop.bands.iter().all(|&b| b == 0.0));
            assert_eq!(hop.volume, 0.0);
        }
    }

    #[test]
    fn test_energies_bounded() {
        let samples = sine(440.0, 2.0, 44100);
        let analyzer = SpectralAnalyzer::new(AnalysisConfig::default());
        let hops = analyzer.analyze(&samples, 44100).unwrap();

        for hop in &hops {
            assert!(hop.bands.iter().all(|&b| (0.0..=1.0).contains(&b)));
            assert!((0.0..=1.0).contains(&hop.volume));
        }
        // Something must have hit the normalization ceiling
        assert!(hops.iter().any(|h| h.volume > 0.99));
    }

    #[test]
    fn test_band_follows_tone_onset() {
        // One second of 60 Hz (band 1: 40-80 Hz) followed by one second
        // of silence; band energy must track the tone through time
        let mut samples = sine(60.0, 1.0, 44100);
        samples.extend(std::iter::repeat(0.0).take(44100));

        let analyzer = SpectralAnalyzer::new(AnalysisConfig::default());
        let hops = analyzer.analyze(&samples, 44100).unwrap();

        let quarter = hops.len() / 4;
        let during_tone = hops[quarter].bands[1];
        let during_silence = hops[3 * quarter].bands[1];

        assert!(during_tone > 0.5, "tone energy too low: {during_tone}");
        assert!(during_silence < 0.1, "silence energy too high: {during_silence}");
    }

    #[test]
    fn test_short_track_single_window() {
        // Shorter than one window: one zero-padded hop per hop-size chunk
        let samples = vec![0.1f32; 100];
        let analyzer = SpectralAnalyzer::new(AnalysisConfig::default());
        let hops = analyzer.analyze(&samples, 44100).unwrap();
        assert_eq!(hops.len(), 1);
    }

    #[test]
    fn test_hop_count_matches_stride() {
        let samples = vec![0.0f32; 44100];
        let config = AnalysisConfig::default();
        let analyzer = SpectralAnalyzer::new(config.clone());
        let hops = analyzer.analyze(&samples, 44100).unwrap();
        assert_eq!(hops.len(), 44100usize.div_ceil(config.hop_size));
    }
}
