//! # Audio Analysis Module
//!
//! Turns a decoded audio track into the time-indexed feature stream that
//! drives frame synthesis: per-band spectral energy, overall volume, and
//! beat flags.
//!
//! ## Core Features
//!
//! - **Spectral analysis**: Hann-windowed real FFT over overlapping hops,
//!   reduced to 8 fixed frequency bands
//! - **Beat detection**: transient detection on the low bands against a
//!   rolling baseline, with a retrigger cooldown
//! - **Feature track**: immutable, timestamped samples with
//!   nearest-previous lookup by video frame time
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chromawave::audio::{AudioLoader, SpectralAnalyzer, BeatDetector, FeatureTrack};
//! use chromawave::config::AnalysisConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("song.mp3").await?;
//! let mono = audio.mono_samples();
//!
//! let config = AnalysisConfig::default();
//! let hops = SpectralAnalyzer::new(config.clone()).analyze(&mono, audio.sample_rate)?;
//! let beats = BeatDetector::new(&config).detect(&hops);
//! let track = FeatureTrack::assemble(hops, beats, config.hop_size, audio.sample_rate);
//!
//! println!("{} analysis frames", track.len());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod beat;
pub mod features;
pub mod loader;

pub use analyzer::{HopFeatures, SpectralAnalyzer};
pub use beat::BeatDetector;
pub use features::{FeatureSample, FeatureTrack, BAND_COUNT, FREQUENCY_BANDS};
pub use loader::{AudioData, AudioLoader};
