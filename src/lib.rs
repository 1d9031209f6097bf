//! # Chromawave
//!
//! Render psychedelic audio-reactive music videos from an audio track.
//!
//! Chromawave decomposes a track into eight frequency-band energies plus
//! beat events, then deterministically synthesizes layered frames
//! (starfield, waveform trails, pulsing cover rings, text) and muxes
//! them with the source audio through ffmpeg. The same track and
//! configuration always produce a bit-identical video.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chromawave::{config::Config, pipeline::RenderEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.visual.palette = "fire".to_string();
//!
//! let engine = RenderEngine::new(config);
//! engine.render("song.wav", "song.mp4").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - decoding, spectral analysis, and beat detection
//! - [`render`] - the deterministic frame synthesizer and its layer chain
//! - [`encode`] - streaming frames into an external ffmpeg process
//! - [`pipeline`] - the end-to-end engine tying the steps together
//! - [`config`] - configuration management
//!
//! ## Working with the frame stream directly
//!
//! The synthesizer is a plain iterator over frames, so the video encoder
//! can be swapped out entirely:
//!
//! ```rust,no_run
//! use chromawave::audio::FeatureTrack;
//! use chromawave::render::{FrameSynthesizer, PaletteRegistry, RenderConfig};
//! use chromawave::config::Config;
//!
//! # fn demo(track: FeatureTrack) -> anyhow::Result<()> {
//! let config = Config::default();
//! let palette = PaletteRegistry::new().resolve(&config.visual.palette)?;
//! let render_config = RenderConfig::resolve(&config, palette, None, None);
//!
//! for frame in FrameSynthesizer::new(render_config, track)? {
//!     let frame = frame?;
//!     // frame.as_raw() is RGB24, row-major
//! }
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod render;

pub use config::Config;
pub use error::{Result, VisualizerError};
pub use pipeline::RenderEngine;
