use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::{AudioLoader, BeatDetector, FeatureTrack, SpectralAnalyzer};
use crate::config::Config;
use crate::encode::FfmpegEncoder;
use crate::error::{Result, VisualizerError};
use crate::render::{FrameSynthesizer, PaletteRegistry, RenderConfig};

/// Orchestrates the full audio-to-video pipeline
///
/// The pipeline has three steps:
/// 1. Audio Analysis - decode the track and extract band energies and beats
/// 2. Asset Resolution - palette lookup, cover and font loading
/// 3. Synthesis & Encode - stream deterministic frames into ffmpeg
pub struct RenderEngine {
    config: Config,
}

impl RenderEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render `audio_path` into a finished video at `output_path`
    pub async fn render<P: AsRef<Path>>(&self, audio_path: P, output_path: P) -> Result<()> {
        let audio_path = audio_path.as_ref().to_path_buf();
        let output_path = output_path.as_ref().to_path_buf();

        info!("🎧 Starting render");
        info!("   Audio:   {:?}", audio_path);
        info!("   Output:  {:?}", output_path);
        info!("   Palette: {}", self.config.visual.palette);

        let track = self.analyze_audio(&audio_path).await?;
        let render_config = self.resolve_assets()?;
        self.synthesize_and_encode(render_config, track, audio_path, output_path.clone())
            .await?;

        info!("🎉 Render complete! Output saved to: {:?}", output_path);
        Ok(())
    }

    /// Step 1: decode the audio and turn it into the feature track
    async fn analyze_audio(&self, audio_path: &Path) -> Result<FeatureTrack> {
        info!("🎵 Step 1: Analyzing audio...");

        let audio = AudioLoader::load(audio_path).await?;
        info!(
            "   Loaded: {:.1}s, {} Hz, {} channels",
            audio.duration, audio.sample_rate, audio.channels
        );

        let analysis_config = self.config.analysis.clone();
        let sample_rate = audio.sample_rate;
        let samples = audio.mono_samples();
        if samples.is_empty() {
            return Err(crate::error::ConfigError::EmptyAudio.into());
        }

        // The analysis is CPU-bound; keep it off the async runtime
        let track = tokio::task::spawn_blocking(move || -> Result<FeatureTrack> {
            let analyzer = SpectralAnalyzer::new(analysis_config.clone());
            let hops = analyzer.analyze(&samples, sample_rate)?;

            let detector = BeatDetector::new(&analysis_config);
            let beats = detector.detect(&hops);

            Ok(FeatureTrack::assemble(
                hops,
                beats,
                analysis_config.hop_size,
                sample_rate,
            ))
        })
        .await
        .map_err(|e| VisualizerError::generic(format!("analysis task panicked: {e}")))??;

        let beat_count = track.samples().iter().filter(|s| s.beat).count();
        info!(
            "   ✅ {} feature frames, {} beats over {:.1}s",
            track.len(),
            beat_count,
            track.duration()
        );

        Ok(track)
    }

    /// Step 2: resolve palette, cover art, and font into the immutable
    /// render configuration
    fn resolve_assets(&self) -> Result<RenderConfig> {
        info!("🎨 Step 2: Resolving visual assets...");

        let palette = PaletteRegistry::new().resolve(&self.config.visual.palette)?;

        let cover = self
            .config
            .visual
            .cover
            .as_ref()
            .and_then(|path| load_cover(path));
        let font = self
            .config
            .visual
            .font
            .as_ref()
            .and_then(|path| load_font(path));

        if self.config.visual.text.is_some() && font.is_none() {
            warn!("Overlay text configured but no usable font; text layer disabled");
        }

        let render_config = RenderConfig::resolve(&self.config, palette, cover, font);
        render_config.validate()?;

        info!(
            "   ✅ {}x{} @ {} fps, cover: {}, text: {}",
            render_config.width,
            render_config.height,
            render_config.fps,
            render_config.cover.is_some(),
            render_config.text.is_some()
        );

        Ok(render_config)
    }

    /// Step 3: run the frame loop, streaming into ffmpeg
    async fn synthesize_and_encode(
        &self,
        render_config: RenderConfig,
        track: FeatureTrack,
        audio_path: PathBuf,
        output_path: PathBuf,
    ) -> Result<()> {
        info!("🎬 Step 3: Synthesizing frames...");

        tokio::task::spawn_blocking(move || -> Result<()> {
            let synthesizer = FrameSynthesizer::new(render_config, track)?;
            let total = synthesizer.total_frames();

            let (width, height) = synthesizer.resolution();
            let mut encoder =
                FfmpegEncoder::new(&output_path, &audio_path, width, height, synthesizer.fps())?;

            let report_every = (total / 10).max(1);
            for (index, frame) in synthesizer.enumerate() {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        encoder.abort();
                        return Err(e);
                    }
                };
                if let Err(e) = encoder.write_frame(frame.as_raw()) {
                    encoder.abort();
                    return Err(e);
                }
                if (index as u64 + 1) % report_every == 0 {
                    debug!("   Frame {}/{}", index + 1, total);
                }
            }

            encoder.finish()
        })
        .await
        .map_err(|e| VisualizerError::generic(format!("render task panicked: {e}")))?
    }
}

fn load_cover(path: &Path) -> Option<image::RgbImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgb8()),
        Err(e) => {
            warn!("Could not load cover image {:?}: {e}; continuing without", path);
            None
        }
    }
}

fn load_font(path: &Path) -> Option<fontdue::Font> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read font file {:?}: {e}; continuing without", path);
            return None;
        }
    };
    match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Could not parse font {:?}: {e}; continuing without", path);
            None
        }
    }
}
