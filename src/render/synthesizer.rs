use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::audio::{BeatDetector, FeatureTrack, SpectralAnalyzer};
use crate::config::AnalysisConfig;
use crate::error::{ConfigError, RenderError, Result};
use crate::render::frame::Frame;
use crate::render::layers::{self, LayerRenderer};
use crate::render::scene::SceneState;
use crate::render::RenderConfig;

/// Pull-based frame producer: one deterministic frame per `next()`
///
/// Each frame maps its timestamp onto the feature track with
/// nearest-previous lookup, advances the scene once, runs the layer
/// chain over a fresh black frame, then applies the end-of-track fade.
/// The iterator ends after the final frame; a cancelled render yields a
/// single `Aborted` error and then ends.
pub struct FrameSynthesizer {
    config: RenderConfig,
    track: FeatureTrack,
    scene: SceneState,
    chain: Vec<Box<dyn LayerRenderer>>,
    frame_index: u64,
    total_frames: u64,
    fade_start: f64,
    last_frame_time: f64,
    cancel: Arc<AtomicBool>,
}

impl FrameSynthesizer {
    pub fn new(config: RenderConfig, track: FeatureTrack) -> Result<Self> {
        config.validate()?;
        if track.is_empty() {
            return Err(ConfigError::EmptyAudio.into());
        }

        let rendered_seconds = config
            .preview_seconds
            .map(|p| p.min(track.duration()))
            .unwrap_or_else(|| track.duration());
        let total_frames = ((rendered_seconds * config.fps).round() as u64).max(1);
        let last_frame_time = (total_frames - 1) as f64 / config.fps;
        let fade_start = rendered_seconds - config.scene.fade_seconds;

        tracing::debug!(
            "Synthesizer: {} frames at {} fps ({:.2}s of {:.2}s track)",
            total_frames,
            config.fps,
            rendered_seconds,
            track.duration()
        );

        let scene = SceneState::new(&config);
        let chain = layers::build_chain(&config);

        Ok(Self {
            config,
            track,
            scene,
            chain,
            frame_index: 0,
            total_frames,
            fade_start,
            last_frame_time,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Analyze a raw sample buffer and build a synthesizer in one step
    ///
    /// Convenience entry point for callers that do not need the feature
    /// track separately.
    pub fn analyze(
        samples: &[f32],
        sample_rate: u32,
        analysis: &AnalysisConfig,
        config: RenderConfig,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(ConfigError::EmptyAudio.into());
        }

        let hops = SpectralAnalyzer::new(analysis.clone()).analyze(samples, sample_rate)?;
        let beats = BeatDetector::new(analysis).detect(&hops);
        let track = FeatureTrack::assemble(hops, beats, analysis.hop_size, sample_rate);
        Self::new(config, track)
    }

    /// Number of frames this synthesizer will produce
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Output resolution (width, height)
    pub fn resolution(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn fps(&self) -> f64 {
        self.config.fps
    }

    /// Shared flag for cancelling the render from another thread
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn render_frame(&mut self, time: f64) -> Result<Frame> {
        let sample = self.track.sample_at(time.min(self.track.duration()));
        self.scene.advance(sample, &self.config);

        let mut frame = Frame::new(self.config.width, self.config.height);
        for layer in &self.chain {
            layer
                .render(&mut frame, &self.scene, sample, &self.config)
                .map_err(|e| RenderError::LayerFailed {
                    layer: layer.name().to_string(),
                    reason: e.to_string(),
                })?;
        }

        frame.fade(fade_multiplier(time, self.fade_start, self.last_frame_time));
        Ok(frame)
    }
}

impl Iterator for FrameSynthesizer {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame_index >= self.total_frames {
            return None;
        }
        if self.cancel.load(Ordering::Relaxed) {
            self.frame_index = self.total_frames;
            return Some(Err(RenderError::Aborted.into()));
        }

        let time = self.frame_index as f64 / self.config.fps;
        self.frame_index += 1;
        Some(self.render_frame(time))
    }
}

/// Brightness multiplier for the end-of-track fade
///
/// Exactly 1.0 up to the fade start, falling linearly to exactly 0.0 on
/// the final frame so the video always ends on black.
fn fade_multiplier(time: f64, fade_start: f64, last_frame_time: f64) -> f32 {
    if last_frame_time <= fade_start {
        // Track shorter than the fade window: only the last frame fades
        return if time >= last_frame_time { 0.0 } else { 1.0 };
    }
    if time <= fade_start {
        return 1.0;
    }
    if time >= last_frame_time {
        return 0.0;
    }
    (1.0 - (time - fade_start) / (last_frame_time - fade_start)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::analyzer::HopFeatures;
    use crate::audio::BAND_COUNT;
    use crate::render::test_config;

    fn track(seconds: f64) -> FeatureTrack {
        let hop_size = 1024;
        let sample_rate = 44100;
        let hops_count = (seconds * sample_rate as f64 / hop_size as f64).ceil() as usize;
        let hops: Vec<HopFeatures> = (0..hops_count)
            .map(|i| HopFeatures {
                bands: [((i % 10) as f32 / 10.0); BAND_COUNT],
                volume: (i % 10) as f32 / 10.0,
            })
            .collect();
        let beats = (0..hops_count).map(|i| i % 30 == 15).collect();
        FeatureTrack::assemble(hops, beats, hop_size, sample_rate)
    }

    #[test]
    fn test_frame_count_matches_duration() {
        let config = test_config();
        let t = track(3.0);
        let expected = (t.duration() * config.fps).round() as u64;

        let synth = FrameSynthesizer::new(config, t).unwrap();
        assert_eq!(synth.total_frames(), expected);
        assert_eq!(synth.count() as u64, expected);
    }

    #[test]
    fn test_preview_caps_frames() {
        let mut config = test_config();
        config.preview_seconds = Some(1.0);

        let synth = FrameSynthesizer::new(config, track(5.0)).unwrap();
        assert_eq!(synth.total_frames(), 30);
    }

    #[test]
    fn test_empty_track_rejected() {
        let config = test_config();
        let empty = FeatureTrack::assemble(vec![], vec![], 1024, 44100);
        assert!(FrameSynthesizer::new(config, empty).is_err());
    }

    #[test]
    fn test_last_frame_is_black() {
        let config = test_config();
        let synth = FrameSynthesizer::new(config, track(3.0)).unwrap();
        let last = synth.last().unwrap().unwrap();
        assert!(last.is_black());
    }

    #[test]
    fn test_frames_at_configured_resolution() {
        let config = test_config();
        let (w, h) = (config.width, config.height);
        let mut synth = FrameSynthesizer::new(config, track(1.0)).unwrap();
        let frame = synth.next().unwrap().unwrap();
        assert_eq!((frame.width(), frame.height()), (w, h));
    }

    #[test]
    fn test_render_is_bit_identical() {
        let t = track(2.0);
        let a: Vec<Frame> = FrameSynthesizer::new(test_config(), t.clone())
            .unwrap()
            .map(|f| f.unwrap())
            .collect();
        let b: Vec<Frame> = FrameSynthesizer::new(test_config(), t)
            .unwrap()
            .map(|f| f.unwrap())
            .collect();

        assert_eq!(a.len(), b.len());
        for (fa, fb) in a.iter().zip(&b) {
            assert_eq!(fa.as_raw(), fb.as_raw());
        }
    }

    #[test]
    fn test_cancellation_aborts() {
        let mut synth = FrameSynthesizer::new(test_config(), track(3.0)).unwrap();
        let cancel = synth.cancel_handle();

        assert!(synth.next().unwrap().is_ok());
        cancel.store(true, Ordering::Relaxed);

        let aborted = synth.next().unwrap();
        assert!(matches!(
            aborted,
            Err(crate::error::VisualizerError::Render(RenderError::Aborted))
        ));
        assert!(synth.next().is_none());
    }

    #[test]
    fn test_analyze_rejects_empty_buffer() {
        let result = FrameSynthesizer::analyze(&[], 44100, &AnalysisConfig::default(), test_config());
        assert!(matches!(
            result,
            Err(crate::error::VisualizerError::Config(ConfigError::EmptyAudio))
        ));
    }

    #[test]
    fn test_analyze_end_to_end() {
        // One second of a quiet 100 Hz tone straight through the pipeline
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / 44100.0).sin() * 0.3)
            .collect();

        let config = test_config();
        let fps = config.fps;
        let synth =
            FrameSynthesizer::analyze(&samples, 44100, &AnalysisConfig::default(), config).unwrap();

        let expected_hops = 44100usize.div_ceil(1024);
        let expected_frames = (expected_hops as f64 * 1024.0 / 44100.0 * fps).round() as u64;
        assert_eq!(synth.total_frames(), expected_frames);
    }

    #[test]
    fn test_disabled_layers_leave_rest_identical() {
        // With starfield and rings off, the chain is the waveform layer
        // alone; the first synthesized frame must match a manual pass
        // over the same scene evolution
        use crate::render::layers::{LayerRenderer, WaveformLayer};
        use crate::render::scene::SceneState;

        let t = track(3.0);
        let mut config = test_config();
        config.starfield_enabled = false;
        config.rings_enabled = false;

        let mut synth = FrameSynthesizer::new(config, t.clone()).unwrap();
        let synthesized = synth.next().unwrap().unwrap();

        let mut manual_config = test_config();
        manual_config.starfield_enabled = false;
        manual_config.rings_enabled = false;
        let mut scene = SceneState::new(&manual_config);
        let sample = t.sample_at(0.0);
        scene.advance(sample, &manual_config);

        let mut manual = Frame::new(manual_config.width, manual_config.height);
        WaveformLayer
            .render(&mut manual, &scene, sample, &manual_config)
            .unwrap();

        assert_eq!(synthesized, manual);
    }

    #[test]
    fn test_fade_multiplier_profile() {
        let fade_start = 8.0;
        let last = 10.0;

        assert_eq!(fade_multiplier(0.0, fade_start, last), 1.0);
        assert_eq!(fade_multiplier(8.0, fade_start, last), 1.0);
        assert_eq!(fade_multiplier(10.0, fade_start, last), 0.0);

        let mut previous = 1.0;
        for step in 0..=20 {
            let time = fade_start + (last - fade_start) * step as f64 / 20.0;
            let m = fade_multiplier(time, fade_start, last);
            assert!(m <= previous, "fade not monotone at t={time}");
            previous = m;
        }
    }

    #[test]
    fn test_short_track_still_ends_black() {
        // Shorter than the fade window
        let config = test_config();
        let synth = FrameSynthesizer::new(config, track(0.5)).unwrap();
        let frames: Vec<Frame> = synth.map(|f| f.unwrap()).collect();
        assert!(frames.last().unwrap().is_black());
        // Earlier frames are dimmed but not fully black
        assert!(!frames[0].is_black());
    }
}
