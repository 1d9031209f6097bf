use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for Chromawave
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Audio analysis settings
    pub analysis: AnalysisConfig,

    /// Output and layer settings
    pub visual: VisualConfig,

    /// Simulation tuning
    pub scene: SceneConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string(),
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.visual.validate()?;
        self.scene.validate()?;
        Ok(())
    }
}

/// Spectral analysis and beat detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Window size for FFT analysis (power of two)
    pub window_size: usize,

    /// Hop size between consecutive analysis windows, in samples
    pub hop_size: usize,

    /// Beat trigger ratio: instantaneous low-band energy must exceed
    /// the rolling average by this factor
    pub beat_sensitivity: f32,

    /// Length of the rolling average window, in analysis frames
    pub beat_smoothing_frames: usize,

    /// Minimum analysis frames between two flagged beats
    pub beat_cooldown_frames: usize,

    /// Number of worker threads for per-hop spectral analysis
    pub threads: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 1024,
            beat_sensitivity: 1.5,
            beat_smoothing_frames: 43,
            beat_cooldown_frames: 10,
            threads: num_cpus::get(),
        }
    }
}

impl AnalysisConfig {
    /// Smaller analysis window for fast preview iteration
    pub fn preview() -> Self {
        Self {
            window_size: 1024,
            hop_size: 512,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.window_size == 0 || !self.window_size.is_power_of_two() {
            return Err(ConfigError::InvalidValue {
                key: "analysis.window_size".to_string(),
                value: self.window_size.to_string(),
            }
            .into());
        }

        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(ConfigError::InvalidValue {
                key: "analysis.hop_size".to_string(),
                value: self.hop_size.to_string(),
            }
            .into());
        }

        if self.beat_sensitivity <= 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.beat_sensitivity".to_string(),
                value: self.beat_sensitivity.to_string(),
            }
            .into());
        }

        if self.beat_smoothing_frames == 0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.beat_smoothing_frames".to_string(),
                value: self.beat_smoothing_frames.to_string(),
            }
            .into());
        }

        if self.threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "analysis.threads".to_string(),
                value: self.threads.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Output format and layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Output resolution (width, height)
    pub resolution: (u32, u32),

    /// Output frame rate
    pub fps: f64,

    /// Name of the color palette to use
    pub palette: String,

    /// Rotation axis for the waveform layer
    pub waveform_rotation: RotationAxis,

    /// Rotation axis for the ring layer
    pub ring_rotation: RotationAxis,

    /// Spin direction for the starfield
    pub starfield_rotation: SpinDirection,

    /// Optional cover image path
    pub cover: Option<PathBuf>,

    /// Cover clipping shape
    pub cover_shape: CoverShape,

    /// Cover size multiplier
    pub cover_size: f32,

    /// Mirror the cover into this many kaleidoscope segments
    pub kaleidoscope_segments: Option<u32>,

    /// Ring outline shape
    pub ring_shape: RingShape,

    /// Optional overlay text
    pub text: Option<String>,

    /// TrueType font file for the text overlay
    pub font: Option<PathBuf>,

    /// Skip the ring layer entirely
    pub disable_rings: bool,

    /// Skip the starfield layer entirely
    pub disable_starfield: bool,

    /// Render only the first N seconds
    pub preview_seconds: Option<f64>,

    /// Halve the output resolution for fast proof renders
    pub proof: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            resolution: (1280, 720),
            fps: 30.0,
            palette: "rainbow".to_string(),
            waveform_rotation: RotationAxis::Z,
            ring_rotation: RotationAxis::Z,
            starfield_rotation: SpinDirection::None,
            cover: None,
            cover_shape: CoverShape::Square,
            cover_size: 1.0,
            kaleidoscope_segments: None,
            ring_shape: RingShape::Circle,
            text: None,
            font: None,
            disable_rings: false,
            disable_starfield: false,
            preview_seconds: None,
            proof: false,
        }
    }
}

impl VisualConfig {
    fn validate(&self) -> Result<()> {
        if self.fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "visual.fps".to_string(),
                value: self.fps.to_string(),
            }
            .into());
        }

        let (width, height) = self.resolution;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "visual.resolution".to_string(),
                value: format!("{}x{}", width, height),
            }
            .into());
        }

        if self.cover_size <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "visual.cover_size".to_string(),
                value: self.cover_size.to_string(),
            }
            .into());
        }

        if let Some(segments) = self.kaleidoscope_segments {
            if segments < 2 {
                return Err(ConfigError::InvalidValue {
                    key: "visual.kaleidoscope_segments".to_string(),
                    value: segments.to_string(),
                }
                .into());
            }
        }

        if let Some(secs) = self.preview_seconds {
            if secs <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "visual.preview_seconds".to_string(),
                    value: secs.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Simulation tuning parameters
///
/// Defaults are the empirically tuned animation constants; they shape the
/// feel of the output but carry no compatibility contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Number of starfield particles
    pub star_count: usize,

    /// Base outward star speed in pixels per frame
    pub star_base_speed: f32,

    /// How strongly volume accelerates the stars
    pub star_volume_multiplier: f32,

    /// Base rotation phase increment per frame, in radians
    pub base_rotation_speed: f32,

    /// How strongly volume accelerates rotation
    pub volume_rotation_multiplier: f32,

    /// Base hue drift per frame, in degrees
    pub hue_shift_base: f32,

    /// Number of waveform generations kept for the afterimage trail
    pub trail_depth: usize,

    /// Points per waveform band ring
    pub waveform_points: usize,

    /// Ring expansion at full beat boost, as a fraction of base radius
    pub beat_boost_max: f32,

    /// Per-frame exponential decay factor of the beat boost
    pub beat_boost_decay: f32,

    /// Length of the end-of-track fade, in seconds
    pub fade_seconds: f64,

    /// Seed for the starfield rng
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 200,
            star_base_speed: 0.5,
            star_volume_multiplier: 5.5,
            base_rotation_speed: 0.001,
            volume_rotation_multiplier: 0.015,
            hue_shift_base: 0.5,
            trail_depth: 10,
            waveform_points: 128,
            beat_boost_max: 1.0,
            beat_boost_decay: 0.7,
            fade_seconds: 2.0,
            seed: 0x5EED_CA11,
        }
    }
}

impl SceneConfig {
    fn validate(&self) -> Result<()> {
        if self.star_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scene.star_count".to_string(),
                value: self.star_count.to_string(),
            }
            .into());
        }

        if self.trail_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scene.trail_depth".to_string(),
                value: self.trail_depth.to_string(),
            }
            .into());
        }

        if self.waveform_points < 3 {
            return Err(ConfigError::InvalidValue {
                key: "scene.waveform_points".to_string(),
                value: self.waveform_points.to_string(),
            }
            .into());
        }

        if !(0.0..1.0).contains(&self.beat_boost_decay) {
            return Err(ConfigError::InvalidValue {
                key: "scene.beat_boost_decay".to_string(),
                value: self.beat_boost_decay.to_string(),
            }
            .into());
        }

        if self.fade_seconds < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scene.fade_seconds".to_string(),
                value: self.fade_seconds.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Rotation axis for a layer's animated transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RotationAxis {
    /// No rotation
    None,
    /// Perspective squeeze of the vertical axis
    X,
    /// Perspective squeeze of the horizontal axis
    Y,
    /// Plain in-plane rotation
    Z,
}

/// Starfield spin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpinDirection {
    None,
    Cw,
    Ccw,
}

/// Cover image clipping shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CoverShape {
    Square,
    Round,
}

/// Ring outline shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RingShape {
    Circle,
    Square,
}
