use thiserror::Error;

/// Main error type for the Chromawave library
#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Frame synthesis errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render aborted by caller")]
    Aborted,

    #[error("Layer '{layer}' failed: {reason}")]
    LayerFailed { layer: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Unknown color palette: {name} (available: {available})")]
    UnknownPalette { name: String, available: String },

    #[error("Audio track contains no samples")]
    EmptyAudio,
}

/// Errors from the external encoder step
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to spawn ffmpeg: {reason}")]
    SpawnFailed { reason: String },

    #[error("Failed to write frame to encoder: {reason}")]
    WriteFailed { reason: String },

    #[error("ffmpeg exited with an error: {stderr}")]
    EncoderFailed { stderr: String },
}

/// Convenience type alias for Results using VisualizerError
pub type Result<T> = std::result::Result<T, VisualizerError>;

impl VisualizerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Config(ConfigError::UnknownPalette { name, available }) => {
                format!("Palette '{}' not found. Available palettes: {}.", name, available)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Encode(EncodeError::SpawnFailed { .. }) => {
                "Could not start ffmpeg. Is it installed and on your PATH?".to_string()
            }
            _ => self.to_string(),
        }
    }
}
