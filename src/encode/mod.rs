//! Video encoding via an external ffmpeg process.

mod ffmpeg;

pub use ffmpeg::FfmpegEncoder;
