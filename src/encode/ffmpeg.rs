use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{EncodeError, Result};

/// Streams raw RGB24 frames into a spawned ffmpeg process, which muxes
/// them with the source audio into the output file
///
/// `-shortest` trims the audio to the rendered video, so preview renders
/// produce a correctly truncated file without re-cutting the audio.
pub struct FfmpegEncoder {
    child: Child,
}

impl FfmpegEncoder {
    pub fn new(
        output_path: &Path,
        input_audio: &Path,
        width: u32,
        height: u32,
        fps: f64,
    ) -> Result<Self> {
        let args = [
            "-y".to_string(),
            "-f".into(),
            "rawvideo".into(),
            "-pixel_format".into(),
            "rgb24".into(),
            "-video_size".into(),
            format!("{}x{}", width, height),
            "-framerate".into(),
            fps.to_string(),
            "-i".into(),
            "pipe:0".into(),
            "-i".into(),
            input_audio.display().to_string(),
            "-c:v".into(),
            "libx264".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-crf".into(),
            "18".into(),
            "-preset".into(),
            "medium".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            "-shortest".into(),
            output_path.display().to_string(),
        ];

        let child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EncodeError::SpawnFailed {
                reason: format!("{e}. Is ffmpeg installed and on PATH?"),
            })?;

        tracing::info!(
            "ffmpeg encoder started: {}x{} @ {} fps -> {}",
            width,
            height,
            fps,
            output_path.display()
        );

        Ok(Self { child })
    }

    /// Write one frame of raw RGB24 bytes, row-major
    pub fn write_frame(&mut self, rgb_pixels: &[u8]) -> Result<()> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| EncodeError::WriteFailed {
                reason: "ffmpeg stdin not available".to_string(),
            })?;
        stdin
            .write_all(rgb_pixels)
            .map_err(|e| EncodeError::WriteFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Close the pipe and wait for ffmpeg to finish muxing
    pub fn finish(mut self) -> Result<()> {
        // Closing stdin signals EOF
        drop(self.child.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| EncodeError::EncoderFailed {
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(EncodeError::EncoderFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        tracing::info!("ffmpeg encoding complete");
        Ok(())
    }

    /// Abandon the encode, killing the child process
    pub fn abort(mut self) {
        drop(self.child.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_spawn_error() {
        // Point PATH at an empty directory so the spawn must fail
        let temp = tempfile::tempdir().unwrap();
        let old_path = std::env::var_os("PATH");
        std::env::set_var("PATH", temp.path());

        let result = FfmpegEncoder::new(
            &temp.path().join("out.mp4"),
            &temp.path().join("in.wav"),
            64,
            64,
            30.0,
        );

        match old_path {
            Some(p) => std::env::set_var("PATH", p),
            None => std::env::remove_var("PATH"),
        }

        assert!(matches!(
            result,
            Err(crate::error::VisualizerError::Encode(EncodeError::SpawnFailed { .. }))
        ));
    }
}
