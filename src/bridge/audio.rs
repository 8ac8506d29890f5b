//! Audio conversion for voice messages.
//!
//! WhatsApp plays voice notes only as Opus in an Ogg container. Anything else
//! goes through ffmpeg first.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Converts an audio file to Opus/Ogg.
pub trait AudioTranscoder: Send + Sync {
    /// Write an Opus/Ogg copy of `input` and return its path.
    fn to_opus_ogg(&self, input: &Path) -> Result<PathBuf>;
}

/// True unless the file already has an `.ogg` extension.
pub fn needs_conversion(path: &Path) -> bool {
    !path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ogg"))
}

/// Runs the ffmpeg binary. Output lands in the system temp dir and is left
/// for the bridge to read.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioTranscoder for FfmpegTranscoder {
    fn to_opus_ogg(&self, input: &Path) -> Result<PathBuf> {
        let output_path = std::env::temp_dir().join(format!("wa-voice-{}.ogg", uuid::Uuid::new_v4()));

        tracing::debug!(input = %input.display(), output = %output_path.display(), "converting audio");

        let output = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-vn", "-c:a", "libopus", "-b:a", "32k", "-ar", "24000", "-ac", "1"])
            .args(["-application", "voip"])
            .arg(&output_path)
            .output()
            .map_err(|e| Error::Transcode(format!("failed to run {}: {}", self.program.display(), e)))?;

        if output.status.success() {
            Ok(output_path)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim().to_string();
            Err(Error::Transcode(format!("ffmpeg exited with {}: {}", output.status, last_line)))
        }
    }
}
