//! The transcode executor: input staging, argument assembly, invocation.

use std::path::PathBuf;
use std::time::Duration;

use ap_core::{Error, Result};

use crate::command::{EngineCommand, DEFAULT_TIMEOUT};
use crate::filters::FilterChain;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// WAV container, 16-bit little-endian PCM.
    Wav,
    /// MP3 at 128 kbps.
    Mp3,
    /// FLAC at compression level 5.
    Flac,
}

impl OutputFormat {
    /// Parse the `format` query parameter value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            _ => None,
        }
    }

    /// MIME type for HTTP responses.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Flac => "audio/flac",
        }
    }

    /// Fixed output argument set: mono, 16 kHz, container and codec
    /// selection, bitrate or compression level as applicable.
    pub fn output_args(&self) -> &'static [&'static str] {
        match self {
            Self::Wav => &["-ac", "1", "-ar", "16000", "-f", "wav", "-acodec", "pcm_s16le"],
            Self::Mp3 => &[
                "-ac", "1", "-ar", "16000", "-f", "mp3", "-acodec", "libmp3lame", "-b:a", "128k",
            ],
            Self::Flac => &[
                "-ac", "1", "-ar", "16000", "-f", "flac", "-acodec", "flac",
                "-compression_level", "5",
            ],
        }
    }
}

/// Runs transcode jobs against the installed engine binary.
///
/// Construct once at startup with the path resolved by [`crate::artifact`]
/// and share behind an `Arc`; runs are independent and proceed
/// concurrently without coordination.
#[derive(Debug, Clone)]
pub struct Transcoder {
    engine_path: PathBuf,
    verbose: bool,
    timeout: Duration,
    staging_dir: Option<PathBuf>,
}

impl Transcoder {
    /// Create a transcoder bound to the given engine executable.
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            verbose: false,
            timeout: DEFAULT_TIMEOUT,
            staging_dir: None,
        }
    }

    /// Log engine diagnostics even for successful runs.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Override the per-run wall-clock limit.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stage inputs under a specific directory instead of the system
    /// temp dir (useful when the engine and its inputs must share a
    /// filesystem).
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "info"
        } else {
            "error"
        }
    }

    /// Transcode `input` to `format`, applying `filters`.
    ///
    /// The input is staged to a closed temporary file first: container
    /// formats like MP4/MOV keep metadata at arbitrary offsets, so the
    /// engine must be able to seek, which a pipe cannot provide. The
    /// staged file is removed on every exit path, including errors.
    ///
    /// On success the returned bytes are the engine's stdout verbatim.
    pub async fn transcode(
        &self,
        input: &[u8],
        format: OutputFormat,
        filters: &FilterChain,
    ) -> Result<Vec<u8>> {
        // Staging failures belong to the conversion, same as the engine
        // rejecting the input; they never take the whole server down.
        let mut builder = tempfile::Builder::new();
        builder.prefix("audio-input-");
        let staged = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| Error::engine(format!("failed to stage input: {e}")))?;
        tokio::fs::write(staged.path(), input)
            .await
            .map_err(|e| Error::engine(format!("failed to stage input: {e}")))?;

        let mut cmd = EngineCommand::new(&self.engine_path)
            .args(["-hide_banner", "-loglevel", self.log_level()])
            .arg("-i")
            .arg(staged.path().to_string_lossy())
            .args(format.output_args().iter().copied());

        let expr = filters.expression();
        if !expr.is_empty() {
            cmd = cmd.arg("-af").arg(expr);
        }

        let output = cmd.arg("pipe:1").timeout(self.timeout).execute().await?;

        if self.verbose && !output.stderr.is_empty() {
            tracing::debug!("engine diagnostics: {}", output.stderr.trim());
        }

        Ok(output.stdout)
    }
}
