use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AudioSplitError;

/// Default postfix inserted between the input stem and the chunk index.
pub const DEFAULT_POSTFIX: &str = "chunk";

/// Upper bound on the number of chunks a single run may produce.
pub const DEFAULT_MAX_CHUNKS: NonZeroUsize = match NonZeroUsize::new(50_000) {
    Some(limit) => limit,
    None => panic!("chunk limit must be non-zero"),
};

/// How the total duration of the input is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProbeBackend {
    /// Ask `ffprobe` for the container duration.
    #[default]
    Ffprobe,
    /// Read the container headers in-process.
    Native,
}

/// Encoding parameters forwarded to ffmpeg for every chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranscodeOptions {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub codec: Option<String>,
}

/// Configuration for the audio splitting operation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Canonicalized path of the source file to split.
    pub input_path: PathBuf,
    /// Directory into which the chunks are written. Created on demand.
    pub output_dir: PathBuf,
    /// Nominal length of each chunk.
    pub chunk_length: Duration,
    /// Time shared between the end of one chunk and the start of the next.
    pub overlap: Duration,
    /// Postfix inserted into the output file names.
    pub postfix: String,
    /// Extension of the generated files.
    pub format: String,
    /// Replace existing files instead of refusing to run.
    pub overwrite: bool,
    /// Maximum number of chunks a run may produce.
    pub max_chunks: NonZeroUsize,
    pub probe: ProbeBackend,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub transcode: TranscodeOptions,
}

impl Config {
    /// Construct a [`Config`] with default settings for everything but the
    /// chunk geometry.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        chunk_length: Duration,
        overlap: Duration,
    ) -> Result<Self, AudioSplitError> {
        Self::builder(input, output, chunk_length)
            .overlap(overlap)
            .build()
    }

    /// Start building a [`Config`] for splitting `input` into `output`.
    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        chunk_length: Duration,
    ) -> ConfigBuilder {
        ConfigBuilder {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            chunk_length,
            overlap: Duration::ZERO,
            postfix: DEFAULT_POSTFIX.to_owned(),
            format: None,
            overwrite: false,
            max_chunks: DEFAULT_MAX_CHUNKS,
            probe: ProbeBackend::default(),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            transcode: TranscodeOptions::default(),
        }
    }

    /// Distance between the starts of consecutive chunks.
    pub fn step(&self) -> Duration {
        self.chunk_length.saturating_sub(self.overlap)
    }

    /// File stem shared by every chunk of this job.
    pub fn base_name(&self) -> Result<&str, AudioSplitError> {
        self.input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or(AudioSplitError::InvalidInputName)
    }
}

/// Builder for [`Config`], validating the chunk geometry on [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    input: PathBuf,
    output: PathBuf,
    chunk_length: Duration,
    overlap: Duration,
    postfix: String,
    format: Option<String>,
    overwrite: bool,
    max_chunks: NonZeroUsize,
    probe: ProbeBackend,
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    transcode: TranscodeOptions,
}

impl ConfigBuilder {
    pub fn overlap(mut self, overlap: Duration) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn postfix<S: Into<String>>(mut self, postfix: S) -> Self {
        self.postfix = postfix.into();
        self
    }

    /// Output extension. Defaults to the extension of the input file.
    pub fn format<S: Into<String>>(mut self, format: S) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn max_chunks(mut self, max_chunks: NonZeroUsize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    pub fn probe(mut self, probe: ProbeBackend) -> Self {
        self.probe = probe;
        self
    }

    pub fn ffmpeg<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ffmpeg = path.into();
        self
    }

    pub fn ffprobe<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ffprobe = path.into();
        self
    }

    pub fn transcode(mut self, transcode: TranscodeOptions) -> Self {
        self.transcode = transcode;
        self
    }

    /// Validate the settings and produce an immutable [`Config`].
    ///
    /// The chunk geometry is checked before the filesystem is touched, so an
    /// invalid overlap is reported even when the input is missing.
    pub fn build(self) -> Result<Config, AudioSplitError> {
        validate_geometry(self.chunk_length, self.overlap)?;

        if !self.input.is_file() {
            return Err(AudioSplitError::MissingInput(self.input));
        }
        let input_path = fs::canonicalize(&self.input)?;

        let format = match self.format {
            Some(format) => format.trim_start_matches('.').to_owned(),
            None => input_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_owned)
                .ok_or_else(|| AudioSplitError::MissingFormat(input_path.clone()))?,
        };
        if format.is_empty() {
            return Err(AudioSplitError::MissingFormat(input_path));
        }

        Ok(Config {
            input_path,
            output_dir: self.output,
            chunk_length: self.chunk_length,
            overlap: self.overlap,
            postfix: self.postfix,
            format,
            overwrite: self.overwrite,
            max_chunks: self.max_chunks,
            probe: self.probe,
            ffmpeg: self.ffmpeg,
            ffprobe: self.ffprobe,
            transcode: self.transcode,
        })
    }
}

/// Reject chunk geometries that cannot make forward progress.
pub fn validate_geometry(chunk_length: Duration, overlap: Duration) -> Result<(), AudioSplitError> {
    if chunk_length.is_zero() {
        return Err(AudioSplitError::InvalidChunkLength);
    }
    if overlap >= chunk_length {
        return Err(AudioSplitError::OverlapTooLarge {
            overlap,
            chunk_length,
        });
    }
    Ok(())
}
