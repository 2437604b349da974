use std::path::PathBuf;
use std::time::Duration;

use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

/// Errors that can occur while planning or splitting audio files.
#[derive(Debug, Error)]
pub enum AudioSplitError {
    /// The requested chunk length was zero.
    #[error("chunk length must be greater than zero")]
    InvalidChunkLength,

    /// The overlap leaves no forward progress between consecutive chunks.
    #[error("overlap ({overlap:?}) must be shorter than the chunk length ({chunk_length:?})")]
    OverlapTooLarge {
        overlap: Duration,
        chunk_length: Duration,
    },

    /// The plan would produce more chunks than allowed.
    #[error("splitting would produce {required} chunks, exceeding the limit of {limit}")]
    ChunkLimitExceeded { limit: usize, required: u128 },

    /// The input reported a total duration of zero.
    #[error("input '{}' has zero duration", .0.display())]
    EmptyInput(PathBuf),

    /// The input file does not exist or is not a regular file.
    #[error("input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    /// Error produced when a file name cannot be derived from the input path.
    #[error("failed to derive a base name for the input file")]
    InvalidInputName,

    /// No output format was given and the input has no usable extension.
    #[error("cannot infer an output format for '{}'; pass one explicitly", .0.display())]
    MissingFormat(PathBuf),

    /// The output directory could not be created.
    #[error("failed to create output directory '{}'", .path.display())]
    CreateOutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A chunk would overwrite an existing file and overwriting is disabled.
    #[error("output file already exists: {} (use --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    /// The external tool binary could not be started.
    #[error("'{tool}' was not found; install it or point to it explicitly")]
    ToolNotFound { tool: String },

    /// The external tool exited unsuccessfully.
    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The duration probe returned something that is not a duration.
    #[error("could not read a duration from probe output '{0}'")]
    InvalidProbeOutput(String),

    /// The container does not advertise enough metadata to compute its length.
    #[error("input stream does not advertise its duration")]
    UnknownDuration,

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Extraction of a single chunk failed; the run stops at this chunk.
    #[error("failed to extract chunk {index} to '{}'", .path.display())]
    ChunkFailed {
        index: usize,
        path: PathBuf,
        #[source]
        source: Box<AudioSplitError>,
    },

    /// Wrapper around errors produced by the Symphonia probing library.
    #[error(transparent)]
    Symphonia(#[from] SymphoniaError),

    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioSplitError {
    /// Whether the error stems from an invalid job configuration rather than
    /// from the input or the external tool.
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            AudioSplitError::InvalidChunkLength
                | AudioSplitError::OverlapTooLarge { .. }
                | AudioSplitError::ChunkLimitExceeded { .. }
        )
    }
}
