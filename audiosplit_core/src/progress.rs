use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::plan::ChunkInterval;

/// Progress notifications emitted while a run is underway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent<'a> {
    /// Planning finished; extraction is about to begin.
    Start {
        total_duration: Duration,
        chunks: usize,
    },
    /// The external tool is being invoked for one chunk.
    ChunkStarted {
        index: usize,
        interval: ChunkInterval,
        path: &'a Path,
    },
    /// One chunk has been written.
    ChunkFinished { index: usize, interval: ChunkInterval },
    /// All chunks have been written.
    Finish,
}

/// Receives [`ProgressEvent`]s. The default implementation ignores them.
pub trait ProgressReporter {
    fn report(&mut self, _event: ProgressEvent<'_>) {}
}

/// Adapts a closure into a [`ProgressReporter`].
pub(crate) struct CallbackReporter<F>(pub(crate) F);

impl<F> ProgressReporter for CallbackReporter<F>
where
    F: FnMut(ProgressEvent<'_>),
{
    fn report(&mut self, event: ProgressEvent<'_>) {
        (self.0)(event)
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunMetrics {
    pub chunks_written: usize,
    pub total_duration: Duration,
    pub outputs: Vec<PathBuf>,
}
