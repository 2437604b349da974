//! Split audio files into fixed-length, optionally overlapping chunks.
//!
//! The crate never touches audio samples itself. It asks a [`DurationProbe`]
//! how long the input is, plans the chunk boundaries with
//! [`plan_intervals`], and hands each range to a [`ChunkExtractor`]
//! (`ffmpeg` by default), one chunk at a time.

mod config;
mod error;
mod extract;
mod plan;
mod probe;
mod progress;

use std::fs;

use log::{debug, info};

pub use config::{
    validate_geometry, Config, ConfigBuilder, ProbeBackend, TranscodeOptions,
    DEFAULT_MAX_CHUNKS, DEFAULT_POSTFIX,
};
pub use error::AudioSplitError;
pub use extract::{ChunkExtractor, FfmpegExtractor};
pub use plan::{
    chunk_count, chunk_file_name, format_timestamp, plan_chunks, plan_intervals,
    plan_intervals_with_limit, ChunkInterval, ChunkPlan, PlannedChunk,
};
pub use probe::{parse_probe_output, DurationProbe, FfprobeProbe, NativeProbe, Probe};
pub use progress::{ProgressEvent, ProgressReporter, RunMetrics};

use progress::CallbackReporter;

/// Probe the input of `config` and compute its chunk plan without writing
/// anything.
pub fn plan(config: &Config) -> Result<ChunkPlan, AudioSplitError> {
    let total = Probe::from_config(config).probe(&config.input_path)?;
    plan_chunks(config, total)
}

/// Perform the splitting operation using the supplied [`Config`].
pub fn run(config: Config) -> Result<RunMetrics, AudioSplitError> {
    run_with_progress(config, |_| {})
}

/// Like [`run`], invoking `callback` with every [`ProgressEvent`].
pub fn run_with_progress<F>(config: Config, callback: F) -> Result<RunMetrics, AudioSplitError>
where
    F: FnMut(ProgressEvent<'_>),
{
    run_with_metrics(config, &mut CallbackReporter(callback))
}

/// Split with the tools named in `config`, reporting through `reporter`.
///
/// `ffmpeg` is checked before the input is probed so a missing binary is
/// reported ahead of any other failure.
pub fn run_with_metrics<R: ProgressReporter>(
    config: Config,
    reporter: &mut R,
) -> Result<RunMetrics, AudioSplitError> {
    let mut extractor = FfmpegExtractor::from_config(&config);
    extractor.verify()?;
    let probe = Probe::from_config(&config);
    split_with(&config, &probe, &mut extractor, reporter)
}

/// Run a split with explicit collaborators.
///
/// Chunks are extracted sequentially. The run stops at the first chunk that
/// fails; files written before it are left in place.
pub fn split_with<P, E, R>(
    config: &Config,
    probe: &P,
    extractor: &mut E,
    reporter: &mut R,
) -> Result<RunMetrics, AudioSplitError>
where
    P: DurationProbe + ?Sized,
    E: ChunkExtractor + ?Sized,
    R: ProgressReporter + ?Sized,
{
    let total = probe.probe(&config.input_path)?;
    let plan = plan_chunks(config, total)?;
    info!(
        "audio duration {} | chunk {:?} | overlap {:?} | chunks {}",
        format_timestamp(plan.total_duration),
        config.chunk_length,
        config.overlap,
        plan.len()
    );

    if !config.overwrite {
        if let Some(existing) = plan.chunks.iter().find(|chunk| chunk.path.exists()) {
            return Err(AudioSplitError::OutputExists(existing.path.clone()));
        }
    }

    fs::create_dir_all(&config.output_dir).map_err(|source| {
        AudioSplitError::CreateOutputDirectory {
            path: config.output_dir.clone(),
            source,
        }
    })?;

    reporter.report(ProgressEvent::Start {
        total_duration: plan.total_duration,
        chunks: plan.len(),
    });

    let mut outputs = Vec::with_capacity(plan.len());
    for chunk in &plan.chunks {
        reporter.report(ProgressEvent::ChunkStarted {
            index: chunk.index,
            interval: chunk.interval,
            path: &chunk.path,
        });

        extractor
            .extract(&config.input_path, chunk.interval, &chunk.path)
            .map_err(|source| AudioSplitError::ChunkFailed {
                index: chunk.index,
                path: chunk.path.clone(),
                source: Box::new(source),
            })?;
        debug!(
            "chunk {}/{} [{}] -> {}",
            chunk.index,
            plan.len(),
            chunk.interval,
            chunk.path.display()
        );

        reporter.report(ProgressEvent::ChunkFinished {
            index: chunk.index,
            interval: chunk.interval,
        });
        outputs.push(chunk.path.clone());
    }

    reporter.report(ProgressEvent::Finish);
    info!(
        "wrote {} chunk(s) to '{}'",
        outputs.len(),
        config.output_dir.display()
    );

    Ok(RunMetrics {
        chunks_written: outputs.len(),
        total_duration: plan.total_duration,
        outputs,
    })
}
