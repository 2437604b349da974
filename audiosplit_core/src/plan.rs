use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{validate_geometry, Config, DEFAULT_MAX_CHUNKS};
use crate::error::AudioSplitError;

/// A contiguous time range of the input, `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkInterval {
    pub start: Duration,
    pub end: Duration,
}

impl ChunkInterval {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for ChunkInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

/// One chunk of a [`ChunkPlan`]: where it lies in the input and where it goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedChunk {
    /// 1-based position of the chunk.
    pub index: usize,
    pub interval: ChunkInterval,
    pub path: PathBuf,
}

/// Every chunk a run will produce, in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    pub total_duration: Duration,
    pub chunks: Vec<PlannedChunk>,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Number of intervals [`plan_intervals`] yields, computed without
/// materialising them.
///
/// The geometry must already be valid (`chunk_length > overlap`).
pub fn chunk_count(total: Duration, chunk_length: Duration, overlap: Duration) -> u128 {
    if total.is_zero() {
        return 0;
    }
    if total <= chunk_length {
        return 1;
    }
    let step = (chunk_length - overlap).as_nanos();
    let remaining = (total - overlap).as_nanos();
    remaining.div_ceil(step)
}

/// Compute the chunk boundaries covering `[0, total]`.
///
/// Chunks start every `chunk_length - overlap` and are `chunk_length` long,
/// except the last one, which is clipped to `total`. Generation stops with
/// the first chunk that reaches `total`, so the tail is never emitted twice.
/// At most [`DEFAULT_MAX_CHUNKS`] intervals are produced.
pub fn plan_intervals(
    total: Duration,
    chunk_length: Duration,
    overlap: Duration,
) -> Result<Vec<ChunkInterval>, AudioSplitError> {
    plan_intervals_with_limit(total, chunk_length, overlap, DEFAULT_MAX_CHUNKS)
}

/// [`plan_intervals`] with an explicit bound on the number of intervals.
///
/// The count is checked before anything is allocated.
pub fn plan_intervals_with_limit(
    total: Duration,
    chunk_length: Duration,
    overlap: Duration,
    limit: NonZeroUsize,
) -> Result<Vec<ChunkInterval>, AudioSplitError> {
    validate_geometry(chunk_length, overlap)?;
    let required = chunk_count(total, chunk_length, overlap);
    let limit = limit.get();
    if required > limit as u128 {
        return Err(AudioSplitError::ChunkLimitExceeded { limit, required });
    }

    let step = chunk_length - overlap;
    let mut intervals = Vec::with_capacity(required as usize);
    let mut start = Duration::ZERO;
    while start < total {
        let end = start.saturating_add(chunk_length).min(total);
        intervals.push(ChunkInterval { start, end });
        if end == total {
            break;
        }
        start += step;
    }

    Ok(intervals)
}

/// Plan the chunks of `config` for an input lasting `total`.
///
/// Enforces the configured chunk limit before any interval is allocated.
pub fn plan_chunks(config: &Config, total: Duration) -> Result<ChunkPlan, AudioSplitError> {
    validate_geometry(config.chunk_length, config.overlap)?;
    if total.is_zero() {
        return Err(AudioSplitError::EmptyInput(config.input_path.clone()));
    }

    let base_name = config.base_name()?;
    let intervals = plan_intervals_with_limit(
        total,
        config.chunk_length,
        config.overlap,
        config.max_chunks,
    )?;
    let pad_width = num_width(intervals.len() as u64).max(3);

    let chunks = intervals
        .into_iter()
        .enumerate()
        .map(|(offset, interval)| {
            let index = offset + 1;
            let file_name = chunk_file_name(
                base_name,
                &config.postfix,
                index,
                pad_width,
                &config.format,
            );
            PlannedChunk {
                index,
                interval,
                path: config.output_dir.join(file_name),
            }
        })
        .collect();

    Ok(ChunkPlan {
        total_duration: total,
        chunks,
    })
}

/// `{base}_{postfix}_{index}.{extension}` with the index zero-padded.
pub fn chunk_file_name(
    base_name: &str,
    postfix: &str,
    index: usize,
    pad_width: usize,
    extension: &str,
) -> String {
    if postfix.is_empty() {
        format!("{base_name}_{index:0pad_width$}.{extension}")
    } else {
        format!("{base_name}_{postfix}_{index:0pad_width$}.{extension}")
    }
}

fn num_width(mut value: u64) -> usize {
    if value == 0 {
        return 1;
    }

    let mut width = 0;
    while value > 0 {
        value /= 10;
        width += 1;
    }
    width
}

/// `HH:MM:SS.mmm`, as printed in dry runs and log lines.
pub fn format_timestamp(value: Duration) -> String {
    let total_ms = value.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
