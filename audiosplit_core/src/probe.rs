use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::debug;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

use crate::config::{Config, ProbeBackend};
use crate::error::AudioSplitError;

/// Reports the total playing time of an input file.
pub trait DurationProbe {
    fn probe(&self, input: &Path) -> Result<Duration, AudioSplitError>;
}

/// Queries `ffprobe` for the container duration.
#[derive(Clone, Debug)]
pub struct FfprobeProbe {
    binary: PathBuf,
}

impl FfprobeProbe {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn probe(&self, input: &Path) -> Result<Duration, AudioSplitError> {
        let tool = self.binary.display().to_string();
        debug!("probing '{}' with {tool}", input.display());

        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(input)
            .output()
            .map_err(|err| spawn_error(&tool, err))?;

        if !output.status.success() {
            return Err(AudioSplitError::ToolFailed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads the duration from container headers through Symphonia without
/// decoding any audio.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeProbe;

impl DurationProbe for NativeProbe {
    fn probe(&self, input: &Path) -> Result<Duration, AudioSplitError> {
        let mut hint = Hint::new();
        if let Some(extension) = input.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let file = File::open(input)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let track = probed
            .format
            .default_track()
            .ok_or(AudioSplitError::MissingDefaultTrack)?;
        let params = &track.codec_params;
        let frames = params.n_frames.ok_or(AudioSplitError::UnknownDuration)?;

        if let Some(time_base) = params.time_base {
            let time = time_base.calc_time(frames);
            return Ok(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac));
        }

        let sample_rate = params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or(AudioSplitError::UnknownDuration)?;
        Ok(Duration::from_secs_f64(frames as f64 / f64::from(sample_rate)))
    }
}

/// The probe selected by a [`Config`].
#[derive(Clone, Debug)]
pub enum Probe {
    Ffprobe(FfprobeProbe),
    Native(NativeProbe),
}

impl Probe {
    pub fn from_config(config: &Config) -> Self {
        match config.probe {
            ProbeBackend::Ffprobe => Probe::Ffprobe(FfprobeProbe::new(&config.ffprobe)),
            ProbeBackend::Native => Probe::Native(NativeProbe),
        }
    }
}

impl DurationProbe for Probe {
    fn probe(&self, input: &Path) -> Result<Duration, AudioSplitError> {
        match self {
            Probe::Ffprobe(probe) => probe.probe(input),
            Probe::Native(probe) => probe.probe(input),
        }
    }
}

/// Parse the seconds value `ffprobe` prints for `format=duration`.
pub fn parse_probe_output(stdout: &str) -> Result<Duration, AudioSplitError> {
    let value = stdout.lines().map(str::trim).find(|line| !line.is_empty());
    let Some(value) = value else {
        return Err(AudioSplitError::InvalidProbeOutput(stdout.trim().to_owned()));
    };

    let seconds: f64 = value
        .parse()
        .map_err(|_| AudioSplitError::InvalidProbeOutput(value.to_owned()))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| AudioSplitError::InvalidProbeOutput(value.to_owned()))
}

pub(crate) fn spawn_error(tool: &str, err: io::Error) -> AudioSplitError {
    if err.kind() == io::ErrorKind::NotFound {
        AudioSplitError::ToolNotFound {
            tool: tool.to_owned(),
        }
    } else {
        AudioSplitError::Io(err)
    }
}
