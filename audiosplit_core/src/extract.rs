use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use log::debug;

use crate::config::{Config, TranscodeOptions};
use crate::error::AudioSplitError;
use crate::plan::ChunkInterval;
use crate::probe::spawn_error;

/// Writes one time range of an input file to a new output file.
pub trait ChunkExtractor {
    fn extract(
        &mut self,
        input: &Path,
        interval: ChunkInterval,
        output: &Path,
    ) -> Result<(), AudioSplitError>;
}

/// Runs `ffmpeg` once per chunk.
#[derive(Clone, Debug)]
pub struct FfmpegExtractor {
    binary: PathBuf,
    overwrite: bool,
    transcode: TranscodeOptions,
}

impl FfmpegExtractor {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
            overwrite: false,
            transcode: TranscodeOptions::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            binary: config.ffmpeg.clone(),
            overwrite: config.overwrite,
            transcode: config.transcode.clone(),
        }
    }

    fn tool(&self) -> String {
        self.binary.display().to_string()
    }

    /// Check that the binary can be started at all.
    pub fn verify(&self) -> Result<(), AudioSplitError> {
        let tool = self.tool();
        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(|err| spawn_error(&tool, err))?;

        if !output.status.success() {
            return Err(AudioSplitError::ToolFailed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        if let Some(banner) = String::from_utf8_lossy(&output.stdout).lines().next() {
            debug!("using {banner}");
        }
        Ok(())
    }

    /// Arguments passed to ffmpeg for one chunk.
    pub fn arguments(&self, input: &Path, interval: ChunkInterval, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostdin",
            if self.overwrite { "-y" } else { "-n" },
            "-ss",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(seconds_arg(interval.start.as_micros()).into());
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
        args.push("-t".into());
        args.push(seconds_arg(length_micros(interval.length())).into());

        if let Some(rate) = self.transcode.sample_rate {
            args.push("-ar".into());
            args.push(rate.to_string().into());
        }
        if let Some(channels) = self.transcode.channels {
            args.push("-ac".into());
            args.push(channels.to_string().into());
        }
        if let Some(codec) = &self.transcode.codec {
            args.push("-c:a".into());
            args.push(codec.into());
        }

        args.push(output.as_os_str().to_owned());
        args
    }
}

impl ChunkExtractor for FfmpegExtractor {
    fn extract(
        &mut self,
        input: &Path,
        interval: ChunkInterval,
        output: &Path,
    ) -> Result<(), AudioSplitError> {
        let tool = self.tool();
        let args = self.arguments(input, interval, output);
        debug!("running {tool} {args:?}");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| spawn_error(&tool, err))?;

        if !result.status.success() {
            return Err(AudioSplitError::ToolFailed {
                tool,
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }
}

/// Seconds with microsecond precision, the finest ffmpeg reads for `-ss`/`-t`.
fn seconds_arg(micros: u128) -> String {
    format!("{}.{:06}", micros / 1_000_000, micros % 1_000_000)
}

/// Chunk length in microseconds, rounded up so a non-empty chunk never
/// reaches ffmpeg as `-t 0`.
fn length_micros(length: Duration) -> u128 {
    length.as_nanos().div_ceil(1_000)
}
