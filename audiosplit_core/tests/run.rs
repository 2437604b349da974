use audiosplit_core::{
    plan, run, run_with_progress, AudioSplitError, Config, DurationProbe, NativeProbe,
    ProbeBackend, ProgressEvent,
};
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

/// Generate a small single-channel WAV file for testing.
///
/// The WAV data is synthesised procedurally so that no binary test assets need
/// to be stored in the repository.
fn write_test_tone<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    duration_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let total_samples = sample_rate as u64 * duration_ms / 1_000;
    let mut samples = Vec::with_capacity(total_samples as usize * 2);

    for n in 0..total_samples {
        let theta = (n as f32 / sample_rate as f32) * 2.0 * std::f32::consts::PI * 440.0;
        let sample = (theta.sin() * i16::MAX as f32) as i16;
        samples.extend_from_slice(&sample.to_le_bytes());
    }

    let mut file = File::create(path)?;
    let data_len = samples.len() as u32;
    let chunk_size = 36u32 + data_len;
    file.write_all(b"RIFF")?;
    file.write_all(&chunk_size.to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?;
    file.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * 2;
    file.write_all(&byte_rate.to_le_bytes())?;
    file.write_all(&2u16.to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?;
    file.write_all(b"data")?;
    file.write_all(&data_len.to_le_bytes())?;
    file.write_all(&samples)?;
    Ok(())
}

#[test]
fn native_probe_reads_wav_duration() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("tone.wav");
    write_test_tone(&input_path, 8_000, 1_100)?;

    let duration = NativeProbe.probe(&input_path)?;
    assert_eq!(duration.as_millis(), 1_100);

    work_dir.close()?;
    Ok(())
}

#[test]
fn native_probe_rejects_non_audio_input() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("input.bin");
    File::create(&input_path)?.write_all(b"not an audio file")?;

    let err = NativeProbe
        .probe(&input_path)
        .expect_err("unsupported input should fail");
    assert!(matches!(err, AudioSplitError::Symphonia(_)));

    work_dir.close()?;
    Ok(())
}

#[test]
fn plan_lists_chunks_without_writing() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("input.wav");
    write_test_tone(&input_path, 8_000, 1_100)?;
    let output_path = work_dir.path().join("chunks");

    let config = Config::builder(&input_path, &output_path, Duration::from_millis(400))
        .overlap(Duration::from_millis(100))
        .probe(ProbeBackend::Native)
        .build()?;
    let plan = plan(&config)?;

    assert_eq!(plan.total_duration, Duration::from_millis(1_100));
    assert_eq!(plan.len(), 4);
    assert_eq!(plan.chunks[0].path, output_path.join("input_chunk_001.wav"));
    assert_eq!(plan.chunks[3].interval.start, Duration::from_millis(900));
    assert_eq!(plan.chunks[3].interval.end, Duration::from_millis(1_100));
    assert!(!output_path.exists(), "planning must not create directories");

    work_dir.close()?;
    Ok(())
}

#[test]
fn plan_enforces_chunk_limit() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("long.wav");
    write_test_tone(&input_path, 8_000, 50_001)?;

    let config = Config::builder(&input_path, work_dir.path(), Duration::from_millis(1))
        .probe(ProbeBackend::Native)
        .build()?;
    let err = plan(&config).expect_err("chunk limit should be exceeded");

    match err {
        AudioSplitError::ChunkLimitExceeded { limit, required } => {
            assert_eq!(limit, 50_000);
            assert_eq!(required, 50_001);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    work_dir.close()?;
    Ok(())
}

#[test]
fn run_reports_missing_ffmpeg() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("tone.wav");
    write_test_tone(&input_path, 8_000, 500)?;

    let config = Config::builder(&input_path, work_dir.path(), Duration::from_millis(250))
        .ffmpeg("audiosplit-no-such-ffmpeg")
        .build()?;
    let err = run(config).expect_err("missing ffmpeg should be reported");
    assert!(matches!(err, AudioSplitError::ToolNotFound { .. }));

    work_dir.close()?;
    Ok(())
}

/// Shell-script stand-ins for ffmpeg and ffprobe.
#[cfg(unix)]
mod fake_tools {
    use std::fs;
    use std::io;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    pub fn write_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// Prints `seconds` as ffprobe would.
    pub fn ffprobe(dir: &Path, seconds: &str) -> io::Result<PathBuf> {
        write_script(dir, "ffprobe", &format!("echo {seconds}"))
    }

    /// Writes its argument list into the output file (the last argument).
    pub fn ffmpeg(dir: &Path) -> io::Result<PathBuf> {
        write_script(
            dir,
            "ffmpeg",
            r#"if [ "$1" = "-version" ]; then echo "ffmpeg version fake"; exit 0; fi
for last; do :; done
echo "$@" > "$last""#,
        )
    }

    /// Fails on the chunk whose output name contains `needle`.
    pub fn failing_ffmpeg(dir: &Path, needle: &str) -> io::Result<PathBuf> {
        write_script(
            dir,
            "ffmpeg",
            &format!(
                r#"if [ "$1" = "-version" ]; then echo "ffmpeg version fake"; exit 0; fi
for last; do :; done
case "$last" in
  *{needle}*) echo "conversion failed" >&2; exit 1 ;;
esac
echo "$@" > "$last""#
            ),
        )
    }
}

#[cfg(unix)]
fn sorted_outputs(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut outputs: Vec<_> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    outputs.sort();
    Ok(outputs)
}

#[cfg(unix)]
#[test]
fn run_invokes_ffmpeg_once_per_chunk() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let ffprobe = fake_tools::ffprobe(tools.path(), "90.000000")?;
    let ffmpeg = fake_tools::ffmpeg(tools.path())?;

    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("podcast.mp3");
    File::create(&input_path)?;
    let output_path = work_dir.path().join("out/nested");

    let config = Config::builder(&input_path, &output_path, Duration::from_secs(30))
        .overlap(Duration::from_secs(5))
        .ffmpeg(&ffmpeg)
        .ffprobe(&ffprobe)
        .build()?;

    let mut started = Vec::new();
    let metrics = run_with_progress(config, |event| {
        if let ProgressEvent::ChunkStarted { index, .. } = event {
            started.push(index);
        }
    })?;

    assert_eq!(metrics.chunks_written, 4);
    assert_eq!(metrics.total_duration, Duration::from_secs(90));
    assert_eq!(started, vec![1, 2, 3, 4]);

    let outputs = sorted_outputs(&output_path)?;
    let names: Vec<_> = outputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "podcast_chunk_001.mp3",
            "podcast_chunk_002.mp3",
            "podcast_chunk_003.mp3",
            "podcast_chunk_004.mp3",
        ]
    );

    let second = fs::read_to_string(&outputs[1])?;
    assert!(second.contains("-ss 25.000"), "unexpected args: {second}");
    assert!(second.contains("-t 30.000"), "unexpected args: {second}");
    let last = fs::read_to_string(&outputs[3])?;
    assert!(last.contains("-ss 75.000"), "unexpected args: {last}");
    assert!(last.contains("-t 15.000"), "unexpected args: {last}");
    assert!(last.contains(" -n "), "overwrite must be off by default: {last}");

    work_dir.close()?;
    tools.close()?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_aborts_on_failed_chunk() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let ffprobe = fake_tools::ffprobe(tools.path(), "90")?;
    let ffmpeg = fake_tools::failing_ffmpeg(tools.path(), "_002")?;

    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("podcast.mp3");
    File::create(&input_path)?;
    let output_path = work_dir.path().join("out");

    let config = Config::builder(&input_path, &output_path, Duration::from_secs(30))
        .ffmpeg(&ffmpeg)
        .ffprobe(&ffprobe)
        .build()?;
    let err = run(config).expect_err("second chunk should fail");

    match &err {
        AudioSplitError::ChunkFailed { index, source, .. } => {
            assert_eq!(*index, 2);
            assert!(source.to_string().contains("conversion failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let outputs = sorted_outputs(&output_path)?;
    assert_eq!(outputs.len(), 1, "chunks after the failure must not run");

    work_dir.close()?;
    tools.close()?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn run_surfaces_bad_probe_output() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let ffprobe = fake_tools::ffprobe(tools.path(), "N/A")?;
    let ffmpeg = fake_tools::ffmpeg(tools.path())?;

    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("stream.ogg");
    File::create(&input_path)?;

    let config = Config::builder(&input_path, work_dir.path(), Duration::from_secs(30))
        .ffmpeg(&ffmpeg)
        .ffprobe(&ffprobe)
        .build()?;
    let err = run(config).expect_err("unparsable duration should fail");
    assert!(matches!(err, AudioSplitError::InvalidProbeOutput(_)));

    work_dir.close()?;
    tools.close()?;
    Ok(())
}
