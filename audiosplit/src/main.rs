mod cli;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use audiosplit_core::{
    format_timestamp, plan, run_with_progress, Config, ProbeBackend, ProgressEvent,
    TranscodeOptions,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;

use crate::cli::build_cli;

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    let chunk_length = *matches
        .get_one::<Duration>("duration")
        .expect("defaulted argument");
    let overlap = *matches
        .get_one::<Duration>("overlap")
        .expect("defaulted argument");
    let output_dir = matches
        .get_one::<PathBuf>("output")
        .expect("defaulted argument");
    let postfix = matches
        .get_one::<String>("postfix")
        .expect("defaulted argument");
    let max_chunks = *matches
        .get_one::<NonZeroUsize>("max-chunks")
        .expect("defaulted argument");
    let probe = match matches.get_one::<String>("probe").map(String::as_str) {
        Some("native") => ProbeBackend::Native,
        _ => ProbeBackend::Ffprobe,
    };
    let transcode = TranscodeOptions {
        sample_rate: matches.get_one::<u32>("sample-rate").copied(),
        channels: matches.get_one::<u16>("channels").copied(),
        codec: matches.get_one::<String>("codec").cloned(),
    };

    let mut builder = Config::builder(input_path, output_dir, chunk_length)
        .overlap(overlap)
        .postfix(postfix.as_str())
        .overwrite(matches.get_flag("overwrite"))
        .max_chunks(max_chunks)
        .probe(probe)
        .ffmpeg(matches.get_one::<PathBuf>("ffmpeg").expect("defaulted argument"))
        .ffprobe(matches.get_one::<PathBuf>("ffprobe").expect("defaulted argument"))
        .transcode(transcode);
    if let Some(format) = matches.get_one::<String>("format") {
        builder = builder.format(format.as_str());
    }
    let config = builder.build().with_context(|| {
        format!(
            "failed to create configuration for '{}'",
            input_path.display()
        )
    })?;

    if matches.get_flag("dry-run") {
        let plan = plan(&config)
            .with_context(|| format!("failed to plan chunks for '{}'", input_path.display()))?;

        println!(
            "Dry run: would generate {} chunk(s) from {} of audio:",
            plan.len(),
            format_timestamp(plan.total_duration)
        );
        for chunk in &plan.chunks {
            println!("  {}  [{}]", chunk.path.display(), chunk.interval);
        }

        return Ok(());
    }

    let output_dir = config.output_dir.clone();
    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(bar_style);

    let progress_handle = progress.clone();
    let result = run_with_progress(config, move |event| match event {
        ProgressEvent::Start {
            total_duration,
            chunks,
        } => {
            info!(
                "splitting {} of audio into {chunks} chunk(s)",
                format_timestamp(total_duration)
            );
            progress_handle.set_length(chunks as u64);
            progress_handle.enable_steady_tick(Duration::from_millis(100));
        }
        ProgressEvent::ChunkStarted { path, .. } => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress_handle.set_message(name);
        }
        ProgressEvent::ChunkFinished { .. } => progress_handle.inc(1),
        ProgressEvent::Finish => {
            progress_handle.set_message(String::from("Completed"));
        }
    })
    .with_context(|| format!("failed to split '{}'", input_path.display()));

    progress.finish_and_clear();

    let metrics = result?;
    println!(
        "Finished: {} chunk(s) saved to {}",
        metrics.chunks_written,
        output_dir.display()
    );

    Ok(())
}
