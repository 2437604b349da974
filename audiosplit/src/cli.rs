pub mod duration;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use audiosplit_core::DEFAULT_POSTFIX;
use clap::{builder::ValueParser, value_parser, Arg, ArgAction, Command};

use self::duration::{parse_duration, parse_non_negative};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CHUNK_LENGTH: &str = "300";
pub const DEFAULT_OVERLAP: &str = "0";
pub const DEFAULT_MAX_CHUNKS: &str = "50000";

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split audio files into fixed-length, optionally overlapping chunks using ffmpeg")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("DURATION")
                .help("Length of each chunk in seconds or with units (e.g. 300, 5m, 1m30s)")
                .default_value(DEFAULT_CHUNK_LENGTH)
                .value_parser(ValueParser::new(parse_duration)),
        )
        .arg(
            Arg::new("overlap")
                .short('l')
                .long("overlap")
                .value_name("DURATION")
                .help("Time shared by consecutive chunks; must be shorter than the chunk length")
                .default_value(DEFAULT_OVERLAP)
                .value_parser(ValueParser::new(parse_non_negative)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("Directory where the chunks will be written (created if missing)")
                .default_value(DEFAULT_OUTPUT_DIR)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("EXTENSION")
                .help("Output file extension [default: same as the input]"),
        )
        .arg(
            Arg::new("postfix")
                .short('p')
                .long("postfix")
                .value_name("POSTFIX")
                .help("Postfix inserted into generated file names")
                .default_value(DEFAULT_POSTFIX),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Allow overwriting existing files in the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Preview the planned chunks without writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("probe")
                .long("probe")
                .value_name("BACKEND")
                .help("How to measure the input duration")
                .value_parser(["ffprobe", "native"])
                .default_value("ffprobe"),
        )
        .arg(
            Arg::new("ffmpeg")
                .long("ffmpeg")
                .value_name("PATH")
                .help("ffmpeg binary used to extract chunks")
                .env("AUDIOSPLIT_FFMPEG")
                .default_value("ffmpeg")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ffprobe")
                .long("ffprobe")
                .value_name("PATH")
                .help("ffprobe binary used to measure the input")
                .env("AUDIOSPLIT_FFPROBE")
                .default_value("ffprobe")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("sample-rate")
                .long("sample-rate")
                .value_name("HZ")
                .help("Resample chunks to this rate (e.g. 16000)")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("channels")
                .long("channels")
                .value_name("COUNT")
                .help("Number of audio channels in the chunks (e.g. 1 for mono)")
                .value_parser(value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("codec")
                .long("codec")
                .value_name("CODEC")
                .help("Audio codec passed to ffmpeg (e.g. pcm_s16le, libmp3lame)"),
        )
        .arg(
            Arg::new("max-chunks")
                .long("max-chunks")
                .value_name("COUNT")
                .help("Refuse to run if more chunks than this would be produced")
                .default_value(DEFAULT_MAX_CHUNKS)
                .value_parser(value_parser!(NonZeroUsize)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v info, -vv debug); RUST_LOG takes precedence")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input audio file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}
