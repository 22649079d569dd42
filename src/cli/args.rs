//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the strip command
#[derive(Args, Debug)]
pub struct StripArgs {
    /// Input media file path
    #[arg(short = 'i', long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Output media file path
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Streams to keep: video, non-audio, kind:<list>, index:<list> or codec:<list>
    #[arg(long)]
    pub keep: Option<String>,

    /// Output container format (default: inferred from the output path)
    #[arg(long)]
    pub format: Option<String>,

    /// Packet write failure handling: skip, stop or abort
    #[arg(long)]
    pub on_write_error: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory to scan
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Extension of the files to process (default: mp4)
    #[arg(long)]
    pub ext: Option<String>,

    /// Suffix appended to each output file stem (default: _noaudio)
    #[arg(long)]
    pub suffix: Option<String>,

    /// Directory for the outputs (default: next to each input)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Files processed concurrently (default: number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Streams to keep: video, non-audio, kind:<list>, index:<list> or codec:<list>
    #[arg(long)]
    pub keep: Option<String>,

    /// Packet write failure handling: skip, stop or abort
    #[arg(long)]
    pub on_write_error: Option<String>,

    /// Print the batch summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input media file path
    #[arg(short = 'i', long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Selection to preview
    #[arg(long)]
    pub keep: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
