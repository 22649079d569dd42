//! vidstrip
//!
//! Command-line tool that copies media files without their audio streams. Packets are
//! copied as-is; nothing is decoded or re-encoded.
//!
//! # Usage
//!
//! ```bash
//! vidstrip strip --in movie.mp4 --out movie_noaudio.mp4
//! vidstrip batch --dir ./videos --jobs 4
//! vidstrip inspect --in movie.mp4 --keep non-audio
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use vidstrip::cli::{commands, Cli, Commands};
use vidstrip::config::RemuxConfig;
use vidstrip::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI > env > file > defaults
    let mut config = RemuxConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    cli.apply_global(&mut config);
    config.log.validate()?;

    logging::init(&config.log);
    info!("Starting vidstrip {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Strip(args) => commands::strip(args, config),
        Commands::Batch(args) => commands::batch(args, config).await,
        Commands::Inspect(args) => commands::inspect(args, config),
    }
}
