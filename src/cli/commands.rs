//! Command implementations

use std::fs;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::adapters::LibavBackend;
use crate::app::batch::{discover, run_batch, BatchSummary};
use crate::app::inspect::{format_as_text, inspect as inspect_file};
use crate::cli::args::{BatchArgs, InspectArgs, StripArgs};
use crate::config::RemuxConfig;
use crate::engine::{RemuxReport, StreamCopyRemuxer};
use crate::utils::Utils;

fn apply_remux_overrides(
    config: &mut RemuxConfig,
    keep: Option<&str>,
    on_write_error: Option<&str>,
) -> Result<()> {
    if let Some(keep) = keep {
        config.remux.keep = keep.parse()?;
    }
    if let Some(policy) = on_write_error {
        config.remux.on_write_error = policy.parse()?;
    }
    Ok(())
}

/// Execute the strip command
pub fn strip(args: StripArgs, mut config: RemuxConfig) -> Result<()> {
    apply_remux_overrides(
        &mut config,
        args.keep.as_deref(),
        args.on_write_error.as_deref(),
    )?;
    if let Some(format) = args.format {
        config.remux.format = Some(format);
    }
    config.validate()?;

    info!("Input: {}", args.input.display());
    info!("Output: {}", args.output.display());
    info!("Keeping: {}", config.remux.keep);

    let backend = LibavBackend::new()?;
    let started = Instant::now();
    let report = StreamCopyRemuxer::new(backend, config.remux)
        .run(&args.input, &args.output)
        .with_context(|| format!("Failed to process file: {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
        let size = fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);
        println!(
            "Wrote {} in {}",
            Utils::format_file_size(size),
            Utils::format_duration(started.elapsed())
        );
    }
    Ok(())
}

/// Execute the batch command
pub async fn batch(args: BatchArgs, mut config: RemuxConfig) -> Result<()> {
    apply_remux_overrides(
        &mut config,
        args.keep.as_deref(),
        args.on_write_error.as_deref(),
    )?;
    if let Some(ext) = args.ext {
        config.batch.extension = ext;
    }
    if let Some(suffix) = args.suffix {
        config.batch.suffix = suffix;
    }
    if args.output_dir.is_some() {
        config.batch.output_dir = args.output_dir;
    }
    if args.jobs.is_some() {
        config.batch.jobs = args.jobs;
    }
    if args.recursive {
        config.batch.recursive = true;
    }
    config.validate()?;

    let jobs = discover(&args.dir, &config.batch)
        .with_context(|| format!("Failed to scan directory: {}", args.dir.display()))?;
    if jobs.is_empty() {
        info!(
            "No .{} files found in {}",
            config.batch.extension,
            args.dir.display()
        );
        return Ok(());
    }
    if config.batch.output_dir.is_some() {
        for job in &jobs {
            if let Some(dir) = job.output.parent() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create output directory: {}", dir.display())
                })?;
            }
        }
    }

    let backend = LibavBackend::new()?;
    let concurrency = config.batch.concurrency();
    let summary = run_batch(backend, config.remux, jobs, concurrency).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&summary));
    }

    if summary.failed() > 0 {
        bail!(
            "{} of {} files failed",
            summary.failed(),
            summary.entries.len()
        );
    }
    Ok(())
}

/// Execute the inspect command
pub fn inspect(args: InspectArgs, mut config: RemuxConfig) -> Result<()> {
    apply_remux_overrides(&mut config, args.keep.as_deref(), None)?;

    let backend = LibavBackend::new()?;
    let report = inspect_file(&backend, &args.input, &config.remux.keep)
        .with_context(|| format!("Failed to inspect file: {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_as_text(&report));
    }
    Ok(())
}

fn format_report(report: &RemuxReport) -> String {
    let mut text = format!("Video saved to {}\n", report.output);
    text.push_str(&format!(
        "  streams: {} of {} kept\n",
        report.output_streams, report.source_streams
    ));
    text.push_str(&format!(
        "  packets: {} read, {} written, {} discarded\n",
        report.packets_read, report.packets_written, report.packets_discarded
    ));
    if report.write_failures > 0 {
        text.push_str(&format!(
            "  write failures: {}{}\n",
            report.write_failures,
            if report.stopped_early { " (stopped early)" } else { "" }
        ));
    }
    text
}

fn format_summary(summary: &BatchSummary) -> String {
    let mut text = String::new();
    for entry in &summary.entries {
        match &entry.error {
            None => text.push_str(&format!("ok     {} -> {}\n", entry.input, entry.output)),
            Some(e) => text.push_str(&format!("failed {}: {}\n", entry.input, e)),
        }
    }
    text.push_str(&format!(
        "{} succeeded, {} failed\n",
        summary.succeeded(),
        summary.failed()
    ));
    text
}
