// Batch interactor - run one pipeline per matching file in a directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::engine::{RemuxOptions, RemuxReport, StreamCopyRemuxer};
use crate::error::{RemuxError, RemuxResult};
use crate::ports::MediaBackend;
use crate::utils::path::PathUtils;

/// Directory scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Extension of the files to process, compared case-insensitively
    pub extension: String,
    /// Appended to the input stem to name the output
    pub suffix: String,
    /// Concurrent pipelines; defaults to the number of CPUs
    pub jobs: Option<usize>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Where outputs go; next to each input when absent
    pub output_dir: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: "mp4".to_string(),
            suffix: "_noaudio".to_string(),
            jobs: None,
            recursive: false,
            output_dir: None,
        }
    }
}

impl BatchConfig {
    pub fn concurrency(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// One (input, output) pair handed to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Result of one job
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub input: String,
    pub output: String,
    pub report: Option<RemuxReport>,
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Collect the files under `dir` that match the configured extension, sorted by path.
///
/// Files whose stem already ends with the output suffix are skipped so a second run
/// does not process the previous run's outputs. Under `output_dir`, each input's
/// subdirectory relative to `dir` is recreated. Two inputs that would write the same
/// output are rejected.
pub fn discover(dir: &Path, config: &BatchConfig) -> RemuxResult<Vec<BatchJob>> {
    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut jobs = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| RemuxError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let input = entry.path();
        if !PathUtils::has_extension(input, &config.extension) {
            continue;
        }
        if !config.suffix.is_empty()
            && PathUtils::get_stem(input).is_some_and(|stem| stem.ends_with(&config.suffix))
        {
            continue;
        }

        let output_dir = config.output_dir.as_deref().map(|out| {
            let relative = input
                .parent()
                .and_then(|parent| parent.strip_prefix(dir).ok())
                .unwrap_or_else(|| Path::new(""));
            out.join(relative)
        });
        let output = PathUtils::output_path_for(
            input,
            &config.suffix,
            &config.extension,
            output_dir.as_deref(),
        )?;
        jobs.push(BatchJob {
            input: input.to_path_buf(),
            output,
        });
    }

    jobs.sort_by(|a, b| a.input.cmp(&b.input));
    reject_shared_outputs(&jobs)?;
    Ok(jobs)
}

fn reject_shared_outputs(jobs: &[BatchJob]) -> RemuxResult<()> {
    let mut claimed: HashMap<&Path, &Path> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        if let Some(first) = claimed.insert(job.output.as_path(), job.input.as_path()) {
            return Err(RemuxError::Config {
                message: format!(
                    "{} and {} would both be written to {}",
                    first.display(),
                    job.input.display(),
                    job.output.display()
                ),
            });
        }
    }
    Ok(())
}

fn run_job<B: MediaBackend>(backend: B, options: RemuxOptions, job: &BatchJob) -> BatchEntry {
    let remuxer = StreamCopyRemuxer::new(backend, options);
    let result = remuxer.run(&job.input, &job.output);

    let mut entry = BatchEntry {
        input: job.input.display().to_string(),
        output: job.output.display().to_string(),
        report: None,
        error: None,
    };
    match result {
        Ok(report) => {
            info!("Processed file successfully: {}", entry.input);
            entry.report = Some(report);
        }
        Err(e) => entry.error = Some(e.to_string()),
    }
    entry
}

/// Run every job, at most `concurrency` at a time; results come back in job order.
///
/// Each pipeline runs on a blocking thread and owns its reader and writer outright.
pub async fn run_batch<B>(
    backend: B,
    options: RemuxOptions,
    jobs: Vec<BatchJob>,
    concurrency: usize,
) -> BatchSummary
where
    B: MediaBackend + Clone + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    info!(files = jobs.len(), concurrency, "Starting batch");

    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let semaphore = Arc::clone(&semaphore);
            let backend = backend.clone();
            let options = options.clone();
            let paths = (
                job.input.display().to_string(),
                job.output.display().to_string(),
            );
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || run_job(backend, options, &job)).await
            });
            (paths, handle)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for ((input, output), handle) in handles {
        let entry = match handle.await {
            Ok(Ok(entry)) => entry,
            Ok(Err(e)) | Err(e) => {
                warn!(input = %input, "pipeline task did not complete: {}", e);
                BatchEntry {
                    input,
                    output,
                    report: None,
                    error: Some(format!("pipeline task did not complete: {}", e)),
                }
            }
        };
        summary.entries.push(entry);
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "Batch finished"
    );
    summary
}
