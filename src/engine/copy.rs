//! Stream copy implementation

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::domain::model::StreamDescriptor;
use crate::engine::{PipelineStage, RemuxOptions, RemuxReport, WriteFailurePolicy};
use crate::error::{RemuxError, RemuxResult};
use crate::ports::{Demuxer, MediaBackend, Muxer};
use crate::streams::StreamIndexMap;

type Parameters<B> = <<B as MediaBackend>::Reader as Demuxer>::Parameters;

/// Stream copy remuxer: demux, filter, remux without touching payloads.
///
/// Reader and writer are scoped to a single `run`; whichever of them was acquired is
/// released when the run returns, on success and on every failure.
pub struct StreamCopyRemuxer<B> {
    backend: B,
    options: RemuxOptions,
}

impl<B: MediaBackend> StreamCopyRemuxer<B> {
    /// Create a new stream copy remuxer
    pub fn new(backend: B, options: RemuxOptions) -> Self {
        Self { backend, options }
    }

    /// Remux `input` into `output`, keeping the streams the configured selection matches
    pub fn run(&self, input: &Path, output: &Path) -> RemuxResult<RemuxReport> {
        let selection = &self.options.keep;
        self.run_with(input, output, |stream| selection.matches(stream))
    }

    /// Remux with an arbitrary stream predicate in place of the configured selection
    pub fn run_with(
        &self,
        input: &Path,
        output: &Path,
        keep: impl Fn(&StreamDescriptor<Parameters<B>>) -> bool,
    ) -> RemuxResult<RemuxReport> {
        info!(input = %input.display(), output = %output.display(), "Processing file");

        match self.remux(input, output, keep) {
            Ok(report) => {
                info!(
                    input = %input.display(),
                    streams = report.output_streams,
                    packets = report.packets_written,
                    "Video saved to {}",
                    output.display()
                );
                Ok(report)
            }
            Err(e) => {
                let stage = e.stage().unwrap_or(PipelineStage::Init);
                error!(input = %input.display(), %stage, "Failed to process file: {}", e);
                Err(e)
            }
        }
    }

    fn remux(
        &self,
        input: &Path,
        output: &Path,
        keep: impl Fn(&StreamDescriptor<Parameters<B>>) -> bool,
    ) -> RemuxResult<RemuxReport> {
        let mut reader = self.backend.open(input)?;
        debug!(stage = %PipelineStage::SourceOpen, input = %input.display());

        let streams = reader.probe()?;
        debug!(stage = %PipelineStage::Probed, streams = streams.len());

        let mut writer = self
            .backend
            .create(output, self.options.format.as_deref())?;
        debug!(stage = %PipelineStage::DestCreated, output = %output.display());

        let map = StreamIndexMap::build(&streams, keep);
        for stream in &streams {
            let Some(expected) = map.get(stream.index) else {
                continue;
            };
            let dest = writer.add_stream(stream)?;
            if dest != expected {
                return Err(RemuxError::Alloc {
                    path: output.display().to_string(),
                    message: format!(
                        "stream {} was allocated at index {} instead of {}",
                        stream.index, dest, expected
                    ),
                });
            }
        }
        debug!(stage = %PipelineStage::StreamsMapped, retained = map.retained_count());

        writer.write_header()?;
        debug!(stage = %PipelineStage::HeaderWritten);

        let mut report = RemuxReport {
            input: input.display().to_string(),
            output: output.display().to_string(),
            source_streams: streams.len(),
            output_streams: map.retained_count(),
            ..RemuxReport::default()
        };

        while let Some(packet) = reader.next_packet() {
            report.packets_read += 1;

            let Some(dest) = map.get(packet.stream_index) else {
                report.packets_discarded += 1;
                continue;
            };

            if let Err(e) = writer.write_packet(dest, packet) {
                report.write_failures += 1;
                match self.options.on_write_error {
                    WriteFailurePolicy::Skip => {
                        warn!(output = %output.display(), "{}; packet dropped", e);
                    }
                    WriteFailurePolicy::Stop => {
                        warn!(output = %output.display(), "{}; finalizing early", e);
                        report.stopped_early = true;
                        break;
                    }
                    WriteFailurePolicy::Abort => return Err(e),
                }
            } else {
                report.packets_written += 1;
            }
        }
        debug!(
            stage = %PipelineStage::Copying,
            read = report.packets_read,
            written = report.packets_written,
            discarded = report.packets_discarded
        );

        writer.write_trailer()?;
        debug!(stage = %PipelineStage::Finalized);

        drop(writer);
        drop(reader);
        debug!(stage = %PipelineStage::Closed);

        Ok(report)
    }
}
