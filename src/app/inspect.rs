// Inspect interactor - probe a file and preview what a selection keeps

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::model::{MediaKind, Timebase};
use crate::error::RemuxResult;
use crate::ports::{Demuxer, MediaBackend};
use crate::streams::{StreamIndexMap, StreamSelection};

/// One source stream and its fate under the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub index: usize,
    pub kind: MediaKind,
    pub codec: String,
    pub time_base: Timebase,
    /// Destination index if the stream is kept
    pub output_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub input: String,
    pub selection: String,
    pub streams: Vec<StreamSummary>,
}

impl InspectReport {
    pub fn kept(&self) -> usize {
        self.streams
            .iter()
            .filter(|s| s.output_index.is_some())
            .count()
    }
}

/// Open and probe `input` without creating any output
pub fn inspect<B: MediaBackend>(
    backend: &B,
    input: &Path,
    selection: &StreamSelection,
) -> RemuxResult<InspectReport> {
    let mut reader = backend.open(input)?;
    let streams = reader.probe()?;
    let map = StreamIndexMap::build(&streams, |s| selection.matches(s));

    let summaries: Vec<StreamSummary> = streams
        .iter()
        .map(|stream| StreamSummary {
            index: stream.index,
            kind: stream.kind,
            codec: stream.codec.clone(),
            time_base: stream.time_base,
            output_index: map.get(stream.index),
        })
        .collect();

    info!(
        input = %input.display(),
        streams = summaries.len(),
        kept = map.retained_count(),
        "Media file probed successfully"
    );

    Ok(InspectReport {
        input: input.display().to_string(),
        selection: selection.to_string(),
        streams: summaries,
    })
}

/// Human-readable rendering of an inspect report
pub fn format_as_text(report: &InspectReport) -> String {
    let mut text = String::new();
    text.push_str(&format!("Input: {}\n", report.input));
    text.push_str(&format!("Selection: {}\n", report.selection));
    for stream in &report.streams {
        let fate = match stream.output_index {
            Some(dest) => format!("keep -> #{}", dest),
            None => "drop".to_string(),
        };
        text.push_str(&format!(
            "  #{} {:<10} {:<12} tb={:<12} {}\n",
            stream.index,
            stream.kind.to_string(),
            stream.codec,
            stream.time_base.to_string(),
            fate
        ));
    }
    text.push_str(&format!(
        "{} of {} streams kept\n",
        report.kept(),
        report.streams.len()
    ));
    text
}
