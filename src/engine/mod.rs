//! Core remux engine module

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RemuxError;
use crate::streams::StreamSelection;

pub mod copy;

pub use copy::StreamCopyRemuxer;

/// What to do when a single packet cannot be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// Drop the packet and keep copying
    #[default]
    Skip,
    /// Stop copying, then finalize what was written
    Stop,
    /// Fail the run without writing the trailer
    Abort,
}

impl FromStr for WriteFailurePolicy {
    type Err = RemuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(WriteFailurePolicy::Skip),
            "stop" => Ok(WriteFailurePolicy::Stop),
            "abort" => Ok(WriteFailurePolicy::Abort),
            other => Err(RemuxError::Config {
                message: format!(
                    "Unknown write failure policy '{}'. Expected skip, stop or abort",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for WriteFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteFailurePolicy::Skip => "skip",
            WriteFailurePolicy::Stop => "stop",
            WriteFailurePolicy::Abort => "abort",
        })
    }
}

/// Remux engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemuxOptions {
    /// Streams to retain
    pub keep: StreamSelection,
    /// Per-packet write failure handling
    pub on_write_error: WriteFailurePolicy,
    /// Output container format name, inferred from the output path when absent
    pub format: Option<String>,
}

/// Pipeline states, in the order a successful run passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Init,
    SourceOpen,
    Probed,
    DestCreated,
    StreamsMapped,
    HeaderWritten,
    Copying,
    Finalized,
    Closed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::SourceOpen => "open",
            PipelineStage::Probed => "probe",
            PipelineStage::DestCreated => "create",
            PipelineStage::StreamsMapped => "map streams",
            PipelineStage::HeaderWritten => "write header",
            PipelineStage::Copying => "copy packets",
            PipelineStage::Finalized => "write trailer",
            PipelineStage::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of one successful pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemuxReport {
    pub input: String,
    pub output: String,
    /// Streams found in the source
    pub source_streams: usize,
    /// Streams created in the destination
    pub output_streams: usize,
    pub packets_read: u64,
    pub packets_written: u64,
    /// Packets belonging to dropped streams
    pub packets_discarded: u64,
    pub write_failures: u64,
    /// Copying ended on a write failure under the `stop` policy
    pub stopped_early: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("skip".parse::<WriteFailurePolicy>().unwrap(), WriteFailurePolicy::Skip);
        assert_eq!(" STOP ".parse::<WriteFailurePolicy>().unwrap(), WriteFailurePolicy::Stop);
        assert_eq!("abort".parse::<WriteFailurePolicy>().unwrap(), WriteFailurePolicy::Abort);
        assert!("retry".parse::<WriteFailurePolicy>().is_err());
    }

    #[test]
    fn test_default_options() {
        let options = RemuxOptions::default();
        assert_eq!(options.keep, StreamSelection::Video);
        assert_eq!(options.on_write_error, WriteFailurePolicy::Skip);
        assert!(options.format.is_none());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Probed.to_string(), "probe");
        assert_eq!(PipelineStage::HeaderWritten.to_string(), "write header");
    }
}
