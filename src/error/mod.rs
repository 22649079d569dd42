//! Error handling module for vidstrip

use thiserror::Error;

use crate::engine::PipelineStage;

/// Main error type for remux operations
#[derive(Error, Debug)]
pub enum RemuxError {
    /// Source missing, unreadable or not a recognized container
    #[error("Could not open input file {path}: {message}")]
    Open { path: String, message: String },

    /// Stream information could not be determined
    #[error("Could not find stream information for file {path}: {message}")]
    Probe { path: String, message: String },

    /// Destination unwritable or no container format could be assigned
    #[error("Could not create output context for file {path}: {message}")]
    Create { path: String, message: String },

    /// A destination stream could not be allocated
    #[error("Failed allocating output stream for file {path}: {message}")]
    Alloc { path: String, message: String },

    /// The container preamble could not be written
    #[error("Error occurred when writing output file header for file {path}: {message}")]
    Header { path: String, message: String },

    /// A single packet could not be appended
    #[error("Error muxing packet for file {path}: {message}")]
    Write { path: String, message: String },

    /// The closing structural metadata could not be written
    #[error("Error occurred when writing output file trailer for file {path}: {message}")]
    Trailer { path: String, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// FFmpeg initialization error
    #[error("Failed to initialize FFmpeg: {message}")]
    FFmpegInit { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemuxError {
    /// Pipeline stage this error was raised in, if it belongs to one
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            RemuxError::Open { .. } => Some(PipelineStage::SourceOpen),
            RemuxError::Probe { .. } => Some(PipelineStage::Probed),
            RemuxError::Create { .. } => Some(PipelineStage::DestCreated),
            RemuxError::Alloc { .. } => Some(PipelineStage::StreamsMapped),
            RemuxError::Header { .. } => Some(PipelineStage::HeaderWritten),
            RemuxError::Write { .. } => Some(PipelineStage::Copying),
            RemuxError::Trailer { .. } => Some(PipelineStage::Finalized),
            _ => None,
        }
    }

    /// Whether the error ends the run regardless of policy
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RemuxError::Write { .. })
    }
}

/// Result type alias for remux operations
pub type RemuxResult<T> = std::result::Result<T, RemuxError>;
