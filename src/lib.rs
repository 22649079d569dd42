//! vidstrip library
//!
//! Copies a media container's streams into a new container of the same kind, dropping
//! every stream the selection rejects (audio, by default). Packets are never decoded;
//! only their timestamps are rescaled into the destination streams' time bases.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use adapters::LibavBackend;
pub use config::RemuxConfig;
pub use domain::model::{MediaKind, Packet, PacketTiming, StreamDescriptor, Timebase};
pub use engine::{RemuxOptions, RemuxReport, StreamCopyRemuxer, WriteFailurePolicy};
pub use error::{RemuxError, RemuxResult};
pub use streams::{StreamIndexMap, StreamSelection};

/// Remux `input` into `output` with the libav backend, keeping video streams only
pub fn remove_audio(
    input: &std::path::Path,
    output: &std::path::Path,
) -> RemuxResult<RemuxReport> {
    let backend = LibavBackend::new()?;
    StreamCopyRemuxer::new(backend, RemuxOptions::default()).run(input, output)
}
