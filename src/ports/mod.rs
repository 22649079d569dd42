// Ports - Interface definitions between the pipeline and a media backend
//
// Release of the underlying resources is tied to `Drop`: a reader or writer that has been
// handed out is closed exactly once, when it goes out of scope, on every exit path.

use std::path::Path;

use crate::domain::model::{Packet, StreamDescriptor};
use crate::error::RemuxResult;

/// Read side of the pipeline: an opened source container
pub trait Demuxer {
    /// Opaque packet payload carried through untouched
    type Payload;
    /// Opaque codec parameters copied verbatim to the destination
    type Parameters;

    /// Determine every stream's kind, codec parameters and time base
    fn probe(&mut self) -> RemuxResult<Vec<StreamDescriptor<Self::Parameters>>>;

    /// Next packet in file order; `None` once the source is exhausted or unreadable, and
    /// on every call after that
    fn next_packet(&mut self) -> Option<Packet<Self::Payload>>;
}

/// Write side of the pipeline: a destination container under construction
pub trait Muxer {
    type Payload;
    type Parameters;

    /// Allocate a destination stream copying the source's codec parameters; returns its index
    fn add_stream(&mut self, source: &StreamDescriptor<Self::Parameters>) -> RemuxResult<usize>;

    /// Write the container preamble; opens the output file first if the format needs one
    fn write_header(&mut self) -> RemuxResult<()>;

    /// Rescale `packet` from its source time base into the destination stream's and append it
    fn write_packet(&mut self, dest_index: usize, packet: Packet<Self::Payload>) -> RemuxResult<()>;

    /// Write the closing structural metadata
    fn write_trailer(&mut self) -> RemuxResult<()>;
}

/// Factory for matching reader/writer pairs
pub trait MediaBackend {
    type Reader: Demuxer;
    type Writer: Muxer<
        Payload = <Self::Reader as Demuxer>::Payload,
        Parameters = <Self::Reader as Demuxer>::Parameters,
    >;

    /// Open a source container for reading
    fn open(&self, path: &Path) -> RemuxResult<Self::Reader>;

    /// Create a destination container; `format` overrides inference from the path
    fn create(&self, path: &Path, format: Option<&str>) -> RemuxResult<Self::Writer>;
}
