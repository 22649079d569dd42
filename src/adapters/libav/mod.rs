//! FFmpeg backend using libav bindings
//!
//! Opening, probing, stream allocation and output file opening are kept as separate
//! steps so each can fail on its own and be reported against the right pipeline stage.

use std::ffi::CString;
use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg::{ffi, media, Rational};

use crate::domain::model::{MediaKind, Timebase};
use crate::error::{RemuxError, RemuxResult};
use crate::ports::MediaBackend;

mod reader;
mod writer;

pub use reader::LibavReader;
pub use writer::LibavWriter;

/// libav-backed reader/writer factory
#[derive(Debug, Clone, Copy)]
pub struct LibavBackend {
    _initialized: (),
}

impl LibavBackend {
    /// Initialize FFmpeg and create the backend
    pub fn new() -> RemuxResult<Self> {
        ffmpeg::init().map_err(|e| RemuxError::FFmpegInit {
            message: e.to_string(),
        })?;
        // libav's own logging would interleave with ours
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);

        Ok(Self { _initialized: () })
    }
}

impl MediaBackend for LibavBackend {
    type Reader = LibavReader;
    type Writer = LibavWriter;

    fn open(&self, path: &Path) -> RemuxResult<LibavReader> {
        LibavReader::open(path)
    }

    fn create(&self, path: &Path, format: Option<&str>) -> RemuxResult<LibavWriter> {
        LibavWriter::create(path, format)
    }
}

pub(crate) fn c_path(path: &Path) -> Result<CString, String> {
    let utf8 = path
        .to_str()
        .ok_or_else(|| "path is not valid UTF-8".to_string())?;
    CString::new(utf8).map_err(|e| e.to_string())
}

pub(crate) fn media_kind(medium: media::Type) -> MediaKind {
    match medium {
        media::Type::Video => MediaKind::Video,
        media::Type::Audio => MediaKind::Audio,
        media::Type::Subtitle => MediaKind::Subtitle,
        media::Type::Data => MediaKind::Data,
        media::Type::Attachment => MediaKind::Attachment,
        media::Type::Unknown => MediaKind::Unknown,
    }
}

pub(crate) fn timebase(rational: Rational) -> Timebase {
    Timebase {
        num: rational.numerator(),
        den: rational.denominator(),
    }
}

pub(crate) fn rational(timebase: Timebase) -> Rational {
    Rational::new(timebase.num, timebase.den)
}

/// `avcodec_parameters_copy`, checked
///
/// # Safety
/// Both pointers must reference live, allocated codec parameter structs.
pub(crate) unsafe fn copy_parameters(
    dst: *mut ffi::AVCodecParameters,
    src: *const ffi::AVCodecParameters,
) -> Result<(), ffmpeg::Error> {
    match ffi::avcodec_parameters_copy(dst, src) {
        e if e < 0 => Err(ffmpeg::Error::from(e)),
        _ => Ok(()),
    }
}
