// Container writer over an FFmpeg output context

use std::ffi::CString;
use std::path::Path;
use std::ptr;

use ffmpeg_next as ffmpeg;
use ffmpeg::codec::{self, Parameters};
use ffmpeg::ffi;
use ffmpeg::format::context::Output;
use tracing::debug;

use super::{c_path, copy_parameters, rational, timebase};
use crate::domain::model::{Packet, StreamDescriptor, Timebase};
use crate::error::{RemuxError, RemuxResult};
use crate::ports::Muxer;

/// Destination container under construction. Dropping it closes the output file
/// (if one was opened) and frees the context.
pub struct LibavWriter {
    output: Output,
    path: String,
    c_path: CString,
    source_time_bases: Vec<Timebase>,
    dest_time_bases: Vec<Timebase>,
    header_written: bool,
}

impl LibavWriter {
    /// Allocate the output context; the format comes from `format` or the path's extension
    pub fn create(path: &Path, format: Option<&str>) -> RemuxResult<Self> {
        let display = path.display().to_string();
        let create_err = |message: String| RemuxError::Create {
            path: display.clone(),
            message,
        };

        let c_path = c_path(path).map_err(create_err)?;
        let c_format = format
            .map(CString::new)
            .transpose()
            .map_err(|e| create_err(e.to_string()))?;

        let mut ctx = ptr::null_mut();
        let ret = unsafe {
            ffi::avformat_alloc_output_context2(
                &mut ctx,
                ptr::null_mut(),
                c_format.as_ref().map_or(ptr::null(), |f| f.as_ptr()),
                c_path.as_ptr(),
            )
        };
        if ret < 0 || ctx.is_null() {
            return Err(create_err(ffmpeg::Error::from(ret).to_string()));
        }

        let output = unsafe { Output::wrap(ctx) };
        debug!(output = %display, format = output.format().name(), "created output context");

        Ok(Self {
            output,
            path: display,
            c_path,
            source_time_bases: Vec::new(),
            dest_time_bases: Vec::new(),
            header_written: false,
        })
    }

    fn write_err(&self, message: impl Into<String>) -> RemuxError {
        RemuxError::Write {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn needs_file(&self) -> bool {
        unsafe {
            let ctx = self.output.as_ptr();
            ((*(*ctx).oformat).flags & ffi::AVFMT_NOFILE as i32) == 0
        }
    }
}

impl Muxer for LibavWriter {
    type Payload = ffmpeg::Packet;
    type Parameters = Parameters;

    fn add_stream(&mut self, source: &StreamDescriptor<Parameters>) -> RemuxResult<usize> {
        let alloc_err = |message: String| RemuxError::Alloc {
            path: self.path.clone(),
            message,
        };

        let mut stream = self
            .output
            .add_stream(codec::encoder::find(codec::Id::None))
            .map_err(|e| alloc_err(e.to_string()))?;

        unsafe {
            let codecpar = (*stream.as_mut_ptr()).codecpar;
            copy_parameters(codecpar, source.parameters.as_ptr())
                .map_err(|e| alloc_err(format!("Failed to copy codec parameters: {}", e)))?;
            // the source container's tag may mean nothing in the destination's
            (*codecpar).codec_tag = 0;
        }
        // muxers treat this as a hint and may pick their own in write_header
        stream.set_time_base(rational(source.time_base));

        let index = stream.index();
        self.source_time_bases.push(source.time_base);
        debug!(
            output = %self.path,
            source = source.index,
            dest = index,
            codec = %source.codec,
            "added output stream"
        );
        Ok(index)
    }

    fn write_header(&mut self) -> RemuxResult<()> {
        let header_err = |path: &str, message: String| RemuxError::Header {
            path: path.to_string(),
            message,
        };

        if self.needs_file() {
            let ret = unsafe {
                let ctx = self.output.as_mut_ptr();
                if (*ctx).pb.is_null() {
                    ffi::avio_open(
                        &mut (*ctx).pb,
                        self.c_path.as_ptr(),
                        ffi::AVIO_FLAG_WRITE as i32,
                    )
                } else {
                    0
                }
            };
            if ret < 0 {
                return Err(header_err(
                    &self.path,
                    format!("Could not open output file: {}", ffmpeg::Error::from(ret)),
                ));
            }
        }

        self.output
            .write_header()
            .map_err(|e| header_err(&self.path, e.to_string()))?;

        self.dest_time_bases = self
            .output
            .streams()
            .map(|stream| timebase(stream.time_base()))
            .collect();
        self.header_written = true;
        Ok(())
    }

    fn write_packet(&mut self, dest_index: usize, packet: Packet<ffmpeg::Packet>) -> RemuxResult<()> {
        if !self.header_written {
            return Err(self.write_err("header has not been written"));
        }

        let (source_tb, dest_tb) = match (
            self.source_time_bases.get(dest_index),
            self.dest_time_bases.get(dest_index),
        ) {
            (Some(src), Some(dst)) => (*src, *dst),
            _ => return Err(self.write_err(format!("no output stream {}", dest_index))),
        };
        if !source_tb.is_valid() || !dest_tb.is_valid() {
            return Err(self.write_err(format!(
                "cannot rescale between time bases {} and {}",
                source_tb, dest_tb
            )));
        }

        let timing = packet.timing.rescale(&source_tb, &dest_tb);
        let mut payload = packet.payload;
        payload.set_stream(dest_index);
        payload.set_pts(timing.pts);
        payload.set_dts(timing.dts);
        payload.set_duration(timing.duration);
        payload.set_position(-1);

        payload
            .write_interleaved(&mut self.output)
            .map_err(|e| self.write_err(e.to_string()))
    }

    fn write_trailer(&mut self) -> RemuxResult<()> {
        self.output
            .write_trailer()
            .map_err(|e| RemuxError::Trailer {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }
}
