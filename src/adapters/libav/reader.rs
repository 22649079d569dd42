// Container reader over an FFmpeg input context

use std::path::Path;
use std::ptr;

use ffmpeg_next as ffmpeg;
use ffmpeg::codec::Parameters;
use ffmpeg::ffi;
use ffmpeg::format::context::Input;
use tracing::{debug, warn};

use super::{c_path, copy_parameters, media_kind, timebase};
use crate::domain::model::{Packet, PacketTiming, StreamDescriptor};
use crate::error::{RemuxError, RemuxResult};
use crate::ports::Demuxer;

/// Opened source container. Dropping it closes the input.
pub struct LibavReader {
    input: Input,
    path: String,
    exhausted: bool,
}

impl LibavReader {
    /// Open the container and parse its header, without probing stream info yet
    pub fn open(path: &Path) -> RemuxResult<Self> {
        let display = path.display().to_string();
        let open_err = |message: String| RemuxError::Open {
            path: display.clone(),
            message,
        };

        let c_path = c_path(path).map_err(open_err)?;
        let mut ctx = ptr::null_mut();
        let ret = unsafe {
            ffi::avformat_open_input(&mut ctx, c_path.as_ptr(), ptr::null_mut(), ptr::null_mut())
        };
        if ret < 0 {
            return Err(open_err(ffmpeg::Error::from(ret).to_string()));
        }

        // avformat_open_input succeeded, so the context is ours to close
        let input = unsafe { Input::wrap(ctx) };
        debug!(input = %display, format = input.format().name(), "opened input");

        Ok(Self {
            input,
            path: display,
            exhausted: false,
        })
    }
}

impl Demuxer for LibavReader {
    type Payload = ffmpeg::Packet;
    type Parameters = Parameters;

    fn probe(&mut self) -> RemuxResult<Vec<StreamDescriptor<Parameters>>> {
        let ret = unsafe { ffi::avformat_find_stream_info(self.input.as_mut_ptr(), ptr::null_mut()) };
        if ret < 0 {
            return Err(RemuxError::Probe {
                path: self.path.clone(),
                message: ffmpeg::Error::from(ret).to_string(),
            });
        }

        let mut streams = Vec::with_capacity(self.input.nb_streams() as usize);
        for stream in self.input.streams() {
            let mut parameters = Parameters::new();
            unsafe { copy_parameters(parameters.as_mut_ptr(), (*stream.as_ptr()).codecpar) }
                .map_err(|e| RemuxError::Probe {
                    path: self.path.clone(),
                    message: format!("stream {}: {}", stream.index(), e),
                })?;

            streams.push(StreamDescriptor {
                index: stream.index(),
                kind: media_kind(parameters.medium()),
                codec: parameters.id().name().to_string(),
                time_base: timebase(stream.time_base()),
                parameters,
            });
        }

        Ok(streams)
    }

    fn next_packet(&mut self) -> Option<Packet<ffmpeg::Packet>> {
        if self.exhausted {
            return None;
        }

        let mut packet = ffmpeg::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Some(Packet {
                stream_index: packet.stream(),
                timing: PacketTiming {
                    pts: packet.pts(),
                    dts: packet.dts(),
                    duration: packet.duration(),
                },
                payload: packet,
            }),
            Err(ffmpeg::Error::Eof) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                warn!(input = %self.path, error = %e, "read error, treating as end of stream");
                self.exhausted = true;
                None
            }
        }
    }
}
