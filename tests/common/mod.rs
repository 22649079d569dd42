//! In-memory media backend for exercising the pipeline without FFmpeg

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vidstrip::domain::model::{MediaKind, Packet, PacketTiming, StreamDescriptor, Timebase};
use vidstrip::error::{RemuxError, RemuxResult};
use vidstrip::ports::{Demuxer, MediaBackend, Muxer};

/// Where the fake backend should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Probe,
    Create,
    /// The n-th `add_stream` call (0-based)
    Alloc(usize),
    Header,
    /// The n-th `write_packet` call (0-based)
    Write(usize),
    /// Reading fails once `n` packets have been returned
    Read(usize),
    Trailer,
}

/// Counters shared by every reader and writer a backend hands out
#[derive(Debug, Default)]
pub struct Events {
    pub opened: usize,
    pub readers_released: usize,
    pub created: usize,
    pub writers_released: usize,
    pub headers: usize,
    pub trailers: usize,
    /// What each released writer received, in release order
    pub outputs: Vec<WrittenFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenStream {
    pub source_index: usize,
    pub parameters: String,
    pub time_base: Timebase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPacket {
    pub stream: usize,
    pub timing: PacketTiming,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub streams: Vec<WrittenStream>,
    pub packets: Vec<WrittenPacket>,
    pub header_written: bool,
    pub trailer_written: bool,
}

#[derive(Debug, Clone)]
pub struct FakeStream {
    pub kind: MediaKind,
    pub codec: String,
    pub time_base: Timebase,
}

#[derive(Debug, Clone)]
pub struct FakePacket {
    pub stream: usize,
    pub timing: PacketTiming,
    pub payload: Vec<u8>,
}

/// Source description plus failure injection
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub streams: Vec<FakeStream>,
    pub packets: Vec<FakePacket>,
    /// Time base every destination stream gets at header time; the source's when `None`
    pub dest_time_base: Option<Timebase>,
    pub failures: Vec<FailAt>,
    /// Inputs whose file name contains one of these fail to open
    pub broken_inputs: Vec<String>,
    pub events: Arc<Mutex<Events>>,
}

pub fn tb(num: i32, den: i32) -> Timebase {
    Timebase::new(num, den).unwrap()
}

pub fn timing(pts: Option<i64>, dts: Option<i64>, duration: i64) -> PacketTiming {
    PacketTiming { pts, dts, duration }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream(mut self, kind: MediaKind, codec: &str, time_base: Timebase) -> Self {
        self.streams.push(FakeStream {
            kind,
            codec: codec.to_string(),
            time_base,
        });
        self
    }

    pub fn with_packet(mut self, stream: usize, timing: PacketTiming) -> Self {
        let payload = format!("s{}-p{}", stream, self.packets.len()).into_bytes();
        self.packets.push(FakePacket {
            stream,
            timing,
            payload,
        });
        self
    }

    pub fn with_dest_time_base(mut self, time_base: Timebase) -> Self {
        self.dest_time_base = Some(time_base);
        self
    }

    pub fn failing_at(mut self, failure: FailAt) -> Self {
        self.failures.push(failure);
        self
    }

    pub fn with_broken_input(mut self, name: &str) -> Self {
        self.broken_inputs.push(name.to_string());
        self
    }

    /// One video stream at 1/30 and one audio stream at 1/44100, `frames` interleaved
    /// video packets at dts 0, 1, 2, ... and an audio packet after each
    pub fn video_and_audio(frames: i64) -> Self {
        let mut backend = Self::new()
            .with_stream(MediaKind::Video, "h264", tb(1, 30))
            .with_stream(MediaKind::Audio, "aac", tb(1, 44100));
        for i in 0..frames {
            backend = backend
                .with_packet(0, timing(Some(i), Some(i), 1))
                .with_packet(1, timing(Some(i * 1470), Some(i * 1470), 1470));
        }
        backend
    }

    fn fails(&self, failure: FailAt) -> bool {
        self.failures.contains(&failure)
    }

    pub fn events(&self) -> std::sync::MutexGuard<'_, Events> {
        self.events.lock().unwrap()
    }
}

pub struct FakeReader {
    path: String,
    streams: Vec<FakeStream>,
    packets: std::vec::IntoIter<FakePacket>,
    fail_probe: bool,
    fail_read_after: Option<usize>,
    returned: usize,
    exhausted: bool,
    events: Arc<Mutex<Events>>,
}

impl Demuxer for FakeReader {
    type Payload = Vec<u8>;
    type Parameters = String;

    fn probe(&mut self) -> RemuxResult<Vec<StreamDescriptor<String>>> {
        if self.fail_probe {
            return Err(RemuxError::Probe {
                path: self.path.clone(),
                message: "truncated".to_string(),
            });
        }
        Ok(self
            .streams
            .iter()
            .enumerate()
            .map(|(index, s)| StreamDescriptor {
                index,
                kind: s.kind,
                codec: s.codec.clone(),
                time_base: s.time_base,
                parameters: format!("params-{}-{}", index, s.codec),
            })
            .collect())
    }

    fn next_packet(&mut self) -> Option<Packet<Vec<u8>>> {
        if self.exhausted || self.fail_read_after == Some(self.returned) {
            self.exhausted = true;
            return None;
        }
        self.returned += 1;
        self.packets.next().map(|p| Packet {
            stream_index: p.stream,
            timing: p.timing,
            payload: p.payload,
        })
    }
}

impl Drop for FakeReader {
    fn drop(&mut self) {
        self.events.lock().unwrap().readers_released += 1;
    }
}

pub struct FakeWriter {
    file: WrittenFile,
    source_time_bases: Vec<Timebase>,
    dest_time_base: Option<Timebase>,
    failures: Vec<FailAt>,
    add_calls: usize,
    write_calls: usize,
    events: Arc<Mutex<Events>>,
}

impl FakeWriter {
    fn fail(&self, failure: FailAt) -> bool {
        self.failures.contains(&failure)
    }

    fn path(&self) -> String {
        self.file.path.display().to_string()
    }

    /// Deterministic text rendering of everything written so far
    fn render(&self) -> String {
        let mut out = String::new();
        for (i, s) in self.file.streams.iter().enumerate() {
            writeln!(out, "stream {} from {} {} tb={}", i, s.source_index, s.parameters, s.time_base).unwrap();
        }
        for p in &self.file.packets {
            writeln!(
                out,
                "packet {} pts={:?} dts={:?} dur={} {}",
                p.stream,
                p.timing.pts,
                p.timing.dts,
                p.timing.duration,
                String::from_utf8_lossy(&p.payload)
            )
            .unwrap();
        }
        out
    }
}

impl Muxer for FakeWriter {
    type Payload = Vec<u8>;
    type Parameters = String;

    fn add_stream(&mut self, source: &StreamDescriptor<String>) -> RemuxResult<usize> {
        let call = self.add_calls;
        self.add_calls += 1;
        if self.fail(FailAt::Alloc(call)) {
            return Err(RemuxError::Alloc {
                path: self.path(),
                message: "out of streams".to_string(),
            });
        }
        self.file.streams.push(WrittenStream {
            source_index: source.index,
            parameters: source.parameters.clone(),
            time_base: source.time_base,
        });
        self.source_time_bases.push(source.time_base);
        Ok(self.file.streams.len() - 1)
    }

    fn write_header(&mut self) -> RemuxResult<()> {
        if self.fail(FailAt::Header) {
            return Err(RemuxError::Header {
                path: self.path(),
                message: "muxer rejected parameters".to_string(),
            });
        }
        if let Some(dest) = self.dest_time_base {
            for stream in &mut self.file.streams {
                stream.time_base = dest;
            }
        }
        self.file.header_written = true;
        self.events.lock().unwrap().headers += 1;
        Ok(())
    }

    fn write_packet(&mut self, dest_index: usize, packet: Packet<Vec<u8>>) -> RemuxResult<()> {
        let call = self.write_calls;
        self.write_calls += 1;
        if self.fail(FailAt::Write(call)) {
            return Err(RemuxError::Write {
                path: self.path(),
                message: format!("write {} refused", call),
            });
        }
        let source_tb = self.source_time_bases[dest_index];
        let dest_tb = self.file.streams[dest_index].time_base;
        self.file.packets.push(WrittenPacket {
            stream: dest_index,
            timing: packet.timing.rescale(&source_tb, &dest_tb),
            payload: packet.payload,
        });
        Ok(())
    }

    fn write_trailer(&mut self) -> RemuxResult<()> {
        if self.fail(FailAt::Trailer) {
            return Err(RemuxError::Trailer {
                path: self.path(),
                message: "disk full".to_string(),
            });
        }
        fs::write(&self.file.path, self.render())?;
        self.file.trailer_written = true;
        self.events.lock().unwrap().trailers += 1;
        Ok(())
    }
}

impl Drop for FakeWriter {
    fn drop(&mut self) {
        let mut events = self.events.lock().unwrap();
        events.writers_released += 1;
        events.outputs.push(self.file.clone());
    }
}

impl MediaBackend for FakeBackend {
    type Reader = FakeReader;
    type Writer = FakeWriter;

    fn open(&self, path: &Path) -> RemuxResult<FakeReader> {
        let name = path.display().to_string();
        if self.fails(FailAt::Open) || self.broken_inputs.iter().any(|b| name.contains(b.as_str())) {
            return Err(RemuxError::Open {
                path: name,
                message: "Invalid data found when processing input".to_string(),
            });
        }
        self.events.lock().unwrap().opened += 1;
        Ok(FakeReader {
            path: name,
            streams: self.streams.clone(),
            packets: self.packets.clone().into_iter(),
            fail_probe: self.fails(FailAt::Probe),
            fail_read_after: self.failures.iter().find_map(|f| match f {
                FailAt::Read(n) => Some(*n),
                _ => None,
            }),
            returned: 0,
            exhausted: false,
            events: Arc::clone(&self.events),
        })
    }

    fn create(&self, path: &Path, _format: Option<&str>) -> RemuxResult<FakeWriter> {
        if self.fails(FailAt::Create) {
            return Err(RemuxError::Create {
                path: path.display().to_string(),
                message: "Unable to choose an output format".to_string(),
            });
        }
        self.events.lock().unwrap().created += 1;
        Ok(FakeWriter {
            file: WrittenFile {
                path: path.to_path_buf(),
                ..WrittenFile::default()
            },
            source_time_bases: Vec::new(),
            dest_time_base: self.dest_time_base,
            failures: self.failures.clone(),
            add_calls: 0,
            write_calls: 0,
            events: Arc::clone(&self.events),
        })
    }
}
