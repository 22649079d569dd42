// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RemuxError;

/// Timebase for timestamp calculations - rational unit in which a stream's timestamps are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timebase {
    pub num: i32,
    pub den: i32,
}

impl Timebase {
    /// Create a new timebase
    pub fn new(num: i32, den: i32) -> Result<Self, RemuxError> {
        if den == 0 {
            return Err(RemuxError::Config {
                message: "Timebase denominator cannot be zero".to_string(),
            });
        }
        Ok(Self { num, den })
    }

    /// Usable for rescaling: both terms strictly positive
    pub fn is_valid(&self) -> bool {
        self.num > 0 && self.den > 0
    }

    /// Rescale a value from this timebase to `target`, rounding to nearest with ties away from zero.
    ///
    /// The product is formed in 128 bits and the result saturates just inside the `i64` range,
    /// so a finite input never collapses onto one of the "no timestamp" markers. An invalid
    /// timebase on either side leaves the value untouched.
    pub fn rescale(&self, value: i64, target: &Timebase) -> i64 {
        if self == target {
            return value;
        }
        let num = value as i128 * self.num as i128 * target.den as i128;
        let den = self.den as i128 * target.num as i128;
        if den == 0 {
            return value;
        }
        div_round_near_inf(num, den)
    }

    /// Rescale a timestamp, passing the "no timestamp" markers through unchanged
    pub fn rescale_ts(&self, ts: Option<i64>, target: &Timebase) -> Option<i64> {
        match ts {
            None => None,
            Some(v) if v == i64::MIN || v == i64::MAX => Some(v),
            Some(v) => Some(self.rescale(v, target)),
        }
    }

    /// Common timebases
    pub fn av_time_base() -> Self {
        Self { num: 1, den: 1_000_000 }
    }

    pub fn mpeg_ts() -> Self {
        Self { num: 1, den: 90_000 }
    }

    pub fn frame_rate_30() -> Self {
        Self { num: 1, den: 30 }
    }
}

impl fmt::Display for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

fn div_round_near_inf(num: i128, den: i128) -> i64 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    let q = if num >= 0 {
        (num + half) / den
    } else {
        -((-num + half) / den)
    };
    q.clamp(i64::MIN as i128 + 1, i64::MAX as i128 - 1) as i64
}

/// Media kind of an elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Subtitle => "subtitle",
            MediaKind::Data => "data",
            MediaKind::Attachment => "attachment",
            MediaKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for MediaKind {
    type Err = RemuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "v" => Ok(MediaKind::Video),
            "audio" | "a" => Ok(MediaKind::Audio),
            "subtitle" | "s" => Ok(MediaKind::Subtitle),
            "data" | "d" => Ok(MediaKind::Data),
            "attachment" | "t" => Ok(MediaKind::Attachment),
            "unknown" => Ok(MediaKind::Unknown),
            other => Err(RemuxError::Config {
                message: format!("Unknown media kind '{}'", other),
            }),
        }
    }
}

/// Per-stream metadata produced by the demuxer.
///
/// `parameters` is the backend's opaque codec parameter blob; it is copied to the
/// destination verbatim and never interpreted here.
#[derive(Debug, Clone)]
pub struct StreamDescriptor<P = ()> {
    pub index: usize,
    pub kind: MediaKind,
    pub codec: String,
    pub time_base: Timebase,
    pub parameters: P,
}

/// Timing fields of a packet, in the time base of the stream it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketTiming {
    pub pts: Option<i64>,
    pub dts: Option<i64>,
    pub duration: i64,
}

impl PacketTiming {
    /// Rescale pts, dts and duration from `from` into `to`
    pub fn rescale(&self, from: &Timebase, to: &Timebase) -> PacketTiming {
        PacketTiming {
            pts: from.rescale_ts(self.pts, to),
            dts: from.rescale_ts(self.dts, to),
            duration: from.rescale(self.duration, to),
        }
    }
}

/// One demuxed packet tagged with its source stream index
#[derive(Debug, Clone)]
pub struct Packet<P> {
    pub stream_index: usize,
    pub timing: PacketTiming,
    pub payload: P,
}
