//! Stream selection and mapping module

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::model::{MediaKind, StreamDescriptor};
use crate::error::RemuxError;

pub mod mapper;

pub use mapper::StreamIndexMap;

/// Which source streams survive the remux.
///
/// Parsed from `video`, `non-audio`, `kind:video,subtitle`, `index:0,2` or `codec:h264,hevc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StreamSelection {
    /// Keep video streams only
    #[default]
    Video,
    /// Keep everything that is not audio
    NonAudio,
    /// Keep streams of the listed kinds
    Kinds(Vec<MediaKind>),
    /// Keep the listed source stream indices
    Indices(Vec<usize>),
    /// Keep streams whose codec name matches (case-insensitive)
    Codecs(Vec<String>),
}

impl StreamSelection {
    /// Predicate applied to every source stream
    pub fn matches<P>(&self, stream: &StreamDescriptor<P>) -> bool {
        match self {
            StreamSelection::Video => stream.kind == MediaKind::Video,
            StreamSelection::NonAudio => stream.kind != MediaKind::Audio,
            StreamSelection::Kinds(kinds) => kinds.contains(&stream.kind),
            StreamSelection::Indices(indices) => indices.contains(&stream.index),
            StreamSelection::Codecs(codecs) => codecs
                .iter()
                .any(|codec| codec.eq_ignore_ascii_case(&stream.codec)),
        }
    }
}

fn parse_list<T, E>(raw: &str, parse: impl Fn(&str) -> Result<T, E>) -> Result<Vec<T>, E> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse)
        .collect()
}

impl FromStr for StreamSelection {
    type Err = RemuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |detail: String| RemuxError::Config {
            message: format!("Invalid stream selection '{}': {}", trimmed, detail),
        };

        let selection = match trimmed.split_once(':') {
            None => match trimmed.to_lowercase().as_str() {
                "video" => StreamSelection::Video,
                "non-audio" | "no-audio" => StreamSelection::NonAudio,
                other => return Err(invalid(format!("unknown policy '{}'", other))),
            },
            Some((key, list)) => match key.to_lowercase().as_str() {
                "kind" => StreamSelection::Kinds(parse_list(list, str::parse::<MediaKind>)?),
                "index" => StreamSelection::Indices(
                    parse_list(list, str::parse::<usize>).map_err(|e| invalid(e.to_string()))?,
                ),
                "codec" => StreamSelection::Codecs(parse_list(list, |c| {
                    Ok::<_, RemuxError>(c.to_lowercase())
                })?),
                other => return Err(invalid(format!("unknown selector '{}'", other))),
            },
        };

        let empty = match &selection {
            StreamSelection::Kinds(v) => v.is_empty(),
            StreamSelection::Indices(v) => v.is_empty(),
            StreamSelection::Codecs(v) => v.is_empty(),
            _ => false,
        };
        if empty {
            return Err(invalid("empty list".to_string()));
        }
        Ok(selection)
    }
}

impl TryFrom<String> for StreamSelection {
    type Error = RemuxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StreamSelection> for String {
    fn from(selection: StreamSelection) -> Self {
        selection.to_string()
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for StreamSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSelection::Video => f.write_str("video"),
            StreamSelection::NonAudio => f.write_str("non-audio"),
            StreamSelection::Kinds(kinds) => write!(f, "kind:{}", join(kinds)),
            StreamSelection::Indices(indices) => write!(f, "index:{}", join(indices)),
            StreamSelection::Codecs(codecs) => write!(f, "codec:{}", join(codecs)),
        }
    }
}
