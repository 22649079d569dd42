//! Stream mapping utilities

use tracing::debug;

use crate::domain::model::StreamDescriptor;

/// Source stream index -> destination stream index, `None` for dropped streams.
///
/// Destination indices are handed out sequentially in source order, so the map is
/// strictly increasing over the retained streams.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamIndexMap {
    slots: Vec<Option<usize>>,
    retained: usize,
}

impl StreamIndexMap {
    /// Build the map by applying `keep` to every stream in index order
    pub fn build<P>(
        streams: &[StreamDescriptor<P>],
        keep: impl Fn(&StreamDescriptor<P>) -> bool,
    ) -> Self {
        let mut slots = vec![None; streams.len()];
        let mut retained = 0;

        for stream in streams {
            if stream.index >= slots.len() {
                slots.resize(stream.index + 1, None);
            }
            if keep(stream) {
                debug!(stream = stream.index, kind = %stream.kind, dest = retained, "keeping stream");
                slots[stream.index] = Some(retained);
                retained += 1;
            } else {
                debug!(stream = stream.index, kind = %stream.kind, "dropping stream");
            }
        }

        Self { slots, retained }
    }

    /// Destination index for a source stream; unknown indices are dropped
    pub fn get(&self, source_index: usize) -> Option<usize> {
        self.slots.get(source_index).copied().flatten()
    }

    /// Number of source streams covered
    pub fn source_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of retained streams
    pub fn retained_count(&self) -> usize {
        self.retained
    }

    pub fn is_empty(&self) -> bool {
        self.retained == 0
    }

    /// (source, destination) pairs for the retained streams, in order
    pub fn retained(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(source, dest)| dest.map(|d| (source, d)))
    }
}
