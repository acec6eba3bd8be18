//! Texture Output
//!
//! The sink the arranger drives. The atlas pixels themselves live behind this
//! trait; the core only ever hands over normalized positions and page sizes.

use ahash::AHashMap;
use glam::Vec2;

use crate::registry::TextureId;

/// Receiving end of the arranger's decisions.
///
/// Implementations own the physical atlas. Calls are synchronous and must not
/// re-enter the arranger.
pub trait TextureOutput {
    /// Atlas edge length in pages; always a power of two
    fn size(&self) -> u32;

    /// Upper bound in pages for this object (asset or hardware ceiling)
    fn max_size(&self, id: TextureId) -> u32;

    /// Commit `id`'s texel data at `position` (normalized `[0, 1)`) with the
    /// given page size
    fn copy(&mut self, id: TextureId, position: Vec2, size: u32);

    /// Drop `id`'s placement; the object renders as "not resident" afterwards
    fn remove(&mut self, id: TextureId);
}

/// One sink call, as observed by [`RecordingOutput`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputEvent {
    Copy {
        id: TextureId,
        position: Vec2,
        size: u32,
    },
    Remove {
        id: TextureId,
    },
}

/// In-memory sink that records every call and tracks current placements.
///
/// Backs the simulator and the test suite; a real renderer would put the GPU
/// upload behind the same trait.
#[derive(Debug)]
pub struct RecordingOutput {
    size: u32,
    max_sizes: AHashMap<TextureId, u32>,
    placements: AHashMap<TextureId, (Vec2, u32)>,
    events: Vec<OutputEvent>,
}

impl RecordingOutput {
    /// Create a sink for an atlas of `size` pages per edge
    pub fn new(size: u32) -> Self {
        assert!(size.is_power_of_two(), "atlas edge must be a power of two");
        Self {
            size,
            max_sizes: AHashMap::new(),
            placements: AHashMap::new(),
            events: Vec::new(),
        }
    }

    /// Cap the page size for one object (defaults to the full atlas edge)
    pub fn set_max_size(&mut self, id: TextureId, max: u32) {
        self.max_sizes.insert(id, max);
    }

    /// Every call made so far, in order
    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    /// Drain the recorded calls
    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current placement of `id`, if resident
    pub fn placement(&self, id: TextureId) -> Option<(Vec2, u32)> {
        self.placements.get(&id).copied()
    }

    /// Number of resident objects
    pub fn resident_count(&self) -> usize {
        self.placements.len()
    }
}

impl TextureOutput for RecordingOutput {
    fn size(&self) -> u32 {
        self.size
    }

    fn max_size(&self, id: TextureId) -> u32 {
        self.max_sizes.get(&id).copied().unwrap_or(self.size)
    }

    fn copy(&mut self, id: TextureId, position: Vec2, size: u32) {
        self.placements.insert(id, (position, size));
        self.events.push(OutputEvent::Copy { id, position, size });
    }

    fn remove(&mut self, id: TextureId) {
        self.placements.remove(&id);
        self.events.push(OutputEvent::Remove { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_output_tracks_placements() {
        let mut output = RecordingOutput::new(8);
        let id = TextureId::new(7);

        output.copy(id, Vec2::new(0.5, 0.0), 4);
        assert_eq!(output.placement(id), Some((Vec2::new(0.5, 0.0), 4)));
        assert_eq!(output.resident_count(), 1);

        output.remove(id);
        assert_eq!(output.placement(id), None);
        assert_eq!(output.events().len(), 2);
    }

    #[test]
    fn test_max_size_defaults_to_edge() {
        let mut output = RecordingOutput::new(16);
        let id = TextureId::new(1);
        assert_eq!(output.max_size(id), 16);
        output.set_max_size(id, 4);
        assert_eq!(output.max_size(id), 4);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_power_of_two_edge_rejected() {
        RecordingOutput::new(6);
    }
}
