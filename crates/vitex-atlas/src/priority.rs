//! Priority Source
//!
//! Where the arranger learns what the screen cares about. Priorities are
//! fractions of total on-screen importance in `(0, 1]`; they are compared
//! against each other, so an imperfect sum is tolerated.

use ahash::AHashMap;

use crate::registry::TextureId;

/// Ranked importance feed consumed once per tick.
///
/// Ids must be stable across ticks for the same logical object.
pub trait PrioritySource {
    /// Number of objects reported this tick
    fn count(&self) -> usize;

    /// Object at `idx`
    fn object(&self, idx: usize) -> TextureId;

    /// Importance fraction for the object at `idx`
    fn priority(&self, idx: usize) -> f32;
}

/// Plain list of `(id, priority)` pairs
#[derive(Debug, Clone, Default)]
pub struct PriorityList {
    entries: Vec<(TextureId, f32)>,
}

impl PriorityList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, id: TextureId, priority: f32) {
        self.entries.push((id, priority));
    }
}

impl From<Vec<(TextureId, f32)>> for PriorityList {
    fn from(entries: Vec<(TextureId, f32)>) -> Self {
        Self { entries }
    }
}

impl PrioritySource for PriorityList {
    fn count(&self) -> usize {
        self.entries.len()
    }

    fn object(&self, idx: usize) -> TextureId {
        self.entries[idx].0
    }

    fn priority(&self, idx: usize) -> f32 {
        self.entries[idx].1
    }
}

/// Per-frame accumulator of raw screen-area samples.
///
/// Feed it one sample per visible surface; an object seen through several
/// surfaces keeps its largest sample. The [`PrioritySource`] view divides by
/// the running total, so priorities come out as area fractions.
#[derive(Debug, Default)]
pub struct FramePriorities {
    order: Vec<TextureId>,
    areas: AHashMap<TextureId, f32>,
    total: f32,
}

impl FramePriorities {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a screen-area sample for `id`. Non-positive samples are ignored.
    pub fn note(&mut self, id: TextureId, area: f32) {
        if area <= 0.0 {
            return;
        }
        match self.areas.get_mut(&id) {
            Some(existing) => {
                if area > *existing {
                    self.total += area - *existing;
                    *existing = area;
                }
            }
            None => {
                self.order.push(id);
                self.areas.insert(id, area);
                self.total += area;
            }
        }
    }

    /// Forget all samples, keeping allocations for the next frame
    pub fn clear(&mut self) {
        self.order.clear();
        self.areas.clear();
        self.total = 0.0;
    }

    /// Sum of all retained samples
    pub fn total(&self) -> f32 {
        self.total
    }
}

impl PrioritySource for FramePriorities {
    fn count(&self) -> usize {
        self.order.len()
    }

    fn object(&self, idx: usize) -> TextureId {
        self.order[idx]
    }

    fn priority(&self, idx: usize) -> f32 {
        self.areas[&self.order[idx]] / self.total
    }
}
