//! Arranger
//!
//! Per-tick LOD arbitration over the slot tree. Each tick the arranger ranks
//! the on-screen priorities, decides which textures would rather be at a
//! different resolution, damps that decision through a hysteresis gate, and
//! commits **at most one** atlas copy. Unloads (a texture falling below
//! visibility) are free and do not count against the budget.
//!
//! All sizes are measured in atlas pages: the output reports its edge length
//! in pages (a power of two), and a texture at smallness `s` occupies
//! `edge >> s` pages.

use glam::Vec2;
use smallvec::SmallVec;

use crate::output::TextureOutput;
use crate::priority::PrioritySource;
use crate::registry::TextureId;
use crate::slot_tree::SlotTree;

/// Anything projecting to less than half a page is treated as invisible and
/// requested for a full unload.
const INVISIBLE_SIZE: f32 = 0.5;

/// Arranger tuning
#[derive(Debug, Clone)]
pub struct ArrangerConfig {
    /// Quadtree depth; the atlas edge is `2^depth` pages
    pub depth: u32,
    /// Damping threshold in `(0, 1]` for resize decisions. Higher values
    /// require the ideal size to sit closer to the candidate before a
    /// resize commits, trading latency for stability.
    pub hysteresis: f32,
}

impl Default for ArrangerConfig {
    fn default() -> Self {
        Self {
            // 16384 texel atlas with 128 texel pages
            depth: 7,
            hysteresis: 0.5,
        }
    }
}

/// One candidate resize, alive only within a tick
#[derive(Debug, Clone, Copy)]
struct PendingOp {
    id: TextureId,
    current_size: u32,
    candidate_size: u32,
    new_smallness: u32,
}

impl PendingOp {
    fn delta(&self) -> i64 {
        i64::from(self.candidate_size) - i64::from(self.current_size)
    }
}

/// The copy committed by a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedCopy {
    /// Texture that moved
    pub id: TextureId,
    /// New cell position, normalized to `[0, 1)`
    pub position: Vec2,
    /// New size in pages
    pub size: u32,
}

/// What one tick did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Objects read from the priority source
    pub examined: usize,
    /// Resize candidates that survived the hysteresis gate
    pub pending: usize,
    /// Unbudgeted unloads issued
    pub unloads: usize,
    /// The single committed copy, if any
    pub committed: Option<CommittedCopy>,
    /// A growth candidate was picked but did not fit
    pub growth_forfeited: bool,
    /// Shrink re-pack failures (tree corruption; logged, never panics)
    pub invariant_violations: usize,
}

impl TickReport {
    /// Copies issued this tick (0 or 1)
    pub fn copies(&self) -> usize {
        usize::from(self.committed.is_some())
    }
}

/// Single authority deciding one atlas mutation per tick.
///
/// The arranger owns the slot tree and is the only mutator of it; ticks run
/// synchronously on the caller's thread and the `&mut self` receiver is the
/// whole concurrency story.
pub struct Arranger {
    tree: SlotTree,
    config: ArrangerConfig,
}

impl Arranger {
    /// Create an arranger with the given tuning
    pub fn new(config: ArrangerConfig) -> Self {
        Self {
            tree: SlotTree::new(config.depth),
            config,
        }
    }

    /// The damping threshold currently in effect
    pub fn hysteresis(&self) -> f32 {
        self.config.hysteresis
    }

    /// Change the damping threshold
    pub fn set_hysteresis(&mut self, hysteresis: f32) {
        self.config.hysteresis = hysteresis;
    }

    /// Read access to the slot tree (occupancy inspection)
    pub fn tree(&self) -> &SlotTree {
        &self.tree
    }

    /// Run one tick: rank priorities, gate resize candidates, commit at most
    /// one copy to `output`.
    pub fn update(
        &mut self,
        priority: &dyn PrioritySource,
        output: &mut dyn TextureOutput,
    ) -> TickReport {
        let mut report = TickReport::default();

        let mut ranked: Vec<(TextureId, f32)> = (0..priority.count())
            .map(|idx| (priority.object(idx), priority.priority(idx)))
            .collect();
        // Low importance first, so the final pick favors later, higher
        // priority entries on equal deltas.
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        report.examined = ranked.len();

        let edge = output.size();
        let mut pending: SmallVec<[PendingOp; 8]> = SmallVec::new();

        for (id, fraction) in ranked {
            // Linear texel size implied by the on-screen area fraction.
            let norm_size = fraction.max(0.0).sqrt() * edge as f32;
            let smallness = self.tree.get_smallness(id);
            let current_size = smallness.map_or(0, |s| edge >> s);

            let candidate_size = candidate_size(norm_size, current_size, edge)
                .min(output.max_size(id))
                .min(edge);

            // 0 = exactly the current size, 1 = exactly the candidate.
            let mut interp = inverse_lerp(current_size as f32, candidate_size as f32, norm_size);
            if interp <= 0.5 {
                continue;
            }
            // Rescale to 0 = definitely stay, 1 = definitely switch.
            interp = 2.0 * (interp - 0.5);
            if interp <= self.config.hysteresis {
                continue;
            }

            if candidate_size == 0 {
                // Dropped below visibility; unloads are free.
                self.tree.remove(id);
                output.remove(id);
                report.unloads += 1;
                log::debug!("unloaded {id:?} (norm size {norm_size:.2})");
            } else {
                pending.push(PendingOp {
                    id,
                    current_size,
                    candidate_size,
                    new_smallness: (edge / candidate_size).ilog2(),
                });
            }
        }

        report.pending = pending.len();
        if pending.is_empty() {
            // Nothing wants to move. A defrag pass could use this slack.
            return report;
        }
        pending.sort_by_key(PendingOp::delta);

        // Prefer the smallest growth; if it does not fit, spend the budget on
        // the largest shrink instead so a later tick has room.
        if let Some(op) = pending.iter().find(|op| op.candidate_size > op.current_size) {
            self.tree.remove(op.id);
            if let Some(position) = self.tree.pack(op.new_smallness, op.id, true) {
                output.copy(op.id, position, op.candidate_size);
                report.committed = Some(CommittedCopy {
                    id: op.id,
                    position,
                    size: op.candidate_size,
                });
                log::debug!(
                    "grew {:?} {} -> {} pages at {position:?}",
                    op.id,
                    op.current_size,
                    op.candidate_size
                );
                return report;
            }
            // Atlas is momentarily full at that depth. The object stays
            // unplaced rather than half-moved; next tick retries with fresh
            // priorities.
            report.growth_forfeited = true;
            log::trace!(
                "no room to grow {:?} to {} pages",
                op.id,
                op.candidate_size
            );
        }

        if let Some(op) = pending.iter().find(|op| op.candidate_size < op.current_size) {
            self.tree.remove(op.id);
            match self.tree.pack(op.new_smallness, op.id, true) {
                Some(position) => {
                    output.copy(op.id, position, op.candidate_size);
                    report.committed = Some(CommittedCopy {
                        id: op.id,
                        position,
                        size: op.candidate_size,
                    });
                    log::debug!(
                        "shrank {:?} {} -> {} pages at {position:?}",
                        op.id,
                        op.current_size,
                        op.candidate_size
                    );
                }
                None => {
                    // Shrinking frees space; failing to re-pack afterwards
                    // means the size bookkeeping is corrupt.
                    report.invariant_violations += 1;
                    log::error!(
                        "failed to pack {:?} at {} pages just after removing it at {}",
                        op.id,
                        op.candidate_size,
                        op.current_size
                    );
                }
            }
        }

        report
    }
}

/// One-octave size step toward the ideal size.
///
/// Placed textures move a single octave per decision; unplaced textures jump
/// in at the power of two nearest their ideal so a freshly visible object
/// does not crawl up from one page. Anything projecting below half a page
/// unloads entirely.
fn candidate_size(norm_size: f32, current_size: u32, edge: u32) -> u32 {
    if norm_size <= INVISIBLE_SIZE {
        0
    } else if current_size == 0 {
        closest_power_of_two(norm_size).min(edge)
    } else if norm_size < current_size as f32 {
        current_size / 2
    } else {
        current_size.saturating_mul(2)
    }
}

fn closest_power_of_two(value: f32) -> u32 {
    let rounded = (value.round().max(1.0)) as u32;
    let above = rounded.next_power_of_two();
    let below = above / 2;
    if below >= 1 && rounded - below < above - rounded {
        below
    } else {
        above
    }
}

/// Fraction of the way `value` sits from `a` to `b`, clamped to `[0, 1]`.
/// Degenerate ranges report 0.
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}
