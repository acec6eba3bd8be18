//! Slot Tree
//!
//! Fixed-depth quadtree over the square atlas surface. The tree is the single
//! placement authority: each node either holds one occupant or is empty, and a
//! cell's depth ("smallness") encodes its size implicitly — a node occupied at
//! depth `d` covers a region of `1 / 2^d` of the atlas edge.
//!
//! Nodes live in one flat arena in breadth-first order instead of owned
//! recursive links: the children of node `i` are `4*i + 1 ..= 4*i + 4`, in
//! quadrant order `index = x_bit + 2 * y_bit`. The arena is allocated once at
//! construction and only the occupant slots mutate afterwards.

use glam::Vec2;

use crate::registry::TextureId;

/// Arena-backed quadtree tracking which atlas cell holds which texture.
#[derive(Debug, Clone)]
pub struct SlotTree {
    /// Occupant per node, breadth-first order
    nodes: Vec<Option<TextureId>>,
    /// Number of subdivision levels below the root
    depth: u32,
}

impl SlotTree {
    /// Create a tree with `depth` subdivision levels (depth 0 = a single cell).
    ///
    /// Allocates `(4^(depth+1) - 1) / 3` nodes up front.
    pub fn new(depth: u32) -> Self {
        let node_count = ((4usize.pow(depth + 1)) - 1) / 3;
        Self {
            nodes: vec![None; node_count],
            depth,
        }
    }

    /// Number of subdivision levels below the root
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Depth of the node currently holding `id`, 0 = root (largest cell).
    ///
    /// Linear scan over the arena; called a handful of times per tick.
    pub fn get_smallness(&self, id: TextureId) -> Option<u32> {
        self.nodes
            .iter()
            .position(|n| *n == Some(id))
            .map(Self::level_of)
    }

    /// Try to place `id` in a free cell at exactly `smallness` levels below
    /// the root. Returns the cell position normalized to `[0, 1)` in the
    /// atlas frame, or `None` if no cell at that depth is free.
    ///
    /// With `commit = false` this is a pure dry-run probe: feasibility is
    /// reported but no state changes. A `smallness` deeper than the tree
    /// returns `None`.
    pub fn pack(&mut self, smallness: u32, id: TextureId, commit: bool) -> Option<Vec2> {
        self.pack_at(0, smallness, self.depth, id, commit)
    }

    fn pack_at(
        &mut self,
        node: usize,
        smallness: u32,
        depth_remaining: u32,
        id: TextureId,
        commit: bool,
    ) -> Option<Vec2> {
        if smallness == 0 {
            if self.subtree_blocked(node, depth_remaining, id) {
                return None;
            }
            if commit {
                self.nodes[node] = Some(id);
            }
            return Some(Vec2::ZERO);
        }
        if depth_remaining == 0 {
            return None;
        }
        for quadrant in 0..4usize {
            let child = 4 * node + 1 + quadrant;
            if let Some(local) =
                self.pack_at(child, smallness - 1, depth_remaining - 1, id, commit)
            {
                let offset = Vec2::new((quadrant % 2) as f32, (quadrant / 2) as f32);
                return Some((local + offset) / 2.0);
            }
        }
        None
    }

    /// Whether the subtree rooted at `node` holds any occupant other than `id`.
    ///
    /// A node that itself holds an occupant ends the scan: occupied nodes
    /// never have occupied descendants, so there is nothing further to check.
    fn subtree_blocked(&self, node: usize, depth_remaining: u32, id: TextureId) -> bool {
        match self.nodes[node] {
            Some(occupant) => occupant != id,
            None => {
                depth_remaining > 0
                    && (0..4usize)
                        .any(|q| self.subtree_blocked(4 * node + 1 + q, depth_remaining - 1, id))
            }
        }
    }

    /// Clear the first cell holding `id`. Returns whether `id` was present.
    pub fn remove(&mut self, id: TextureId) -> bool {
        match self.nodes.iter().position(|n| *n == Some(id)) {
            Some(index) => {
                self.nodes[index] = None;
                true
            }
            None => false,
        }
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.nodes.fill(None);
    }

    /// Number of occupied cells
    pub fn occupant_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// All occupants with the depth they sit at
    pub fn occupants(&self) -> impl Iterator<Item = (TextureId, u32)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.map(|id| (id, Self::level_of(index))))
    }

    /// Depth of a node from its arena index. Level `l` starts at
    /// `(4^l - 1) / 3` in breadth-first order.
    fn level_of(index: usize) -> u32 {
        let mut level = 0;
        let mut level_start = 0usize;
        let mut level_len = 1usize;
        while index >= level_start + level_len {
            level_start += level_len;
            level_len *= 4;
            level += 1;
        }
        level
    }
}
