//! Single-linkage grouping of projected points.
//!
//! Two points are linked when their distance is at most the threshold, and
//! groups are the connected components of that graph. The union-find is
//! kept across calls with growing thresholds, so each call only adds links.

use rustc_hash::FxHashMap;
use std::f64::consts::SQRT_2;

/// Neighbour cells that can hold a point within reach of the current cell.
///
/// Cells are `threshold / sqrt(2)` wide, so a linked pair is at most two
/// cells apart on each axis. Only the forward half is listed; the backward
/// half is covered when the neighbour takes its turn.
const FORWARD_OFFSETS: [(i64, i64); 12] = [
    (0, 1),
    (0, 2),
    (1, -2),
    (1, -1),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, -2),
    (2, -1),
    (2, 0),
    (2, 1),
    (2, 2),
];

/// Disjoint-set forest over point indices.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
    rank: Vec<u8>,
    components: usize,
}

impl UnionFind {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            rank: vec![0; len],
            components: len,
        }
    }

    pub(crate) fn components(&self) -> usize {
        self.components
    }

    pub(crate) fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge the sets holding `a` and `b`. Returns false if already merged.
    pub(crate) fn union(&mut self, a: u32, b: u32) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (high, low) = if self.rank[ra as usize] >= self.rank[rb as usize] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[low as usize] = high;
        if self.rank[high as usize] == self.rank[low as usize] {
            self.rank[high as usize] += 1;
        }
        self.components -= 1;
        true
    }
}

fn cell_of(coord: &[f64; 2], cell: f64) -> (i64, i64) {
    ((coord[0] / cell).floor() as i64, (coord[1] / cell).floor() as i64)
}

fn any_pair_within(a: &[u32], b: &[u32], coords: &[[f64; 2]], threshold_sq: f64) -> bool {
    a.iter().any(|&i| {
        let p = coords[i as usize];
        b.iter().any(|&j| {
            let q = coords[j as usize];
            let (dx, dy) = (p[0] - q[0], p[1] - q[1]);
            dx * dx + dy * dy <= threshold_sq
        })
    })
}

/// Link every pair of points at most `threshold` apart.
pub(crate) fn link_within(uf: &mut UnionFind, coords: &[[f64; 2]], threshold: f64) {
    if uf.components() <= 1 || threshold.is_nan() || threshold <= 0.0 {
        return;
    }

    let cell = threshold / SQRT_2;
    let mut grid: FxHashMap<(i64, i64), Vec<u32>> = FxHashMap::default();
    for (i, coord) in coords.iter().enumerate() {
        grid.entry(cell_of(coord, cell)).or_default().push(i as u32);
    }

    // A cell's diagonal equals the threshold, so its points are all linked.
    for members in grid.values() {
        for &other in &members[1..] {
            uf.union(members[0], other);
        }
    }

    let threshold_sq = threshold * threshold;
    let mut keys: Vec<(i64, i64)> = grid.keys().copied().collect();
    keys.sort_unstable();

    for key in keys {
        if uf.components() <= 1 {
            return;
        }
        let here = &grid[&key];
        for (dx, dy) in FORWARD_OFFSETS {
            let Some(there) = grid.get(&(key.0 + dx, key.1 + dy)) else {
                continue;
            };
            if uf.find(here[0]) == uf.find(there[0]) {
                continue;
            }
            if any_pair_within(here, there, coords, threshold_sq) {
                uf.union(here[0], there[0]);
            }
        }
    }
}
