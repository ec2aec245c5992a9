//! Hierarchical consolidation of equally sized cells.
//!
//! The external packer slows down sharply with the number of boxes, while
//! lightmaps are usually full of identical small faces. Consolidation merges
//! equal cells into super-cells before packing: two equal rectangles become
//! one rectangle twice as wide, four equal squares become one square twice as
//! big. Merging repeats until a pass changes nothing. A bound derived from
//! the whole atlas limits the side of merged squares and the height of
//! merged rectangles.
//!
//! Each pass drains the current buckets into fresh ones, so no bucket is
//! modified while it is being walked.

use std::collections::BTreeMap;
use std::mem;

use log::debug;

use crate::mesh::MeshIndex;

use super::cell::{CellArena, CellId};

/// Result of [`consolidate`].
#[derive(Debug, Clone)]
pub struct Consolidation {
    /// Cells without a parent, in creation order. These go to the packer.
    pub roots: Vec<CellId>,
    /// Number of merge passes, including the final pass that changed nothing.
    pub passes: usize,
    /// Side length cells had to stay below to be merged.
    pub max_group_dimension: u64,
}

/// Largest side (exclusive) a cell may have and still be merged.
///
/// One `divisor`-th of the atlas side length, in quantized units, but never
/// less than 2 so that unit cells can always merge.
pub fn max_group_dimension(total_area: u64, divisor: u32) -> u64 {
    let bound = ((total_area as f64).sqrt() / f64::from(divisor.max(1))).floor() as u64;
    bound.max(2)
}

#[derive(Debug, Default)]
struct Buckets {
    /// Square cells keyed by side.
    squares: BTreeMap<u64, Vec<CellId>>,
    /// Rectangular cells keyed by (width, height).
    rects: BTreeMap<(u64, u64), Vec<CellId>>,
}

impl Buckets {
    fn insert<I: MeshIndex>(&mut self, arena: &CellArena<I>, id: CellId) {
        let cell = arena.get(id);
        if cell.is_square() {
            self.squares.entry(cell.width).or_default().push(id);
        } else {
            self.rects
                .entry((cell.width, cell.height))
                .or_default()
                .push(id);
        }
    }

    fn into_ids(self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self
            .squares
            .into_values()
            .chain(self.rects.into_values())
            .flatten()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Merge equal cells into groups and return the cells left without a parent.
///
/// All `cells` must be wide-or-square leaves or groups without a parent.
/// Rectangles pair while their height is below the bound and squares merge
/// while their side is.
/// After merging, every second non-square root (walking from the newest) is
/// given an extra quarter turn so the packer sees a mix of orientations.
pub fn consolidate<I: MeshIndex>(
    arena: &mut CellArena<I>,
    cells: Vec<CellId>,
    divisor: u32,
) -> Consolidation {
    let total_area = arena.total_area(&cells);
    let bound = max_group_dimension(total_area, divisor);

    let mut buckets = Buckets::default();
    for id in cells {
        buckets.insert(arena, id);
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let (next, merged) = merge_pass(arena, mem::take(&mut buckets), bound);
        buckets = next;
        if merged == 0 {
            break;
        }
    }

    let roots = buckets.into_ids();
    let turned = alternate_orientation(arena, &roots);

    debug_assert_eq!(arena.total_area(&roots), total_area);
    debug!(
        "consolidated into {} roots in {} passes (bound {}, {} turned)",
        roots.len(),
        passes,
        bound,
        turned
    );

    Consolidation {
        roots,
        passes,
        max_group_dimension: bound,
    }
}

/// One merge pass. Returns the new buckets and the number of groups formed.
fn merge_pass<I: MeshIndex>(
    arena: &mut CellArena<I>,
    buckets: Buckets,
    bound: u64,
) -> (Buckets, usize) {
    let mut next = Buckets::default();
    let mut merged = 0;

    for ((width, height), cells) in buckets.rects {
        // Only the height is bounded; strips keep doubling in width while
        // the bucket has partners.
        if height >= bound || cells.len() < 2 {
            next.rects.entry((width, height)).or_default().extend(cells);
            continue;
        }
        let mut pairs = cells.chunks_exact(2);
        for pair in &mut pairs {
            let group = arena.group_pair(pair[0], pair[1]);
            next.insert(arena, group);
            merged += 1;
        }
        next.rects
            .entry((width, height))
            .or_default()
            .extend_from_slice(pairs.remainder());
    }

    for (side, mut cells) in buckets.squares {
        if side >= bound || cells.len() < 4 {
            next.squares.entry(side).or_default().extend(cells);
            continue;
        }
        // Shallow cells first keeps the tree balanced.
        cells.sort_by_key(|&id| (arena.get(id).descendants, id));
        let mut quads = cells.chunks_exact(4);
        for quad in &mut quads {
            let group = arena.group_quad([quad[0], quad[1], quad[2], quad[3]]);
            next.insert(arena, group);
            merged += 1;
        }
        next.squares
            .entry(side)
            .or_default()
            .extend_from_slice(quads.remainder());
    }

    (next, merged)
}

/// Turn every second non-square root, walking from the newest. Returns the
/// number of roots turned.
fn alternate_orientation<I: MeshIndex>(arena: &mut CellArena<I>, roots: &[CellId]) -> usize {
    let mut seen = 0;
    let mut turned = 0;
    for &id in roots.iter().rev() {
        if arena.get(id).is_square() {
            continue;
        }
        if seen % 2 == 1 {
            arena.spin(id);
            turned += 1;
        }
        seen += 1;
    }
    turned
}
