//! Packing cells.
//!
//! A [`Cell`] is one packable rectangle in quantized units. Leaves carry the
//! faces they stand for, groups carry two or four equally sized children.
//! Cells live in a [`CellArena`] and refer to each other by [`CellId`], so the
//! tree has no back-pointers: a child never knows its parent, and placement is
//! pushed from the roots downwards.

use nalgebra::Point3;

use crate::mesh::{FaceId, MeshIndex};

/// Index of a cell inside a [`CellArena`]. Ids grow in creation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CellId(u32);

impl CellId {
    /// Get the index as usize.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Edge lengths of one triangle and their order.
///
/// Edge `e` joins corner `e` and corner `(e + 1) % 3`.
#[derive(Debug, Clone, Copy)]
pub struct TriangleCorners<I: MeshIndex = u32> {
    /// The triangle face.
    pub face: FaceId<I>,
    /// Edge lengths, indexed by edge.
    pub edges: [f64; 3],
    /// Edge indices sorted from shortest to longest.
    pub order: [usize; 3],
}

impl<I: MeshIndex> TriangleCorners<I> {
    /// Measure a triangle from its corner positions.
    pub fn new(face: FaceId<I>, corners: [Point3<f64>; 3]) -> Self {
        let edges = [
            (corners[1] - corners[0]).norm(),
            (corners[2] - corners[1]).norm(),
            (corners[0] - corners[2]).norm(),
        ];
        let mut order = [0, 1, 2];
        // Stable sort: equal lengths keep edge order.
        order.sort_by(|&a, &b| edges[a].total_cmp(&edges[b]));
        Self { face, edges, order }
    }

    /// Edge lengths from shortest to longest.
    #[inline]
    pub fn sorted_lengths(&self) -> [f64; 3] {
        self.order.map(|e| self.edges[e])
    }

    /// Length of the shortest edge.
    #[inline]
    pub fn shortest(&self) -> f64 {
        self.edges[self.order[0]]
    }

    /// Length of the middle edge.
    #[inline]
    pub fn middle(&self) -> f64 {
        self.edges[self.order[1]]
    }

    /// Sum of absolute differences between the sorted edge lengths.
    pub fn distance(&self, other: &Self) -> f64 {
        let a = self.sorted_lengths();
        let b = other.sorted_lengths();
        (0..3).map(|k| (a[k] - b[k]).abs()).sum()
    }

    /// Corner indices as `[apex, middle_end, short_end]`.
    ///
    /// The apex joins the shortest and middle edge (it faces the longest one).
    /// The middle edge runs from the apex to `middle_end`, the shortest edge
    /// from the apex to `short_end`.
    pub fn roles(&self) -> [usize; 3] {
        let apex = (self.order[2] + 2) % 3;
        let middle_edge = self.order[1];
        let middle_end = if middle_edge == apex {
            (middle_edge + 1) % 3
        } else {
            middle_edge
        };
        [apex, middle_end, 3 - apex - middle_end]
    }
}

/// The faces behind a leaf cell.
///
/// `turns` counts counter-clockwise quarter turns applied to the leaf since it
/// was measured; it shifts which rectangle corner each face corner receives.
#[derive(Debug, Clone)]
pub enum Payload<I: MeshIndex = u32> {
    /// One quad face.
    Quad {
        /// The quad face.
        face: FaceId<I>,
        /// Quarter turns, mod 4.
        turns: u8,
    },
    /// Two triangles sharing the rectangle along its diagonal.
    TrianglePair {
        /// Triangle taking the lower-left half.
        first: TriangleCorners<I>,
        /// Triangle taking the complementary half.
        second: TriangleCorners<I>,
        /// Quarter turns, mod 4.
        turns: u8,
    },
    /// A triangle left over after pairing.
    LoneTriangle {
        /// The triangle.
        triangle: TriangleCorners<I>,
        /// Quarter turns, mod 4.
        turns: u8,
    },
}

impl<I: MeshIndex> Payload<I> {
    /// Quarter turns applied so far.
    #[inline]
    pub fn turns(&self) -> u8 {
        match self {
            Payload::Quad { turns, .. }
            | Payload::TrianglePair { turns, .. }
            | Payload::LoneTriangle { turns, .. } => *turns,
        }
    }

    fn turns_mut(&mut self) -> &mut u8 {
        match self {
            Payload::Quad { turns, .. }
            | Payload::TrianglePair { turns, .. }
            | Payload::LoneTriangle { turns, .. } => turns,
        }
    }

    /// Whether triangles use the opposite diagonal of their rectangle.
    #[inline]
    pub fn tri_rotated(&self) -> bool {
        self.turns() % 2 == 1
    }

    /// Shift the corner mapping one step forward.
    pub fn turn(&mut self) {
        let turns = self.turns_mut();
        *turns = (*turns + 1) % 4;
    }

    /// Shift the corner mapping one step back.
    pub fn unturn(&mut self) {
        let turns = self.turns_mut();
        *turns = (*turns + 3) % 4;
    }

    /// Faces covered by this payload.
    pub fn faces(&self) -> Vec<FaceId<I>> {
        match self {
            Payload::Quad { face, .. } => vec![*face],
            Payload::TrianglePair { first, second, .. } => vec![first.face, second.face],
            Payload::LoneTriangle { triangle, .. } => vec![triangle.face],
        }
    }
}

/// Children of a group cell.
#[derive(Debug, Clone, Copy)]
pub enum Children {
    /// Two cells side by side.
    Pair([CellId; 2]),
    /// Four square cells, one per quadrant.
    Quad([CellId; 4]),
}

impl Children {
    /// Child ids in placement order.
    #[inline]
    pub fn as_slice(&self) -> &[CellId] {
        match self {
            Children::Pair(ids) => ids,
            Children::Quad(ids) => ids,
        }
    }
}

/// Leaf or group.
#[derive(Debug, Clone)]
pub enum CellKind<I: MeshIndex = u32> {
    /// Backed by geometry.
    Leaf(Payload<I>),
    /// Backed by child cells.
    Group(Children),
}

/// One packable rectangle.
#[derive(Debug, Clone)]
pub struct Cell<I: MeshIndex = u32> {
    /// Width in quantized units.
    pub width: u64,
    /// Height in quantized units.
    pub height: u64,
    /// Offset inside the parent, in quantized units. Zero for roots.
    pub offset: (u64, u64),
    /// Whether width and height are swapped relative to creation.
    pub rotated: bool,
    /// Number of cells below this one.
    pub descendants: usize,
    /// Leaf payload or group children.
    pub kind: CellKind<I>,
    has_parent: bool,
}

impl<I: MeshIndex> Cell<I> {
    /// Area in quantized units.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width * self.height
    }

    /// Whether width equals height.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Whether this cell has been placed into a group.
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.has_parent
    }

    /// The payload, for leaves.
    pub fn payload(&self) -> Option<&Payload<I>> {
        match &self.kind {
            CellKind::Leaf(payload) => Some(payload),
            CellKind::Group(_) => None,
        }
    }

    /// The children, for groups.
    pub fn children(&self) -> &[CellId] {
        match &self.kind {
            CellKind::Leaf(_) => &[],
            CellKind::Group(children) => children.as_slice(),
        }
    }
}

/// Owner of every cell of one packing run.
#[derive(Debug, Clone)]
pub struct CellArena<I: MeshIndex = u32> {
    cells: Vec<Cell<I>>,
}

impl<I: MeshIndex> Default for CellArena<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> CellArena<I> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a cell.
    #[inline]
    pub fn get(&self, id: CellId) -> &Cell<I> {
        &self.cells[id.index()]
    }

    fn push(&mut self, cell: Cell<I>) -> CellId {
        debug_assert!(self.cells.len() < u32::MAX as usize, "cell arena overflow");
        let id = CellId(self.cells.len() as u32);
        self.cells.push(cell);
        id
    }

    /// Add a leaf cell.
    pub fn push_leaf(&mut self, width: u64, height: u64, payload: Payload<I>) -> CellId {
        debug_assert!(width > 0 && height > 0, "leaf with empty side");
        self.push(Cell {
            width,
            height,
            offset: (0, 0),
            rotated: false,
            descendants: 0,
            kind: CellKind::Leaf(payload),
            has_parent: false,
        })
    }

    fn adopt(&mut self, child: CellId, offset: (u64, u64)) -> usize {
        let cell = &mut self.cells[child.index()];
        debug_assert!(!cell.has_parent, "{:?} already has a parent", child);
        cell.has_parent = true;
        cell.offset = offset;
        cell.descendants + 1
    }

    /// Put two equal cells side by side along the width.
    pub fn group_pair(&mut self, a: CellId, b: CellId) -> CellId {
        let (width, height) = (self.get(a).width, self.get(a).height);
        debug_assert_eq!((width, height), (self.get(b).width, self.get(b).height));

        let descendants = self.adopt(a, (0, 0)) + self.adopt(b, (width, 0));
        self.push(Cell {
            width: width * 2,
            height,
            offset: (0, 0),
            rotated: false,
            descendants,
            kind: CellKind::Group(Children::Pair([a, b])),
            has_parent: false,
        })
    }

    /// Put four equal square cells into the quadrants of a square twice as big.
    pub fn group_quad(&mut self, ids: [CellId; 4]) -> CellId {
        let side = self.get(ids[0]).width;
        debug_assert!(ids
            .iter()
            .all(|&id| self.get(id).width == side && self.get(id).height == side));

        let offsets = [(0, 0), (side, 0), (0, side), (side, side)];
        let descendants: usize = ids
            .iter()
            .zip(offsets)
            .map(|(&id, offset)| self.adopt(id, offset))
            .sum();
        self.push(Cell {
            width: side * 2,
            height: side * 2,
            offset: (0, 0),
            rotated: false,
            descendants,
            kind: CellKind::Group(Children::Quad(ids)),
            has_parent: false,
        })
    }

    /// Turn a cell and its whole subtree a quarter turn counter-clockwise.
    ///
    /// Width and height swap, `rotated` toggles, and every child moves to where
    /// the turn carries it inside the parent.
    pub fn spin(&mut self, id: CellId) {
        self.turn_subtree(id, true);
    }

    /// Exact inverse of [`spin`](Self::spin): a clockwise quarter turn.
    pub fn unspin(&mut self, id: CellId) {
        self.turn_subtree(id, false);
    }

    fn turn_subtree(&mut self, id: CellId, counter_clockwise: bool) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let cell = &mut self.cells[id.index()];
            let (width, height) = (cell.width, cell.height);
            cell.width = height;
            cell.height = width;
            cell.rotated = !cell.rotated;

            let children = match &mut cell.kind {
                CellKind::Leaf(payload) => {
                    if counter_clockwise {
                        payload.turn();
                    } else {
                        payload.unturn();
                    }
                    continue;
                }
                CellKind::Group(children) => *children,
            };

            // Children have not been turned yet, so their sizes are still in
            // the parent's old frame.
            for &child in children.as_slice() {
                let child_cell = &mut self.cells[child.index()];
                let (x, y) = child_cell.offset;
                child_cell.offset = if counter_clockwise {
                    (height - y - child_cell.height, x)
                } else {
                    (y, width - x - child_cell.width)
                };
                stack.push(child);
            }
        }
    }

    /// Total area of the given cells.
    pub fn total_area(&self, ids: &[CellId]) -> u64 {
        ids.iter().map(|&id| self.get(id).area()).sum()
    }

    /// Leaf ids below (and including) a cell, depth first.
    pub fn leaves_under(&self, id: CellId) -> Vec<CellId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match &self.get(id).kind {
                CellKind::Leaf(_) => leaves.push(id),
                CellKind::Group(children) => stack.extend(children.as_slice().iter().rev()),
            }
        }
        leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(face: usize) -> Payload {
        Payload::Quad {
            face: FaceId::new(face),
            turns: 0,
        }
    }

    #[test]
    fn test_triangle_sorting() {
        let tri: TriangleCorners = TriangleCorners::new(
            FaceId::new(0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(0.0, 3.0, 0.0),
            ],
        );
        // Edges: c0-c1 = 4, c1-c2 = 5, c2-c0 = 3
        assert_eq!(tri.order, [2, 0, 1]);
        assert_eq!(tri.sorted_lengths(), [3.0, 4.0, 5.0]);
        // Right angle at c0, the 4-edge leads to c1, the 3-edge to c2
        assert_eq!(tri.roles(), [0, 1, 2]);
    }

    #[test]
    fn test_triangle_roles_any_winding() {
        let corners = [
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let tri: TriangleCorners = TriangleCorners::new(FaceId::new(0), corners);
        let [apex, middle_end, short_end] = tri.roles();
        assert_eq!(apex, 1);
        assert!(((corners[middle_end] - corners[apex]).norm() - 4.0).abs() < 1e-10);
        assert!(((corners[short_end] - corners[apex]).norm() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let mut arena = CellArena::new();
        let ids = [0, 1, 2, 3].map(|f| arena.push_leaf(1, 1, quad(f)));
        let g = arena.group_quad(ids);

        let indices: Vec<usize> = ids.iter().chain([&g]).map(|id| id.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(arena.len(), 5);
        assert!(ids.iter().all(|&id| id < g));
    }

    #[test]
    fn test_group_pair() {
        let mut arena = CellArena::new();
        let a = arena.push_leaf(2, 1, quad(0));
        let b = arena.push_leaf(2, 1, quad(1));
        let g = arena.group_pair(a, b);

        let group = arena.get(g);
        assert_eq!((group.width, group.height), (4, 1));
        assert_eq!(group.descendants, 2);
        assert_eq!(arena.get(b).offset, (2, 0));
        assert!(arena.get(a).has_parent());
        assert!(!group.has_parent());
        assert!(group.payload().is_none());
        assert_eq!(group.children(), &[a, b]);
    }

    #[test]
    fn test_group_quad_offsets() {
        let mut arena = CellArena::new();
        let ids = [0, 1, 2, 3].map(|f| arena.push_leaf(2, 2, quad(f)));
        let g = arena.group_quad(ids);

        assert_eq!(arena.get(g).width, 4);
        assert_eq!(arena.get(g).descendants, 4);
        let offsets: Vec<_> = ids.iter().map(|&id| arena.get(id).offset).collect();
        assert_eq!(offsets, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
        assert_eq!(arena.leaves_under(g), ids.to_vec());
    }

    #[test]
    fn test_spin_leaf() {
        let mut arena = CellArena::new();
        let id = arena.push_leaf(1, 4, quad(0));
        arena.spin(id);

        let cell = arena.get(id);
        assert_eq!((cell.width, cell.height), (4, 1));
        assert!(cell.rotated);
        assert_eq!(cell.payload().unwrap().turns(), 1);
        assert!(cell.payload().unwrap().tri_rotated());
    }

    #[test]
    fn test_spin_group_moves_children() {
        let mut arena = CellArena::new();
        let a = arena.push_leaf(2, 1, quad(0));
        let b = arena.push_leaf(2, 1, quad(1));
        let g = arena.group_pair(a, b);
        arena.spin(g);

        assert_eq!((arena.get(g).width, arena.get(g).height), (1, 4));
        // A counter-clockwise turn stacks the pair vertically
        assert_eq!(arena.get(a).offset, (0, 0));
        assert_eq!(arena.get(b).offset, (0, 2));
        for id in [a, b] {
            let cell = arena.get(id);
            assert_eq!((cell.width, cell.height), (1, 2));
            assert!(cell.rotated);
        }
        // Rotation reaches every descendant
        assert!(arena.leaves_under(g).iter().all(|&id| arena.get(id).rotated));
    }

    #[test]
    fn test_unspin_restores() {
        let mut arena = CellArena::new();
        let ids = [0, 1, 2, 3].map(|f| arena.push_leaf(2, 1, quad(f)));
        let p0 = arena.group_pair(ids[0], ids[1]);
        let p1 = arena.group_pair(ids[2], ids[3]);
        let g = arena.group_pair(p0, p1);
        let before: Vec<_> = (0..arena.len())
            .map(|i| {
                let cell = arena.get(CellId(i as u32));
                (cell.width, cell.height, cell.offset, cell.rotated)
            })
            .collect();

        arena.spin(g);
        arena.unspin(g);

        for (i, expected) in before.iter().enumerate() {
            let cell = arena.get(CellId(i as u32));
            assert_eq!(&(cell.width, cell.height, cell.offset, cell.rotated), expected);
            if let Some(payload) = cell.payload() {
                assert_eq!(payload.turns(), 0);
            }
        }
    }
}
