//! Placement writer.
//!
//! Walks the consolidation tree from the packed roots down to the leaves,
//! turns every leaf into a normalized rectangle shrunk by the margin, and
//! writes one UV per face corner. This is the only stage that touches the UV
//! layer.
//!
//! Rectangle corners are numbered counter-clockwise from the lower left:
//!
//! ```text
//!   c3 ---- c2
//!   |        |
//!   c0 ---- c1
//! ```
//!
//! A leaf turned `t` quarter turns hands corner `c[(k + t) % 4]` to the face
//! corner that would have received `c[k]` unturned.

use nalgebra::Point2;
use rayon::prelude::*;

use crate::mesh::{LoopId, LoopUvs, MeshIndex, PolyMesh};

use super::cell::{CellArena, CellId, CellKind, Payload, TriangleCorners};

/// Corner slots of `[apex, middle_end, short_end]` for the triangle taking the
/// lower-left half of an unturned rectangle. The middle edge runs along the
/// bottom, the shortest edge up the left side.
const FIRST_TRIANGLE_SLOTS: [usize; 3] = [0, 1, 3];

/// Corner slots for the triangle taking the upper-right half. It shares the
/// diagonal c1-c3 with the first one.
const SECOND_TRIANGLE_SLOTS: [usize; 3] = [2, 3, 1];

/// An axis-aligned rectangle in normalized UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    /// Lower-left corner.
    pub min: Point2<f64>,
    /// Upper-right corner.
    pub max: Point2<f64>,
}

impl UvRect {
    /// The four corners, counter-clockwise from the lower left.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// Whether the interiors of two rectangles intersect.
    pub fn overlaps(&self, other: &UvRect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Whether the rectangle lies inside the unit square.
    pub fn in_unit_square(&self) -> bool {
        self.min.x >= 0.0 && self.min.y >= 0.0 && self.max.x <= 1.0 && self.max.y <= 1.0
    }
}

/// Canvas size and margin, used to normalize quantized coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    /// Width in quantized units.
    pub width: f64,
    /// Height in quantized units.
    pub height: f64,
    /// Margin in UV units, removed from every side of every leaf.
    pub margin: f64,
}

impl Canvas {
    /// A canvas whose margin is `canvas_size / margin_divisor` along each
    /// axis, expressed in UV units.
    pub fn new(width: f64, height: f64, margin_divisor: f64) -> Self {
        Self {
            width,
            height,
            margin: 1.0 / margin_divisor,
        }
    }

    /// Normalized rectangle of a cell at absolute position `(x, y)`.
    ///
    /// Each side loses `margin`, except that the margin is capped at a
    /// quarter of the rectangle's extent on each axis. Leaves at least
    /// `4 * margin` wide (or tall) are shrunk by exactly `margin`; narrower
    /// ones lose a quarter of their extent per side instead of collapsing or
    /// inverting, which also keeps wide `margin_fraction` values usable.
    pub fn rect(&self, x: f64, y: f64, width: u64, height: u64) -> UvRect {
        let (x1, x2) = shrink(x / self.width, (x + width as f64) / self.width, self.margin);
        let (y1, y2) = shrink(y / self.height, (y + height as f64) / self.height, self.margin);
        UvRect {
            min: Point2::new(x1, y1),
            max: Point2::new(x2, y2),
        }
    }
}

fn shrink(lo: f64, hi: f64, margin: f64) -> (f64, f64) {
    let margin = margin.min(0.25 * (hi - lo));
    (lo + margin, hi - margin)
}

/// Collect the rectangles of every leaf below `id`.
///
/// `origin` is the absolute position of the parent; the cell's own offset is
/// added to it.
pub fn place_cell<I: MeshIndex>(
    arena: &CellArena<I>,
    id: CellId,
    origin: (f64, f64),
    canvas: &Canvas,
    out: &mut Vec<(CellId, UvRect)>,
) {
    let cell = arena.get(id);
    let x = origin.0 + cell.offset.0 as f64;
    let y = origin.1 + cell.offset.1 as f64;
    match &cell.kind {
        CellKind::Group(children) => {
            for &child in children.as_slice() {
                place_cell(arena, child, (x, y), canvas, out);
            }
        }
        CellKind::Leaf(_) => out.push((id, canvas.rect(x, y, cell.width, cell.height))),
    }
}

/// Leaf rectangles for every packed root, in root order then depth-first.
///
/// `origins[i]` is the packer's origin for `roots[i]`. With `parallel` set,
/// roots are walked on the rayon pool; the output is the same either way.
pub fn place_roots<I: MeshIndex>(
    arena: &CellArena<I>,
    roots: &[CellId],
    origins: &[(f64, f64)],
    canvas: &Canvas,
    parallel: bool,
) -> Vec<(CellId, UvRect)> {
    debug_assert_eq!(roots.len(), origins.len());

    let walk = |(&root, &origin): (&CellId, &(f64, f64))| {
        let mut out = Vec::new();
        place_cell(arena, root, origin, canvas, &mut out);
        out
    };

    if parallel {
        roots
            .par_iter()
            .zip(origins.par_iter())
            .flat_map_iter(walk)
            .collect()
    } else {
        roots.iter().zip(origins).flat_map(walk).collect()
    }
}

/// Write the UVs of one leaf.
pub fn write_leaf<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    payload: &Payload<I>,
    rect: &UvRect,
    uvs: &mut LoopUvs<I>,
) {
    let corners = rect.corners();
    let turns = usize::from(payload.turns());
    match payload {
        Payload::Quad { face, .. } => {
            for (k, l) in mesh.face_loops(*face).enumerate() {
                uvs.set(l, corners[(k + turns) % 4]);
            }
        }
        Payload::TrianglePair { first, second, .. } => {
            write_triangle(mesh, first, FIRST_TRIANGLE_SLOTS, turns, &corners, uvs);
            write_triangle(mesh, second, SECOND_TRIANGLE_SLOTS, turns, &corners, uvs);
        }
        Payload::LoneTriangle { triangle, .. } => {
            write_triangle(mesh, triangle, FIRST_TRIANGLE_SLOTS, turns, &corners, uvs);
        }
    }
}

fn write_triangle<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    triangle: &TriangleCorners<I>,
    slots: [usize; 3],
    turns: usize,
    corners: &[Point2<f64>; 4],
    uvs: &mut LoopUvs<I>,
) {
    let loops: Vec<LoopId<I>> = mesh.face_loops(triangle.face).collect();
    for (corner, slot) in triangle.roles().into_iter().zip(slots) {
        uvs.set(loops[corner], corners[(slot + turns) % 4]);
    }
}

/// Write the UVs of every placed leaf.
pub fn write_placements<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    arena: &CellArena<I>,
    rects: &[(CellId, UvRect)],
    uvs: &mut LoopUvs<I>,
) {
    for (id, rect) in rects {
        if let Some(payload) = arena.get(*id).payload() {
            write_leaf(mesh, payload, rect, uvs);
        }
    }
}
