//! Polygon mesh storage.
//!
//! [`PolyMesh`] is a read-only face-vertex mesh with an explicit loop array:
//! every face owns a contiguous run of loops, and every loop points at one
//! vertex. Per-corner attributes (see [`LoopUvs`](super::LoopUvs)) are
//! indexed by [`LoopId`].

use std::ops::Range;

use nalgebra::Point3;

use super::index::{FaceId, LoopId, MeshIndex, VertexId};

/// A face: a contiguous run of loops.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// First loop of this face.
    pub first_loop: LoopId<I>,
    /// Number of corners.
    pub corners: usize,
}

impl<I: MeshIndex> Face<I> {
    /// Range of loop indices owned by this face.
    #[inline]
    pub fn loop_range(&self) -> Range<usize> {
        let start = self.first_loop.index();
        start..start + self.corners
    }
}

/// A polygon mesh made of triangles, quads and (ignored by the packer) n-gons.
#[derive(Debug, Clone)]
pub struct PolyMesh<I: MeshIndex = u32> {
    pub(crate) positions: Vec<Point3<f64>>,
    pub(crate) loops: Vec<VertexId<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> PolyMesh<I> {
    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of loops (face corners) over all faces.
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Get a face.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Vertex referenced by a loop.
    #[inline]
    pub fn loop_vertex(&self, l: LoopId<I>) -> VertexId<I> {
        self.loops[l.index()]
    }

    /// Number of corners of a face.
    #[inline]
    pub fn face_corners(&self, f: FaceId<I>) -> usize {
        self.faces[f.index()].corners
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over the loops of a face, in winding order.
    pub fn face_loops(&self, f: FaceId<I>) -> impl Iterator<Item = LoopId<I>> {
        self.faces[f.index()].loop_range().map(LoopId::new)
    }

    /// Iterate over the vertices of a face, in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.loops[self.faces[f.index()].loop_range()].iter().copied()
    }

    /// World-space positions of a face's corners, in winding order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| self.positions[v.index()]).collect()
    }

    /// Area of a face.
    ///
    /// Polygons are fanned from their first corner, so the result is exact for
    /// planar convex faces and a reasonable estimate otherwise.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        polygon_area(&self.face_positions(f))
    }
}

/// Fan-triangulated area of a polygon given its corner positions.
pub(crate) fn polygon_area(corners: &[Point3<f64>]) -> f64 {
    if corners.len() < 3 {
        return 0.0;
    }
    let p0 = corners[0];
    corners
        .windows(2)
        .skip(1)
        .map(|w| 0.5 * (w[0] - p0).cross(&(w[1] - p0)).norm())
        .sum()
}
