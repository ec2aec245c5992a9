//! Per-loop UV storage.
//!
//! This module provides the [`LoopUvs`] layer: one 2D coordinate per face
//! corner. Storing UVs per loop rather than per vertex lets faces that share
//! a vertex land in different places of the atlas.

use std::marker::PhantomData;

use nalgebra::Point2;

use super::index::{FaceId, LoopId, MeshIndex};
use super::poly::PolyMesh;

/// UV coordinates for every loop of a mesh.
#[derive(Debug, Clone)]
pub struct LoopUvs<I: MeshIndex = u32> {
    /// UV coordinates indexed by loop ID.
    coords: Vec<Point2<f64>>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> LoopUvs<I> {
    /// Create a UV layer from existing coordinates, indexed by loop.
    pub fn new(coords: Vec<Point2<f64>>) -> Self {
        Self {
            coords,
            _marker: PhantomData,
        }
    }

    /// Create a zeroed UV layer with `n` loops.
    pub fn zeros(n: usize) -> Self {
        Self::new(vec![Point2::origin(); n])
    }

    /// Create a zeroed UV layer sized for a mesh.
    pub fn for_mesh(mesh: &PolyMesh<I>) -> Self {
        Self::zeros(mesh.num_loops())
    }

    /// Get the UV coordinates of a loop.
    #[inline]
    pub fn get(&self, l: LoopId<I>) -> Point2<f64> {
        self.coords[l.index()]
    }

    /// Set the UV coordinates of a loop.
    #[inline]
    pub fn set(&mut self, l: LoopId<I>, uv: Point2<f64>) {
        self.coords[l.index()] = uv;
    }

    /// Get the number of loops.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// UVs of a face's corners, in winding order.
    pub fn face_uvs(&self, mesh: &PolyMesh<I>, f: FaceId<I>) -> Vec<Point2<f64>> {
        mesh.face_loops(f).map(|l| self.get(l)).collect()
    }

    /// Get the raw coordinates slice.
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.coords
    }

    /// Compute the bounding box of the UV coordinates.
    ///
    /// Returns `None` if the layer is empty.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.coords.first()?;
        Some(self.coords.iter().fold((first, first), |(min, max), uv| {
            (
                Point2::new(min.x.min(uv.x), min.y.min(uv.y)),
                Point2::new(max.x.max(uv.x), max.y.max(uv.y)),
            )
        }))
    }
}
