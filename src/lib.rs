//! # Quilt
//!
//! Lightmap UV atlas packing for quad and triangle meshes.
//!
//! Quilt gives every selected face of a mesh its own non-overlapping region
//! of the unit square, so lighting can be baked into one texture without two
//! faces sharing texels.
//!
//! ## Features
//!
//! - **Quads and triangles**: quads map to one rectangle each, similar
//!   triangles are paired into one rectangle split along its diagonal
//! - **Power-of-two sizes**: face sizes snap to a halving progression so equal
//!   faces pack as equal boxes
//! - **Consolidation**: equal boxes merge into super-boxes before packing,
//!   which keeps large, regular meshes cheap to pack
//! - **Pluggable packer**: any 2D bin-packing solver fits behind the
//!   [`Packer`](atlas::Packer) trait; [`ShelfPacker`](atlas::ShelfPacker) is
//!   built in
//! - **Flexible indexing**: 16-bit, 32-bit and 64-bit mesh indices
//!
//! ## Quick Start
//!
//! ```
//! use quilt::prelude::*;
//! use nalgebra::Point3;
//!
//! // Four unit quads side by side
//! let vertices: Vec<Point3<f64>> = (0..10)
//!     .map(|i| Point3::new((i / 2) as f64, (i % 2) as f64, 0.0))
//!     .collect();
//! let faces: Vec<[usize; 4]> = (0..4)
//!     .map(|i| [2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1])
//!     .collect();
//! let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! let mut uvs = LoopUvs::for_mesh(&mesh);
//! let report = pack_mesh_lightmap(&mesh, &LightmapOptions::default(), &ShelfPacker, &mut uvs)
//!     .unwrap();
//!
//! assert_eq!(report.leaf_count, 4);
//! let (min, max) = uvs.bounding_box().unwrap();
//! assert!(min.x >= 0.0 && min.y >= 0.0 && max.x <= 1.0 && max.y <= 1.0);
//! ```
//!
//! ## Custom Packers
//!
//! A closure taking a [`PackingRequest`](atlas::PackingRequest) works as a
//! packer. The engine checks its answer before touching any UVs:
//!
//! ```
//! use quilt::prelude::*;
//! use quilt::atlas::{PackingRequest, PackingResult, Placement};
//! # use nalgebra::Point3;
//! # let vertices: Vec<Point3<f64>> = (0..10)
//! #     .map(|i| Point3::new((i / 2) as f64, (i % 2) as f64, 0.0))
//! #     .collect();
//! # let faces: Vec<[usize; 4]> = (0..4)
//! #     .map(|i| [2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1])
//! #     .collect();
//! # let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! // Lay every box out in a single row
//! let row = |request: &PackingRequest| -> Result<PackingResult> {
//!     let mut x = 0;
//!     let mut placements = Vec::new();
//!     for b in &request.boxes {
//!         placements.push(Placement { id: b.id, x: x as f64, y: 0.0 });
//!         x += b.width;
//!     }
//!     let height = request.boxes.iter().map(|b| b.height).max().unwrap_or(1);
//!     Ok(PackingResult {
//!         canvas_width: x as f64,
//!         canvas_height: height as f64,
//!         placements,
//!     })
//! };
//!
//! let mut uvs = LoopUvs::for_mesh(&mesh);
//! pack_mesh_lightmap(&mesh, &LightmapOptions::default(), &row, &mut uvs).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atlas;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use quilt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::atlas::{
        pack_lightmap, pack_mesh_lightmap, AtlasReport, LightmapOptions, Packer, ShelfPacker,
        SkipReason, SkippedFace,
    };
    pub use crate::error::{AtlasError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, FaceId, LoopId, LoopUvs,
        MeshIndex, PolyMesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    /// A closed box of six quads, one per side, with side lengths 4, 2 and 1.
    fn slab() -> PolyMesh<u16> {
        let (x, y, z) = (4.0, 2.0, 1.0);
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(x, 0.0, 0.0),
            Point3::new(x, y, 0.0),
            Point3::new(0.0, y, 0.0),
            Point3::new(0.0, 0.0, z),
            Point3::new(x, 0.0, z),
            Point3::new(x, y, z),
            Point3::new(0.0, y, z),
        ];
        let faces = [
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [2, 3, 7, 6], // back
            [1, 2, 6, 5], // right
            [3, 0, 4, 7], // left
        ];
        build_from_quads(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_slab() {
        let mesh = slab();
        let mut uvs = LoopUvs::for_mesh(&mesh);
        let report =
            pack_mesh_lightmap(&mesh, &LightmapOptions::default(), &ShelfPacker, &mut uvs)
                .unwrap();

        assert_eq!(report.leaf_count, 6);
        assert!(report.skipped.is_empty());

        // Every face gets a rectangle of its own inside the unit square
        let rects: Vec<(f64, f64, f64, f64)> = mesh
            .face_ids()
            .map(|f| {
                let face_uvs = uvs.face_uvs(&mesh, f);
                let xs = face_uvs.iter().map(|uv| uv.x);
                let ys = face_uvs.iter().map(|uv| uv.y);
                (
                    xs.clone().fold(f64::INFINITY, f64::min),
                    ys.clone().fold(f64::INFINITY, f64::min),
                    xs.fold(f64::NEG_INFINITY, f64::max),
                    ys.fold(f64::NEG_INFINITY, f64::max),
                )
            })
            .collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.0 >= 0.0 && a.1 >= 0.0 && a.2 <= 1.0 && a.3 <= 1.0);
            assert!(a.2 > a.0 && a.3 > a.1, "face {} has an empty rectangle", i);
            for b in &rects[i + 1..] {
                let disjoint = a.2 <= b.0 || b.2 <= a.0 || a.3 <= b.1 || b.3 <= a.1;
                assert!(disjoint);
            }
        }

        // Each face keeps its corners in winding order on the rectangle
        for f in mesh.face_ids() {
            let face_uvs = uvs.face_uvs(&mesh, f);
            for k in 0..4 {
                let a = face_uvs[k];
                let b = face_uvs[(k + 1) % 4];
                let axis_aligned = (a.x - b.x).abs() < 1e-12 || (a.y - b.y).abs() < 1e-12;
                assert!(axis_aligned, "edge {} of {:?} is diagonal", k, f);
            }
        }
    }

    #[test]
    fn test_selection_subset() {
        let mesh = slab();
        let mut uvs = LoopUvs::for_mesh(&mesh);
        let faces: Vec<FaceId<u16>> = (0..4).map(FaceId::new).collect();
        let report = pack_lightmap(
            &mesh,
            &faces,
            &LightmapOptions::default().sequential(),
            &ShelfPacker,
            &mut uvs,
        )
        .unwrap();

        assert_eq!(report.leaf_count, 4);
        // Unselected faces are left alone
        for f in [FaceId::new(4), FaceId::new(5)] {
            assert!(uvs.face_uvs(&mesh, f).iter().all(|uv| uv.x == 0.0 && uv.y == 0.0));
        }
    }
}
