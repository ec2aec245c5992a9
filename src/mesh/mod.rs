//! Host mesh data structures.
//!
//! The packer reads geometry from a [`PolyMesh`] and writes its result into a
//! [`LoopUvs`] layer.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//! - [`LoopId`] - Identifies a face corner
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use quilt::mesh::{build_from_quads, PolyMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3]];
//!
//! let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//! ```

mod builder;
mod index;
mod poly;
mod uv;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles};
pub use index::{FaceId, LoopId, MeshIndex, VertexId};
pub(crate) use poly::polygon_area;
pub use poly::{Face, PolyMesh};
pub use uv::LoopUvs;
