//! Mesh construction utilities.
//!
//! This module builds [`PolyMesh`] values from face-vertex lists as commonly
//! found in mesh file formats and host applications.

use nalgebra::Point3;

use super::index::{LoopId, MeshIndex, VertexId};
use super::poly::{Face, PolyMesh};
use crate::error::{AtlasError, Result};

/// Build a polygon mesh from vertices and faces of any corner count.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of faces, each as a list of vertex indices in winding order
///
/// # Returns
/// A polygon mesh, or an error if the input is invalid.
///
/// # Example
/// ```
/// use quilt::mesh::{build_from_polygons, PolyMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: PolyMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_loops(), 4);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<PolyMesh<I>> {
    if faces.is_empty() {
        return Err(AtlasError::EmptyMesh);
    }

    let mut loops = Vec::with_capacity(faces.iter().map(|f| f.as_ref().len()).sum());
    let mut out_faces = Vec::with_capacity(faces.len());

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(AtlasError::TooFewCorners {
                face: fi,
                corners: face.len(),
            });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(AtlasError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..k].contains(&vi) {
                return Err(AtlasError::DegenerateFace { face: fi });
            }
        }

        out_faces.push(Face {
            first_loop: LoopId::new(loops.len()),
            corners: face.len(),
        });
        loops.extend(face.iter().map(|&vi| VertexId::new(vi)));
    }

    Ok(PolyMesh {
        positions: vertices.to_vec(),
        loops,
        faces: out_faces,
    })
}

/// Build a polygon mesh from vertices and triangle faces.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<PolyMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a polygon mesh from vertices and quad faces.
///
/// Each quad is `[v0, v1, v2, v3]`; edges `v0-v1`/`v2-v3` and `v1-v2`/`v3-v0`
/// are treated as opposite pairs by the packer.
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<PolyMesh<I>> {
    build_from_polygons(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceId;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_build_from_quads() {
        let mesh: PolyMesh<u32> = build_from_quads(&unit_square(), &[[0, 1, 2, 3]]).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.face_corners(FaceId::new(0)), 4);
    }

    #[test]
    fn test_build_from_triangles() {
        let faces = [[0, 1, 2], [0, 2, 3]];
        let mesh: PolyMesh<u16> = build_from_triangles(&unit_square(), &faces).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_loops(), 6);
        let second: Vec<usize> = mesh
            .face_vertices(FaceId::new(1))
            .map(|v| v.index())
            .collect();
        assert_eq!(second, vec![0, 2, 3]);
    }

    #[test]
    fn test_empty_mesh() {
        let faces: Vec<[usize; 3]> = Vec::new();
        let result: Result<PolyMesh<u32>> = build_from_triangles(&unit_square(), &faces);
        assert!(matches!(result, Err(AtlasError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let result: Result<PolyMesh<u32>> = build_from_triangles(&unit_square(), &[[0, 1, 9]]);
        assert!(matches!(
            result,
            Err(AtlasError::InvalidVertexIndex { face: 0, vertex: 9 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let result: Result<PolyMesh<u32>> = build_from_quads(&unit_square(), &[[0, 1, 2, 0]]);
        assert!(matches!(result, Err(AtlasError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_too_few_corners() {
        let faces = vec![vec![0, 1, 2], vec![2, 3]];
        let result: Result<PolyMesh<u32>> = build_from_polygons(&unit_square(), &faces);
        assert!(matches!(
            result,
            Err(AtlasError::TooFewCorners { face: 1, corners: 2 })
        ));
    }
}
