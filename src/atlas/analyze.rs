//! Face measurement and triangle pairing.
//!
//! Every selected face becomes part of exactly one leaf shape. Quads map to
//! one rectangle each, measured by averaging opposite edges so slightly
//! skewed quads still get a sensible size. Triangles are paired greedily by
//! the similarity of their sorted edge lengths; two paired triangles share one
//! rectangle split along its diagonal.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::error::{AtlasError, Result};
use crate::mesh::{polygon_area, FaceId, MeshIndex, PolyMesh};

use super::cell::{Payload, TriangleCorners};

/// Smallest number of faces an atlas is built for.
pub const MIN_FACES: usize = 4;

/// A leaf rectangle in world units, before quantization.
#[derive(Debug, Clone)]
pub struct LeafShape<I: MeshIndex = u32> {
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
    /// The faces behind it.
    pub payload: Payload<I>,
}

impl<I: MeshIndex> LeafShape<I> {
    /// Area in world units.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Why a selected face was left out of the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The face has (near) zero area.
    Degenerate {
        /// The measured area.
        area: f64,
    },
    /// The face is neither a triangle nor a quad.
    UnsupportedCorners {
        /// Number of corners.
        corners: usize,
    },
}

/// A selected face that was not packed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkippedFace<I: MeshIndex = u32> {
    /// The face.
    pub face: FaceId<I>,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Output of [`analyze`].
#[derive(Debug, Clone)]
pub struct Analysis<I: MeshIndex = u32> {
    /// One shape per quad and per triangle pair (or lone triangle).
    pub leaves: Vec<LeafShape<I>>,
    /// Faces that were selected but left out.
    pub skipped: Vec<SkippedFace<I>>,
}

/// Check that a face selection is usable: ids in range, no repeats, and at
/// least [`MIN_FACES`] faces.
pub fn validate_selection<I: MeshIndex>(mesh: &PolyMesh<I>, faces: &[FaceId<I>]) -> Result<()> {
    let mut seen = HashSet::with_capacity(faces.len());
    for &face in faces {
        if face.index() >= mesh.num_faces() {
            return Err(AtlasError::InvalidFaceId { face: face.index() });
        }
        if !seen.insert(face) {
            return Err(AtlasError::DuplicateFace { face: face.index() });
        }
    }
    if faces.len() < MIN_FACES {
        return Err(AtlasError::TooFewFaces {
            found: faces.len(),
            required: MIN_FACES,
        });
    }
    Ok(())
}

/// Measure the selected faces and build one leaf shape per quad and per
/// triangle pair.
///
/// Faces with an area at or below `min_face_area` and faces that are neither
/// triangles nor quads are reported in [`Analysis::skipped`].
///
/// # Errors
///
/// Returns an error if the selection is invalid (see [`validate_selection`])
/// or if fewer than [`MIN_FACES`] faces survive the filtering.
pub fn analyze<I: MeshIndex>(
    mesh: &PolyMesh<I>,
    faces: &[FaceId<I>],
    min_face_area: f64,
) -> Result<Analysis<I>> {
    validate_selection(mesh, faces)?;

    let mut leaves = Vec::new();
    let mut triangles = Vec::new();
    let mut skipped = Vec::new();

    for &face in faces {
        let corners = mesh.face_positions(face);
        if corners.len() != 3 && corners.len() != 4 {
            skipped.push(SkippedFace {
                face,
                reason: SkipReason::UnsupportedCorners {
                    corners: corners.len(),
                },
            });
            continue;
        }

        let area = polygon_area(&corners);
        // Written so that NaN areas are skipped too.
        if !(area > min_face_area) {
            skipped.push(SkippedFace {
                face,
                reason: SkipReason::Degenerate { area },
            });
            continue;
        }

        if let [p0, p1, p2, p3] = corners[..] {
            leaves.push(LeafShape {
                width: 0.5 * ((p1 - p0).norm() + (p3 - p2).norm()),
                height: 0.5 * ((p2 - p1).norm() + (p0 - p3).norm()),
                payload: Payload::Quad { face, turns: 0 },
            });
        } else if let [p0, p1, p2] = corners[..] {
            triangles.push(TriangleCorners::new(face, [p0, p1, p2]));
        }
    }

    let eligible = faces.len() - skipped.len();
    if eligible < MIN_FACES {
        return Err(AtlasError::TooFewFaces {
            found: eligible,
            required: MIN_FACES,
        });
    }

    let quads = leaves.len();
    let pairs = pair_triangles(triangles);
    leaves.extend(pairs.into_iter().map(|(first, second)| triangle_shape(first, second)));

    debug!(
        "analyzed {} faces: {} quad leaves, {} triangle leaves, {} skipped",
        faces.len(),
        quads,
        leaves.len() - quads,
        skipped.len()
    );

    Ok(Analysis { leaves, skipped })
}

/// Greedily pair triangles by edge-length similarity.
///
/// The first remaining triangle is taken and matched with the remaining
/// triangle whose sorted edge lengths differ least (earliest wins ties). The
/// result only depends on the input order.
pub fn pair_triangles<I: MeshIndex>(
    triangles: Vec<TriangleCorners<I>>,
) -> Vec<(TriangleCorners<I>, Option<TriangleCorners<I>>)> {
    let mut pool: VecDeque<_> = triangles.into();
    let mut pairs = Vec::with_capacity(pool.len().div_ceil(2));

    while let Some(tri) = pool.pop_front() {
        let mut best: Option<(usize, f64)> = None;
        for (i, other) in pool.iter().enumerate() {
            let distance = tri.distance(other);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        let partner = best.and_then(|(i, _)| pool.remove(i));
        pairs.push((tri, partner));
    }

    pairs
}

/// Rectangle for one or two triangles: each triangle contributes half its
/// middle edge to the width; the height is the mean shortest edge.
fn triangle_shape<I: MeshIndex>(
    first: TriangleCorners<I>,
    second: Option<TriangleCorners<I>>,
) -> LeafShape<I> {
    match second {
        Some(second) => LeafShape {
            width: 0.5 * (first.middle() + second.middle()),
            height: 0.5 * (first.shortest() + second.shortest()),
            payload: Payload::TrianglePair {
                first,
                second,
                turns: 0,
            },
        },
        None => LeafShape {
            width: 0.5 * first.middle(),
            height: first.shortest(),
            payload: Payload::LoneTriangle {
                triangle: first,
                turns: 0,
            },
        },
    }
}
