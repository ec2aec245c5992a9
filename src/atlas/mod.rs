//! Lightmap atlas packing.
//!
//! [`pack_lightmap`] lays out the selected faces of a mesh in the unit square
//! so that every face owns a separate region of a lightmap texture. The run
//! goes through these stages:
//!
//! 1. [`analyze`](analyze::analyze): measure quads, pair similar triangles.
//! 2. [`quantize`](quantize::quantize): snap sizes to powers of two.
//! 3. [`normalize_orientation`](orient::normalize_orientation): make every
//!    leaf wide-or-square.
//! 4. [`consolidate`](consolidate::consolidate): merge equal cells into
//!    super-cells to shrink the packing problem.
//! 5. A [`Packer`] places the remaining boxes on a canvas.
//! 6. [`place_roots`](place::place_roots) and
//!    [`write_placements`](place::write_placements): walk the tree down to
//!    every leaf and write the UVs.
//!
//! # Example
//!
//! ```
//! use quilt::atlas::{pack_mesh_lightmap, LightmapOptions, ShelfPacker};
//! use quilt::mesh::{build_from_quads, LoopUvs, PolyMesh};
//! use nalgebra::Point3;
//!
//! // A 2x2 grid of unit quads
//! let mut vertices = Vec::new();
//! for y in 0..3 {
//!     for x in 0..3 {
//!         vertices.push(Point3::new(x as f64, y as f64, 0.0));
//!     }
//! }
//! let mut faces = Vec::new();
//! for y in 0..2 {
//!     for x in 0..2 {
//!         let v = y * 3 + x;
//!         faces.push([v, v + 1, v + 4, v + 3]);
//!     }
//! }
//! let mesh: PolyMesh = build_from_quads(&vertices, &faces).unwrap();
//! let mut uvs = LoopUvs::for_mesh(&mesh);
//!
//! let report = pack_mesh_lightmap(&mesh, &LightmapOptions::default(), &ShelfPacker, &mut uvs)
//!     .unwrap();
//! assert_eq!(report.leaf_count, 4);
//! assert_eq!(report.box_count, 1);
//! ```

pub mod analyze;
pub mod cell;
pub mod consolidate;
pub mod options;
pub mod orient;
pub mod packer;
pub mod place;
pub mod quantize;

use log::{debug, warn};

use crate::error::{AtlasError, Result};
use crate::mesh::{FaceId, LoopUvs, MeshIndex, PolyMesh};

pub use analyze::{SkipReason, SkippedFace, MIN_FACES};
pub use options::LightmapOptions;
pub use packer::{PackBox, Packer, PackingRequest, PackingResult, Placement, ShelfPacker};
pub use place::UvRect;

/// Summary of a packing run.
#[derive(Debug, Clone)]
pub struct AtlasReport<I: MeshIndex = u32> {
    /// Canvas width reported by the packer, in quantized units.
    pub canvas_width: f64,
    /// Canvas height reported by the packer, in quantized units.
    pub canvas_height: f64,
    /// Number of leaf cells (quads, triangle pairs and lone triangles).
    pub leaf_count: usize,
    /// Number of boxes handed to the packer.
    pub box_count: usize,
    /// Number of group cells built by consolidation.
    pub group_count: usize,
    /// Selected faces that were left out.
    pub skipped: Vec<SkippedFace<I>>,
}

/// Pack the given faces into a lightmap atlas and write their UVs.
///
/// `uvs` must have one entry per loop of `mesh`. Loops of faces that are not
/// selected (or are skipped) keep their previous value. Nothing is written
/// unless the run succeeds.
///
/// # Errors
///
/// - [`AtlasError::InvalidParameter`] for out-of-range options
/// - [`AtlasError::UvLayerMismatch`] if `uvs` does not fit the mesh
/// - [`AtlasError::InvalidFaceId`] or [`AtlasError::DuplicateFace`] for a bad
///   selection
/// - [`AtlasError::TooFewFaces`] if fewer than [`MIN_FACES`] usable faces
///   remain
/// - [`AtlasError::PackingFault`] if the packer result breaks the contract,
///   or any error the packer itself returns
pub fn pack_lightmap<I, P>(
    mesh: &PolyMesh<I>,
    faces: &[FaceId<I>],
    options: &LightmapOptions,
    packer: &P,
    uvs: &mut LoopUvs<I>,
) -> Result<AtlasReport<I>>
where
    I: MeshIndex,
    P: Packer + ?Sized,
{
    options.validate()?;
    if uvs.len() != mesh.num_loops() {
        return Err(AtlasError::UvLayerMismatch {
            expected: mesh.num_loops(),
            found: uvs.len(),
        });
    }

    let analysis = analyze::analyze(mesh, faces, options.min_face_area)?;
    let leaf_count = analysis.leaves.len();
    let skipped = analysis.skipped;

    let margin_divisor = options.margin_divisor();
    let (mut arena, leaves, _) =
        quantize::quantize(analysis.leaves, margin_divisor).ok_or(AtlasError::EmptyPacking)?;
    let turned = orient::normalize_orientation(&mut arena, &leaves);
    debug!("{} of {} leaves turned wide", turned, leaf_count);

    let consolidation =
        consolidate::consolidate(&mut arena, leaves, options.consolidation_divisor);
    let request = PackingRequest::from_cells(&arena, &consolidation.roots);
    if request.is_empty() {
        return Err(AtlasError::EmptyPacking);
    }

    debug!("packing {} boxes", request.len());
    let result = packer.pack(&request)?;
    let origins = result.validate(&request)?;
    debug!("canvas {} x {}", result.canvas_width, result.canvas_height);

    let canvas = place::Canvas::new(result.canvas_width, result.canvas_height, margin_divisor);
    let rects = place::place_roots(
        &arena,
        &consolidation.roots,
        &origins,
        &canvas,
        options.parallel,
    );
    place::write_placements(mesh, &arena, &rects, uvs);

    if !skipped.is_empty() {
        warn!(
            "{} selected faces were not packed: {}",
            skipped.len(),
            describe_skipped(&skipped)
        );
    }

    Ok(AtlasReport {
        canvas_width: result.canvas_width,
        canvas_height: result.canvas_height,
        leaf_count,
        box_count: request.len(),
        group_count: arena.len() - leaf_count,
        skipped,
    })
}

/// Pack every face of the mesh. See [`pack_lightmap`].
pub fn pack_mesh_lightmap<I, P>(
    mesh: &PolyMesh<I>,
    options: &LightmapOptions,
    packer: &P,
    uvs: &mut LoopUvs<I>,
) -> Result<AtlasReport<I>>
where
    I: MeshIndex,
    P: Packer + ?Sized,
{
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    pack_lightmap(mesh, &faces, options, packer, uvs)
}

fn describe_skipped<I: MeshIndex>(skipped: &[SkippedFace<I>]) -> String {
    let degenerate = skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::Degenerate { .. }))
        .count();
    format!(
        "{} degenerate, {} neither triangle nor quad",
        degenerate,
        skipped.len() - degenerate
    )
}
