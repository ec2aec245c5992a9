//! Error types for quilt.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`AtlasError`].
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Errors that can occur while building meshes or packing a lightmap atlas.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face uses the same vertex more than once.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A face has fewer than three corners.
    #[error("face {face} has {corners} corners, at least 3 are required")]
    TooFewCorners {
        /// The face index.
        face: usize,
        /// Number of corners the face was given.
        corners: usize,
    },

    /// Not enough faces were selected (or survived analysis) to build an atlas.
    #[error("{found} eligible faces selected, at least {required} are required")]
    TooFewFaces {
        /// Number of eligible faces.
        found: usize,
        /// Minimum number of faces.
        required: usize,
    },

    /// A selected face id does not exist in the mesh.
    #[error("face {face} does not exist in the mesh")]
    InvalidFaceId {
        /// The offending face index.
        face: usize,
    },

    /// A face was selected more than once.
    #[error("face {face} is selected more than once")]
    DuplicateFace {
        /// The duplicated face index.
        face: usize,
    },

    /// The UV layer does not have one entry per mesh loop.
    #[error("UV layer has {found} entries, mesh has {expected} loops")]
    UvLayerMismatch {
        /// Number of loops in the mesh.
        expected: usize,
        /// Number of entries in the UV layer.
        found: usize,
    },

    /// There was nothing to hand to the packer.
    #[error("packing request contains no boxes")]
    EmptyPacking,

    /// The packer returned an unusable layout.
    #[error("packer fault: {0}")]
    PackingFault(#[from] PackingFault),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl AtlasError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        AtlasError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Ways a packer result can break the packing contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackingFault {
    /// The canvas is empty, negative or not finite.
    #[error("invalid canvas size {width} x {height}")]
    InvalidCanvas {
        /// Reported canvas width.
        width: f64,
        /// Reported canvas height.
        height: f64,
    },

    /// A placement refers to a box that was never requested.
    #[error("placement for unknown box {id}")]
    UnknownId {
        /// The unknown id.
        id: usize,
    },

    /// A box was placed twice.
    #[error("box {id} placed more than once")]
    DuplicatePlacement {
        /// The duplicated id.
        id: usize,
    },

    /// A box received no placement.
    #[error("box {id} was not placed")]
    MissingPlacement {
        /// The missing id.
        id: usize,
    },

    /// A box does not lie inside the canvas.
    #[error("box {id} at ({x}, {y}) with size {width} x {height} exceeds the canvas")]
    OutOfBounds {
        /// The box id.
        id: usize,
        /// Placement x.
        x: f64,
        /// Placement y.
        y: f64,
        /// Box width.
        width: u64,
        /// Box height.
        height: u64,
    },
}
