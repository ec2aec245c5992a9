//! Configuration for lightmap packing.

use crate::error::{AtlasError, Result};

/// Options for [`pack_lightmap`](super::pack_lightmap).
#[derive(Debug, Clone)]
pub struct LightmapOptions {
    /// Divisor bounding how large a consolidated super-cell may grow relative
    /// to the side length of the whole atlas. Larger values keep super-cells
    /// smaller (more boxes reach the packer).
    pub consolidation_divisor: u32,

    /// Fraction of the canvas kept free around every box, in (0, 1).
    pub margin_fraction: f64,

    /// Faces with an area at or below this value are skipped.
    pub min_face_area: f64,

    /// Whether to walk placement subtrees in parallel (default: true).
    pub parallel: bool,
}

impl Default for LightmapOptions {
    fn default() -> Self {
        Self {
            consolidation_divisor: 8,
            margin_fraction: 0.002,
            min_face_area: 1e-12,
            parallel: true,
        }
    }
}

impl LightmapOptions {
    /// Set the consolidation divisor.
    pub fn with_consolidation_divisor(mut self, divisor: u32) -> Self {
        self.consolidation_divisor = divisor;
        self
    }

    /// Set the margin as a fraction of the canvas.
    pub fn with_margin_fraction(mut self, fraction: f64) -> Self {
        self.margin_fraction = fraction;
        self
    }

    /// Set the area below which faces count as degenerate.
    pub fn with_min_face_area(mut self, area: f64) -> Self {
        self.min_face_area = area;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// The margin expressed as a divisor of the canvas size.
    #[inline]
    pub fn margin_divisor(&self) -> f64 {
        1.0 / self.margin_fraction
    }

    /// Check that every option lies in its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.consolidation_divisor == 0 {
            return Err(AtlasError::invalid_param(
                "consolidation_divisor",
                self.consolidation_divisor,
                "must be at least 1",
            ));
        }
        if !(self.margin_fraction > 0.0 && self.margin_fraction < 1.0) {
            return Err(AtlasError::invalid_param(
                "margin_fraction",
                self.margin_fraction,
                "must lie in (0, 1)",
            ));
        }
        if !(self.min_face_area.is_finite() && self.min_face_area >= 0.0) {
            return Err(AtlasError::invalid_param(
                "min_face_area",
                self.min_face_area,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
