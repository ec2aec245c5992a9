//! Snapping leaf sizes to a power-of-two progression.
//!
//! Leaf widths and heights are replaced by the nearest entry of a halving
//! sequence that starts at the side length of the largest leaf. The smallest
//! entry becomes 1, the next 2, and so on, so all quantized sizes are powers
//! of two and cells of the same size compare equal exactly.

use log::debug;

use crate::mesh::MeshIndex;

use super::analyze::LeafShape;
use super::cell::{CellArena, CellId};

/// Upper bound on the number of progression steps; keeps every quantized
/// side at or below 2^23.
pub const MAX_STEPS: usize = 24;

/// Relative slack when comparing a halved step against the smallest leaf, so
/// identical leaves measured with rounding noise share one step.
const STEP_TOLERANCE: f64 = 1e-9;

/// A halving sequence of real lengths and its power-of-two integer codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    /// Real lengths, ascending. Entry `k` is encoded as `2^k`.
    steps: Vec<f64>,
}

impl Progression {
    /// Build the progression for leaves whose side lengths range from
    /// `min_len` to `max_len`.
    ///
    /// Halving stops before a step would drop below `min_len`, or once a
    /// quarter of the current step falls below `overall_side / margin_divisor`.
    pub fn new(max_len: f64, min_len: f64, overall_side: f64, margin_divisor: f64) -> Self {
        let threshold = overall_side / margin_divisor;
        let floor = min_len * (1.0 - STEP_TOLERANCE);

        let mut steps = vec![max_len];
        let mut current = max_len;
        while steps.len() < MAX_STEPS {
            let next = current * 0.5;
            if next < floor || current * 0.25 < threshold {
                break;
            }
            steps.push(next);
            current = next;
        }
        steps.reverse();

        Self { steps }
    }

    /// Build the progression for a set of leaf shapes.
    ///
    /// Returns `None` if there are no leaves.
    pub fn for_leaves<I: MeshIndex>(leaves: &[LeafShape<I>], margin_divisor: f64) -> Option<Self> {
        let first = leaves.first()?.area();
        let (min_area, max_area, total_area) = leaves.iter().fold(
            (first, first, 0.0),
            |(min, max, total), leaf| {
                let area = leaf.area();
                (min.min(area), max.max(area), total + area)
            },
        );
        Some(Self::new(
            max_area.sqrt(),
            min_area.sqrt(),
            total_area.sqrt(),
            margin_divisor,
        ))
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a progression has at least one step.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Real lengths, ascending.
    #[inline]
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    /// Real length of one quantized unit.
    #[inline]
    pub fn unit(&self) -> f64 {
        self.steps[0]
    }

    /// Quantize a length to the code of its nearest step. Ties go to the
    /// smaller step.
    pub fn quantize(&self, length: f64) -> u64 {
        let mut best = 0;
        for (k, &step) in self.steps.iter().enumerate().skip(1) {
            if (step - length).abs() < (self.steps[best] - length).abs() {
                best = k;
            }
        }
        1 << best
    }
}

/// Quantize leaf shapes into arena cells.
///
/// Returns the arena, the leaf ids in input order and the progression used.
/// Returns `None` if there are no leaves.
pub fn quantize<I: MeshIndex>(
    leaves: Vec<LeafShape<I>>,
    margin_divisor: f64,
) -> Option<(CellArena<I>, Vec<CellId>, Progression)> {
    let progression = Progression::for_leaves(&leaves, margin_divisor)?;

    let mut arena = CellArena::new();
    let ids = leaves
        .into_iter()
        .map(|leaf| {
            arena.push_leaf(
                progression.quantize(leaf.width),
                progression.quantize(leaf.height),
                leaf.payload,
            )
        })
        .collect();

    debug!(
        "quantized with {} steps, unit length {}",
        progression.len(),
        progression.unit()
    );

    Some((arena, ids, progression))
}
