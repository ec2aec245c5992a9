//! The boundary to the 2D bin-packing solver.
//!
//! The engine hands a [`PackingRequest`] (one box per root cell) to a
//! [`Packer`] and gets back the canvas size and one origin per box. Any solver
//! can be plugged in by implementing [`Packer`], or by passing a closure.
//! [`ShelfPacker`] is a simple built-in solver.
//!
//! The engine trusts the packer not to overlap boxes, but checks that every
//! box was placed exactly once and lies inside the canvas before it writes any
//! UVs.

use std::collections::HashMap;

use crate::error::{AtlasError, PackingFault, Result};
use crate::mesh::MeshIndex;

use super::cell::{CellArena, CellId};

/// A box to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackBox {
    /// Identifier; the index of the root cell.
    pub id: usize,
    /// Width in quantized units.
    pub width: u64,
    /// Height in quantized units.
    pub height: u64,
}

/// The boxes handed to a packer.
#[derive(Debug, Clone, Default)]
pub struct PackingRequest {
    /// Boxes in root order.
    pub boxes: Vec<PackBox>,
}

impl PackingRequest {
    /// One box per root cell; box `i` stands for `roots[i]`.
    pub fn from_cells<I: MeshIndex>(arena: &CellArena<I>, roots: &[CellId]) -> Self {
        let boxes = roots
            .iter()
            .enumerate()
            .map(|(id, &cell)| {
                let cell = arena.get(cell);
                PackBox {
                    id,
                    width: cell.width,
                    height: cell.height,
                }
            })
            .collect();
        Self { boxes }
    }

    /// Number of boxes.
    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Check if there are no boxes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Total area of all boxes.
    pub fn total_area(&self) -> u64 {
        self.boxes.iter().map(|b| b.width * b.height).sum()
    }
}

/// Lower-left origin of one placed box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Box identifier.
    pub id: usize,
    /// Origin x, in quantized units.
    pub x: f64,
    /// Origin y, in quantized units.
    pub y: f64,
}

/// What a packer returns.
#[derive(Debug, Clone)]
pub struct PackingResult {
    /// Canvas width, in quantized units.
    pub canvas_width: f64,
    /// Canvas height, in quantized units.
    pub canvas_height: f64,
    /// One placement per requested box, in any order.
    pub placements: Vec<Placement>,
}

impl PackingResult {
    /// Check this result against the request it answers.
    ///
    /// Returns the origins in request order.
    pub fn validate(
        &self,
        request: &PackingRequest,
    ) -> std::result::Result<Vec<(f64, f64)>, PackingFault> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PackingFault::InvalidCanvas { width, height });
        }
        // Tolerate rounding in solvers that work in floating point.
        let slack_x = width * 1e-9;
        let slack_y = height * 1e-9;

        let slots: HashMap<usize, usize> = request
            .boxes
            .iter()
            .enumerate()
            .map(|(slot, b)| (b.id, slot))
            .collect();
        let mut origins: Vec<Option<(f64, f64)>> = vec![None; request.len()];

        for placement in &self.placements {
            let id = placement.id;
            let slot = *slots.get(&id).ok_or(PackingFault::UnknownId { id })?;
            if origins[slot].is_some() {
                return Err(PackingFault::DuplicatePlacement { id });
            }

            let pack_box = request.boxes[slot];
            let (x, y) = (placement.x, placement.y);
            let inside = x.is_finite()
                && y.is_finite()
                && x >= -slack_x
                && y >= -slack_y
                && x + pack_box.width as f64 <= width + slack_x
                && y + pack_box.height as f64 <= height + slack_y;
            if !inside {
                return Err(PackingFault::OutOfBounds {
                    id,
                    x,
                    y,
                    width: pack_box.width,
                    height: pack_box.height,
                });
            }
            origins[slot] = Some((x, y));
        }

        request
            .boxes
            .iter()
            .zip(origins)
            .map(|(b, origin)| origin.ok_or(PackingFault::MissingPlacement { id: b.id }))
            .collect()
    }
}

/// A 2D bin-packing solver.
pub trait Packer {
    /// Place every box of `request` on a canvas without overlaps.
    fn pack(&self, request: &PackingRequest) -> Result<PackingResult>;
}

impl<F> Packer for F
where
    F: Fn(&PackingRequest) -> Result<PackingResult>,
{
    fn pack(&self, request: &PackingRequest) -> Result<PackingResult> {
        self(request)
    }
}

/// Row-by-row packer.
///
/// Boxes are sorted by height and laid out left to right in shelves as wide
/// as the square root of the total area (or the widest box). Fast and simple;
/// plug in a stronger solver through [`Packer`] for tighter atlases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl Packer for ShelfPacker {
    fn pack(&self, request: &PackingRequest) -> Result<PackingResult> {
        if request.is_empty() {
            return Err(AtlasError::EmptyPacking);
        }

        let widest = request.boxes.iter().map(|b| b.width).max().unwrap_or(0);
        let side = (request.total_area() as f64).sqrt().ceil() as u64;
        let shelf_width = widest.max(side);

        let mut order: Vec<&PackBox> = request.boxes.iter().collect();
        order.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then(b.width.cmp(&a.width))
                .then(a.id.cmp(&b.id))
        });

        let mut placements = Vec::with_capacity(order.len());
        let (mut cursor_x, mut cursor_y, mut row_height) = (0u64, 0u64, 0u64);
        let mut used_width = 0u64;

        for pack_box in order {
            if cursor_x + pack_box.width > shelf_width {
                cursor_x = 0;
                cursor_y += row_height;
                row_height = 0;
            }
            placements.push(Placement {
                id: pack_box.id,
                x: cursor_x as f64,
                y: cursor_y as f64,
            });
            cursor_x += pack_box.width;
            used_width = used_width.max(cursor_x);
            row_height = row_height.max(pack_box.height);
        }

        Ok(PackingResult {
            canvas_width: used_width as f64,
            canvas_height: (cursor_y + row_height) as f64,
            placements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sizes: &[(u64, u64)]) -> PackingRequest {
        PackingRequest {
            boxes: sizes
                .iter()
                .enumerate()
                .map(|(id, &(width, height))| PackBox { id, width, height })
                .collect(),
        }
    }

    fn overlaps(a: (f64, f64, u64, u64), b: (f64, f64, u64, u64)) -> bool {
        a.0 < b.0 + b.2 as f64
            && b.0 < a.0 + a.2 as f64
            && a.1 < b.1 + b.3 as f64
            && b.1 < a.1 + a.3 as f64
    }

    #[test]
    fn test_shelf_packer_no_overlap() {
        let sizes = [(4, 4), (2, 1), (8, 2), (1, 1), (2, 2), (1, 4), (3, 3), (8, 8)];
        let req = request(&sizes);
        let result = ShelfPacker.pack(&req).unwrap();
        let origins = result.validate(&req).unwrap();

        let rects: Vec<_> = origins
            .iter()
            .zip(&sizes)
            .map(|(&(x, y), &(w, h))| (x, y, w, h))
            .collect();
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                assert!(!overlaps(rects[i], rects[j]), "{} overlaps {}", i, j);
            }
        }
        assert!(result.canvas_width * result.canvas_height >= req.total_area() as f64);
    }

    #[test]
    fn test_shelf_packer_rejects_empty() {
        let result = ShelfPacker.pack(&PackingRequest::default());
        assert!(matches!(result, Err(AtlasError::EmptyPacking)));
    }

    #[test]
    fn test_validate_faults() {
        let req = request(&[(2, 2), (1, 1)]);
        let result = |placements: Vec<Placement>| PackingResult {
            canvas_width: 3.0,
            canvas_height: 2.0,
            placements,
        };
        let at = |id, x, y| Placement { id, x, y };

        let ok = result(vec![at(1, 2.0, 0.0), at(0, 0.0, 0.0)]);
        assert_eq!(ok.validate(&req).unwrap(), vec![(0.0, 0.0), (2.0, 0.0)]);

        let missing = result(vec![at(0, 0.0, 0.0)]);
        assert_eq!(
            missing.validate(&req),
            Err(PackingFault::MissingPlacement { id: 1 })
        );

        let unknown = result(vec![at(0, 0.0, 0.0), at(7, 2.0, 0.0)]);
        assert_eq!(unknown.validate(&req), Err(PackingFault::UnknownId { id: 7 }));

        let twice = result(vec![at(0, 0.0, 0.0), at(0, 0.0, 0.0)]);
        assert_eq!(
            twice.validate(&req),
            Err(PackingFault::DuplicatePlacement { id: 0 })
        );

        let outside = result(vec![at(0, 0.0, 0.0), at(1, 2.5, 0.0)]);
        assert!(matches!(
            outside.validate(&req),
            Err(PackingFault::OutOfBounds { id: 1, .. })
        ));

        let mut empty_canvas = result(vec![at(0, 0.0, 0.0), at(1, 2.0, 0.0)]);
        empty_canvas.canvas_height = 0.0;
        assert!(matches!(
            empty_canvas.validate(&req),
            Err(PackingFault::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_closure_packer() {
        let packer = |req: &PackingRequest| -> Result<PackingResult> {
            Ok(PackingResult {
                canvas_width: req.total_area() as f64,
                canvas_height: 1.0,
                placements: Vec::new(),
            })
        };
        let result = packer.pack(&request(&[(1, 1), (1, 1)])).unwrap();
        assert!((result.canvas_width - 2.0).abs() < 1e-10);
    }
}
