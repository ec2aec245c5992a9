//! Wide-or-square leaf orientation.

use crate::mesh::MeshIndex;

use super::cell::{CellArena, CellId};

/// Turn a leaf a quarter turn if it is taller than wide.
///
/// Returns whether the leaf was turned. A second call on the same leaf is a
/// no-op, since the leaf is then already wide-or-square.
pub fn normalize_leaf<I: MeshIndex>(arena: &mut CellArena<I>, id: CellId) -> bool {
    let cell = arena.get(id);
    debug_assert!(cell.payload().is_some(), "{:?} is not a leaf", id);
    if cell.height <= cell.width {
        return false;
    }
    arena.spin(id);
    true
}

/// Make every leaf wide-or-square. Returns the number of leaves turned.
pub fn normalize_orientation<I: MeshIndex>(arena: &mut CellArena<I>, leaves: &[CellId]) -> usize {
    leaves
        .iter()
        .filter(|&&id| normalize_leaf(arena, id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::cell::{Payload, TriangleCorners};
    use crate::mesh::FaceId;
    use nalgebra::Point3;

    fn quad(face: usize) -> Payload {
        Payload::Quad {
            face: FaceId::new(face),
            turns: 0,
        }
    }

    #[test]
    fn test_tall_leaf_turns() {
        let mut arena = CellArena::new();
        let tall = arena.push_leaf(2, 8, quad(0));
        let wide = arena.push_leaf(8, 2, quad(1));
        let square = arena.push_leaf(4, 4, quad(2));

        assert_eq!(normalize_orientation(&mut arena, &[tall, wide, square]), 1);

        let cell = arena.get(tall);
        assert_eq!((cell.width, cell.height), (8, 2));
        assert!(cell.rotated);
        assert!(!arena.get(wide).rotated);
        assert!(!arena.get(square).rotated);
    }

    #[test]
    fn test_idempotent() {
        let mut arena = CellArena::new();
        let id = arena.push_leaf(1, 2, quad(0));

        assert!(normalize_leaf(&mut arena, id));
        let once = (arena.get(id).width, arena.get(id).height, arena.get(id).rotated);
        assert!(!normalize_leaf(&mut arena, id));
        let twice = (arena.get(id).width, arena.get(id).height, arena.get(id).rotated);

        assert_eq!(once, twice);
        assert_eq!(arena.get(id).payload().unwrap().turns(), 1);
    }

    #[test]
    fn test_triangle_pair_flags_diagonal() {
        let tri = |face| {
            TriangleCorners::new(
                FaceId::new(face),
                [
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.0, 2.0, 0.0),
                ],
            )
        };
        let mut arena: CellArena = CellArena::new();
        let id = arena.push_leaf(
            1,
            2,
            Payload::TrianglePair {
                first: tri(0),
                second: tri(1),
                turns: 0,
            },
        );

        assert!(normalize_leaf(&mut arena, id));
        assert!(arena.get(id).payload().unwrap().tri_rotated());
    }
}
