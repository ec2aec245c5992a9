//! Index types for mesh elements.
//!
//! Vertices, faces and loops (face corners) are addressed through type-safe
//! wrappers so that a face index can never be used to look up a vertex. The
//! wrappers are generic over the underlying integer: `u16` for small meshes,
//! `u32` (the default) for typical ones and `u64` for very large ones.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can back a mesh index.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The largest usable index value.
    const MAX: Self;

    /// Sentinel value for a missing index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= Self::MAX as u128,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe loop index. A loop is one corner of one face; per-corner data
/// such as UVs is stored per loop.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct LoopId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the index as usize.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(FaceId, "F");
impl_index_type!(LoopId, "L");
