//! Typed index newtypes.
//!
//! A compiler juggles several independent id spaces (AST node ids, frame
//! slots, file ids). Raw `usize` indices make it easy to hand the wrong id
//! to the wrong table; newtype indices turn that mistake into a type error
//! at no runtime cost.

/// Trait for types that can be used as indices
///
/// Implementations must ensure `from_usize(i).index() == i` for all valid
/// indices.
pub trait Idx: Copy + Eq + PartialEq {
    /// Convert from usize to index type
    ///
    /// # Panics
    ///
    /// May panic if `idx` exceeds the maximum value representable by `Self`.
    fn from_usize(idx: usize) -> Self;

    /// Convert index to usize for array indexing
    fn index(self) -> usize;
}

/// Define a u32-backed index type implementing [`Idx`]
///
/// # Examples
///
/// ```
/// use homc_util::{define_idx, Idx};
///
/// define_idx!(SlotId);
///
/// let slot = SlotId::from_usize(3);
/// assert_eq!(slot.index(), 3);
/// assert_eq!(slot, SlotId(3));
/// ```
#[macro_export]
macro_rules! define_idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize);
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_idx!(TestId);

    #[test]
    fn test_round_trip() {
        let id = TestId::from_usize(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, TestId(42));
    }

    #[test]
    fn test_distinct_values() {
        assert_ne!(TestId(1), TestId(2));
    }
}
