//! Matrix extents, either runtime values or compile-time constants.
//!
//! Kernel bodies are generic over [`Extents`]; with [`ConstExtents`] every
//! loop bound and offset multiplier is a constant the optimiser can fold.

use crate::error::{Error, Result};

/// `dim` and package width `V` of a kernel instantiation.
pub trait Extents: Copy + Send + Sync {
    fn dim(&self) -> usize;
    fn vec_len(&self) -> usize;
}

/// Both extents known only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeExtents {
    pub dim: usize,
    pub vec_len: usize,
}

impl Extents for RuntimeExtents {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.dim
    }

    #[inline(always)]
    fn vec_len(&self) -> usize {
        self.vec_len
    }
}

/// Runtime `dim`, constant package width.
///
/// Explicit lane vectors need `V` as a type parameter even when the matrix
/// dimension stays a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneExtents<const V: usize> {
    pub dim: usize,
}

impl<const V: usize> Extents for LaneExtents<V> {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.dim
    }

    #[inline(always)]
    fn vec_len(&self) -> usize {
        V
    }
}

/// Both extents fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstExtents<const DIM: usize, const VEC: usize>;

impl<const DIM: usize, const VEC: usize> Extents for ConstExtents<DIM, VEC> {
    #[inline(always)]
    fn dim(&self) -> usize {
        DIM
    }

    #[inline(always)]
    fn vec_len(&self) -> usize {
        VEC
    }
}

/// Code run once the extents are resolved to a concrete type.
///
/// `V` always equals `extents.vec_len()`.
pub(crate) trait ExtentsVisitor {
    type Output;

    fn visit<E: Extents, const V: usize>(self, extents: E) -> Self::Output;
}

/// Package widths with a compiled instantiation.
pub const SUPPORTED_VEC_LENS: [usize; 5] = [1, 2, 4, 8, 16];

/// Largest `dim` with a compiled constant-extent instantiation.
pub const MAX_CONST_DIM: usize = 8;

macro_rules! visit_lanes {
    ($visitor:expr, $vec_len:expr, |$v:ident| $make:expr) => {
        match $vec_len {
            1 => Some({ const $v: usize = 1; $visitor.visit::<_, 1>($make) }),
            2 => Some({ const $v: usize = 2; $visitor.visit::<_, 2>($make) }),
            4 => Some({ const $v: usize = 4; $visitor.visit::<_, 4>($make) }),
            8 => Some({ const $v: usize = 8; $visitor.visit::<_, 8>($make) }),
            16 => Some({ const $v: usize = 16; $visitor.visit::<_, 16>($make) }),
            _ => None,
        }
    };
}

macro_rules! visit_const {
    ($visitor:expr, $dim:expr, $vec_len:expr, [$($d:literal),*]) => {
        match $dim {
            $( $d => visit_lanes!($visitor, $vec_len, |V| ConstExtents::<$d, V>), )*
            _ => None,
        }
    };
}

/// Run `visitor` with a runtime `dim` and a constant package width.
pub(crate) fn with_lane_extents<X: ExtentsVisitor>(
    dim: usize,
    vec_len: usize,
    visitor: X,
) -> Result<X::Output> {
    visit_lanes!(visitor, vec_len, |V| LaneExtents::<V> { dim })
        .ok_or(Error::UnsupportedExtents { dim, vec_len })
}

/// Run `visitor` with both extents as compile-time constants.
pub(crate) fn with_const_extents<X: ExtentsVisitor>(
    dim: usize,
    vec_len: usize,
    visitor: X,
) -> Result<X::Output> {
    visit_const!(visitor, dim, vec_len, [1, 2, 3, 4, 5, 6, 7, 8])
        .ok_or(Error::UnsupportedExtents { dim, vec_len })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl ExtentsVisitor for Probe {
        type Output = (usize, usize, usize);

        fn visit<E: Extents, const V: usize>(self, extents: E) -> Self::Output {
            (extents.dim(), extents.vec_len(), V)
        }
    }

    #[test]
    fn test_const_dispatch_resolves_extents() {
        for dim in 1..=MAX_CONST_DIM {
            for vec_len in SUPPORTED_VEC_LENS {
                let got = with_const_extents(dim, vec_len, Probe).unwrap();
                assert_eq!(got, (dim, vec_len, vec_len));
            }
        }
    }

    #[test]
    fn test_const_dispatch_rejects_unknown_extents() {
        assert!(matches!(
            with_const_extents(9, 4, Probe),
            Err(Error::UnsupportedExtents { dim: 9, vec_len: 4 })
        ));
        assert!(matches!(
            with_const_extents(2, 3, Probe),
            Err(Error::UnsupportedExtents { dim: 2, vec_len: 3 })
        ));
    }

    #[test]
    fn test_lane_dispatch_keeps_runtime_dim() {
        assert_eq!(with_lane_extents(13, 8, Probe).unwrap(), (13, 8, 8));
        assert!(with_lane_extents(13, 6, Probe).is_err());
    }
}
