//! Owned batch of density matrices.

use super::layout::BatchLayout;
use super::scalar::{Complex, Real};
use crate::error::{Error, Result};

/// `num` independent `dim × dim` complex matrices in one contiguous buffer.
///
/// The layout is a property of the whole batch; converting between layouts
/// goes through [`crate::transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaBatch {
    data: Vec<Real>,
    dim: usize,
    num: usize,
    layout: BatchLayout,
}

impl SigmaBatch {
    /// Allocate a zeroed batch in AoS layout.
    pub fn zeros(dim: usize, num: usize) -> Self {
        Self {
            data: vec![0.0; 2 * dim * dim * num],
            dim,
            num,
            layout: BatchLayout::Aos,
        }
    }

    /// Build an AoS batch from complex entries (matrix-major, row-major).
    pub fn from_complex(entries: &[Complex], dim: usize, num: usize) -> Result<Self> {
        if entries.len() != dim * dim * num {
            return Err(Error::Shape(format!(
                "expected {} complex entries for {} matrices of {}x{}, got {}",
                dim * dim * num,
                num,
                dim,
                dim,
                entries.len()
            )));
        }
        let data = entries.iter().flat_map(|c| [c.re, c.im]).collect();
        Ok(Self {
            data,
            dim,
            num,
            layout: BatchLayout::Aos,
        })
    }

    /// Wrap raw storage that is already in `layout`.
    pub fn from_raw(data: Vec<Real>, dim: usize, num: usize, layout: BatchLayout) -> Result<Self> {
        if data.len() != 2 * dim * dim * num {
            return Err(Error::Shape(format!(
                "expected {} reals, got {}",
                2 * dim * dim * num,
                data.len()
            )));
        }
        if let BatchLayout::Aosoa { vec_len } = layout {
            check_packaging(num, vec_len)?;
        }
        Ok(Self {
            data,
            dim,
            num,
            layout,
        })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of matrices.
    #[inline]
    pub fn num(&self) -> usize {
        self.num
    }

    /// Current layout.
    #[inline]
    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    /// Number of reals in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the batch holds no matrices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw storage.
    #[inline]
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Mutable raw storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }

    /// Entry `(i, j)` of matrix `p`, regardless of layout.
    pub fn get(&self, p: usize, i: usize, j: usize) -> Complex {
        let re = self.data[self.layout.real(self.dim, p, i, j)];
        let im = self.data[self.layout.imag(self.dim, p, i, j)];
        Complex::new(re, im)
    }

    /// Overwrite entry `(i, j)` of matrix `p`.
    pub fn set(&mut self, p: usize, i: usize, j: usize, value: Complex) {
        let re = self.layout.real(self.dim, p, i, j);
        let im = self.layout.imag(self.dim, p, i, j);
        self.data[re] = value.re;
        self.data[im] = value.im;
    }

    /// Copy every entry out as complex numbers in canonical (AoS) order.
    pub fn to_complex_aos(&self) -> Vec<Complex> {
        let mut out = Vec::with_capacity(self.dim * self.dim * self.num);
        for p in 0..self.num {
            for i in 0..self.dim {
                for j in 0..self.dim {
                    out.push(self.get(p, i, j));
                }
            }
        }
        out
    }

    /// Set every entry to zero, keeping the layout.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Copy values and layout from `other`, reusing this allocation.
    pub fn copy_from(&mut self, other: &SigmaBatch) -> Result<()> {
        self.check_same_extents(other)?;
        self.data.copy_from_slice(&other.data);
        self.layout = other.layout;
        Ok(())
    }

    /// Error unless `other` has the same `dim` and `num`.
    pub fn check_same_extents(&self, other: &SigmaBatch) -> Result<()> {
        if self.dim != other.dim || self.num != other.num {
            return Err(Error::Shape(format!(
                "batch extents differ: ({}, {}) vs ({}, {})",
                self.dim, self.num, other.dim, other.num
            )));
        }
        Ok(())
    }

    /// Error unless the batch is in `layout`.
    pub fn expect_layout(&self, layout: BatchLayout) -> Result<()> {
        if self.layout != layout {
            return Err(Error::Shape(format!(
                "batch is in {} layout, expected {}",
                self.layout, layout
            )));
        }
        Ok(())
    }

    pub(crate) fn replace_storage(&mut self, data: Vec<Real>, layout: BatchLayout) {
        debug_assert_eq!(data.len(), self.data.len());
        self.data = data;
        self.layout = layout;
    }
}

/// Validate that `num` matrices split into whole packages of `vec_len`.
pub fn check_packaging(num: usize, vec_len: usize) -> Result<()> {
    if vec_len == 0 {
        return Err(Error::Shape("vector length must be positive".into()));
    }
    if num % vec_len != 0 {
        return Err(Error::Shape(format!(
            "num ({}) is not a multiple of the vector length ({})",
            num, vec_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_complex_roundtrip() {
        let entries: Vec<Complex> = (0..8).map(|x| Complex::new(x as Real, -(x as Real))).collect();
        let batch = SigmaBatch::from_complex(&entries, 2, 2).unwrap();
        assert_eq!(batch.len(), 16);
        assert_eq!(batch.get(1, 0, 1), Complex::new(5.0, -5.0));
        assert_eq!(batch.to_complex_aos(), entries);
    }

    #[test]
    fn test_from_complex_rejects_wrong_length() {
        let entries = vec![Complex::new(0.0, 0.0); 7];
        assert!(SigmaBatch::from_complex(&entries, 2, 2).is_err());
    }

    #[test]
    fn test_from_raw_checks_packaging() {
        let data = vec![0.0; 2 * 4 * 6];
        assert!(SigmaBatch::from_raw(data.clone(), 2, 6, BatchLayout::Aosoa { vec_len: 4 }).is_err());
        assert!(SigmaBatch::from_raw(data, 2, 6, BatchLayout::Aosoa { vec_len: 2 }).is_ok());
    }

    #[test]
    fn test_set_get() {
        let mut batch = SigmaBatch::zeros(3, 2);
        batch.set(1, 2, 0, Complex::new(1.5, 2.5));
        assert_eq!(batch.get(1, 2, 0), Complex::new(1.5, 2.5));
        assert_eq!(batch.get(0, 2, 0), Complex::new(0.0, 0.0));
    }
}
