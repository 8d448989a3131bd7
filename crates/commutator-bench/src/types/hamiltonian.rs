//! Owned Hamiltonian matrix.

use super::layout::HamiltonianLayout;
use super::scalar::{Complex, Real};
use crate::error::{Error, Result};

/// One `dim × dim` complex matrix shared read-only by every matrix of a batch.
///
/// Hermiticity is part of the physical model but not enforced here.
#[derive(Debug, Clone, PartialEq)]
pub struct Hamiltonian {
    data: Vec<Real>,
    dim: usize,
    layout: HamiltonianLayout,
}

impl Hamiltonian {
    /// Zero matrix, interleaved layout.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; 2 * dim * dim],
            dim,
            layout: HamiltonianLayout::Interleaved,
        }
    }

    /// Build from row-major complex entries, interleaved layout.
    pub fn from_complex(entries: &[Complex], dim: usize) -> Result<Self> {
        if entries.len() != dim * dim {
            return Err(Error::Shape(format!(
                "expected {} Hamiltonian entries, got {}",
                dim * dim,
                entries.len()
            )));
        }
        Ok(Self {
            data: entries.iter().flat_map(|c| [c.re, c.im]).collect(),
            dim,
            layout: HamiltonianLayout::Interleaved,
        })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Current layout.
    #[inline]
    pub fn layout(&self) -> HamiltonianLayout {
        self.layout
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

    /// Entry `(i, j)`, regardless of layout.
    pub fn get(&self, i: usize, j: usize) -> Complex {
        Complex::new(
            self.data[self.layout.real(self.dim, i, j)],
            self.data[self.layout.imag(self.dim, i, j)],
        )
    }

    /// Overwrite entry `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, value: Complex) {
        let re = self.layout.real(self.dim, i, j);
        let im = self.layout.imag(self.dim, i, j);
        self.data[re] = value.re;
        self.data[im] = value.im;
    }

    /// Error unless the matrix is in `layout`.
    pub fn expect_layout(&self, layout: HamiltonianLayout) -> Result<()> {
        if self.layout != layout {
            return Err(Error::Shape(format!(
                "Hamiltonian is {}, expected {}",
                self.layout, layout
            )));
        }
        Ok(())
    }

    pub(crate) fn replace_storage(&mut self, data: Vec<Real>, layout: HamiltonianLayout) {
        debug_assert_eq!(data.len(), self.data.len());
        self.data = data;
        self.layout = layout;
    }
}
