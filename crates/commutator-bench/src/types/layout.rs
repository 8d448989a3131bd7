//! Physical layouts and the index arithmetic that defines them.

use std::fmt;

/// Memory layout of a whole [`SigmaBatch`](super::SigmaBatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchLayout {
    /// Array of structures: matrix `p` occupies one contiguous block of
    /// `dim * dim` interleaved `(re, im)` pairs.
    Aos,
    /// Array of structures of arrays: packages of `vec_len` matrices. Inside
    /// a package, entry `(i, j)` stores the `vec_len` real parts followed by
    /// the `vec_len` imaginary parts.
    Aosoa {
        /// Matrices per package.
        vec_len: usize,
    },
}

impl BatchLayout {
    /// Offset of the real part of entry `(i, j)` of matrix `p`.
    ///
    /// The imaginary part lives at [`BatchLayout::imag`].
    #[inline(always)]
    pub fn real(self, dim: usize, p: usize, i: usize, j: usize) -> usize {
        match self {
            BatchLayout::Aos => 2 * ((p * dim + i) * dim + j),
            BatchLayout::Aosoa { vec_len } => {
                let package = p / vec_len;
                let lane = p % vec_len;
                package * 2 * vec_len * dim * dim + 2 * vec_len * (dim * i + j) + lane
            }
        }
    }

    /// Offset of the imaginary part of entry `(i, j)` of matrix `p`.
    #[inline(always)]
    pub fn imag(self, dim: usize, p: usize, i: usize, j: usize) -> usize {
        match self {
            BatchLayout::Aos => self.real(dim, p, i, j) + 1,
            BatchLayout::Aosoa { vec_len } => self.real(dim, p, i, j) + vec_len,
        }
    }

    /// Vector length of an AoSoA layout, `None` for AoS.
    pub fn vec_len(self) -> Option<usize> {
        match self {
            BatchLayout::Aos => None,
            BatchLayout::Aosoa { vec_len } => Some(vec_len),
        }
    }
}

impl fmt::Display for BatchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchLayout::Aos => write!(f, "aos"),
            BatchLayout::Aosoa { vec_len } => write!(f, "aosoa[{}]", vec_len),
        }
    }
}

/// Memory layout of a [`Hamiltonian`](super::Hamiltonian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HamiltonianLayout {
    /// Interleaved `(re, im)` pairs, row-major.
    Interleaved,
    /// Real plane (row-major) followed by the imaginary plane.
    Planar,
}

impl HamiltonianLayout {
    /// Offset of the real part of entry `(i, j)`.
    #[inline(always)]
    pub fn real(self, dim: usize, i: usize, j: usize) -> usize {
        match self {
            HamiltonianLayout::Interleaved => 2 * (i * dim + j),
            HamiltonianLayout::Planar => i * dim + j,
        }
    }

    /// Offset of the imaginary part of entry `(i, j)`.
    #[inline(always)]
    pub fn imag(self, dim: usize, i: usize, j: usize) -> usize {
        match self {
            HamiltonianLayout::Interleaved => 2 * (i * dim + j) + 1,
            HamiltonianLayout::Planar => dim * dim + i * dim + j,
        }
    }
}

impl fmt::Display for HamiltonianLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HamiltonianLayout::Interleaved => write!(f, "interleaved"),
            HamiltonianLayout::Planar => write!(f, "planar"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aos_offsets() {
        let l = BatchLayout::Aos;
        assert_eq!(l.real(2, 0, 0, 0), 0);
        assert_eq!(l.imag(2, 0, 0, 0), 1);
        assert_eq!(l.real(2, 0, 1, 1), 6);
        // second matrix starts after 2*2 complex entries
        assert_eq!(l.real(2, 1, 0, 0), 8);
    }

    #[test]
    fn test_aosoa_offsets() {
        let l = BatchLayout::Aosoa { vec_len: 4 };
        // lanes of the same entry are contiguous
        assert_eq!(l.real(2, 0, 0, 0), 0);
        assert_eq!(l.real(2, 3, 0, 0), 3);
        assert_eq!(l.imag(2, 0, 0, 0), 4);
        assert_eq!(l.real(2, 0, 0, 1), 8);
        // second package
        assert_eq!(l.real(2, 4, 0, 0), 2 * 4 * 4);
    }

    #[test]
    fn test_planar_offsets() {
        let l = HamiltonianLayout::Planar;
        assert_eq!(l.real(3, 1, 2), 5);
        assert_eq!(l.imag(3, 1, 2), 14);
    }
}
