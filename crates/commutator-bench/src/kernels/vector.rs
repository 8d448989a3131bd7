//! Fixed-width lane vectors and how kernels move them in and out of memory.

use crate::types::Real;
use std::ops::{Add, Mul, Sub};

/// `W` reals processed as one unit.
///
/// Plain array arithmetic; with a constant `W` the compiler maps the
/// elementwise loops onto SIMD registers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct RealVec<const W: usize>(pub [Real; W]);

impl<const W: usize> RealVec<W> {
    /// All lanes set to `value`.
    #[inline(always)]
    pub fn splat(value: Real) -> Self {
        Self([value; W])
    }

    /// Load `W` consecutive reals starting at `offset`.
    #[inline(always)]
    pub fn load(src: &[Real], offset: usize) -> Self {
        let mut lanes = [0.0; W];
        lanes.copy_from_slice(&src[offset..offset + W]);
        Self(lanes)
    }

    /// Store all lanes to `W` consecutive reals starting at `offset`.
    #[inline(always)]
    pub fn store(self, dst: &mut [Real], offset: usize) {
        dst[offset..offset + W].copy_from_slice(&self.0);
    }
}

impl<const W: usize> Add for RealVec<W> {
    type Output = Self;

    #[inline(always)]
    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
        self
    }
}

impl<const W: usize> Sub for RealVec<W> {
    type Output = Self;

    #[inline(always)]
    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
        self
    }
}

impl<const W: usize> Mul<Real> for RealVec<W> {
    type Output = Self;

    #[inline(always)]
    fn mul(mut self, rhs: Real) -> Self {
        for a in self.0.iter_mut() {
            *a *= rhs;
        }
        self
    }
}

/// Arithmetic unit of a kernel body: a single real or a lane vector.
pub trait Lane:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Real, Output = Self> + Send + Sync
{
    /// Additive identity.
    fn zero() -> Self;
}

impl Lane for Real {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
}

impl<const W: usize> Lane for RealVec<W> {
    #[inline(always)]
    fn zero() -> Self {
        Self::splat(0.0)
    }
}

/// Moves one [`Lane`] between a group's storage and registers.
///
/// `entry` is the lane-independent offset of a matrix entry; the
/// implementation decides which lane(s) it covers.
pub(crate) trait LaneIo<L: Lane>: Copy + Send + Sync {
    fn load(&self, src: &[Real], entry: usize) -> L;
    fn store(&self, dst: &mut [Real], entry: usize, value: L);
}

/// One scalar lane at a fixed offset from the entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScalarLane {
    pub lane: usize,
}

impl LaneIo<Real> for ScalarLane {
    #[inline(always)]
    fn load(&self, src: &[Real], entry: usize) -> Real {
        src[entry + self.lane]
    }

    #[inline(always)]
    fn store(&self, dst: &mut [Real], entry: usize, value: Real) {
        dst[entry + self.lane] = value;
    }
}

/// All `W` lanes of one package, contiguous in memory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Contiguous;

impl<const W: usize> LaneIo<RealVec<W>> for Contiguous {
    #[inline(always)]
    fn load(&self, src: &[Real], entry: usize) -> RealVec<W> {
        RealVec::load(src, entry)
    }

    #[inline(always)]
    fn store(&self, dst: &mut [Real], entry: usize, value: RealVec<W>) {
        value.store(dst, entry);
    }
}

/// `M` lanes gathered from several packages of one group.
///
/// Lanes at and beyond `active` are padding: they load as zero and are
/// never written back.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Gather<const M: usize> {
    pub bases: [usize; M],
    pub active: usize,
}

impl<const M: usize> LaneIo<RealVec<M>> for Gather<M> {
    #[inline(always)]
    fn load(&self, src: &[Real], entry: usize) -> RealVec<M> {
        let mut lanes = [0.0; M];
        for (t, lane) in lanes.iter_mut().enumerate().take(self.active) {
            *lane = src[self.bases[t] + entry];
        }
        RealVec(lanes)
    }

    #[inline(always)]
    fn store(&self, dst: &mut [Real], entry: usize, value: RealVec<M>) {
        for t in 0..self.active {
            dst[self.bases[t] + entry] = value.0[t];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realvec_arithmetic() {
        let a = RealVec([1.0, 2.0, 3.0]);
        let b = RealVec::splat(0.5);
        assert_eq!(a + b, RealVec([1.5, 2.5, 3.5]));
        assert_eq!(a - b, RealVec([0.5, 1.5, 2.5]));
        assert_eq!(a * 2.0, RealVec([2.0, 4.0, 6.0]));
    }

    #[test]
    fn test_contiguous_io() {
        let mut buf: Vec<Real> = (0..8).map(|x| x as Real).collect();
        let v: RealVec<4> = Contiguous.load(&buf, 2);
        assert_eq!(v, RealVec([2.0, 3.0, 4.0, 5.0]));
        Contiguous.store(&mut buf, 4, v);
        assert_eq!(&buf[4..8], &[2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_gather_skips_padding() {
        let mut buf: Vec<Real> = (0..16).map(|x| x as Real).collect();
        let io = Gather::<3> {
            bases: [0, 8, 0],
            active: 2,
        };
        let v: RealVec<3> = io.load(&buf, 1);
        assert_eq!(v, RealVec([1.0, 9.0, 0.0]));

        io.store(&mut buf, 2, RealVec([-1.0, -2.0, -3.0]));
        // padding lane shares base 0 with lane 0 and must not overwrite it
        assert_eq!(buf[2], -1.0);
        assert_eq!(buf[10], -2.0);
    }
}
