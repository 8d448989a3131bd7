//! The commutator update `σ_out += H·σ_in − σ_in·H`, written once.
//!
//! Each body is generic over three things:
//! - [`Addressing`]: where entry `(i, j)` of σ and H lives in a group,
//! - [`Lane`]: a scalar or a lane vector,
//! - [`LaneIo`]: which lanes of the group a load or store touches.
//!
//! Per output entry the real and imaginary parts receive
//!
//! ```text
//! re += Hr(i,k)·Sr(k,j) − Hi(i,k)·Si(k,j) − Sr(i,k)·Hr(k,j) + Si(i,k)·Hi(k,j)
//! im += Hr(i,k)·Si(k,j) + Hi(i,k)·Sr(k,j) − Sr(i,k)·Hi(k,j) − Si(i,k)·Hr(k,j)
//! ```
//!
//! summed over `k`.

use super::extent::Extents;
use super::strategy::{Accumulation, KernelConfig, LoopOrder, Seed, Unroll};
use super::vector::{Lane, LaneIo};
use crate::types::Real;

/// Offsets of σ and H entries inside one group.
pub(crate) trait Addressing: Copy + Send + Sync {
    fn dim(&self) -> usize;
    fn sigma_re(&self, i: usize, j: usize) -> usize;
    fn sigma_im(&self, i: usize, j: usize) -> usize;
    fn ham_re(&self, i: usize, j: usize) -> usize;
    fn ham_im(&self, i: usize, j: usize) -> usize;
}

/// One AoS matrix; interleaved Hamiltonian.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AosAddressing<E>(pub E);

impl<E: Extents> Addressing for AosAddressing<E> {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.0.dim()
    }

    #[inline(always)]
    fn sigma_re(&self, i: usize, j: usize) -> usize {
        2 * (self.dim() * i + j)
    }

    #[inline(always)]
    fn sigma_im(&self, i: usize, j: usize) -> usize {
        self.sigma_re(i, j) + 1
    }

    #[inline(always)]
    fn ham_re(&self, i: usize, j: usize) -> usize {
        2 * (self.dim() * i + j)
    }

    #[inline(always)]
    fn ham_im(&self, i: usize, j: usize) -> usize {
        self.ham_re(i, j) + 1
    }
}

/// One AoSoA package, lane 0; planar Hamiltonian.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AosoaAddressing<E>(pub E);

impl<E: Extents> Addressing for AosoaAddressing<E> {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.0.dim()
    }

    #[inline(always)]
    fn sigma_re(&self, i: usize, j: usize) -> usize {
        2 * self.0.vec_len() * (self.dim() * i + j)
    }

    #[inline(always)]
    fn sigma_im(&self, i: usize, j: usize) -> usize {
        self.sigma_re(i, j) + self.0.vec_len()
    }

    #[inline(always)]
    fn ham_re(&self, i: usize, j: usize) -> usize {
        self.dim() * i + j
    }

    #[inline(always)]
    fn ham_im(&self, i: usize, j: usize) -> usize {
        self.dim() * self.dim() + self.dim() * i + j
    }
}

/// Borrowed operands of one group.
pub(crate) struct Group<'a> {
    pub sigma_in: &'a [Real],
    pub sigma_out: &'a mut [Real],
    pub hamiltonian: &'a [Real],
}

/// Run the body selected by `config` on one group.
#[inline(always)]
pub(crate) fn commutator_group<L, A, IO>(
    config: &KernelConfig,
    seed: Seed,
    addr: &A,
    io: &IO,
    group: Group<'_>,
) where
    L: Lane,
    A: Addressing,
    IO: LaneIo<L>,
{
    let hinted = config.unroll == Unroll::Hinted;
    match (config.accumulation, config.loop_order, hinted) {
        (Accumulation::Accumulate, LoopOrder::Ijk, false) => {
            accumulate_ijk::<L, A, IO, false>(addr, io, seed, group)
        }
        (Accumulation::Accumulate, LoopOrder::Ijk, true) => {
            accumulate_ijk::<L, A, IO, true>(addr, io, seed, group)
        }
        (Accumulation::Accumulate, LoopOrder::Ikj, false) => {
            accumulate_ikj::<L, A, IO, false>(addr, io, seed, group)
        }
        (Accumulation::Accumulate, LoopOrder::Ikj, true) => {
            accumulate_ikj::<L, A, IO, true>(addr, io, seed, group)
        }
        (Accumulation::Direct, LoopOrder::Ijk, false) => {
            direct_ijk::<L, A, IO, false>(addr, io, group)
        }
        (Accumulation::Direct, LoopOrder::Ijk, true) => direct_ijk::<L, A, IO, true>(addr, io, group),
        (Accumulation::Direct, LoopOrder::Ikj, false) => {
            direct_ikj::<L, A, IO, false>(addr, io, group)
        }
        (Accumulation::Direct, LoopOrder::Ikj, true) => direct_ikj::<L, A, IO, true>(addr, io, group),
    }
}

/// `for j in 0..dim`, stepped by two when `UNROLL` is set.
#[inline(always)]
fn for_each_j<const UNROLL: bool, F: FnMut(usize)>(dim: usize, mut f: F) {
    if UNROLL {
        let mut j = 0;
        while j + 2 <= dim {
            f(j);
            f(j + 1);
            j += 2;
        }
        if j < dim {
            f(j);
        }
    } else {
        for j in 0..dim {
            f(j);
        }
    }
}

#[inline(always)]
fn add_into<L: Lane, IO: LaneIo<L>>(io: &IO, dst: &mut [Real], entry: usize, term: L) {
    let v = io.load(dst, entry) + term;
    io.store(dst, entry, v);
}

#[inline(always)]
fn sub_into<L: Lane, IO: LaneIo<L>>(io: &IO, dst: &mut [Real], entry: usize, term: L) {
    let v = io.load(dst, entry) - term;
    io.store(dst, entry, v);
}

#[inline(always)]
fn seed_register<L: Lane, IO: LaneIo<L>>(io: &IO, seed: Seed, out: &[Real], re: usize, im: usize) -> (L, L) {
    match seed {
        Seed::FromOutput => (io.load(out, re), io.load(out, im)),
        Seed::Zero => (L::zero(), L::zero()),
    }
}

#[inline(always)]
fn write_register<L: Lane, IO: LaneIo<L>>(
    io: &IO,
    seed: Seed,
    out: &mut [Real],
    (re, im): (usize, usize),
    (tr, ti): (L, L),
) {
    match seed {
        Seed::FromOutput => {
            io.store(out, re, tr);
            io.store(out, im, ti);
        }
        Seed::Zero => {
            add_into(io, out, re, tr);
            add_into(io, out, im, ti);
        }
    }
}

#[inline(always)]
fn accumulate_ijk<L, A, IO, const UNROLL: bool>(addr: &A, io: &IO, seed: Seed, group: Group<'_>)
where
    L: Lane,
    A: Addressing,
    IO: LaneIo<L>,
{
    let Group {
        sigma_in: s,
        sigma_out: out,
        hamiltonian: h,
    } = group;
    let dim = addr.dim();

    for i in 0..dim {
        for_each_j::<UNROLL, _>(dim, |j| {
            let re = addr.sigma_re(i, j);
            let im = addr.sigma_im(i, j);
            let (mut tr, mut ti) = seed_register::<L, IO>(io, seed, out, re, im);
            for k in 0..dim {
                let hr_ik = h[addr.ham_re(i, k)];
                let hi_ik = h[addr.ham_im(i, k)];
                let hr_kj = h[addr.ham_re(k, j)];
                let hi_kj = h[addr.ham_im(k, j)];
                let sr_ik = io.load(s, addr.sigma_re(i, k));
                let si_ik = io.load(s, addr.sigma_im(i, k));
                let sr_kj = io.load(s, addr.sigma_re(k, j));
                let si_kj = io.load(s, addr.sigma_im(k, j));

                tr = tr + sr_kj * hr_ik - si_kj * hi_ik - sr_ik * hr_kj + si_ik * hi_kj;
                ti = ti + si_kj * hr_ik + sr_kj * hi_ik - sr_ik * hi_kj - si_ik * hr_kj;
            }
            write_register(io, seed, out, (re, im), (tr, ti));
        });
    }
}

#[inline(always)]
fn accumulate_ikj<L, A, IO, const UNROLL: bool>(addr: &A, io: &IO, seed: Seed, group: Group<'_>)
where
    L: Lane,
    A: Addressing,
    IO: LaneIo<L>,
{
    let Group {
        sigma_in: s,
        sigma_out: out,
        hamiltonian: h,
    } = group;
    let dim = addr.dim();

    for i in 0..dim {
        for k in 0..dim {
            let hr_ik = h[addr.ham_re(i, k)];
            let hi_ik = h[addr.ham_im(i, k)];
            let sr_ik = io.load(s, addr.sigma_re(i, k));
            let si_ik = io.load(s, addr.sigma_im(i, k));

            for_each_j::<UNROLL, _>(dim, |j| {
                let re = addr.sigma_re(i, j);
                let im = addr.sigma_im(i, j);
                let hr_kj = h[addr.ham_re(k, j)];
                let hi_kj = h[addr.ham_im(k, j)];
                let sr_kj = io.load(s, addr.sigma_re(k, j));
                let si_kj = io.load(s, addr.sigma_im(k, j));

                let (mut tr, mut ti) = seed_register::<L, IO>(io, seed, out, re, im);
                tr = tr + sr_kj * hr_ik - si_kj * hi_ik - sr_ik * hr_kj + si_ik * hi_kj;
                ti = ti + si_kj * hr_ik + sr_kj * hi_ik - sr_ik * hi_kj - si_ik * hr_kj;
                write_register(io, seed, out, (re, im), (tr, ti));
            });
        }
    }
}

#[inline(always)]
fn direct_ijk<L, A, IO, const UNROLL: bool>(addr: &A, io: &IO, group: Group<'_>)
where
    L: Lane,
    A: Addressing,
    IO: LaneIo<L>,
{
    let Group {
        sigma_in: s,
        sigma_out: out,
        hamiltonian: h,
    } = group;
    let dim = addr.dim();

    for i in 0..dim {
        for_each_j::<UNROLL, _>(dim, |j| {
            let re = addr.sigma_re(i, j);
            let im = addr.sigma_im(i, j);
            for k in 0..dim {
                let hr_ik = h[addr.ham_re(i, k)];
                let hi_ik = h[addr.ham_im(i, k)];
                let hr_kj = h[addr.ham_re(k, j)];
                let hi_kj = h[addr.ham_im(k, j)];
                let sr_ik = io.load(s, addr.sigma_re(i, k));
                let si_ik = io.load(s, addr.sigma_im(i, k));
                let sr_kj = io.load(s, addr.sigma_re(k, j));
                let si_kj = io.load(s, addr.sigma_im(k, j));

                add_into(io, out, re, sr_kj * hr_ik);
                sub_into(io, out, re, si_kj * hi_ik);
                sub_into(io, out, re, sr_ik * hr_kj);
                add_into(io, out, re, si_ik * hi_kj);

                add_into(io, out, im, si_kj * hr_ik);
                add_into(io, out, im, sr_kj * hi_ik);
                sub_into(io, out, im, sr_ik * hi_kj);
                sub_into(io, out, im, si_ik * hr_kj);
            }
        });
    }
}

#[inline(always)]
fn direct_ikj<L, A, IO, const UNROLL: bool>(addr: &A, io: &IO, group: Group<'_>)
where
    L: Lane,
    A: Addressing,
    IO: LaneIo<L>,
{
    let Group {
        sigma_in: s,
        sigma_out: out,
        hamiltonian: h,
    } = group;
    let dim = addr.dim();

    for i in 0..dim {
        for k in 0..dim {
            let hr_ik = h[addr.ham_re(i, k)];
            let hi_ik = h[addr.ham_im(i, k)];
            let sr_ik = io.load(s, addr.sigma_re(i, k));
            let si_ik = io.load(s, addr.sigma_im(i, k));

            for_each_j::<UNROLL, _>(dim, |j| {
                let re = addr.sigma_re(i, j);
                let im = addr.sigma_im(i, j);
                let hr_kj = h[addr.ham_re(k, j)];
                let hi_kj = h[addr.ham_im(k, j)];
                let sr_kj = io.load(s, addr.sigma_re(k, j));
                let si_kj = io.load(s, addr.sigma_im(k, j));

                add_into(io, out, re, sr_kj * hr_ik);
                sub_into(io, out, re, si_kj * hi_ik);
                sub_into(io, out, re, sr_ik * hr_kj);
                add_into(io, out, re, si_ik * hi_kj);

                add_into(io, out, im, si_kj * hr_ik);
                add_into(io, out, im, sr_kj * hi_ik);
                sub_into(io, out, im, sr_ik * hi_kj);
                sub_into(io, out, im, si_ik * hr_kj);
            });
        }
    }
}
