//! Independent optimisation axes a kernel variant is composed from.

use std::fmt;

/// Storage layout a kernel reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// One matrix at a time, interleaved Hamiltonian.
    Aos,
    /// `V`-matrix packages, planar Hamiltonian.
    Aosoa,
}

/// How the `V` lanes of a package are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vectorisation {
    /// Scalar body per lane; vectorising is left to the compiler.
    AutoLanes,
    /// One body over [`RealVec`](super::RealVec) values of width `V`.
    Explicit,
}

/// Whether `dim` and `V` are known when the body is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indexing {
    Runtime,
    Constant,
}

/// How partial products reach `sigma_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accumulation {
    /// Sum into a register per output entry, write it once.
    Accumulate,
    /// Compound-assign every partial product into `sigma_out`.
    Direct,
}

/// Nesting of the three matrix loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopOrder {
    /// `i, j, k`: inner loop runs over the summation index.
    Ijk,
    /// `i, k, j`: `H(i,k)` and `σ(i,k)` are hoisted out of the `j` loop.
    Ikj,
}

/// Adjacent packages processed together as one group.
///
/// The group's `packages · V` lanes are handled in chunks of
/// `register_width`; the last chunk may be partially filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fusion {
    pub packages: usize,
    pub register_width: usize,
}

impl Fusion {
    pub const TWO_TO_THREE: Fusion = Fusion {
        packages: 2,
        register_width: 3,
    };
    pub const TWO_TO_FIVE: Fusion = Fusion {
        packages: 2,
        register_width: 5,
    };
    pub const FOUR_TO_FIVE: Fusion = Fusion {
        packages: 4,
        register_width: 5,
    };
}

impl fmt::Display for Fusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}to{}", self.packages, self.register_width)
    }
}

/// Unrolling of the innermost output loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unroll {
    None,
    /// `j` stepped by two; evaluation order is unchanged.
    Hinted,
}

/// Where a [`Accumulation::Accumulate`] register starts.
///
/// Both choices give the same result up to rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Seed {
    /// Load the current output, add the terms, store.
    #[default]
    FromOutput,
    /// Start from zero, then add the register onto the output.
    Zero,
}

/// A point in the strategy space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelConfig {
    pub layout: LayoutKind,
    pub vectorisation: Vectorisation,
    pub indexing: Indexing,
    pub accumulation: Accumulation,
    pub loop_order: LoopOrder,
    pub fusion: Option<Fusion>,
    pub unroll: Unroll,
}

impl KernelConfig {
    /// Runtime-extent, auto-lane, accumulate, `ijk` kernel over `layout`.
    pub const fn baseline(layout: LayoutKind) -> Self {
        Self {
            layout,
            vectorisation: Vectorisation::AutoLanes,
            indexing: Indexing::Runtime,
            accumulation: Accumulation::Accumulate,
            loop_order: LoopOrder::Ijk,
            fusion: None,
            unroll: Unroll::None,
        }
    }

    pub const fn explicit(mut self) -> Self {
        self.vectorisation = Vectorisation::Explicit;
        self
    }

    pub const fn constants(mut self) -> Self {
        self.indexing = Indexing::Constant;
        self
    }

    pub const fn direct(mut self) -> Self {
        self.accumulation = Accumulation::Direct;
        self
    }

    pub const fn perm(mut self) -> Self {
        self.loop_order = LoopOrder::Ikj;
        self
    }

    pub const fn fused(mut self, fusion: Fusion) -> Self {
        self.fusion = Some(fusion);
        self
    }

    pub const fn unroll_hints(mut self) -> Self {
        self.unroll = Unroll::Hinted;
        self
    }
}
