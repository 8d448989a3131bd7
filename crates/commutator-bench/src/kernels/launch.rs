//! Binding a [`KernelConfig`] to concrete buffers and body instantiations.

use super::body::{commutator_group, AosAddressing, AosoaAddressing, Group};
use super::extent::{with_const_extents, with_lane_extents, Extents, ExtentsVisitor, RuntimeExtents};
use super::parallel::for_each_group;
use super::strategy::{Indexing, KernelConfig, LayoutKind, Seed, Vectorisation};
use super::vector::{Contiguous, Gather, RealVec, ScalarLane};
use crate::error::{Error, Result};
use crate::types::{BatchLayout, Hamiltonian, HamiltonianLayout, Real, SigmaBatch};

/// Operands of one kernel call.
///
/// `hbar` and `dt` are part of the calling convention; kernels that need
/// the `dt/ħ` factor receive a pre-scaled Hamiltonian instead.
#[derive(Debug)]
pub struct KernelArgs<'a> {
    pub sigma_in: &'a SigmaBatch,
    pub sigma_out: &'a mut SigmaBatch,
    pub hamiltonian: &'a Hamiltonian,
    pub hbar: Real,
    pub dt: Real,
}

/// Run the kernel described by `config` once over the whole batch.
///
/// Checks layouts and extents first and fails without touching
/// `sigma_out` if they do not fit the configuration.
pub fn launch(config: &KernelConfig, seed: Seed, args: KernelArgs<'_>) -> Result<()> {
    let vec_len = check_operands(config, &args)?;
    let dim = args.sigma_in.dim();

    let sigma_in = args.sigma_in.as_slice();
    let hamiltonian = args.hamiltonian.as_slice();
    let sigma_out = args.sigma_out.as_mut_slice();

    if config.layout == LayoutKind::Aos {
        run_aos(config, seed, dim, sigma_in, sigma_out, hamiltonian);
        return Ok(());
    }

    let launch = AosoaLaunch {
        config,
        seed,
        sigma_in,
        sigma_out,
        hamiltonian,
    };
    match config.indexing {
        Indexing::Constant => with_const_extents(dim, vec_len, launch),
        Indexing::Runtime => {
            let extents = RuntimeExtents { dim, vec_len };
            match (config.fusion, config.vectorisation) {
                (Some(_), _) => {
                    launch.fused(extents);
                    Ok(())
                }
                (None, Vectorisation::AutoLanes) => {
                    launch.auto_lanes(extents);
                    Ok(())
                }
                (None, Vectorisation::Explicit) => with_lane_extents(dim, vec_len, launch),
            }
        }
    }
}

/// Validate buffers against `config`; returns the package width.
fn check_operands(config: &KernelConfig, args: &KernelArgs<'_>) -> Result<usize> {
    args.sigma_in.check_same_extents(args.sigma_out)?;
    if args.sigma_in.layout() != args.sigma_out.layout() {
        return Err(Error::Shape(format!(
            "sigma_in is {}, sigma_out is {}",
            args.sigma_in.layout(),
            args.sigma_out.layout()
        )));
    }
    if args.hamiltonian.dim() != args.sigma_in.dim() {
        return Err(Error::Shape(format!(
            "Hamiltonian dim {} does not match batch dim {}",
            args.hamiltonian.dim(),
            args.sigma_in.dim()
        )));
    }

    match config.layout {
        LayoutKind::Aos => {
            if config.vectorisation != Vectorisation::AutoLanes
                || config.indexing != Indexing::Runtime
                || config.fusion.is_some()
            {
                return Err(Error::Config(format!(
                    "AoS kernels have no lane, constant or fusion axis: {config:?}"
                )));
            }
            args.sigma_in.expect_layout(BatchLayout::Aos)?;
            args.hamiltonian.expect_layout(HamiltonianLayout::Interleaved)?;
            Ok(1)
        }
        LayoutKind::Aosoa => {
            let vec_len = match args.sigma_in.layout() {
                BatchLayout::Aosoa { vec_len } => vec_len,
                other => {
                    return Err(Error::Shape(format!("AoSoA kernel given {other} batch")));
                }
            };
            args.hamiltonian.expect_layout(HamiltonianLayout::Planar)?;
            if let Some(fusion) = config.fusion {
                if fusion.packages == 0 || !matches!(fusion.register_width, 3 | 5) {
                    return Err(Error::Config(format!("unsupported fusion {fusion}")));
                }
            }
            Ok(vec_len)
        }
    }
}

fn run_aos(
    config: &KernelConfig,
    seed: Seed,
    dim: usize,
    sigma_in: &[Real],
    sigma_out: &mut [Real],
    hamiltonian: &[Real],
) {
    let addr = AosAddressing(RuntimeExtents { dim, vec_len: 1 });
    let io = ScalarLane { lane: 0 };
    for_each_group(sigma_in, sigma_out, 2 * dim * dim, |inp, out| {
        let group = Group {
            sigma_in: inp,
            sigma_out: out,
            hamiltonian,
        };
        commutator_group::<Real, _, _>(config, seed, &addr, &io, group);
    });
}

struct AosoaLaunch<'a> {
    config: &'a KernelConfig,
    seed: Seed,
    sigma_in: &'a [Real],
    sigma_out: &'a mut [Real],
    hamiltonian: &'a [Real],
}

impl AosoaLaunch<'_> {
    /// One scalar body per lane of each package.
    fn auto_lanes<E: Extents>(self, extents: E) {
        let Self {
            config,
            seed,
            sigma_in,
            sigma_out,
            hamiltonian,
        } = self;
        let addr = AosoaAddressing(extents);
        let package_len = package_len(&extents);

        for_each_group(sigma_in, sigma_out, package_len, |inp, out| {
            for lane in 0..extents.vec_len() {
                let group = Group {
                    sigma_in: inp,
                    sigma_out: &mut *out,
                    hamiltonian,
                };
                commutator_group::<Real, _, _>(config, seed, &addr, &ScalarLane { lane }, group);
            }
        });
    }

    /// One vector body per package.
    fn explicit<E: Extents, const V: usize>(self, extents: E) {
        debug_assert_eq!(extents.vec_len(), V);
        let Self {
            config,
            seed,
            sigma_in,
            sigma_out,
            hamiltonian,
        } = self;
        let addr = AosoaAddressing(extents);

        for_each_group(sigma_in, sigma_out, package_len(&extents), |inp, out| {
            let group = Group {
                sigma_in: inp,
                sigma_out: out,
                hamiltonian,
            };
            commutator_group::<RealVec<V>, _, _>(config, seed, &addr, &Contiguous, group);
        });
    }

    /// Several packages per group, their lanes re-chunked into registers
    /// of the fusion width.
    fn fused<E: Extents>(self, extents: E) {
        match self.config.fusion.map(|f| f.register_width) {
            Some(3) => self.fused_width::<E, 3>(extents),
            Some(5) => self.fused_width::<E, 5>(extents),
            // rejected in check_operands
            _ => {}
        }
    }

    fn fused_width<E: Extents, const M: usize>(self, extents: E) {
        let Self {
            config,
            seed,
            sigma_in,
            sigma_out,
            hamiltonian,
        } = self;
        let packages = config.fusion.map_or(1, |f| f.packages);
        let addr = AosoaAddressing(extents);
        let vec_len = extents.vec_len();
        let package_len = package_len(&extents);

        for_each_group(sigma_in, sigma_out, packages * package_len, |inp, out| {
            let lanes = inp.len() / package_len * vec_len;
            let mut first = 0;
            while first < lanes {
                let active = M.min(lanes - first);
                let mut bases = [0; M];
                for (t, base) in bases.iter_mut().enumerate().take(active) {
                    let g = first + t;
                    *base = g / vec_len * package_len + g % vec_len;
                }
                let group = Group {
                    sigma_in: inp,
                    sigma_out: &mut *out,
                    hamiltonian,
                };
                let io = Gather::<M> { bases, active };
                commutator_group::<RealVec<M>, _, _>(config, seed, &addr, &io, group);
                first += M;
            }
        });
    }
}

impl ExtentsVisitor for AosoaLaunch<'_> {
    type Output = ();

    fn visit<E: Extents, const V: usize>(self, extents: E) {
        match (self.config.fusion, self.config.vectorisation) {
            (Some(_), _) => self.fused(extents),
            (None, Vectorisation::AutoLanes) => self.auto_lanes(extents),
            (None, Vectorisation::Explicit) => self.explicit::<E, V>(extents),
        }
    }
}

#[inline(always)]
fn package_len<E: Extents>(extents: &E) -> usize {
    2 * extents.vec_len() * extents.dim() * extents.dim()
}
