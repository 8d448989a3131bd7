use super::{ExecutionBackend, PreparedKernel, Workspace};
use crate::error::Result;
use crate::kernels::{KernelArgs, Seed, Variant};
use std::time::{Duration, Instant};

/// Calls host kernel variants in-process and times them with a wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectBackend {
    seed: Seed,
}

impl DirectBackend {
    /// Backend whose accumulate kernels start from `seed`.
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }
}

impl ExecutionBackend for DirectBackend {
    type Kernel = Variant;
    type Prepared = DirectKernel;

    fn name(&self) -> &'static str {
        "direct"
    }

    fn kernels(&self) -> Vec<Variant> {
        Variant::ALL.to_vec()
    }

    fn prepare(&mut self, kernel: &Variant, _workspace: &Workspace) -> Result<DirectKernel> {
        Ok(DirectKernel {
            variant: *kernel,
            seed: self.seed,
        })
    }
}

/// A host variant bound to an accumulation seed.
#[derive(Debug, Clone, Copy)]
pub struct DirectKernel {
    variant: Variant,
    seed: Seed,
}

impl PreparedKernel for DirectKernel {
    fn stage(&mut self, _workspace: &Workspace) -> Result<()> {
        Ok(())
    }

    fn invoke(&mut self, workspace: &mut Workspace) -> Result<Duration> {
        let args = KernelArgs {
            sigma_in: &workspace.sigma_in,
            sigma_out: &mut workspace.sigma_out,
            hamiltonian: &workspace.hamiltonian,
            hbar: workspace.hbar,
            dt: workspace.dt,
        };
        let start = Instant::now();
        self.variant.run(self.seed, args)?;
        Ok(start.elapsed())
    }

    fn retrieve(&mut self, _workspace: &mut Workspace) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform_aos_to_aosoa;
    use crate::types::{Complex, Hamiltonian, SigmaBatch};

    #[test]
    fn test_direct_backend_runs_variant() {
        let h = Hamiltonian::from_complex(
            &[
                Complex::new(0.0, 0.0),
                Complex::new(1.0, 0.0),
                Complex::new(1.0, 0.0),
                Complex::new(0.0, 0.0),
            ],
            2,
        )
        .unwrap();
        let s = SigmaBatch::from_complex(
            &[
                Complex::new(0.0, 0.0),
                Complex::new(0.0, -1.0),
                Complex::new(0.0, 1.0),
                Complex::new(0.0, 0.0),
            ],
            2,
            1,
        )
        .unwrap();
        let mut ws = Workspace {
            hamiltonian: h,
            sigma_out: SigmaBatch::zeros(2, 1),
            sigma_in: s,
            hbar: 1.0,
            dt: 1.0,
        };

        let mut backend = DirectBackend::default();
        let mut kernel = backend.prepare(&Variant::Aos, &ws).unwrap();
        assert!(kernel.build_time().is_none());
        kernel.stage(&ws).unwrap();
        kernel.invoke(&mut ws).unwrap();
        kernel.retrieve(&mut ws).unwrap();

        assert_eq!(ws.sigma_out.get(0, 0, 0), Complex::new(0.0, 2.0));
    }

    #[test]
    fn test_layout_errors_surface_from_invoke() {
        let mut sigma_in = SigmaBatch::zeros(2, 2);
        transform_aos_to_aosoa(&mut sigma_in, 2).unwrap();
        let mut ws = Workspace {
            hamiltonian: Hamiltonian::zeros(2),
            sigma_out: sigma_in.clone(),
            sigma_in,
            hbar: 1.0,
            dt: 1.0,
        };
        let mut kernel = DirectBackend::default().prepare(&Variant::Aos, &ws).unwrap();
        assert!(kernel.invoke(&mut ws).is_err());
    }
}
