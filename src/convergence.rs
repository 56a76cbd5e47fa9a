use crate::communication::Collective;
use crate::field::Field;

/// Max |T - T0| over the strict interior.
pub fn local_residual(t: &Field, t0: &Field) -> f64 {
    let [nx, ny, nz] = t.extents();
    let mut residual: f64 = 0.0;
    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            for k in 1..nz - 1 {
                residual = residual.max((t[[i, j, k]] - t0[[i, j, k]]).abs());
            }
        }
    }
    residual
}

fn normalizer_candidate(residual: f64) -> f64 {
    if residual > 0.0 {
        residual
    } else {
        1.0
    }
}

/// Decides termination collectively. The normalizer is fixed on the first
/// iteration as the MIN over ranks of the local candidate, so every rank
/// scales its residual identically afterwards. The break flag is reduced
/// with MAX: the loop ends as soon as any rank reports convergence.
pub struct ConvergenceMonitor {
    eps: f64,
    norm: Option<f64>,
}

impl ConvergenceMonitor {
    pub fn new(eps: f64) -> Self {
        Self { eps, norm: None }
    }

    pub fn converged(&mut self, residual: f64, collective: &dyn Collective) -> bool {
        let norm = match self.norm {
            Some(norm) => norm,
            None => {
                let norm = collective.all_min(normalizer_candidate(residual));
                self.norm = Some(norm);
                norm
            }
        };
        let flag = i32::from(residual / norm < self.eps);
        collective.all_max(flag) != 0
    }

    pub fn norm(&self) -> Option<f64> {
        self.norm
    }
}
