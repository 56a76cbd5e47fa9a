use std::time::Duration;
use std::time::Instant;

use log::debug;

use crate::communication::Collective;
use crate::communication::HaloExchange;
use crate::convergence::local_residual;
use crate::convergence::ConvergenceMonitor;
use crate::field::FieldPair;
use crate::halo::pack_faces;
use crate::halo::HaloBuffers;
use crate::initial_conditions::apply_dirichlet;
use crate::parameters::Parameters;
use crate::topology::Subdomain;
use crate::update::average_corners;
use crate::update::extrapolate_edges;
use crate::update::update_faces;
use crate::update::update_interior;

const RESIDUAL_LOG_INTERVAL: usize = 100;

/// Per-rank solver state for the explicit Euler iteration.
pub struct Simulation {
    pub subdomain: Subdomain,
    pub fields: FieldPair,
    pub halos: HaloBuffers,
    diffusion: [f64; 3],
}

pub struct RunReport {
    pub iterations: usize,
    pub converged: bool,
    pub norm: f64,
    pub last_residual: f64,
    pub elapsed: Duration,
}

impl Simulation {
    pub fn new(parameters: &Parameters, subdomain: Subdomain) -> Self {
        let mut fields = FieldPair::zeros(subdomain.extents);
        apply_dirichlet(&mut fields.t, &subdomain);
        Self {
            halos: HaloBuffers::for_extents(subdomain.extents),
            fields,
            diffusion: parameters.diffusion_numbers(),
            subdomain,
        }
    }

    /// Snapshot T into T0 and pack the outgoing face planes from it.
    pub fn prepare_step(&mut self) {
        self.fields.snapshot();
        let Self {
            subdomain,
            fields,
            halos,
            ..
        } = self;
        pack_faces(&fields.t0, &subdomain.neighbours, &mut halos.send);
    }

    /// One full time step; returns the local residual.
    pub fn step(&mut self, exchange: &mut dyn HaloExchange) -> f64 {
        self.prepare_step();
        let diffusion = self.diffusion;
        {
            let Self {
                subdomain,
                fields,
                halos,
                ..
            } = self;
            let HaloBuffers { send, recv } = halos;
            let (t, t0) = fields.split_mut();
            exchange.exchange(&subdomain.neighbours, send, recv, &mut || {
                update_interior(t, t0, diffusion)
            });
        }
        self.finish_boundaries()
    }

    /// Runs phases 2-5 against already delivered halos; returns the local
    /// residual. `prepare_step` must have run for this iteration.
    pub fn complete_step(&mut self) -> f64 {
        let diffusion = self.diffusion;
        let (t, t0) = self.fields.split_mut();
        update_interior(t, t0, diffusion);
        self.finish_boundaries()
    }

    fn finish_boundaries(&mut self) -> f64 {
        let diffusion = self.diffusion;
        let Self {
            subdomain,
            fields,
            halos,
            ..
        } = self;
        let (t, t0) = fields.split_mut();
        update_faces(t, t0, &subdomain.neighbours, &halos.recv, diffusion);
        extrapolate_edges(t, &subdomain.neighbours);
        average_corners(t, &subdomain.neighbours);
        local_residual(t, t0)
    }

    /// The outer time loop: steps until the collective convergence test
    /// fires or the iteration bound is reached.
    pub fn run(
        &mut self,
        exchange: &mut dyn HaloExchange,
        collective: &dyn Collective,
        parameters: &Parameters,
    ) -> RunReport {
        let mut monitor = ConvergenceMonitor::new(parameters.eps);
        let start = Instant::now();
        let mut iterations = 0;
        let mut converged = false;
        let mut residual = 0.0;
        for iteration in 1..=parameters.iter_max {
            residual = self.step(exchange);
            iterations = iteration;
            if iteration % RESIDUAL_LOG_INTERVAL == 0 {
                debug!("iteration {:>8}: residual {:.3e}", iteration, residual);
            }
            if monitor.converged(residual, collective) {
                converged = true;
                break;
            }
        }
        RunReport {
            iterations,
            converged,
            norm: monitor.norm().unwrap_or(1.0),
            last_residual: residual,
            elapsed: start.elapsed(),
        }
    }

    /// Local sums of squared deviation from and squared magnitude of the
    /// analytic reference T = y, counting every global node once.
    pub fn reference_error_sums(&self) -> (f64, f64) {
        let [nx, ny, nz] = self.subdomain.extents;
        let mut deviation = 0.0;
        let mut magnitude = 0.0;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    if !self.subdomain.owns_node([i, j, k]) {
                        continue;
                    }
                    let reference = self.subdomain.global_position(1, j);
                    let difference = self.fields.t[[i, j, k]] - reference;
                    deviation += difference * difference;
                    magnitude += reference * reference;
                }
            }
        }
        (deviation, magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Simulation;
    use crate::communication::Rank;
    use crate::communication::SerialCollective;
    use crate::communication::SerialHaloExchange;
    use crate::parameters::Parameters;
    use crate::test_utils::assert_is_close;
    use crate::topology::neighbour_coords;
    use crate::topology::Direction;
    use crate::topology::NeighbourTable;
    use crate::topology::Subdomain;

    fn serial_simulation(parameters: &Parameters) -> Simulation {
        let subdomain = Subdomain::new(
            parameters,
            [1, 1, 1],
            [0, 0, 0],
            NeighbourTable::default(),
        );
        Simulation::new(parameters, subdomain)
    }

    /// Several subdomains stepped in lockstep, with send planes couriered
    /// into the matching receive planes in place of real transport.
    struct Cluster {
        dims: [usize; 3],
        sims: Vec<Simulation>,
    }

    fn rank_of(coords: [usize; 3], dims: [usize; 3]) -> usize {
        (coords[0] * dims[1] + coords[1]) * dims[2] + coords[2]
    }

    impl Cluster {
        fn new(parameters: &Parameters, dims: [usize; 3]) -> Self {
            let mut sims = Vec::new();
            for cx in 0..dims[0] {
                for cy in 0..dims[1] {
                    for cz in 0..dims[2] {
                        let coords = [cx, cy, cz];
                        let mut neighbours = NeighbourTable::default();
                        for dir in Direction::ALL {
                            let peer = neighbour_coords(coords, dims, dir)
                                .map(|c| rank_of(c, dims) as Rank);
                            neighbours.set(dir, peer);
                        }
                        let subdomain = Subdomain::new(parameters, dims, coords, neighbours);
                        sims.push(Simulation::new(parameters, subdomain));
                    }
                }
            }
            Self { dims, sims }
        }

        fn deliver(&mut self) {
            for rank in 0..self.sims.len() {
                for dir in Direction::ALL {
                    if let Some(peer) = self.sims[rank].subdomain.neighbours.get(dir) {
                        let plane = self.sims[peer as usize].halos.send[dir.opposite()]
                            .values()
                            .to_vec();
                        self.sims[rank].halos.recv[dir]
                            .values_mut()
                            .copy_from_slice(&plane);
                    }
                }
            }
        }

        fn step_all(&mut self) -> Vec<f64> {
            for sim in &mut self.sims {
                sim.prepare_step();
            }
            self.deliver();
            self.sims.iter_mut().map(Simulation::complete_step).collect()
        }

        fn run(&mut self, iter_max: usize, eps: f64) -> (usize, bool) {
            let mut norm = None;
            for iteration in 1..=iter_max {
                let residuals = self.step_all();
                let norm = *norm.get_or_insert_with(|| {
                    residuals
                        .iter()
                        .map(|&res| if res > 0.0 { res } else { 1.0 })
                        .fold(f64::INFINITY, f64::min)
                });
                if residuals.iter().any(|res| res / norm < eps) {
                    return (iteration, true);
                }
            }
            (iter_max, false)
        }

        fn sim(&self, coords: [usize; 3]) -> &Simulation {
            &self.sims[rank_of(coords, self.dims)]
        }
    }

    #[test]
    fn first_step_increments_the_cell_under_the_hot_face() {
        let parameters = Parameters::new([5, 5, 5], 1, 0.0).unwrap();
        let diffusion = parameters.diffusion_numbers();
        let mut simulation = serial_simulation(&parameters);
        let residual = simulation.step(&mut SerialHaloExchange);
        // Only the centered cell next to the hot face sees exactly the
        // Y diffusion number; its lateral neighbours also feel the side
        // faces.
        assert_is_close(simulation.fields.t[[2, 3, 2]], diffusion[1]);
        assert_is_close(simulation.fields.t[[2, 2, 2]], 0.0);
        assert_is_close(
            simulation.fields.t[[1, 3, 2]],
            0.75 * diffusion[0] + diffusion[1],
        );
        assert_is_close(residual, 0.75 * diffusion[0] + 0.75 * diffusion[2] + diffusion[1]);
    }

    #[test]
    fn minimal_cube_updates_its_single_interior_cell() {
        let parameters = Parameters::new([3, 3, 3], 1, 0.0).unwrap();
        let [dx, dy, dz] = parameters.diffusion_numbers();
        let mut simulation = serial_simulation(&parameters);
        simulation.step(&mut SerialHaloExchange);
        assert_is_close(simulation.fields.t[[1, 1, 1]], dx + dy + dz);
    }

    #[test]
    fn serial_solve_converges_to_the_reference_field() {
        let parameters = Parameters::new([11, 11, 11], 20_000, 1e-6).unwrap();
        let mut simulation = serial_simulation(&parameters);
        let report = simulation.run(&mut SerialHaloExchange, &SerialCollective, &parameters);
        assert!(report.converged, "no convergence in {} iterations", report.iterations);
        let (deviation, magnitude) = simulation.reference_error_sums();
        let error = (deviation / magnitude).sqrt();
        assert!(error <= 0.05, "L2 error {} above 5%", error);
        // Dirichlet data survives the whole run untouched.
        let dy = parameters.spacing()[1];
        for j in 0..11 {
            for k in 0..11 {
                assert_is_close(simulation.fields.t[[0, j, k]], j as f64 * dy);
                assert_is_close(simulation.fields.t[[j, 0, k]], 0.0);
                assert_is_close(simulation.fields.t[[j, 10, k]], 1.0);
            }
        }
    }

    #[test]
    fn iteration_bound_reports_non_convergence() {
        let parameters = Parameters::new([9, 9, 9], 2, 1e-12).unwrap();
        let mut simulation = serial_simulation(&parameters);
        let report = simulation.run(&mut SerialHaloExchange, &SerialCollective, &parameters);
        assert!(!report.converged);
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn halo_planes_carry_the_first_interior_slab_of_the_peer() {
        let parameters = Parameters::new([5, 5, 5], 1, 0.0).unwrap();
        let mut cluster = Cluster::new(&parameters, [2, 1, 1]);
        // Give the lower subdomain a recognizable interior.
        for i in 0..3 {
            for j in 0..5 {
                for k in 0..5 {
                    cluster.sims[0].fields.t[[i, j, k]] =
                        i as f64 + 10.0 * j as f64 + 100.0 * k as f64;
                }
            }
        }
        for sim in &mut cluster.sims {
            sim.prepare_step();
        }
        cluster.deliver();
        let lower = &cluster.sims[0];
        let upper = &cluster.sims[1];
        for j in 1..4 {
            for k in 1..4 {
                assert_is_close(
                    upper.halos.recv[Direction::XLower].at(j - 1, k - 1),
                    lower.fields.t0[[1, j, k]],
                );
            }
        }
    }

    #[test]
    fn split_solve_matches_the_serial_solve() {
        let parameters = Parameters::new([9, 9, 9], 20_000, 1e-8).unwrap();
        let mut serial = serial_simulation(&parameters);
        let report = serial.run(&mut SerialHaloExchange, &SerialCollective, &parameters);
        assert!(report.converged);

        let dims = [2, 2, 2];
        let mut cluster = Cluster::new(&parameters, dims);
        let (_, converged) = cluster.run(parameters.iter_max, parameters.eps);
        assert!(converged);

        for cx in 0..2 {
            for cy in 0..2 {
                for cz in 0..2 {
                    let sim = cluster.sim([cx, cy, cz]);
                    let sub = &sim.subdomain;
                    let [nx, ny, nz] = sub.extents;
                    for i in 0..nx {
                        for j in 0..ny {
                            for k in 0..nz {
                                let corner = [(i, nx), (j, ny), (k, nz)]
                                    .iter()
                                    .all(|&(idx, n)| idx == 0 || idx == n - 1);
                                if corner {
                                    continue;
                                }
                                let global = [
                                    cx * (nx - 1) + i,
                                    cy * (ny - 1) + j,
                                    cz * (nz - 1) + k,
                                ];
                                let difference =
                                    sim.fields.t[[i, j, k]] - serial.fields.t[global];
                                assert!(
                                    difference.abs() < 1e-6,
                                    "zone ({cx},{cy},{cz}) cell ({i},{j},{k}) off by {difference}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}
