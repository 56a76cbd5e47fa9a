use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use log::error;
use log::info;
use mpi::topology::SimpleCommunicator;
use mpi::traits::Communicator;

use caldera::command_line_options::CommandLineOptions;
use caldera::communication::build_cartesian_context;
use caldera::communication::Collective;
use caldera::communication::MpiCollective;
use caldera::communication::MpiHaloExchange;
use caldera::logging::setup_logging;
use caldera::output::write_field_dump;
use caldera::output::OUTPUT_PATH;
use caldera::parameters::Parameters;
use caldera::simulation::Simulation;
use caldera::topology::balanced_process_grid;
use caldera::topology::Subdomain;

fn main() {
    let universe = mpi::initialize().expect("failed to initialize the message passing layer");
    let world = universe.world();
    let rank = world.rank();
    let options = match CommandLineOptions::try_parse() {
        Ok(options) => options,
        Err(err) => {
            if rank == 0 {
                let _ = err.print();
            }
            world.abort(2);
        }
    };
    setup_logging(rank, options.verbosity);
    if let Err(err) = run(&world, &options) {
        if rank == 0 {
            error!("{:#}", err);
        }
        // A group abort keeps peers from deadlocking in a later exchange.
        world.abort(1);
    }
}

fn run(world: &SimpleCommunicator, options: &CommandLineOptions) -> Result<()> {
    let parameters = Parameters::new(
        [options.nx, options.ny, options.nz],
        options.iter_max,
        options.eps,
    )?;
    let num_ranks = world.size() as usize;
    let dims = balanced_process_grid(num_ranks, parameters.points)?;
    let context = build_cartesian_context(world, dims);
    if context.rank == 0 {
        let [nx, ny, nz] = parameters.points;
        let [dx, dy, dz] = parameters.spacing();
        info!(
            "grid {}x{}x{} on {} ranks as {}x{}x{}",
            nx, ny, nz, num_ranks, dims[0], dims[1], dims[2]
        );
        info!(
            "spacing ({:.3e}, {:.3e}, {:.3e}), dt {:.3e}, eps {:.1e}, at most {} iterations",
            dx,
            dy,
            dz,
            parameters.time_step(),
            parameters.eps,
            parameters.iter_max
        );
    }
    let subdomain = Subdomain::new(&parameters, dims, context.coords, context.neighbours);
    let mut simulation = Simulation::new(&parameters, subdomain);
    let mut exchange = MpiHaloExchange::new(&context.comm);
    let collective = MpiCollective::new(&context.comm);
    let report = simulation.run(&mut exchange, &collective, &parameters);

    let (deviation, magnitude) = simulation.reference_error_sums();
    let deviation = collective.all_sum(deviation);
    let magnitude = collective.all_sum(magnitude);
    let error_l2 = (deviation / magnitude).sqrt();

    if context.rank == 0 {
        let elapsed = report.elapsed.as_secs_f64();
        if report.converged {
            let rate = report.iterations as f64 / elapsed.max(f64::MIN_POSITIVE);
            info!(
                "converged after {} iterations in {:.3}s ({:.0} iterations/s)",
                report.iterations, elapsed, rate
            );
        } else {
            info!(
                "did not converge within {} iterations (scaled residual {:.3e})",
                parameters.iter_max,
                report.last_residual / report.norm
            );
        }
        info!("L2-norm error against the analytic reference: {:.3e}", error_l2);
    }

    write_field_dump(&context.comm, &simulation.subdomain, &simulation.fields.t)
        .with_context(|| format!("failed to write {}", OUTPUT_PATH))?;
    if context.rank == 0 {
        info!("wrote {}", OUTPUT_PATH);
    }
    Ok(())
}
