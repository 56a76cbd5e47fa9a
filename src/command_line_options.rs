use clap::ArgAction;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Distributed-memory solver for the 3D transient heat equation", long_about = None)]
pub struct CommandLineOptions {
    /// Grid points along X.
    #[arg(value_name = "NX")]
    pub nx: usize,
    /// Grid points along Y.
    #[arg(value_name = "NY")]
    pub ny: usize,
    /// Grid points along Z.
    #[arg(value_name = "NZ")]
    pub nz: usize,
    /// Upper bound on the number of time steps.
    #[arg(value_name = "ITER_MAX")]
    pub iter_max: usize,
    /// Relative convergence threshold on the interior residual.
    #[arg(value_name = "EPS")]
    pub eps: f64,
    #[arg(short, action = ArgAction::Count)]
    pub verbosity: u8,
}
