pub mod command_line_options;
pub mod communication;
pub mod convergence;
pub mod error;
pub mod field;
pub mod halo;
pub mod initial_conditions;
pub mod logging;
pub mod output;
pub mod parameters;
pub mod simulation;
pub mod topology;
pub mod update;

#[cfg(test)]
pub(crate) mod test_utils;

pub mod prelude {
    pub use crate::parameters::Parameters;
    pub use crate::simulation::RunReport;
    pub use crate::simulation::Simulation;
    pub use crate::topology::Subdomain;
}
