use mpi::collective::SystemOperation;
use mpi::topology::CartesianCommunicator;
use mpi::traits::CommunicatorCollectives;

use super::Collective;

pub struct MpiCollective<'comm> {
    comm: &'comm CartesianCommunicator,
}

impl<'comm> MpiCollective<'comm> {
    pub fn new(comm: &'comm CartesianCommunicator) -> Self {
        Self { comm }
    }
}

impl Collective for MpiCollective<'_> {
    fn all_min(&self, value: f64) -> f64 {
        let mut reduced = value;
        self.comm
            .all_reduce_into(&value, &mut reduced, SystemOperation::min());
        reduced
    }

    fn all_max(&self, value: i32) -> i32 {
        let mut reduced = value;
        self.comm
            .all_reduce_into(&value, &mut reduced, SystemOperation::max());
        reduced
    }

    fn all_sum(&self, value: f64) -> f64 {
        let mut reduced = value;
        self.comm
            .all_reduce_into(&value, &mut reduced, SystemOperation::sum());
        reduced
    }
}

/// Identity reductions for a single-rank world.
pub struct SerialCollective;

impl Collective for SerialCollective {
    fn all_min(&self, value: f64) -> f64 {
        value
    }

    fn all_max(&self, value: i32) -> i32 {
        value
    }

    fn all_sum(&self, value: f64) -> f64 {
        value
    }
}
