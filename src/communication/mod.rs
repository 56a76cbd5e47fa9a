mod cartesian;
mod collective;
mod exchange;

pub use cartesian::build_cartesian_context;
pub use cartesian::CartesianContext;
pub use collective::MpiCollective;
pub use collective::SerialCollective;
pub use exchange::MpiHaloExchange;
pub use exchange::SerialHaloExchange;

use crate::halo::PlaneSet;
use crate::topology::NeighbourTable;

pub type Rank = mpi::Rank;
pub type Tag = mpi::Tag;

const HALO_TAG_BASE: Tag = 100;
const FIELD_TAG_BASE: Tag = 200;
const COORDS_TAG_BASE: Tag = 300;

/// Halo traffic is tag-matched on the receiver: the sender keys its tag by
/// the destination rank, the receiver expects its own rank.
pub fn halo_tag(receiver: Rank) -> Tag {
    HALO_TAG_BASE + receiver
}

pub fn field_tag(sender: Rank) -> Tag {
    FIELD_TAG_BASE + sender
}

pub fn coords_tag(sender: Rank) -> Tag {
    COORDS_TAG_BASE + sender
}

/// Global reductions shared by the convergence test and the error norm.
pub trait Collective {
    fn all_min(&self, value: f64) -> f64;
    fn all_max(&self, value: i32) -> i32;
    fn all_sum(&self, value: f64) -> f64;
}

/// Per-iteration halo transport. Implementations send every packed plane,
/// run `overlap` while the transfers are in flight, deliver the received
/// planes, and wait for all outstanding sends before returning.
pub trait HaloExchange {
    fn exchange(
        &mut self,
        neighbours: &NeighbourTable,
        send: &PlaneSet,
        recv: &mut PlaneSet,
        overlap: &mut dyn FnMut(),
    );
}
