use mpi::request::scope;
use mpi::topology::CartesianCommunicator;
use mpi::traits::Communicator;
use mpi::traits::Destination;
use mpi::traits::Source;

use super::halo_tag;
use super::HaloExchange;
use super::Rank;
use crate::halo::PlaneSet;
use crate::topology::Direction;
use crate::topology::NeighbourTable;

/// Halo transport over the cartesian communicator: non-blocking sends to
/// every peer, blocking tag-matched receives, then a wait on all sends.
/// The send planes are not touched between posting and completion.
pub struct MpiHaloExchange<'comm> {
    comm: &'comm CartesianCommunicator,
    rank: Rank,
}

impl<'comm> MpiHaloExchange<'comm> {
    pub fn new(comm: &'comm CartesianCommunicator) -> Self {
        Self {
            comm,
            rank: comm.rank(),
        }
    }
}

impl HaloExchange for MpiHaloExchange<'_> {
    fn exchange(
        &mut self,
        neighbours: &NeighbourTable,
        send: &PlaneSet,
        recv: &mut PlaneSet,
        overlap: &mut dyn FnMut(),
    ) {
        scope(|sc| {
            let mut pending = Vec::with_capacity(Direction::ALL.len());
            for dir in Direction::ALL {
                if let Some(peer) = neighbours.get(dir) {
                    let request = self.comm.process_at_rank(peer).immediate_send_with_tag(
                        sc,
                        send[dir].values(),
                        halo_tag(peer),
                    );
                    pending.push(request);
                }
            }
            overlap();
            for dir in Direction::ALL {
                if let Some(peer) = neighbours.get(dir) {
                    self.comm
                        .process_at_rank(peer)
                        .receive_into_with_tag(recv[dir].values_mut(), halo_tag(self.rank));
                }
            }
            for request in pending {
                request.wait_without_status();
            }
        });
    }
}

/// Transport for a world without peers; only the overlapped computation
/// runs.
pub struct SerialHaloExchange;

impl HaloExchange for SerialHaloExchange {
    fn exchange(
        &mut self,
        neighbours: &NeighbourTable,
        _send: &PlaneSet,
        _recv: &mut PlaneSet,
        overlap: &mut dyn FnMut(),
    ) {
        debug_assert!(neighbours.is_isolated());
        overlap();
    }
}
