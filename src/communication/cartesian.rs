use mpi::topology::CartesianCommunicator;
use mpi::topology::CartesianLayout;
use mpi::topology::SimpleCommunicator;
use mpi::traits::Communicator;
use mpi::Count;

use super::Rank;
use crate::topology::neighbour_coords;
use crate::topology::Direction;
use crate::topology::NeighbourTable;

/// This process's place in the cartesian communication context.
pub struct CartesianContext {
    pub comm: CartesianCommunicator,
    pub rank: Rank,
    pub coords: [usize; 3],
    pub neighbours: NeighbourTable,
}

/// Creates the non-periodic cartesian context for the given process grid
/// and resolves the caller's coordinates and neighbour ranks.
pub fn build_cartesian_context(world: &SimpleCommunicator, dims: [usize; 3]) -> CartesianContext {
    let cart_dims: Vec<Count> = dims.iter().map(|&d| d as Count).collect();
    let comm = world
        .create_cartesian_communicator(&cart_dims, &[false; 3], false)
        .expect("every rank takes part in the cartesian context");
    let CartesianLayout { coords, .. } = comm.get_layout();
    let coords = [
        coords[0] as usize,
        coords[1] as usize,
        coords[2] as usize,
    ];
    let mut neighbours = NeighbourTable::default();
    for dir in Direction::ALL {
        let peer = neighbour_coords(coords, dims, dir).map(|neighbour| {
            let neighbour: Vec<Count> = neighbour.iter().map(|&c| c as Count).collect();
            comm.coordinates_to_rank(&neighbour)
        });
        neighbours.set(dir, peer);
    }
    CartesianContext {
        rank: comm.rank(),
        comm,
        coords,
        neighbours,
    }
}
