use std::cmp::Ordering;

use crate::communication::Rank;
use crate::error::ConfigError;
use crate::parameters::Parameters;

pub const NUM_DIMS: usize = 3;

/// The six face directions of a subdomain, in axis order X, Y, Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    XLower,
    XUpper,
    YLower,
    YUpper,
    ZLower,
    ZUpper,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::XLower,
        Direction::XUpper,
        Direction::YLower,
        Direction::YUpper,
        Direction::ZLower,
        Direction::ZUpper,
    ];

    pub fn from_axis(axis: usize, upper: bool) -> Direction {
        Self::ALL[2 * axis + upper as usize]
    }

    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_upper(self) -> bool {
        self.index() % 2 == 1
    }

    pub fn opposite(self) -> Direction {
        Self::from_axis(self.axis(), !self.is_upper())
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// In-plane axes of a face normal to `axis`, in X, Y, Z order.
pub fn face_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Peer rank per face direction; `None` on the physical domain boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeighbourTable([Option<Rank>; 6]);

impl NeighbourTable {
    pub fn get(&self, dir: Direction) -> Option<Rank> {
        self.0[dir.index()]
    }

    pub fn set(&mut self, dir: Direction, rank: Option<Rank>) {
        self.0[dir.index()] = rank;
    }

    pub fn has(&self, dir: Direction) -> bool {
        self.get(dir).is_some()
    }

    pub fn is_isolated(&self) -> bool {
        self.0.iter().all(|rank| rank.is_none())
    }
}

/// Most balanced factorization of `num_ranks` into a process grid whose
/// factors divide the cell counts (points - 1) per axis. Ties prefer the
/// lexicographically greatest triple, so surplus ranks land on X first.
pub fn balanced_process_grid(
    num_ranks: usize,
    points: [usize; 3],
) -> Result<[usize; 3], ConfigError> {
    let mut best: Option<[usize; 3]> = None;
    for px in divisors(num_ranks) {
        for py in divisors(num_ranks / px) {
            let pz = num_ranks / px / py;
            let dims = [px, py, pz];
            let divides = (0..3).all(|axis| (points[axis] - 1) % dims[axis] == 0);
            if !divides {
                continue;
            }
            if best.map_or(true, |current| prefer(dims, current)) {
                best = Some(dims);
            }
        }
    }
    best.ok_or(ConfigError::Indivisible {
        num_ranks,
        nx: points[0],
        ny: points[1],
        nz: points[2],
    })
}

fn divisors(n: usize) -> impl Iterator<Item = usize> {
    (1..=n).filter(move |d| n % d == 0)
}

fn spread(dims: [usize; 3]) -> usize {
    dims.iter().max().unwrap() - dims.iter().min().unwrap()
}

fn prefer(candidate: [usize; 3], current: [usize; 3]) -> bool {
    match spread(candidate).cmp(&spread(current)) {
        Ordering::Less => true,
        Ordering::Equal => candidate > current,
        Ordering::Greater => false,
    }
}

/// Coordinates of the neighbouring process in direction `dir`, or `None`
/// past the edge of the process grid.
pub fn neighbour_coords(
    coords: [usize; 3],
    dims: [usize; 3],
    dir: Direction,
) -> Option<[usize; 3]> {
    let axis = dir.axis();
    let mut neighbour = coords;
    if dir.is_upper() {
        if coords[axis] + 1 >= dims[axis] {
            return None;
        }
        neighbour[axis] += 1;
    } else {
        if coords[axis] == 0 {
            return None;
        }
        neighbour[axis] -= 1;
    }
    Some(neighbour)
}

/// The slice of the global grid owned by one process. Adjacent subdomains
/// share their boundary plane.
#[derive(Clone, Debug)]
pub struct Subdomain {
    pub dims: [usize; 3],
    pub coords: [usize; 3],
    pub extents: [usize; 3],
    pub spacing: [f64; 3],
    pub neighbours: NeighbourTable,
}

impl Subdomain {
    pub fn new(
        parameters: &Parameters,
        dims: [usize; 3],
        coords: [usize; 3],
        neighbours: NeighbourTable,
    ) -> Self {
        let extents = [0, 1, 2].map(|axis| {
            debug_assert_eq!((parameters.points[axis] - 1) % dims[axis], 0);
            (parameters.points[axis] - 1) / dims[axis] + 1
        });
        Self {
            dims,
            coords,
            extents,
            spacing: parameters.spacing(),
            neighbours,
        }
    }

    /// Physical coordinate of a local node index along `axis`.
    pub fn global_position(&self, axis: usize, index: usize) -> f64 {
        (self.coords[axis] * (self.extents[axis] - 1) + index) as f64 * self.spacing[axis]
    }

    /// True for exactly one of the subdomains sharing a node, so global
    /// accumulations count every node once.
    pub fn owns_node(&self, index: [usize; 3]) -> bool {
        (0..3).all(|axis| {
            index[axis] < self.extents[axis] - 1 || self.coords[axis] == self.dims[axis] - 1
        })
    }
}
