//! Plane buffers carrying face data between neighbouring subdomains.

use std::ops::Index;
use std::ops::IndexMut;

use crate::field::Field;
use crate::topology::face_axes;
use crate::topology::Direction;
use crate::topology::NeighbourTable;

/// One linearized face plane. A plane for a face normal to some axis spans
/// (n_a - 1) x (n_b - 1) entries over the two in-plane axes; only the
/// in-plane interior is ever written.
#[derive(Clone, Debug)]
pub struct Plane {
    cols: usize,
    values: Vec<f64>,
}

impl Plane {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.cols + col] = value;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

/// Six planes, one per face direction.
pub struct PlaneSet([Plane; 6]);

impl PlaneSet {
    pub fn for_extents(extents: [usize; 3]) -> Self {
        Self(Direction::ALL.map(|dir| {
            let (a, b) = face_axes(dir.axis());
            Plane::new(extents[a] - 1, extents[b] - 1)
        }))
    }
}

impl Index<Direction> for PlaneSet {
    type Output = Plane;

    fn index(&self, dir: Direction) -> &Plane {
        &self.0[dir.index()]
    }
}

impl IndexMut<Direction> for PlaneSet {
    fn index_mut(&mut self, dir: Direction) -> &mut Plane {
        &mut self.0[dir.index()]
    }
}

/// Send and receive planes, allocated once and reused every iteration.
/// Planes of faces without a peer exist but carry no traffic.
pub struct HaloBuffers {
    pub send: PlaneSet,
    pub recv: PlaneSet,
}

impl HaloBuffers {
    pub fn for_extents(extents: [usize; 3]) -> Self {
        Self {
            send: PlaneSet::for_extents(extents),
            recv: PlaneSet::for_extents(extents),
        }
    }
}

/// Linearizes the first interior slab of T0 into the send plane of every
/// face with a peer, iterating the in-plane axes over their interior.
pub fn pack_faces(t0: &Field, neighbours: &NeighbourTable, send: &mut PlaneSet) {
    let extents = t0.extents();
    for dir in Direction::ALL {
        if !neighbours.has(dir) {
            continue;
        }
        let axis = dir.axis();
        let slab = if dir.is_upper() { extents[axis] - 2 } else { 1 };
        let (a, b) = face_axes(axis);
        let plane = &mut send[dir];
        for u in 1..extents[a] - 1 {
            for v in 1..extents[b] - 1 {
                let mut index = [0; 3];
                index[axis] = slab;
                index[a] = u;
                index[b] = v;
                plane.set(u - 1, v - 1, t0[index]);
            }
        }
    }
}
