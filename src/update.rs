//! The per-step update phases: interior stencil, face interiors fed by
//! received halos, edge extrapolation, corner averaging.

use crate::field::Field;
use crate::halo::PlaneSet;
use crate::topology::face_axes;
use crate::topology::Direction;
use crate::topology::NeighbourTable;

/// Applies the 7-point stencil to the strict interior. Reads only T0, so
/// it may run while halo planes are in flight.
pub fn update_interior(t: &mut Field, t0: &Field, diffusion: [f64; 3]) {
    let [nx, ny, nz] = t0.extents();
    let [sx, sy, _] = t0.strides();
    let old = t0.values();
    let new = t.values_mut();
    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            let row = (i * ny + j) * nz;
            for k in 1..nz - 1 {
                let c = row + k;
                let center = old[c];
                new[c] = center
                    + diffusion[0] * (old[c + sx] - 2.0 * center + old[c - sx])
                    + diffusion[1] * (old[c + sy] - 2.0 * center + old[c - sy])
                    + diffusion[2] * (old[c + 1] - 2.0 * center + old[c - 1]);
            }
        }
    }
}

/// Applies the stencil on the interior of every face with a peer, with the
/// off-process term supplied by the received halo plane.
pub fn update_faces(
    t: &mut Field,
    t0: &Field,
    neighbours: &NeighbourTable,
    recv: &PlaneSet,
    diffusion: [f64; 3],
) {
    let extents = t0.extents();
    for dir in Direction::ALL {
        if !neighbours.has(dir) {
            continue;
        }
        let axis = dir.axis();
        let face = if dir.is_upper() { extents[axis] - 1 } else { 0 };
        let (a, b) = face_axes(axis);
        let halo = &recv[dir];
        for u in 1..extents[a] - 1 {
            for v in 1..extents[b] - 1 {
                let mut index = [0; 3];
                index[axis] = face;
                index[a] = u;
                index[b] = v;
                let center = t0[index];
                let mut value = center;
                for ax in 0..3 {
                    let above = if ax == axis && dir.is_upper() {
                        halo.at(u - 1, v - 1)
                    } else {
                        let mut up = index;
                        up[ax] += 1;
                        t0[up]
                    };
                    let below = if ax == axis && !dir.is_upper() {
                        halo.at(u - 1, v - 1)
                    } else {
                        let mut down = index;
                        down[ax] -= 1;
                        t0[down]
                    };
                    value += diffusion[ax] * (above - 2.0 * center + below);
                }
                t[index] = value;
            }
        }
    }
}

fn boundary_cells(upper: bool, extent: usize) -> (usize, usize, usize) {
    if upper {
        (extent - 1, extent - 2, extent - 3)
    } else {
        (0, 1, 2)
    }
}

fn corner_cells(upper: bool, extent: usize) -> (usize, usize) {
    if upper {
        (extent - 1, extent - 2)
    } else {
        (0, 1)
    }
}

/// Fills the edge cells between two peer faces by linear extrapolation.
/// An edge is owned by the earlier axis in X, Y, Z order and extrapolated
/// along it.
pub fn extrapolate_edges(t: &mut Field, neighbours: &NeighbourTable) {
    let extents = t.extents();
    for (p, q) in [(0, 1), (0, 2), (1, 2)] {
        if extents[p] < 3 {
            continue;
        }
        let r = 3 - p - q;
        for p_upper in [false, true] {
            for q_upper in [false, true] {
                if !neighbours.has(Direction::from_axis(p, p_upper))
                    || !neighbours.has(Direction::from_axis(q, q_upper))
                {
                    continue;
                }
                let (edge_p, first_p, second_p) = boundary_cells(p_upper, extents[p]);
                let (edge_q, _) = corner_cells(q_upper, extents[q]);
                for w in 1..extents[r] - 1 {
                    let mut edge = [0; 3];
                    edge[p] = edge_p;
                    edge[q] = edge_q;
                    edge[r] = w;
                    let mut first = edge;
                    first[p] = first_p;
                    let mut second = edge;
                    second[p] = second_p;
                    t[edge] = 2.0 * t[first] - t[second];
                }
            }
        }
    }
}

/// Sets each corner cell with three peer faces to the mean of its three
/// inward neighbours. Runs after the edges are in place.
pub fn average_corners(t: &mut Field, neighbours: &NeighbourTable) {
    let [nx, ny, nz] = t.extents();
    for x_upper in [false, true] {
        for y_upper in [false, true] {
            for z_upper in [false, true] {
                if !neighbours.has(Direction::from_axis(0, x_upper))
                    || !neighbours.has(Direction::from_axis(1, y_upper))
                    || !neighbours.has(Direction::from_axis(2, z_upper))
                {
                    continue;
                }
                let (ci, ii) = corner_cells(x_upper, nx);
                let (cj, ij) = corner_cells(y_upper, ny);
                let (ck, ik) = corner_cells(z_upper, nz);
                t[[ci, cj, ck]] =
                    (t[[ii, cj, ck]] + t[[ci, ij, ck]] + t[[ci, cj, ik]]) / 3.0;
            }
        }
    }
}
