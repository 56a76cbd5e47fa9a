use crate::field::Field;
use crate::topology::face_axes;
use crate::topology::Direction;
use crate::topology::Subdomain;

/// Writes the Dirichlet data on every face that lies on the physical
/// domain boundary. The bottom face stays at zero, the top face is held
/// at one, and the remaining faces carry the global Y-coordinate of each
/// node, which is also the analytic steady state.
pub fn apply_dirichlet(field: &mut Field, subdomain: &Subdomain) {
    for dir in Direction::ALL {
        if subdomain.neighbours.has(dir) {
            continue;
        }
        match dir {
            Direction::YLower => {}
            Direction::YUpper => fill_face(field, dir, |_| 1.0),
            _ => fill_face(field, dir, |index| subdomain.global_position(1, index[1])),
        }
    }
}

fn fill_face(field: &mut Field, dir: Direction, value: impl Fn([usize; 3]) -> f64) {
    let extents = field.extents();
    let axis = dir.axis();
    let face = if dir.is_upper() { extents[axis] - 1 } else { 0 };
    let (a, b) = face_axes(axis);
    for u in 0..extents[a] {
        for v in 0..extents[b] {
            let mut index = [0; 3];
            index[axis] = face;
            index[a] = u;
            index[b] = v;
            field[index] = value(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::apply_dirichlet;
    use crate::field::Field;
    use crate::parameters::Parameters;
    use crate::test_utils::assert_is_close;
    use crate::topology::Direction;
    use crate::topology::NeighbourTable;
    use crate::topology::Subdomain;

    #[test]
    fn physical_faces_carry_the_reference_field() {
        let parameters = Parameters::new([5, 5, 5], 1, 0.0).unwrap();
        let subdomain = Subdomain::new(
            &parameters,
            [1, 1, 1],
            [0, 0, 0],
            NeighbourTable::default(),
        );
        let mut field = Field::zeros(subdomain.extents);
        apply_dirichlet(&mut field, &subdomain);
        for j in 0..5 {
            for k in 0..5 {
                assert_is_close(field[[0, j, k]], j as f64 * 0.25);
                assert_is_close(field[[4, j, k]], j as f64 * 0.25);
                assert_is_close(field[[j, k, 0]], k as f64 * 0.25);
            }
        }
        for i in 0..5 {
            for k in 0..5 {
                assert_is_close(field[[i, 4, k]], 1.0);
                assert_is_close(field[[i, 0, k]], 0.0);
            }
        }
        assert_is_close(field[[2, 2, 2]], 0.0);
    }

    #[test]
    fn faces_with_a_peer_are_left_untouched() {
        let parameters = Parameters::new([5, 5, 5], 1, 0.0).unwrap();
        let mut neighbours = NeighbourTable::default();
        neighbours.set(Direction::XLower, Some(1));
        let subdomain = Subdomain::new(&parameters, [1, 1, 1], [0, 0, 0], neighbours);
        let mut field = Field::zeros(subdomain.extents);
        apply_dirichlet(&mut field, &subdomain);
        for j in 1..4 {
            for k in 1..4 {
                assert_is_close(field[[0, j, k]], 0.0);
            }
        }
        // The peer face still receives values where the Z faces meet it.
        assert_is_close(field[[0, 2, 0]], 0.5);
    }
}
