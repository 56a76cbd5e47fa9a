use std::ops::Index;
use std::ops::IndexMut;

/// Dense 3D scalar array over one contiguous buffer, indexed `[i, j, k]`
/// with k fastest.
#[derive(Clone, Debug)]
pub struct Field {
    extents: [usize; 3],
    values: Vec<f64>,
}

impl Field {
    pub fn zeros(extents: [usize; 3]) -> Self {
        Self {
            extents,
            values: vec![0.0; extents[0] * extents[1] * extents[2]],
        }
    }

    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    pub fn strides(&self) -> [usize; 3] {
        [self.extents[1] * self.extents[2], self.extents[2], 1]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn copy_from(&mut self, other: &Field) {
        debug_assert_eq!(self.extents, other.extents);
        self.values.copy_from_slice(&other.values);
    }

    fn offset(&self, index: [usize; 3]) -> usize {
        (index[0] * self.extents[1] + index[1]) * self.extents[2] + index[2]
    }
}

impl Index<[usize; 3]> for Field {
    type Output = f64;

    fn index(&self, index: [usize; 3]) -> &f64 {
        &self.values[self.offset(index)]
    }
}

impl IndexMut<[usize; 3]> for Field {
    fn index_mut(&mut self, index: [usize; 3]) -> &mut f64 {
        let offset = self.offset(index);
        &mut self.values[offset]
    }
}

/// Current and previous iterate. T0 is read-only within a step; T is
/// written.
pub struct FieldPair {
    pub t: Field,
    pub t0: Field,
}

impl FieldPair {
    pub fn zeros(extents: [usize; 3]) -> Self {
        Self {
            t: Field::zeros(extents),
            t0: Field::zeros(extents),
        }
    }

    /// Seeds T0 with the T of the previous step.
    pub fn snapshot(&mut self) {
        self.t0.copy_from(&self.t);
    }

    pub fn split_mut(&mut self) -> (&mut Field, &Field) {
        (&mut self.t, &self.t0)
    }
}

#[cfg(test)]
mod tests {
    use super::Field;
    use super::FieldPair;

    #[test]
    fn indexing_is_k_fastest() {
        let mut field = Field::zeros([2, 3, 4]);
        field[[0, 0, 1]] = 1.0;
        field[[0, 1, 0]] = 2.0;
        field[[1, 0, 0]] = 3.0;
        assert_eq!(field.values()[1], 1.0);
        assert_eq!(field.values()[4], 2.0);
        assert_eq!(field.values()[12], 3.0);
        assert_eq!(field.strides(), [12, 4, 1]);
    }

    #[test]
    fn snapshot_copies_the_current_iterate() {
        let mut fields = FieldPair::zeros([3, 3, 3]);
        fields.t[[1, 1, 1]] = 4.5;
        fields.snapshot();
        assert_eq!(fields.t0[[1, 1, 1]], 4.5);
        fields.t[[1, 1, 1]] = 6.0;
        assert_eq!(fields.t0[[1, 1, 1]], 4.5);
    }
}
