// atlas_core/src/types.rs

use nalgebra::{DMatrix, DVector};
use std::ops::Range;

// --- Core Identifier ---
// A generic, framework-agnostic identifier for a sensor instance.
// On a real robot, this might be a hardware ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SensorHandle(pub u64);

/// Identifier of one raw sample in a hardware source's buffer.
pub type RawId = u32;

/// An ordered set of indices addressing a sub-block of the dense filter
/// state. The robot's 7-scalar pose block is always addressed through one of
/// these, no matter how large the full state grows with mapped landmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet(Vec<usize>);

impl IndexSet {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn from_range(range: Range<usize>) -> Self {
        Self(range.collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// A new set addressing `range` of this set's own entries
    /// (e.g. the position part of a pose block).
    pub fn subset(&self, range: Range<usize>) -> IndexSet {
        Self(self.0[range].to_vec())
    }

    /// Copies the addressed entries of `x` into a new dense vector.
    pub fn gather_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(self.len(), self.iter().map(|i| x[i]))
    }

    /// Copies the addressed square sub-block `p[self, self]`.
    pub fn gather_matrix(&self, p: &DMatrix<f64>) -> DMatrix<f64> {
        self.gather_block(self, p)
    }

    /// Copies the rectangular sub-block `p[self, cols]`.
    pub fn gather_block(&self, cols: &IndexSet, p: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.len(), cols.len());
        for (r, i) in self.iter().enumerate() {
            for (c, j) in cols.iter().enumerate() {
                out[(r, c)] = p[(i, j)];
            }
        }
        out
    }

    /// Writes `values` back into the addressed entries of `target`.
    pub fn scatter_vector(&self, target: &mut DVector<f64>, values: &[f64]) {
        debug_assert_eq!(self.len(), values.len());
        for (k, i) in self.iter().enumerate() {
            target[i] = values[k];
        }
    }

    /// Writes `block` back into the sub-block `target[self, cols]`.
    pub fn scatter_block(&self, cols: &IndexSet, target: &mut DMatrix<f64>, block: &DMatrix<f64>) {
        debug_assert_eq!((self.len(), cols.len()), block.shape());
        for (r, i) in self.iter().enumerate() {
            for (c, j) in cols.iter().enumerate() {
                target[(i, j)] = block[(r, c)];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_and_scatter_round_trip() {
        let ia = IndexSet::new(vec![1, 3, 4]);
        let x = DVector::from_column_slice(&[0.0, 10.0, 0.0, 30.0, 40.0]);
        let sub = ia.gather_vector(&x);
        assert_eq!(sub.as_slice(), &[10.0, 30.0, 40.0]);

        let mut y = DVector::zeros(5);
        ia.scatter_vector(&mut y, sub.as_slice());
        assert_eq!(y[1], 10.0);
        assert_eq!(y[3], 30.0);
        assert_eq!(y[4], 40.0);
        assert_eq!(y[0], 0.0);
    }

    #[test]
    fn gather_block_addresses_rows_and_columns() {
        let rows = IndexSet::from_range(0..2);
        let cols = IndexSet::new(vec![2]);
        let p = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let block = rows.gather_block(&cols, &p);
        assert_eq!(block.shape(), (2, 1));
        assert_eq!(block[(0, 0)], 3.0);
        assert_eq!(block[(1, 0)], 6.0);
    }

    #[test]
    fn subset_keeps_order() {
        let ia = IndexSet::from_range(4..11);
        assert_eq!(ia.subset(0..3).as_slice(), &[4, 5, 6]);
        assert_eq!(ia.subset(3..7).as_slice(), &[7, 8, 9, 10]);
    }
}
