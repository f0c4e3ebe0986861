//! BinaryRelation: an unconstrained relation on the node set.

use serde::{Deserialize, Serialize};
use super::bits::BitMatrix;
use super::{RoleKind, RoleStructure};
use crate::{Error, Result};

/// A binary relation on `{0..n-1}` with no reflexivity or transitivity
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryRelation {
    matrix: BitMatrix,
}

impl BinaryRelation {
    /// No pairs (the bottom element).
    pub fn empty(n: usize) -> Self {
        Self { matrix: BitMatrix::zeros(n) }
    }

    /// All pairs (the top element).
    pub fn universal(n: usize) -> Self {
        Self { matrix: BitMatrix::full(n) }
    }

    /// # Errors
    /// `NodeOutOfRange` for the first pair that refers to a node `>= n`.
    pub fn try_from_pairs(n: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let mut matrix = BitMatrix::zeros(n);
        for (i, j) in pairs {
            let node = i.max(j);
            if node >= n {
                return Err(Error::NodeOutOfRange { node, count: n });
            }
            matrix.set(i, j);
        }
        Ok(Self { matrix })
    }

    /// # Panics
    /// If a pair refers to a node `>= n`; see `try_from_pairs`.
    pub fn from_pairs(n: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut matrix = BitMatrix::zeros(n);
        for (i, j) in pairs {
            assert!(i < n && j < n, "pair ({i}, {j}) outside domain of size {n}");
            matrix.set(i, j);
        }
        Self { matrix }
    }

    pub fn from_fn(n: usize, f: impl FnMut(usize, usize) -> bool) -> Self {
        Self { matrix: BitMatrix::from_fn(n, f) }
    }

    pub(crate) fn from_matrix(matrix: BitMatrix) -> Self {
        Self { matrix }
    }

    pub(crate) fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    pub fn domain_size(&self) -> usize {
        self.matrix.size()
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.matrix.get(i, j)
    }

    /// All pairs in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.domain_size()).flat_map(move |i| self.matrix.iter_row(i).map(move |j| (i, j)))
    }

    pub fn count_pairs(&self) -> usize {
        self.matrix.count_ones()
    }

    pub fn invert(&self) -> Self {
        Self { matrix: self.matrix.transpose() }
    }

    /// The least transitive relation containing `self`.
    pub fn close_transitively(&self) -> Self {
        let mut matrix = self.matrix.clone();
        matrix.close_transitively();
        Self { matrix }
    }

    pub fn is_transitive(&self) -> bool {
        self.close_transitively() == *self
    }
}

impl RoleStructure for BinaryRelation {
    const KIND: RoleKind = RoleKind::BinaryRelation;

    fn domain_size(&self) -> usize {
        self.matrix.size()
    }

    fn top(n: usize) -> Self {
        Self::universal(n)
    }

    fn bottom(n: usize) -> Self {
        Self::empty(n)
    }

    fn infimum(&self, other: &Self) -> Self {
        Self { matrix: self.matrix.and(&other.matrix) }
    }

    fn supremum(&self, other: &Self) -> Self {
        Self { matrix: self.matrix.or(&other.matrix) }
    }

    fn refines(&self, other: &Self) -> bool {
        self.matrix.is_subset(&other.matrix)
    }

    fn relates(&self, i: usize, j: usize) -> bool {
        self.contains(i, j)
    }

    fn refine_by(within: &Self, mut related: impl FnMut(usize, usize) -> bool) -> Self {
        let n = within.domain_size();
        let mut matrix = BitMatrix::zeros(n);
        for (i, j) in within.pairs() {
            if related(i, j) {
                matrix.set(i, j);
            }
        }
        Self { matrix }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip() {
        let r = BinaryRelation::from_pairs(4, [(3, 0), (0, 2), (1, 1)]);
        assert_eq!(r.pairs().collect::<Vec<_>>(), vec![(0, 2), (1, 1), (3, 0)]);
        assert_eq!(r.count_pairs(), 3);
    }

    #[test]
    fn try_from_pairs_reports_out_of_range_node() {
        let r = BinaryRelation::try_from_pairs(3, [(0, 2), (2, 1)]).unwrap();
        assert_eq!(r, BinaryRelation::from_pairs(3, [(0, 2), (2, 1)]));
        assert!(matches!(
            BinaryRelation::try_from_pairs(3, [(0, 1), (1, 5)]),
            Err(Error::NodeOutOfRange { node: 5, count: 3 })
        ));
        assert!(matches!(
            BinaryRelation::try_from_pairs(0, [(0, 0)]),
            Err(Error::NodeOutOfRange { node: 0, count: 0 })
        ));
    }

    #[test]
    fn deserialize_rejects_malformed_matrix() {
        let r = BinaryRelation::from_pairs(3, [(0, 2), (2, 1)]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(serde_json::from_str::<BinaryRelation>(&json).unwrap(), r);
        let short = r#"{"matrix":{"n":3,"words":1,"bits":[4]}}"#;
        assert!(serde_json::from_str::<BinaryRelation>(short).is_err());
    }

    #[test]
    fn closure_of_cycle_is_complete_on_cycle() {
        let r = BinaryRelation::from_pairs(3, [(0, 1), (1, 2), (2, 0)]);
        let c = r.close_transitively();
        assert_eq!(c, BinaryRelation::universal(3));
        assert!(c.is_transitive());
        assert!(!r.is_transitive());
    }

    #[test]
    fn closure_does_not_add_reflexive_pairs_without_cycles() {
        let r = BinaryRelation::from_pairs(3, [(0, 1), (1, 2)]);
        let c = r.close_transitively();
        assert!(c.contains(0, 2));
        assert!(!c.contains(0, 0));
    }

    #[test]
    fn lattice_operations_are_set_operations() {
        let a = BinaryRelation::from_pairs(2, [(0, 1), (1, 0)]);
        let b = BinaryRelation::from_pairs(2, [(0, 1), (1, 1)]);
        assert_eq!(a.infimum(&b), BinaryRelation::from_pairs(2, [(0, 1)]));
        assert_eq!(a.supremum(&b).count_pairs(), 3);
        assert_eq!(a.invert(), a);
    }
}
