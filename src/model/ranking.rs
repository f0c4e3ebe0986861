//! Ranking: a reflexive, transitive relation (preorder).

use serde::{Deserialize, Serialize};
use super::bits::BitMatrix;
use super::{BinaryRelation, Equivalence, RoleKind, RoleStructure};

/// A preorder on `{0..n-1}`. `contains(i, j)` reads "`i` is ranked at most
/// as high as `j`".
///
/// Every constructor establishes reflexivity and transitivity, so no value
/// of this type violates the preorder laws.
///
/// Deserialization reads the matrix as a `BinaryRelation` and closes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BinaryRelation")]
pub struct Ranking {
    matrix: BitMatrix,
}

impl Ranking {
    /// Only `i ≤ i` (the bottom element).
    pub fn identity(n: usize) -> Self {
        Self { matrix: BitMatrix::identity(n) }
    }

    /// Every pair related (the top element).
    pub fn universal(n: usize) -> Self {
        Self { matrix: BitMatrix::full(n) }
    }

    /// The reflexive transitive closure of `relation`.
    pub fn from_relation(relation: &BinaryRelation) -> Self {
        Self::closed(relation.matrix().clone())
    }

    pub fn from_equivalence(equivalence: &Equivalence) -> Self {
        let n = equivalence.domain_size();
        Self { matrix: BitMatrix::from_fn(n, |i, j| equivalence.are_equivalent(i, j)) }
    }

    /// Reflexive transitive closure of the pairs produced by `f`.
    pub fn from_fn(n: usize, f: impl FnMut(usize, usize) -> bool) -> Self {
        Self::closed(BitMatrix::from_fn(n, f))
    }

    fn closed(mut matrix: BitMatrix) -> Self {
        matrix.set_reflexive();
        matrix.close_transitively();
        Self { matrix }
    }

    pub fn domain_size(&self) -> usize {
        self.matrix.size()
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.matrix.get(i, j)
    }

    /// Nodes `j` with `i ≤ j`, ascending.
    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.matrix.iter_row(i)
    }

    pub fn count_pairs(&self) -> usize {
        self.matrix.count_ones()
    }

    /// The reversed preorder.
    pub fn invert(&self) -> Self {
        Self { matrix: self.matrix.transpose() }
    }

    /// Rankings are transitive already; kept so that generic code can close
    /// rankings and relations alike.
    pub fn close_transitively(&self) -> Self {
        self.clone()
    }

    /// Nodes ranked mutually at most as high as each other.
    pub fn symmetric_part(&self) -> Equivalence {
        let n = self.domain_size();
        let mut labels = vec![usize::MAX; n];
        for i in 0..n {
            if labels[i] != usize::MAX {
                continue;
            }
            labels[i] = i;
            for j in self.successors(i).filter(|&j| j > i) {
                if self.contains(j, i) {
                    labels[j] = i;
                }
            }
        }
        Equivalence::from_classes(labels)
    }

    pub fn to_relation(&self) -> BinaryRelation {
        BinaryRelation::from_matrix(self.matrix.clone())
    }
}

impl RoleStructure for Ranking {
    const KIND: RoleKind = RoleKind::Ranking;

    fn domain_size(&self) -> usize {
        self.matrix.size()
    }

    fn top(n: usize) -> Self {
        Self::universal(n)
    }

    fn bottom(n: usize) -> Self {
        Self::identity(n)
    }

    /// Intersections of preorders are preorders.
    fn infimum(&self, other: &Self) -> Self {
        Self { matrix: self.matrix.and(&other.matrix) }
    }

    fn supremum(&self, other: &Self) -> Self {
        Self::closed(self.matrix.or(&other.matrix))
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
        for i in 0..n {
            for j in within.successors(i) {
                if i == j || related(i, j) {
                    matrix.set(i, j);
                }
            }
        }
        let before = matrix.count_ones();
        matrix.close_transitively();
        let repaired = matrix.count_ones() - before;
        if repaired > 0 {
            tracing::debug!(pairs = repaired, "ranking pairwise test was not transitive; closed");
        }
        Self { matrix }
    }
}

impl From<BinaryRelation> for Ranking {
    fn from(relation: BinaryRelation) -> Self {
        Self::from_relation(&relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_relation_is_reflexive_and_transitive() {
        let r = BinaryRelation::from_pairs(3, [(0, 1), (1, 2)]);
        let ranking = Ranking::from_relation(&r);
        for i in 0..3 {
            assert!(ranking.contains(i, i));
        }
        assert!(ranking.contains(0, 2));
        assert!(!ranking.contains(2, 0));
    }

    #[test]
    fn supremum_stays_transitive() {
        let a = Ranking::from_fn(3, |i, j| (i, j) == (0, 1));
        let b = Ranking::from_fn(3, |i, j| (i, j) == (1, 2));
        let join = a.supremum(&b);
        assert!(join.contains(0, 2));
        assert!(a.refines(&join) && b.refines(&join));
    }

    #[test]
    fn invert_reverses_pairs() {
        let a = Ranking::from_fn(2, |i, j| (i, j) == (0, 1));
        assert!(a.invert().contains(1, 0));
        assert!(!a.invert().contains(0, 1));
    }

    #[test]
    fn symmetric_part_collects_ties() {
        let r = Ranking::from_fn(4, |i, j| matches!((i, j), (0, 2) | (2, 0) | (1, 3)));
        assert_eq!(r.symmetric_part(), Equivalence::from_classes([0, 1, 0, 2]));
    }

    #[test]
    fn refine_by_keeps_reflexivity() {
        let r = Ranking::refine_by(&Ranking::universal(3), |_, _| false);
        assert_eq!(r, Ranking::identity(3));
    }

    #[test]
    fn equivalence_round_trip_through_symmetric_part() {
        let e = Equivalence::from_classes([0, 1, 1, 0]);
        assert_eq!(e.to_ranking().symmetric_part(), e);
    }

    #[test]
    fn deserialize_restores_preorder_laws() {
        let r: Ranking = serde_json::from_str(r#"{"matrix":{"n":2,"words":1,"bits":[0,0]}}"#).unwrap();
        assert!(r.contains(0, 0));
        assert_eq!(r, Ranking::identity(2));
        // 0 ≤ 1 and 1 ≤ 2 without 0 ≤ 2
        let r: Ranking = serde_json::from_str(r#"{"matrix":{"n":3,"words":1,"bits":[2,4,0]}}"#).unwrap();
        assert!(r.contains(0, 2));
        let chain = Ranking::from_fn(3, |i, j| j == i + 1);
        assert_eq!(serde_json::from_str::<Ranking>(&serde_json::to_string(&chain).unwrap()).unwrap(), chain);
    }
}
