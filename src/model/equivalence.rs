//! Equivalence: a partition of the node set.

use std::cmp::Ordering;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use super::{RoleKind, RoleStructure, Ranking};

/// A partition of `{0..n-1}` stored as node → class id.
///
/// Class ids are always canonical: gap-free and numbered in the order in
/// which classes first occur when scanning nodes `0..n`. Two equivalences
/// are therefore equal iff they induce the same partition.
///
/// Serialized as the list of class ids. Deserialization relabels through
/// `from_classes`, so any labels are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct Equivalence {
    classes: Vec<usize>,
    count: usize,
}

impl Equivalence {
    /// Build from arbitrary class labels. Labels are only compared for
    /// equality.
    pub fn from_classes(labels: impl IntoIterator<Item = usize>) -> Self {
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let classes: Vec<usize> = labels
            .into_iter()
            .map(|label| {
                let next = remap.len();
                *remap.entry(label).or_insert(next)
            })
            .collect();
        Self { classes, count: remap.len() }
    }

    /// Every node in its own class (the bottom element).
    pub fn discrete(n: usize) -> Self {
        Self { classes: (0..n).collect(), count: n }
    }

    /// All nodes in one class (the top element).
    pub fn universal(n: usize) -> Self {
        Self { classes: vec![0; n], count: usize::from(n > 0) }
    }

    pub fn domain_size(&self) -> usize {
        self.classes.len()
    }

    pub fn class_of(&self, node: usize) -> usize {
        self.classes[node]
    }

    pub fn count_classes(&self) -> usize {
        self.count
    }

    pub fn are_equivalent(&self, i: usize, j: usize) -> bool {
        self.classes[i] == self.classes[j]
    }

    /// The class id of every node.
    pub fn as_slice(&self) -> &[usize] {
        &self.classes
    }

    /// Members of every class, classes in id order, members ascending.
    pub fn classes(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.count];
        for (node, &class) in self.classes.iter().enumerate() {
            members[class].push(node);
        }
        members
    }

    /// The preorder in which `i ≤ j` iff `i` and `j` share a class.
    pub fn to_ranking(&self) -> Ranking {
        Ranking::from_equivalence(self)
    }

    /// Split every class by a total preorder on its members: within a class,
    /// members end up together iff `cmp` reports them equal. `cmp` must be
    /// a consistent total preorder on each class.
    pub fn split_by(&self, mut cmp: impl FnMut(usize, usize) -> Ordering) -> Self {
        let mut labels = vec![0usize; self.domain_size()];
        let mut next = 0usize;
        for mut members in self.classes() {
            members.sort_by(|&a, &b| cmp(a, b).then(a.cmp(&b)));
            let mut previous: Option<usize> = None;
            for node in members {
                match previous {
                    Some(p) if cmp(p, node) == Ordering::Equal => {}
                    _ => next += 1,
                }
                labels[node] = next;
                previous = Some(node);
            }
        }
        Self::from_classes(labels)
    }

    fn union_find_root(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }
}

impl RoleStructure for Equivalence {
    const KIND: RoleKind = RoleKind::Equivalence;

    fn domain_size(&self) -> usize {
        self.classes.len()
    }

    fn top(n: usize) -> Self {
        Self::universal(n)
    }

    fn bottom(n: usize) -> Self {
        Self::discrete(n)
    }

    fn infimum(&self, other: &Self) -> Self {
        debug_assert_eq!(self.domain_size(), other.domain_size());
        let mut pairs: HashMap<(usize, usize), usize> = HashMap::new();
        let labels: Vec<usize> = self
            .classes
            .iter()
            .zip(&other.classes)
            .map(|(&a, &b)| {
                let next = pairs.len();
                *pairs.entry((a, b)).or_insert(next)
            })
            .collect();
        Self::from_classes(labels)
    }

    fn supremum(&self, other: &Self) -> Self {
        debug_assert_eq!(self.domain_size(), other.domain_size());
        let n = self.domain_size();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut first_in_class: HashMap<(bool, usize), usize> = HashMap::new();
        for node in 0..n {
            for key in [(false, self.classes[node]), (true, other.classes[node])] {
                let rep = *first_in_class.entry(key).or_insert(node);
                let a = Self::union_find_root(&mut parent, rep);
                let b = Self::union_find_root(&mut parent, node);
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
        let labels: Vec<usize> = (0..n).map(|x| Self::union_find_root(&mut parent, x)).collect();
        Self::from_classes(labels)
    }

    fn refines(&self, other: &Self) -> bool {
        if self.domain_size() != other.domain_size() {
            return false;
        }
        let mut image: HashMap<usize, usize> = HashMap::new();
        self.classes
            .iter()
            .zip(&other.classes)
            .all(|(&fine, &coarse)| *image.entry(fine).or_insert(coarse) == coarse)
    }

    fn relates(&self, i: usize, j: usize) -> bool {
        self.are_equivalent(i, j)
    }

    /// Representative splitting: inside each class of `within`, a node joins
    /// the first existing subclass whose representative (smallest member)
    /// it relates to in both directions, otherwise it opens a new subclass.
    /// For a transitive predicate this is exactly the induced partition.
    fn refine_by(within: &Self, mut related: impl FnMut(usize, usize) -> bool) -> Self {
        let mut labels = vec![0usize; within.domain_size()];
        let mut next = 0usize;
        for members in within.classes() {
            let mut representatives: Vec<(usize, usize)> = Vec::new();
            for node in members {
                let found = representatives
                    .iter()
                    .find(|&&(rep, _)| related(rep, node) && related(node, rep))
                    .map(|&(_, label)| label);
                labels[node] = match found {
                    Some(label) => label,
                    None => {
                        let label = next;
                        next += 1;
                        representatives.push((node, label));
                        label
                    }
                };
            }
        }
        Self::from_classes(labels)
    }
}

impl From<Vec<usize>> for Equivalence {
    fn from(labels: Vec<usize>) -> Self {
        Self::from_classes(labels)
    }
}

impl From<Equivalence> for Vec<usize> {
    fn from(equivalence: Equivalence) -> Self {
        equivalence.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_canonicalized() {
        let a = Equivalence::from_classes([7, 3, 7, 9]);
        assert_eq!(a.as_slice(), &[0, 1, 0, 2]);
        assert_eq!(a, Equivalence::from_classes([1, 0, 1, 5]));
        assert_eq!(a.count_classes(), 3);
    }

    #[test]
    fn infimum_is_common_refinement() {
        let a = Equivalence::from_classes([0, 0, 1, 1]);
        let b = Equivalence::from_classes([0, 1, 1, 1]);
        let meet = a.infimum(&b);
        assert_eq!(meet, Equivalence::from_classes([0, 1, 2, 2]));
        assert!(meet.refines(&a));
        assert!(meet.refines(&b));
    }

    #[test]
    fn supremum_merges_chains() {
        let a = Equivalence::from_classes([0, 0, 1, 2, 3]);
        let b = Equivalence::from_classes([0, 1, 1, 2, 2]);
        assert_eq!(a.supremum(&b), Equivalence::from_classes([0, 0, 0, 1, 1]));
    }

    #[test]
    fn top_and_bottom_bound_everything() {
        let a = Equivalence::from_classes([0, 1, 0, 2]);
        assert!(Equivalence::bottom(4).refines(&a));
        assert!(a.refines(&Equivalence::top(4)));
        assert!(!Equivalence::top(4).refines(&a));
    }

    #[test]
    fn empty_domain() {
        let e = Equivalence::universal(0);
        assert_eq!(e.count_classes(), 0);
        assert_eq!(e, Equivalence::discrete(0));
    }

    #[test]
    fn split_by_groups_equal_keys() {
        let keys = [2, 1, 2, 1, 3];
        let e = Equivalence::universal(5).split_by(|a, b| keys[a].cmp(&keys[b]));
        assert_eq!(e, Equivalence::from_classes([0, 1, 0, 1, 2]));
    }

    #[test]
    fn refine_by_respects_within() {
        let within = Equivalence::from_classes([0, 0, 1, 1]);
        let e = Equivalence::refine_by(&within, |_, _| true);
        assert_eq!(e, within);
        let e = Equivalence::refine_by(&within, |a, b| a == b);
        assert_eq!(e, Equivalence::discrete(4));
    }

    #[test]
    fn deserialize_canonicalizes_labels() {
        let e: Equivalence = serde_json::from_str("[3]").unwrap();
        assert_eq!(e, Equivalence::universal(1));
        assert_eq!(e.classes(), vec![vec![0]]);
        let e: Equivalence = serde_json::from_str("[5, 9, 5]").unwrap();
        assert_eq!(e, Equivalence::from_classes([0, 1, 0]));
        assert_eq!(serde_json::to_string(&e).unwrap(), "[0,1,0]");
    }
}
