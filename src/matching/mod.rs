//! # p-Matching Engine
//!
//! Decides whether the ties of one node correspond to the ties of another.
//!
//! The ties of `i` *p-match into* the ties of `j` when every tie of `i` can
//! be assigned to a compatible tie of `j` such that no tie of `j` receives
//! more than `p` ties of `i`. One engine covers every notion:
//!
//! | p                      | Meaning                     | Strategy              |
//! |------------------------|-----------------------------|-----------------------|
//! | `p ≥ ties(i)`          | weak: some partner per tie  | per-tie existential   |
//! | `p = 1`                | exact: one-to-one           | augmenting paths      |
//! | otherwise              | approximate                 | capacitated matching  |
//!
//! Compatibility is supplied by the caller, see `pairwise` for the rules
//! role operators use.

pub(crate) mod pairwise;
pub(crate) mod signature;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::{Error, Result};

/// The matching tolerance `p`: how many ties of the compared node may share
/// one partner tie.
///
/// Serialized as the bare number; deserialization goes through `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PMatching {
    p: usize,
}

impl TryFrom<usize> for PMatching {
    type Error = Error;

    fn try_from(p: usize) -> Result<Self> {
        Self::new(p)
    }
}

impl From<PMatching> for usize {
    fn from(p: PMatching) -> Self {
        p.p
    }
}

impl PMatching {
    /// # Errors
    /// `p = 0` admits no matching at all and is rejected.
    pub fn new(p: usize) -> Result<Self> {
        if p == 0 {
            return Err(Error::InvalidParameter("p-matching requires p >= 1".into()));
        }
        Ok(Self { p })
    }

    /// `p = 1`.
    pub const fn exact() -> Self {
        Self { p: 1 }
    }

    /// No capacity limit.
    pub const fn unbounded() -> Self {
        Self { p: usize::MAX }
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn is_exact(&self) -> bool {
        self.p == 1
    }

    /// Whether capacity never binds for a node with `ties` ties, in which
    /// case matching reduces to a per-tie existence check.
    pub fn covers(&self, ties: usize) -> bool {
        self.p >= ties
    }
}

impl Default for PMatching {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Whether `lhs` p-matches into `rhs` under `compatible`.
pub fn p_match<A, B>(
    lhs: &[A],
    rhs: &[B],
    p: PMatching,
    mut compatible: impl FnMut(&A, &B) -> bool,
) -> bool {
    if lhs.is_empty() {
        return true;
    }
    if p.covers(lhs.len()) {
        return lhs.iter().all(|a| rhs.iter().any(|b| compatible(a, b)));
    }
    if lhs.len() > p.p().saturating_mul(rhs.len()) {
        return false;
    }
    let mut matcher = CapacitatedMatcher::new(lhs, rhs, p, &mut compatible);
    (0..lhs.len()).all(|u| matcher.augment_from(u))
}

/// Cardinality of a maximum capacitated matching of `lhs` into `rhs`.
pub fn max_matching<A, B>(
    lhs: &[A],
    rhs: &[B],
    p: PMatching,
    mut compatible: impl FnMut(&A, &B) -> bool,
) -> usize {
    let mut matcher = CapacitatedMatcher::new(lhs, rhs, p, &mut compatible);
    (0..lhs.len()).filter(|&u| matcher.augment_from(u)).count()
}

// ============================================================================
// Capacitated augmenting-path matching
// ============================================================================

/// Kuhn's algorithm where every right vertex holds up to `capacity` left
/// vertices. Equivalent to running it on `capacity` copies of each right
/// vertex, with all copies visited together.
struct CapacitatedMatcher {
    adjacency: Vec<SmallVec<[usize; 8]>>,
    assigned: Vec<SmallVec<[usize; 4]>>,
    visited: Vec<bool>,
    capacity: usize,
}

impl CapacitatedMatcher {
    fn new<A, B>(lhs: &[A], rhs: &[B], p: PMatching, compatible: &mut impl FnMut(&A, &B) -> bool) -> Self {
        let adjacency = lhs
            .iter()
            .map(|a| {
                rhs.iter()
                    .enumerate()
                    .filter(|&(_, b)| compatible(a, b))
                    .map(|(v, _)| v)
                    .collect()
            })
            .collect();
        Self {
            adjacency,
            assigned: vec![SmallVec::new(); rhs.len()],
            visited: vec![false; rhs.len()],
            capacity: p.p().min(lhs.len().max(1)),
        }
    }

    fn augment_from(&mut self, u: usize) -> bool {
        self.visited.fill(false);
        self.augment(u)
    }

    fn augment(&mut self, u: usize) -> bool {
        for k in 0..self.adjacency[u].len() {
            let v = self.adjacency[u][k];
            if self.visited[v] {
                continue;
            }
            self.visited[v] = true;
            if self.assigned[v].len() < self.capacity {
                self.assigned[v].push(u);
                return true;
            }
            for slot in 0..self.assigned[v].len() {
                let holder = self.assigned[v][slot];
                if self.augment(holder) {
                    self.assigned[v][slot] = u;
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(a: &u32, b: &u32) -> bool {
        a == b
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(matches!(PMatching::new(0), Err(Error::InvalidParameter(_))));
        assert_eq!(PMatching::new(3).unwrap().p(), 3);
    }

    #[test]
    fn test_deserialize_goes_through_new() {
        let p: PMatching = serde_json::from_str("2").unwrap();
        assert_eq!(p.p(), 2);
        assert_eq!(serde_json::to_string(&PMatching::exact()).unwrap(), "1");
        assert!(serde_json::from_str::<PMatching>("0").is_err());
    }

    #[test]
    fn test_weak_ignores_multiplicity() {
        assert!(p_match(&[1, 1, 1], &[1], PMatching::unbounded(), eq));
        assert!(!p_match(&[1, 2], &[1], PMatching::unbounded(), eq));
    }

    #[test]
    fn test_exact_requires_injection() {
        assert!(!p_match(&[1, 1], &[1], PMatching::exact(), eq));
        assert!(p_match(&[1, 1], &[1, 1, 2], PMatching::exact(), eq));
    }

    #[test]
    fn test_capacity_between_exact_and_weak() {
        let p2 = PMatching::new(2).unwrap();
        assert!(p_match(&[1, 1], &[1], p2, eq));
        assert!(!p_match(&[1, 1, 1], &[1], p2, eq));
        assert!(p_match(&[1, 1, 1], &[1, 1], p2, eq));
    }

    #[test]
    fn test_augmenting_path_reassigns() {
        // Greedy would assign lhs[0] to rhs[0] and strand lhs[1].
        let compatible = |a: &usize, b: &usize| match *a {
            0 => *b == 0 || *b == 1,
            _ => *b == 0,
        };
        assert!(p_match(&[0usize, 1], &[0usize, 1], PMatching::exact(), compatible));
        assert_eq!(max_matching(&[0usize, 1], &[0usize, 1], PMatching::exact(), compatible), 2);
    }

    #[test]
    fn test_max_matching_counts_partial() {
        assert_eq!(max_matching(&[1, 1, 2, 3], &[1, 2], PMatching::exact(), eq), 2);
        assert_eq!(max_matching(&[1, 1, 2, 3], &[1, 2], PMatching::unbounded(), eq), 3);
    }

    #[test]
    fn test_empty_sides() {
        assert!(p_match::<u32, u32>(&[], &[], PMatching::exact(), eq));
        assert!(!p_match(&[1], &[], PMatching::exact(), eq));
        assert!(!p_match(&[1], &[], PMatching::unbounded(), eq));
    }
}
