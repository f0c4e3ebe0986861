//! The lattice contract shared by all role structures.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// The three role-structure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Equivalence,
    Ranking,
    BinaryRelation,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleKind::Equivalence => write!(f, "equivalence"),
            RoleKind::Ranking => write!(f, "ranking"),
            RoleKind::BinaryRelation => write!(f, "binary relation"),
        }
    }
}

/// A role structure over the node set `{0..n-1}`, ordered by refinement.
///
/// `a.refines(b)` is the lattice order `a ⊑ b`: for equivalences every class
/// of `a` lies inside a class of `b`, for rankings and relations `a ⊆ b`.
/// `top` is the universal structure, `bottom` the finest one the kind admits.
///
/// `infimum` and `supremum` assume equal domain sizes. Use the `checked_*`
/// variants where the operands come from different sources.
pub trait RoleStructure: Clone + PartialEq + std::fmt::Debug {
    const KIND: RoleKind;

    fn domain_size(&self) -> usize;

    fn top(n: usize) -> Self;

    fn bottom(n: usize) -> Self;

    /// Greatest lower bound (coarsest common refinement).
    fn infimum(&self, other: &Self) -> Self;

    /// Least upper bound.
    fn supremum(&self, other: &Self) -> Self;

    /// `self ⊑ other`.
    fn refines(&self, other: &Self) -> bool;

    /// Whether `i` is related to `j`, read as a binary relation.
    fn relates(&self, i: usize, j: usize) -> bool;

    /// Build the structure generated by a pairwise predicate, restricted to
    /// pairs related in `within`. The predicate is only evaluated on those
    /// pairs. Kinds with closure requirements repair the result so the
    /// output is always a valid structure that refines `within`.
    fn refine_by(within: &Self, related: impl FnMut(usize, usize) -> bool) -> Self;

    fn checked_infimum(&self, other: &Self) -> Result<Self> {
        ensure_same_domain(self.domain_size(), other.domain_size())?;
        Ok(self.infimum(other))
    }

    fn checked_supremum(&self, other: &Self) -> Result<Self> {
        ensure_same_domain(self.domain_size(), other.domain_size())?;
        Ok(self.supremum(other))
    }
}

pub(crate) fn ensure_same_domain(expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::DomainMismatch { expected, got })
    }
}
