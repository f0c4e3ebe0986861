//! Pairwise tie compatibility used by role operators.
//!
//! Two ways of relating a tie `a` of `i` to a tie `b` of `j`:
//!
//! - **Relative** to a candidate structure `S`: `S` relates the targets,
//!   and a tie to the node itself (a loop) only corresponds to a loop.
//! - **Substituted**: the targets are equal once `i` and `j` are swapped in
//!   `j`'s ties, so `j → i` corresponds to `i → j` and loops to loops. This
//!   is the constant test behind structural equivalence.
//!
//! In both cases the comparator must accept the pair.

use smallvec::SmallVec;
use crate::comparator::Comparator;
use crate::model::RoleStructure;
use crate::network::PositionView;
use super::{p_match, PMatching};

pub(crate) type TieBuf<T> = SmallVec<[T; 8]>;

/// Ties of `i` and of `j` while `i` is compared with `j`.
pub(crate) fn neighborhoods<V: PositionView>(view: &V, i: usize, j: usize) -> (TieBuf<V::Tie>, TieBuf<V::Tie>) {
    (view.ties(i, j, i).collect(), view.ties(i, j, j).collect())
}

#[derive(Debug)]
pub(crate) enum TargetRule<'a, U> {
    Relative(&'a U),
    Substituted,
}

impl<U: RoleStructure> TargetRule<'_, U> {
    #[inline]
    pub fn accepts(&self, i: usize, j: usize, ta: usize, tb: usize) -> bool {
        match self {
            TargetRule::Relative(current) => (ta == i) == (tb == j) && current.relates(ta, tb),
            TargetRule::Substituted => {
                let swapped = if tb == i {
                    j
                } else if tb == j {
                    i
                } else {
                    tb
                };
                ta == swapped
            }
        }
    }
}

/// Everything one pairwise test needs, borrowed for one operator
/// application.
pub(crate) struct PairTest<'a, V: PositionView, U> {
    pub view: &'a V,
    pub rule: TargetRule<'a, U>,
    pub comparator: &'a Comparator<V::Tie>,
    pub p: PMatching,
}

impl<V: PositionView, U: RoleStructure> PairTest<'_, V, U> {
    /// Whether the ties of `i` p-match into the ties of `j`.
    pub fn matches_into(&self, i: usize, j: usize) -> bool {
        let (lhs, rhs) = neighborhoods(self.view, i, j);
        p_match(&lhs, &rhs, self.p, |a, b| self.compatible(i, j, a, b))
    }

    #[inline]
    pub fn compatible(&self, i: usize, j: usize, a: &V::Tie, b: &V::Tie) -> bool {
        let (ta, tb) = (self.view.tie_target(a), self.view.tie_target(b));
        self.rule.accepts(i, j, ta, tb) && self.comparator.compatible(U::KIND, a, b)
    }
}
