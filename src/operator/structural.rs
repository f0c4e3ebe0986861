//! Structural operators: a constant test on the view alone.
//!
//! `i` and `j` are structurally equivalent when the ties of `j`, with `i`
//! and `j` swapped in their targets, p-match the ties of `i` target for
//! target. The result never depends on the operator's input, so it is
//! computed once and cached.

use std::sync::OnceLock;
use crate::comparator::Comparator;
use crate::matching::pairwise::{PairTest, TargetRule};
use crate::matching::PMatching;
use crate::model::RoleStructure;
use crate::network::PositionView;
use super::{OperatorTraits, RoleOperator};

pub struct StructuralOperator<V: PositionView, U> {
    view: V,
    comparator: Comparator<V::Tie>,
    p: PMatching,
    cached: OnceLock<U>,
}

impl<V: PositionView, U: RoleStructure> StructuralOperator<V, U> {
    /// Strong structural operator (`p = 1`) ignoring tie values.
    pub fn new(view: V) -> Self {
        Self { view, comparator: Comparator::None, p: PMatching::exact(), cached: OnceLock::new() }
    }

    pub fn with_comparator(mut self, comparator: Comparator<V::Tie>) -> Self {
        self.comparator = comparator;
        self.cached = OnceLock::new();
        self
    }

    pub fn with_p(mut self, p: PMatching) -> Self {
        self.p = p;
        self.cached = OnceLock::new();
        self
    }

    pub fn p(&self) -> PMatching {
        self.p
    }

    /// The structure this operator always returns.
    pub fn value(&self) -> &U {
        self.cached.get_or_init(|| {
            let n = self.view.count_nodes();
            let test = PairTest {
                view: &self.view,
                rule: TargetRule::<U>::Substituted,
                comparator: &self.comparator,
                p: self.p,
            };
            let value = U::refine_by(&U::top(n), |i, j| test.matches_into(i, j));
            tracing::trace!(kind = %U::KIND, nodes = n, "structural test evaluated");
            value
        })
    }
}

impl<V: PositionView, U: RoleStructure> RoleOperator<U> for StructuralOperator<V, U> {
    fn traits(&self) -> OperatorTraits {
        OperatorTraits::constant()
    }

    fn relative(&self, input: &U) -> U {
        debug_assert_eq!(input.domain_size(), self.view.count_nodes());
        self.value().clone()
    }
}
