//! # Role Distances
//!
//! Graded counterpart of the p-matching test: instead of asking whether the
//! ties of `i` match into the ties of `j`, ask what the cheapest
//! correspondence costs when a tie may be substituted by a compatible tie
//! (substitution cost) or left unmatched (failure cost).
//!
//! ## Cost of `i` into `j`
//!
//! | p                  | Method                                        |
//! |--------------------|-----------------------------------------------|
//! | `p ≥ ties(i)`      | per tie: min(failure, cheapest compatible)    |
//! | otherwise          | Munkres assignment, each tie of `j` copied    |
//! |                    | `p` times, one failure column per tie of `i`  |
//!
//! Equivalence kinds add the cost of `j` into `i`; rankings and relations
//! use one direction, so their matrices are generally asymmetric.
//!
//! ## Properties
//!
//! - With unit failure cost and free substitution, `d(i, j) = 0` iff the
//!   boolean p-matching test accepts the pair.
//! - `d(i, i) = 0` whenever substituting a tie by itself is free and the
//!   input structure relates every target to itself.

mod assignment;

use std::sync::Arc;
use crate::comparator::{Comparator, ComparatorSource};
use crate::matching::pairwise::{neighborhoods, PairTest, TargetRule};
use crate::matching::PMatching;
use crate::model::{IntDistanceMatrix, RoleKind, RoleStructure};
use crate::network::PositionView;
use assignment::CostMatrix;

// ============================================================================
// Cost functions
// ============================================================================

type FailFn<T> = Arc<dyn Fn(&T) -> u32 + Send + Sync>;
type SubstituteFn<T> = Arc<dyn Fn(&T, &T) -> u32 + Send + Sync>;

/// Cost model for role distances.
pub enum CostFunction<T> {
    /// Compatible ties substitute for free; an unmatched tie costs `fail`.
    Failure(FailFn<T>),
    /// Substituting `a` by a compatible `b` costs `substitute(a, b)`.
    Substitution { substitute: SubstituteFn<T>, fail: FailFn<T> },
}

impl<T> Clone for CostFunction<T> {
    fn clone(&self) -> Self {
        match self {
            CostFunction::Failure(fail) => CostFunction::Failure(Arc::clone(fail)),
            CostFunction::Substitution { substitute, fail } => {
                CostFunction::Substitution { substitute: Arc::clone(substitute), fail: Arc::clone(fail) }
            }
        }
    }
}

impl<T> std::fmt::Debug for CostFunction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostFunction::Failure(_) => write!(f, "CostFunction::Failure"),
            CostFunction::Substitution { .. } => write!(f, "CostFunction::Substitution"),
        }
    }
}

impl<T> CostFunction<T> {
    /// Every unmatched tie costs 1.
    pub fn unit() -> Self {
        CostFunction::Failure(Arc::new(|_: &T| 1))
    }

    pub fn failure(fail: impl Fn(&T) -> u32 + Send + Sync + 'static) -> Self {
        CostFunction::Failure(Arc::new(fail))
    }

    pub fn substitution(
        substitute: impl Fn(&T, &T) -> u32 + Send + Sync + 'static,
        fail: impl Fn(&T) -> u32 + Send + Sync + 'static,
    ) -> Self {
        CostFunction::Substitution { substitute: Arc::new(substitute), fail: Arc::new(fail) }
    }

    pub fn fail_cost(&self, tie: &T) -> u32 {
        match self {
            CostFunction::Failure(fail) | CostFunction::Substitution { fail, .. } => fail(tie),
        }
    }

    pub fn substitution_cost(&self, a: &T, b: &T) -> u32 {
        match self {
            CostFunction::Failure(_) => 0,
            CostFunction::Substitution { substitute, .. } => substitute(a, b),
        }
    }
}

/// Minimum cost of matching `lhs` into `rhs` with capacity `p`, where
/// incompatible pairs can only be resolved by failing the tie of `lhs`.
pub fn match_cost<T>(
    lhs: &[T],
    rhs: &[T],
    p: PMatching,
    cost: &CostFunction<T>,
    mut compatible: impl FnMut(&T, &T) -> bool,
) -> u64 {
    let mut pair_cost = |a: &T, b: &T| {
        let fail = cost.fail_cost(a);
        if compatible(a, b) { cost.substitution_cost(a, b).min(fail) } else { fail }
    };
    if p.covers(lhs.len()) {
        return lhs
            .iter()
            .map(|a| {
                let best = rhs.iter().map(|b| pair_cost(a, b)).min();
                u64::from(best.unwrap_or_else(|| cost.fail_cost(a)))
            })
            .sum();
    }
    let copies = p.p().min(lhs.len());
    let slots = rhs.len() * copies;
    let matrix = CostMatrix::from_fn(lhs.len(), slots + lhs.len(), |r, c| {
        if c < slots { pair_cost(&lhs[r], &rhs[c / copies]) } else { cost.fail_cost(&lhs[r]) }
    });
    matrix.min_assignment()
}

// ============================================================================
// DistanceOperator
// ============================================================================

/// Computes a role-distance matrix relative to an input structure.
pub trait DistanceOperator<U: RoleStructure> {
    /// The result does not depend on the input.
    fn is_constant(&self) -> bool;

    fn distances(&self, input: &U) -> IntDistanceMatrix;
}

impl<U: RoleStructure, D: DistanceOperator<U> + ?Sized> DistanceOperator<U> for Box<D> {
    fn is_constant(&self) -> bool {
        (**self).is_constant()
    }

    fn distances(&self, input: &U) -> IntDistanceMatrix {
        (**self).distances(input)
    }
}

fn distance_matrix<V: PositionView, U: RoleStructure>(
    test: &PairTest<'_, V, U>,
    cost: &CostFunction<V::Tie>,
) -> IntDistanceMatrix {
    let into = |i: usize, j: usize| {
        let (lhs, rhs) = neighborhoods(test.view, i, j);
        match_cost(&lhs, &rhs, test.p, cost, |a, b| test.compatible(i, j, a, b))
    };
    let n = test.view.count_nodes();
    match U::KIND {
        RoleKind::Equivalence => {
            IntDistanceMatrix::from_fn(n, |i, j| into(i, j).saturating_add(into(j, i)))
        }
        RoleKind::Ranking | RoleKind::BinaryRelation => IntDistanceMatrix::from_fn(n, into),
    }
}

/// Distances under the relative target rule: tie targets must be related in
/// the input structure.
pub struct RegularDistance<V: PositionView, U> {
    view: V,
    comparator: ComparatorSource<U, V::Tie>,
    p: PMatching,
    cost: CostFunction<V::Tie>,
}

impl<V: PositionView, U: RoleStructure> RegularDistance<V, U> {
    pub fn new(view: V, cost: CostFunction<V::Tie>) -> Self {
        Self { view, comparator: ComparatorSource::default(), p: PMatching::unbounded(), cost }
    }

    pub fn with_comparator(mut self, comparator: impl Into<ComparatorSource<U, V::Tie>>) -> Self {
        self.comparator = comparator.into();
        self
    }

    pub fn with_p(mut self, p: PMatching) -> Self {
        self.p = p;
        self
    }
}

impl<V: PositionView, U: RoleStructure> DistanceOperator<U> for RegularDistance<V, U> {
    fn is_constant(&self) -> bool {
        false
    }

    fn distances(&self, input: &U) -> IntDistanceMatrix {
        debug_assert_eq!(input.domain_size(), self.view.count_nodes());
        let comparator = self.comparator.resolve(input);
        let test = PairTest { view: &self.view, rule: TargetRule::Relative(input), comparator: &*comparator, p: self.p };
        distance_matrix(&test, &self.cost)
    }
}

/// Distances under the substituted target rule; ignores the input.
pub struct StructuralDistance<V: PositionView, U> {
    view: V,
    comparator: Comparator<V::Tie>,
    p: PMatching,
    cost: CostFunction<V::Tie>,
    _kind: std::marker::PhantomData<fn(&U)>,
}

impl<V: PositionView, U: RoleStructure> StructuralDistance<V, U> {
    /// Strong structural distance (`p = 1`) ignoring tie values.
    pub fn new(view: V, cost: CostFunction<V::Tie>) -> Self {
        Self {
            view,
            comparator: Comparator::None,
            p: PMatching::exact(),
            cost,
            _kind: std::marker::PhantomData,
        }
    }

    pub fn with_comparator(mut self, comparator: Comparator<V::Tie>) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn with_p(mut self, p: PMatching) -> Self {
        self.p = p;
        self
    }

    pub fn matrix(&self) -> IntDistanceMatrix {
        let test = PairTest {
            view: &self.view,
            rule: TargetRule::<U>::Substituted,
            comparator: &self.comparator,
            p: self.p,
        };
        distance_matrix(&test, &self.cost)
    }
}

impl<V: PositionView, U: RoleStructure> DistanceOperator<U> for StructuralDistance<V, U> {
    fn is_constant(&self) -> bool {
        true
    }

    fn distances(&self, _input: &U) -> IntDistanceMatrix {
        self.matrix()
    }
}

/// Element-wise sum of two distance operators, e.g. over both orientations.
pub struct SumDistance<A, B> {
    left: A,
    right: B,
}

impl<A, B> SumDistance<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<U: RoleStructure, A: DistanceOperator<U>, B: DistanceOperator<U>> DistanceOperator<U> for SumDistance<A, B> {
    fn is_constant(&self) -> bool {
        self.left.is_constant() && self.right.is_constant()
    }

    fn distances(&self, input: &U) -> IntDistanceMatrix {
        self.left.distances(input).sum(&self.right.distances(input))
    }
}
