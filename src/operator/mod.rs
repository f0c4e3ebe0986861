//! # Role Operators
//!
//! A role operator maps a role structure to a role structure of the same
//! kind, e.g. "the equivalence in which nodes are equivalent iff their ties
//! correspond relative to the input equivalence". Its algebraic traits are
//! plain data carried next to it and are trusted, never re-derived.
//!
//! ## Contents
//!
//! | Type | Description |
//! |------|-------------|
//! | `RoleOperator` | The operator contract |
//! | `OperatorTraits` | isotone / nonincreasing / nondecreasing / constant |
//! | `FnOperator`, `Constant` | Operators from closures and values |
//! | `Parallel`, `Series` | Composition with trait propagation |
//! | `RegularOperator` | Matching relative to the input structure |
//! | `StructuralOperator` | Constant matching on the position view |

pub mod regular;
pub mod structural;

use std::marker::PhantomData;
use serde::{Deserialize, Serialize};
use crate::fixpoint::{self, Fixpoint};
use crate::model::RoleStructure;
use crate::{Error, Result};

pub use regular::{MatchRefine, RegularOperator};
pub use structural::StructuralOperator;

// ============================================================================
// Traits record
// ============================================================================

/// Algebraic properties of an operator `f`, with `⊑` the refinement order.
///
/// - `isotone`: `x ⊑ y ⟹ f(x) ⊑ f(y)`
/// - `nonincreasing`: `f(x) ⊑ x`
/// - `nondecreasing`: `x ⊑ f(x)`
/// - `constant`: `f(x)` does not depend on `x`
///
/// Declaring a property the operator does not have is a precondition
/// violation; the fixpoint engine relies on the declarations without
/// checking them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorTraits {
    pub isotone: bool,
    pub nonincreasing: bool,
    pub nondecreasing: bool,
    pub constant: bool,
}

impl OperatorTraits {
    /// Only `isotone`.
    pub const fn isotone() -> Self {
        Self { isotone: true, nonincreasing: false, nondecreasing: false, constant: false }
    }

    /// `constant` (and therefore `isotone`).
    pub const fn constant() -> Self {
        Self { isotone: true, nonincreasing: false, nondecreasing: false, constant: true }
    }

    /// Reject combinations no operator can have.
    pub fn validate(&self) -> Result<()> {
        if self.constant && !self.isotone {
            return Err(Error::UnsupportedConfiguration(
                "a constant operator is isotone; traits declare constant without isotone".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// RoleOperator
// ============================================================================

/// A function from role structures to role structures of the same kind.
pub trait RoleOperator<U: RoleStructure> {
    fn traits(&self) -> OperatorTraits;

    fn relative(&self, input: &U) -> U;

    /// `to_refine ∧ relative(input)`. Implementations may compute this
    /// without materializing `relative(input)`.
    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        to_refine.infimum(&self.relative(input))
    }

    /// `to_coarsen ∨ relative(input)`.
    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        to_coarsen.supremum(&self.relative(input))
    }

    /// Greatest fixpoint below the top structure on `n` nodes.
    fn interior(&self, n: usize) -> U {
        fixpoint::interior(self, n).value
    }

    /// Least fixpoint above the bottom structure on `n` nodes.
    fn closure(&self, n: usize) -> U {
        fixpoint::closure(self, n).value
    }

    /// Greatest fixpoint below `start`, with iteration count.
    fn interior_from(&self, start: U) -> Fixpoint<U> {
        fixpoint::interior_from(self, start)
    }

    /// Least fixpoint above `start`, with iteration count.
    fn closure_from(&self, start: U) -> Fixpoint<U> {
        fixpoint::closure_from(self, start)
    }
}

impl<U: RoleStructure, O: RoleOperator<U> + ?Sized> RoleOperator<U> for Box<O> {
    fn traits(&self) -> OperatorTraits {
        (**self).traits()
    }

    fn relative(&self, input: &U) -> U {
        (**self).relative(input)
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        (**self).relative_refining(input, to_refine)
    }

    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        (**self).relative_coarsening(input, to_coarsen)
    }
}

impl<U: RoleStructure, O: RoleOperator<U> + ?Sized> RoleOperator<U> for &O {
    fn traits(&self) -> OperatorTraits {
        (**self).traits()
    }

    fn relative(&self, input: &U) -> U {
        (**self).relative(input)
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        (**self).relative_refining(input, to_refine)
    }

    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        (**self).relative_coarsening(input, to_coarsen)
    }
}

// ============================================================================
// Simple operators
// ============================================================================

/// An operator defined by a closure and its declared traits.
pub struct FnOperator<U, F> {
    f: F,
    traits: OperatorTraits,
    _kind: PhantomData<fn(&U) -> U>,
}

impl<U: RoleStructure, F: Fn(&U) -> U> FnOperator<U, F> {
    pub fn new(traits: OperatorTraits, f: F) -> Self {
        Self { f, traits, _kind: PhantomData }
    }
}

impl<U: RoleStructure, F: Fn(&U) -> U> RoleOperator<U> for FnOperator<U, F> {
    fn traits(&self) -> OperatorTraits {
        self.traits
    }

    fn relative(&self, input: &U) -> U {
        (self.f)(input)
    }
}

/// Always returns the same structure.
#[derive(Debug, Clone)]
pub struct Constant<U> {
    value: U,
}

impl<U: RoleStructure> Constant<U> {
    pub fn new(value: U) -> Self {
        Self { value }
    }
}

impl<U: RoleStructure> RoleOperator<U> for Constant<U> {
    fn traits(&self) -> OperatorTraits {
        OperatorTraits::constant()
    }

    fn relative(&self, _input: &U) -> U {
        self.value.clone()
    }
}

/// Replaces the declared traits of an operator.
pub struct WithTraits<O> {
    inner: O,
    traits: OperatorTraits,
}

impl<O> WithTraits<O> {
    pub fn new(inner: O, traits: OperatorTraits) -> Self {
        Self { inner, traits }
    }
}

impl<U: RoleStructure, O: RoleOperator<U>> RoleOperator<U> for WithTraits<O> {
    fn traits(&self) -> OperatorTraits {
        self.traits
    }

    fn relative(&self, input: &U) -> U {
        self.inner.relative(input)
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        self.inner.relative_refining(input, to_refine)
    }

    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        self.inner.relative_coarsening(input, to_coarsen)
    }
}

// ============================================================================
// Composition
// ============================================================================

/// How `Parallel` combines the outputs of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Infimum,
    Supremum,
}

/// Both operators applied to the same input, outputs combined by a reducer.
/// The operands are independent and side-effect free; evaluation order is
/// irrelevant.
pub struct Parallel<A, B> {
    left: A,
    right: B,
    reducer: Reducer,
}

impl<A, B> Parallel<A, B> {
    pub fn new(left: A, right: B, reducer: Reducer) -> Self {
        Self { left, right, reducer }
    }

    pub fn meet(left: A, right: B) -> Self {
        Self::new(left, right, Reducer::Infimum)
    }

    pub fn join(left: A, right: B) -> Self {
        Self::new(left, right, Reducer::Supremum)
    }
}

impl<U: RoleStructure, A: RoleOperator<U>, B: RoleOperator<U>> RoleOperator<U> for Parallel<A, B> {
    fn traits(&self) -> OperatorTraits {
        let (l, r) = (self.left.traits(), self.right.traits());
        let isotone = l.isotone && r.isotone;
        let constant = l.constant && r.constant;
        match self.reducer {
            Reducer::Infimum => OperatorTraits {
                isotone,
                nonincreasing: l.nonincreasing || r.nonincreasing,
                nondecreasing: l.nondecreasing && r.nondecreasing,
                constant,
            },
            Reducer::Supremum => OperatorTraits {
                isotone,
                nonincreasing: l.nonincreasing && r.nonincreasing,
                nondecreasing: l.nondecreasing || r.nondecreasing,
                constant,
            },
        }
    }

    fn relative(&self, input: &U) -> U {
        let (l, r) = (self.left.relative(input), self.right.relative(input));
        match self.reducer {
            Reducer::Infimum => l.infimum(&r),
            Reducer::Supremum => l.supremum(&r),
        }
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        match self.reducer {
            Reducer::Infimum => {
                let partial = self.left.relative_refining(input, to_refine);
                self.right.relative_refining(input, &partial)
            }
            Reducer::Supremum => to_refine.infimum(&self.relative(input)),
        }
    }

    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        match self.reducer {
            Reducer::Supremum => {
                let partial = self.left.relative_coarsening(input, to_coarsen);
                self.right.relative_coarsening(input, &partial)
            }
            Reducer::Infimum => to_coarsen.supremum(&self.relative(input)),
        }
    }
}

/// `second ∘ first`.
pub struct Series<A, B> {
    first: A,
    second: B,
}

impl<A, B> Series<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<U: RoleStructure, A: RoleOperator<U>, B: RoleOperator<U>> RoleOperator<U> for Series<A, B> {
    fn traits(&self) -> OperatorTraits {
        let (f, g) = (self.first.traits(), self.second.traits());
        let constant = f.constant || g.constant;
        OperatorTraits {
            isotone: constant || (f.isotone && g.isotone),
            nonincreasing: f.nonincreasing && g.nonincreasing,
            nondecreasing: f.nondecreasing && g.nondecreasing,
            constant,
        }
    }

    fn relative(&self, input: &U) -> U {
        self.second.relative(&self.first.relative(input))
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        self.second.relative_refining(&self.first.relative(input), to_refine)
    }

    fn relative_coarsening(&self, input: &U, to_coarsen: &U) -> U {
        self.second.relative_coarsening(&self.first.relative(input), to_coarsen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Equivalence;

    fn split_first(n: usize) -> impl RoleOperator<Equivalence> {
        FnOperator::new(OperatorTraits::constant(), move |_: &Equivalence| {
            Equivalence::from_classes((0..n).map(|i| usize::from(i == 0)))
        })
    }

    fn split_last(n: usize) -> impl RoleOperator<Equivalence> {
        FnOperator::new(OperatorTraits::constant(), move |_: &Equivalence| {
            Equivalence::from_classes((0..n).map(|i| usize::from(i == n - 1)))
        })
    }

    #[test]
    fn test_validate_rejects_constant_without_isotone() {
        let traits = OperatorTraits { constant: true, ..OperatorTraits::default() };
        assert!(matches!(traits.validate(), Err(Error::UnsupportedConfiguration(_))));
        assert!(OperatorTraits::constant().validate().is_ok());
    }

    #[test]
    fn test_parallel_meet_reduces_with_infimum() {
        let op = Parallel::meet(split_first(4), split_last(4));
        let out = op.relative(&Equivalence::universal(4));
        assert_eq!(out, Equivalence::from_classes([0, 1, 1, 2]));
        assert!(op.traits().constant);
        let refined = op.relative_refining(&Equivalence::universal(4), &Equivalence::from_classes([0, 0, 1, 1]));
        assert_eq!(refined, Equivalence::from_classes([0, 1, 2, 3]));
    }

    #[test]
    fn test_parallel_trait_propagation() {
        let shrink = FnOperator::new(
            OperatorTraits { isotone: true, nonincreasing: true, ..OperatorTraits::default() },
            |x: &Equivalence| x.clone(),
        );
        let plain = FnOperator::new(OperatorTraits::isotone(), |x: &Equivalence| x.clone());
        let meet = Parallel::meet(&shrink, &plain);
        assert!(meet.traits().nonincreasing);
        let join = Parallel::join(&shrink, &plain);
        assert!(!join.traits().nonincreasing);
        assert!(join.traits().isotone);
    }

    #[test]
    fn test_series_is_constant_if_either_is() {
        let id = FnOperator::new(OperatorTraits::isotone(), |x: &Equivalence| x.clone());
        let op = Series::new(id, Constant::new(Equivalence::discrete(3)));
        assert!(op.traits().constant);
        assert_eq!(op.relative(&Equivalence::universal(3)), Equivalence::discrete(3));
    }

    #[test]
    fn test_series_with_constant_first_is_isotone() {
        // a non-isotone second stage still sees one fixed input
        let flip = FnOperator::new(OperatorTraits::default(), |x: &Equivalence| {
            let n = x.domain_size();
            if x.count_classes() == 1 { Equivalence::discrete(n) } else { Equivalence::universal(n) }
        });
        let op = Series::new(Constant::new(Equivalence::universal(3)), flip);
        let traits = op.traits();
        assert!(traits.constant);
        assert!(traits.isotone);
        assert!(traits.validate().is_ok());
        assert_eq!(op.relative(&Equivalence::discrete(3)), Equivalence::discrete(3));
    }

    #[test]
    fn test_with_traits_overrides_declaration() {
        let op = WithTraits::new(Constant::new(Equivalence::discrete(2)), OperatorTraits::isotone());
        assert!(!op.traits().constant);
        assert_eq!(op.relative(&Equivalence::universal(2)), Equivalence::discrete(2));
    }
}
