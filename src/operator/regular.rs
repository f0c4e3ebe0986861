//! Regular operators: two nodes correspond when their ties p-match relative
//! to the operator's input structure.
//!
//! With `p` unbounded this is regular equivalence (every tie has some
//! partner whose target is related), with `p = 1` exact (equitable)
//! equivalence, and anything in between an approximation. The same operator
//! yields rankings and relations, where `(i, j)` means the ties of `i`
//! match into the ties of `j`.

use crate::comparator::{Comparator, ComparatorMode, ComparatorSource};
use crate::matching::pairwise::{PairTest, TargetRule};
use crate::matching::signature::refine_by_signature;
use crate::matching::PMatching;
use crate::model::{BinaryRelation, Equivalence, Ranking, RoleStructure};
use crate::network::PositionView;
use super::{OperatorTraits, RoleOperator};

// ============================================================================
// MatchRefine
// ============================================================================

/// Role structures that can be refined by a relative p-matching test.
///
/// The default runs the pairwise test through `RoleStructure::refine_by`.
/// Kinds with a faster exact strategy override it.
pub trait MatchRefine: RoleStructure {
    /// `to_refine` restricted to the pairs whose ties p-match relative to
    /// `current`.
    fn refine_matching<V: PositionView>(
        view: &V,
        current: &Self,
        to_refine: &Self,
        comparator: &Comparator<V::Tie>,
        p: PMatching,
    ) -> Self {
        refine_pairwise(view, current, to_refine, comparator, p)
    }

    /// Whether `refine_matching` is isotone in `current` for this tolerance
    /// and comparator mode.
    fn isotone_refinement(_p: PMatching, _mode: ComparatorMode) -> bool {
        true
    }
}

fn refine_pairwise<V: PositionView, U: RoleStructure>(
    view: &V,
    current: &U,
    to_refine: &U,
    comparator: &Comparator<V::Tie>,
    p: PMatching,
) -> U {
    let test = PairTest { view, rule: TargetRule::Relative(current), comparator, p };
    U::refine_by(to_refine, |i, j| test.matches_into(i, j))
}

impl MatchRefine for Equivalence {
    /// Weak and exact matching under a total comparator are equality of
    /// sorted tie signatures; everything else is tested pair by pair.
    fn refine_matching<V: PositionView>(
        view: &V,
        current: &Self,
        to_refine: &Self,
        comparator: &Comparator<V::Tie>,
        p: PMatching,
    ) -> Self {
        let multiset = match p.p() {
            1 => true,
            usize::MAX => false,
            _ => return refine_pairwise(view, current, to_refine, comparator, p),
        };
        if !comparator.is_total() {
            return refine_pairwise(view, current, to_refine, comparator, p);
        }
        refine_by_signature(view, current, to_refine, comparator, multiset)
    }

    /// Representative splitting depends on node order unless the pairwise
    /// test is transitive, which only weak and exact matching under a total
    /// comparator guarantee.
    fn isotone_refinement(p: PMatching, mode: ComparatorMode) -> bool {
        matches!(p.p(), 1 | usize::MAX) && matches!(mode, ComparatorMode::None | ComparatorMode::TotalOrder)
    }
}

impl MatchRefine for Ranking {}

impl MatchRefine for BinaryRelation {}

// ============================================================================
// RegularOperator
// ============================================================================

/// Relative p-matching operator over one position view.
///
/// Not constant, and in general neither nonincreasing nor nondecreasing:
/// the fixpoint engine refines the current structure explicitly. Isotone
/// unless an equivalence is split pair by pair with a non-transitive test
/// (see `MatchRefine::isotone_refinement`); `with_traits` overrides the
/// derived declaration.
pub struct RegularOperator<V: PositionView, U> {
    view: V,
    comparator: ComparatorSource<U, V::Tie>,
    p: PMatching,
    traits: Option<OperatorTraits>,
}

impl<V: PositionView, U: MatchRefine> RegularOperator<V, U> {
    /// Regular (weak-matching) operator ignoring tie values.
    pub fn new(view: V) -> Self {
        Self {
            view,
            comparator: ComparatorSource::default(),
            p: PMatching::unbounded(),
            traits: None,
        }
    }

    pub fn with_comparator(mut self, comparator: impl Into<ComparatorSource<U, V::Tie>>) -> Self {
        self.comparator = comparator.into();
        self
    }

    pub fn with_p(mut self, p: PMatching) -> Self {
        self.p = p;
        self
    }

    pub fn with_traits(mut self, traits: OperatorTraits) -> Self {
        self.traits = Some(traits);
        self
    }

    pub fn p(&self) -> PMatching {
        self.p
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

impl<V: PositionView, U: MatchRefine> RoleOperator<U> for RegularOperator<V, U> {
    fn traits(&self) -> OperatorTraits {
        self.traits.unwrap_or_else(|| {
            if U::isotone_refinement(self.p, self.comparator.mode()) {
                OperatorTraits::isotone()
            } else {
                OperatorTraits::default()
            }
        })
    }

    fn relative(&self, input: &U) -> U {
        self.relative_refining(input, &U::top(input.domain_size()))
    }

    fn relative_refining(&self, input: &U, to_refine: &U) -> U {
        debug_assert_eq!(input.domain_size(), self.view.count_nodes());
        debug_assert_eq!(to_refine.domain_size(), self.view.count_nodes());
        let comparator = self.comparator.resolve(input);
        U::refine_matching(&self.view, input, to_refine, &comparator, self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::ComparatorMode;
    use crate::network::{Network, Tie};

    #[test]
    fn test_regular_ignores_multiplicity() {
        let net = Network::from_arcs(4, [(0, 2), (0, 3), (1, 2)]).unwrap();
        let view = net.outgoing();
        let top = Equivalence::universal(4);
        let regular = RegularOperator::<_, Equivalence>::new(view);
        assert_eq!(regular.relative(&top), Equivalence::from_classes([0, 0, 1, 1]));
        let equitable = RegularOperator::<_, Equivalence>::new(view).with_p(PMatching::exact());
        assert_eq!(equitable.relative(&top), Equivalence::from_classes([0, 1, 2, 2]));
    }

    #[test]
    fn test_fast_path_agrees_with_pairwise() {
        let net = Network::from_ties(5, [(0, 3, 1), (0, 4, 2), (1, 3, 2), (1, 4, 1), (2, 4, 1), (2, 3, 1)]).unwrap();
        let view = net.outgoing();
        let current = Equivalence::from_classes([0, 0, 0, 1, 2]);
        let top = Equivalence::universal(5);
        let by_value: Comparator<Tie<i32>> = Comparator::by_value();
        for p in [PMatching::exact(), PMatching::unbounded()] {
            let fast = Equivalence::refine_matching(&view, &current, &top, &by_value, p);
            let slow = refine_pairwise(&view, &current, &top, &by_value, p);
            assert_eq!(fast, slow);
        }
    }

    #[test]
    fn test_relation_is_directional() {
        let net = Network::from_arcs(3, [(0, 2), (0, 2), (1, 2)]).unwrap();
        let view = net.outgoing();
        let top = BinaryRelation::universal(3);
        let weak = RegularOperator::<_, BinaryRelation>::new(view).relative(&top);
        assert!(weak.contains(0, 1));
        assert!(weak.contains(1, 0));
        assert!(weak.contains(2, 0));
        assert!(!weak.contains(0, 2));
        let exact = RegularOperator::<_, BinaryRelation>::new(view).with_p(PMatching::exact()).relative(&top);
        assert!(!exact.contains(0, 1));
        assert!(exact.contains(1, 0));
    }

    #[test]
    fn test_ranking_is_reflexive() {
        let net = Network::from_arcs(3, [(0, 1), (1, 2)]).unwrap();
        let ranking = RegularOperator::<_, Ranking>::new(net.outgoing()).relative(&Ranking::universal(3));
        for i in 0..3 {
            assert!(ranking.contains(i, i));
        }
        assert!(ranking.contains(2, 0));
        assert!(!ranking.contains(0, 2));
    }

    #[test]
    fn test_relative_comparator_is_resolved_per_input() {
        let net = Network::from_ties(3, [(0, 2, 1i32), (1, 2, 5)]).unwrap();
        let source = ComparatorSource::relative(ComparatorMode::TotalOrder, |current: &Equivalence| {
            let strict = current.count_classes() > 1;
            Comparator::by_key(move |tie: &Tie<i32>| if strict { tie.value } else { 0 })
        });
        let op = RegularOperator::<_, Equivalence>::new(net.outgoing()).with_comparator(source);
        assert!(op.relative(&Equivalence::universal(3)).are_equivalent(0, 1));
        assert!(!op.relative(&Equivalence::discrete(3)).are_equivalent(0, 1));
    }

    #[test]
    fn test_relative_refining_stays_below() {
        let net = Network::from_arcs(4, [(0, 1), (2, 3)]).unwrap();
        let op = RegularOperator::<_, Equivalence>::new(net.outgoing());
        let to_refine = Equivalence::from_classes([0, 1, 0, 1]);
        let out = op.relative_refining(&Equivalence::universal(4), &to_refine);
        assert!(out.refines(&to_refine));
        assert_eq!(out, to_refine);
    }

    #[test]
    fn test_order_dependent_split_is_not_declared_isotone() {
        // 0 has one tie, 1 two and 2 three, all into the block {3..8}
        let net = Network::from_arcs(9, [(0, 3), (1, 4), (1, 5), (2, 6), (2, 7), (2, 8)]).unwrap();
        let op = RegularOperator::<_, Equivalence>::new(net.outgoing()).with_p(PMatching::new(2).unwrap());
        assert!(!op.traits().isotone);

        let lower = Equivalence::from_classes([0, 0, 0, 1, 2, 2, 2, 2, 2]);
        let upper = Equivalence::universal(9);
        assert!(lower.refines(&upper));
        assert_eq!(op.relative(&lower), Equivalence::from_classes([0, 1, 1, 2, 2, 2, 2, 2, 2]));
        assert_eq!(op.relative(&upper), Equivalence::from_classes([0, 0, 1, 2, 2, 2, 2, 2, 2]));
        assert!(!op.relative(&lower).refines(&op.relative(&upper)));
    }

    #[test]
    fn test_declared_traits_follow_matching() {
        let net = Network::from_arcs(3, [(0, 1), (1, 2)]).unwrap();
        let view = net.outgoing();
        let p2 = PMatching::new(2).unwrap();
        let partial: Comparator<Tie<()>> = Comparator::partial_order(|_, _| Some(std::cmp::Ordering::Equal));
        assert!(RegularOperator::<_, Equivalence>::new(view).traits().isotone);
        assert!(RegularOperator::<_, Equivalence>::new(view).with_p(PMatching::exact()).traits().isotone);
        assert!(!RegularOperator::<_, Equivalence>::new(view).with_comparator(partial).traits().isotone);
        assert!(RegularOperator::<_, Ranking>::new(view).with_p(p2).traits().isotone);
        assert!(RegularOperator::<_, BinaryRelation>::new(view).with_p(p2).traits().isotone);
        let forced = RegularOperator::<_, Equivalence>::new(view).with_p(p2).with_traits(OperatorTraits::isotone());
        assert!(forced.traits().isotone);
    }
}
