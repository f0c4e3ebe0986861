//! Signature refinement, the fast path for weak and exact equivalences.
//!
//! When compatibility is an equivalence relation on tie keys (class of the
//! target, loop or not, tie value under a total order), mutual weak
//! matching is equality of key sets and mutual exact matching is equality
//! of key multisets. Sorting each node's keys once turns the pairwise test
//! into a comparison of sorted sequences, and splitting a class becomes a
//! sort of its members.
//!
//! Signatures are read with both comparison slots set to the node itself.

use std::cmp::Ordering;
use crate::comparator::Comparator;
use crate::model::Equivalence;
use crate::network::PositionView;

struct Key<T> {
    class: usize,
    reflexive: bool,
    tie: T,
}

fn compare_keys<T>(a: &Key<T>, b: &Key<T>, comparator: &Comparator<T>) -> Ordering {
    a.class
        .cmp(&b.class)
        .then(a.reflexive.cmp(&b.reflexive))
        .then_with(|| comparator.ordering(&a.tie, &b.tie).unwrap_or(Ordering::Equal))
}

fn compare_signatures<T>(a: &[Key<T>], b: &[Key<T>], comparator: &Comparator<T>) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match compare_keys(x, y, comparator) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }
    a.len().cmp(&b.len())
}

/// Split every class of `to_refine` into nodes with equal signatures
/// relative to `current`. `multiset` keeps repeated keys (exact matching),
/// otherwise keys are deduplicated (weak matching).
///
/// The comparator must be total (`None` or `TotalOrder`).
pub(crate) fn refine_by_signature<V: PositionView>(
    view: &V,
    current: &Equivalence,
    to_refine: &Equivalence,
    comparator: &Comparator<V::Tie>,
    multiset: bool,
) -> Equivalence {
    debug_assert!(comparator.is_total());
    let signatures: Vec<Vec<Key<V::Tie>>> = (0..view.count_nodes())
        .map(|node| {
            let mut keys: Vec<Key<V::Tie>> = view
                .ties(node, node, node)
                .map(|tie| {
                    let target = view.tie_target(&tie);
                    Key { class: current.class_of(target), reflexive: target == node, tie }
                })
                .collect();
            keys.sort_by(|a, b| compare_keys(a, b, comparator));
            if !multiset {
                keys.dedup_by(|a, b| compare_keys(a, b, comparator) == Ordering::Equal);
            }
            keys
        })
        .collect();
    to_refine.split_by(|a, b| compare_signatures(&signatures[a], &signatures[b], comparator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_weak_signature_ignores_counts() {
        // 0 sends two ties into {2,3}, 1 sends one.
        let net = Network::from_arcs(4, [(0, 2), (0, 3), (1, 2)]).unwrap();
        let current = Equivalence::from_classes([0, 0, 1, 1]);
        let top = Equivalence::universal(4);
        let weak = refine_by_signature(&net.outgoing(), &current, &top, &Comparator::None, false);
        assert!(weak.are_equivalent(0, 1));
        let exact = refine_by_signature(&net.outgoing(), &current, &top, &Comparator::None, true);
        assert!(!exact.are_equivalent(0, 1));
        assert!(exact.are_equivalent(2, 3));
    }

    #[test]
    fn test_loops_form_their_own_key() {
        let net = Network::from_arcs(2, [(0, 0), (1, 0)]).unwrap();
        let top = Equivalence::universal(2);
        let e = refine_by_signature(&net.outgoing(), &top, &top, &Comparator::None, false);
        assert!(!e.are_equivalent(0, 1));
    }
}
