//! Comparator strategy: how two tie values are compared during matching.
//!
//! Algorithms are written once against `Comparator::equivalent` (used when
//! computing equivalences) and `Comparator::dominated` (rankings and
//! relations). Which of the four modes backs them is the caller's choice.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::model::RoleKind;
use crate::network::Tie;

/// The four comparison modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparatorMode {
    /// Tie values are ignored.
    None,
    TotalOrder,
    PartialOrder,
    /// An arbitrary compatibility test with no order structure.
    Predicate,
}

type OrderFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
type PartialOrderFn<T> = Arc<dyn Fn(&T, &T) -> Option<Ordering> + Send + Sync>;
type PredicateFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Compatibility test between the tie `a` of one node and the tie `b` of
/// the node it is compared with.
pub enum Comparator<T> {
    None,
    TotalOrder(OrderFn<T>),
    PartialOrder(PartialOrderFn<T>),
    Predicate(PredicateFn<T>),
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        match self {
            Comparator::None => Comparator::None,
            Comparator::TotalOrder(f) => Comparator::TotalOrder(Arc::clone(f)),
            Comparator::PartialOrder(f) => Comparator::PartialOrder(Arc::clone(f)),
            Comparator::Predicate(f) => Comparator::Predicate(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Comparator::{:?}", self.mode())
    }
}

impl<T> Default for Comparator<T> {
    fn default() -> Self {
        Comparator::None
    }
}

impl<T> Comparator<T> {
    pub fn total_order(f: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        Comparator::TotalOrder(Arc::new(f))
    }

    pub fn partial_order(f: impl Fn(&T, &T) -> Option<Ordering> + Send + Sync + 'static) -> Self {
        Comparator::PartialOrder(Arc::new(f))
    }

    pub fn predicate(f: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        Comparator::Predicate(Arc::new(f))
    }

    /// Total order on a key extracted from each tie.
    pub fn by_key<K: Ord + 'static>(key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self
    where
        T: 'static,
    {
        Comparator::total_order(move |a, b| key(a).cmp(&key(b)))
    }

    pub fn mode(&self) -> ComparatorMode {
        match self {
            Comparator::None => ComparatorMode::None,
            Comparator::TotalOrder(_) => ComparatorMode::TotalOrder,
            Comparator::PartialOrder(_) => ComparatorMode::PartialOrder,
            Comparator::Predicate(_) => ComparatorMode::Predicate,
        }
    }

    /// Compatibility for equivalences: the values compare equal.
    pub fn equivalent(&self, a: &T, b: &T) -> bool {
        match self {
            Comparator::None => true,
            Comparator::TotalOrder(f) => f(a, b) == Ordering::Equal,
            Comparator::PartialOrder(f) => f(a, b) == Some(Ordering::Equal),
            Comparator::Predicate(f) => f(a, b),
        }
    }

    /// Compatibility for rankings and relations: `a` does not exceed `b`.
    pub fn dominated(&self, a: &T, b: &T) -> bool {
        match self {
            Comparator::None => true,
            Comparator::TotalOrder(f) => f(a, b) != Ordering::Greater,
            Comparator::PartialOrder(f) => matches!(f(a, b), Some(Ordering::Less | Ordering::Equal)),
            Comparator::Predicate(f) => f(a, b),
        }
    }

    pub fn compatible(&self, kind: RoleKind, a: &T, b: &T) -> bool {
        match kind {
            RoleKind::Equivalence => self.equivalent(a, b),
            RoleKind::Ranking | RoleKind::BinaryRelation => self.dominated(a, b),
        }
    }

    /// The total order backing this comparator, if it has one. `None` mode
    /// orders every pair as equal.
    pub(crate) fn ordering(&self, a: &T, b: &T) -> Option<Ordering> {
        match self {
            Comparator::None => Some(Ordering::Equal),
            Comparator::TotalOrder(f) => Some(f(a, b)),
            Comparator::PartialOrder(_) | Comparator::Predicate(_) => None,
        }
    }

    pub(crate) fn is_total(&self) -> bool {
        matches!(self, Comparator::None | Comparator::TotalOrder(_))
    }
}

impl<W: Ord + 'static> Comparator<Tie<W>> {
    /// Total order on tie values.
    pub fn by_value() -> Self {
        Comparator::total_order(|a: &Tie<W>, b: &Tie<W>| a.value.cmp(&b.value))
    }
}

impl<W: PartialOrd + 'static> Comparator<Tie<W>> {
    /// Partial order on tie values (e.g. floating point with NaN).
    pub fn by_partial_value() -> Self {
        Comparator::partial_order(|a: &Tie<W>, b: &Tie<W>| a.value.partial_cmp(&b.value))
    }
}

// ============================================================================
// ComparatorSource
// ============================================================================

type FactoryFn<U, T> = Arc<dyn Fn(&U) -> Comparator<T> + Send + Sync>;

/// Where an operator gets its comparator from: a fixed value, or a factory
/// evaluated against the structure the operator is currently applied to.
///
/// A factory declares the mode of every comparator it returns so that
/// unsupported configurations are rejected before anything runs.
pub enum ComparatorSource<U, T> {
    Fixed(Comparator<T>),
    Relative { mode: ComparatorMode, factory: FactoryFn<U, T> },
}

impl<U, T> Clone for ComparatorSource<U, T> {
    fn clone(&self) -> Self {
        match self {
            ComparatorSource::Fixed(c) => ComparatorSource::Fixed(c.clone()),
            ComparatorSource::Relative { mode, factory } => {
                ComparatorSource::Relative { mode: *mode, factory: Arc::clone(factory) }
            }
        }
    }
}

impl<U, T> std::fmt::Debug for ComparatorSource<U, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparatorSource::Fixed(c) => write!(f, "Fixed({c:?})"),
            ComparatorSource::Relative { mode, .. } => write!(f, "Relative({mode:?})"),
        }
    }
}

impl<U, T> Default for ComparatorSource<U, T> {
    fn default() -> Self {
        ComparatorSource::Fixed(Comparator::None)
    }
}

impl<U, T> From<Comparator<T>> for ComparatorSource<U, T> {
    fn from(comparator: Comparator<T>) -> Self {
        ComparatorSource::Fixed(comparator)
    }
}

impl<U, T> ComparatorSource<U, T> {
    pub fn relative(mode: ComparatorMode, factory: impl Fn(&U) -> Comparator<T> + Send + Sync + 'static) -> Self {
        ComparatorSource::Relative { mode, factory: Arc::new(factory) }
    }

    pub fn mode(&self) -> ComparatorMode {
        match self {
            ComparatorSource::Fixed(c) => c.mode(),
            ComparatorSource::Relative { mode, .. } => *mode,
        }
    }

    /// The comparator to use while `current` is the operator's input.
    pub fn resolve(&self, current: &U) -> Cow<'_, Comparator<T>> {
        match self {
            ComparatorSource::Fixed(c) => Cow::Borrowed(c),
            ComparatorSource::Relative { mode, factory } => {
                let comparator = factory(current);
                debug_assert_eq!(comparator.mode(), *mode, "comparator factory returned an undeclared mode");
                Cow::Owned(comparator)
            }
        }
    }
}
