//! # Position View Contract
//!
//! This is THE contract between the role algebra and any network store.
//! Every algorithm reads ties through `PositionView`; none of them knows
//! how the network is held.
//!
//! ## Implementations
//!
//! | View | Module | Description |
//! |------|--------|-------------|
//! | `NetworkView` | `memory` | In-memory multigraph, one view per orientation |
//! | `Transposed` | here | Any `TransposablePositionView` read backwards |

pub mod memory;

pub use memory::{Network, NetworkView, Orientation, Tie};

// ============================================================================
// PositionView Trait
// ============================================================================

/// Read-only access to the ties of each node.
///
/// `ties(lhs, rhs, node)` yields the ties of `node` while position `lhs` is
/// being compared with position `rhs`. The comparison slots let a view
/// present ties relative to the pair under comparison; views without such
/// context ignore them. Sequences must be finite, restartable and identical
/// across repeated calls within one computation.
pub trait PositionView {
    type Tie: Clone;

    fn count_nodes(&self) -> usize;

    fn ties(&self, lhs: usize, rhs: usize, node: usize) -> impl Iterator<Item = Self::Tie> + '_;

    fn count_ties(&self, lhs: usize, rhs: usize, node: usize) -> usize {
        self.ties(lhs, rhs, node).count()
    }

    /// The node the tie points at, as seen from the tie's owner.
    fn tie_target(&self, tie: &Self::Tie) -> usize;

    /// Stable identifier of the underlying tie.
    fn tie_index(&self, tie: &Self::Tie) -> usize;
}

/// A view that can also be read with tie orientation reversed, so that
/// incoming and outgoing ties are both available without building a second
/// view.
pub trait TransposablePositionView: PositionView {
    fn transposed_ties(&self, lhs: usize, rhs: usize, node: usize) -> impl Iterator<Item = Self::Tie> + '_;

    fn count_transposed_ties(&self, lhs: usize, rhs: usize, node: usize) -> usize {
        self.transposed_ties(lhs, rhs, node).count()
    }
}

impl<V: PositionView> PositionView for &V {
    type Tie = V::Tie;

    fn count_nodes(&self) -> usize {
        (**self).count_nodes()
    }

    fn ties(&self, lhs: usize, rhs: usize, node: usize) -> impl Iterator<Item = Self::Tie> + '_ {
        (**self).ties(lhs, rhs, node)
    }

    fn count_ties(&self, lhs: usize, rhs: usize, node: usize) -> usize {
        (**self).count_ties(lhs, rhs, node)
    }

    fn tie_target(&self, tie: &Self::Tie) -> usize {
        (**self).tie_target(tie)
    }

    fn tie_index(&self, tie: &Self::Tie) -> usize {
        (**self).tie_index(tie)
    }
}

// ============================================================================
// Transposed adapter
// ============================================================================

/// Presents the transposed ties of a view as its primary ties.
#[derive(Debug, Clone, Copy)]
pub struct Transposed<'v, V> {
    inner: &'v V,
}

impl<'v, V: TransposablePositionView> Transposed<'v, V> {
    pub fn new(inner: &'v V) -> Self {
        Self { inner }
    }
}

impl<V: TransposablePositionView> PositionView for Transposed<'_, V> {
    type Tie = V::Tie;

    fn count_nodes(&self) -> usize {
        self.inner.count_nodes()
    }

    fn ties(&self, lhs: usize, rhs: usize, node: usize) -> impl Iterator<Item = Self::Tie> + '_ {
        self.inner.transposed_ties(lhs, rhs, node)
    }

    fn count_ties(&self, lhs: usize, rhs: usize, node: usize) -> usize {
        self.inner.count_transposed_ties(lhs, rhs, node)
    }

    fn tie_target(&self, tie: &Self::Tie) -> usize {
        self.inner.tie_target(tie)
    }

    fn tie_index(&self, tie: &Self::Tie) -> usize {
        self.inner.tie_index(tie)
    }
}

impl<V: TransposablePositionView> TransposablePositionView for Transposed<'_, V> {
    fn transposed_ties(&self, lhs: usize, rhs: usize, node: usize) -> impl Iterator<Item = Self::Tie> + '_ {
        self.inner.ties(lhs, rhs, node)
    }
}
