//! # netroles: Role Structures for Networks
//!
//! Computes which node positions of a network play the same (or a
//! comparable) role: equivalence partitions, rankings and binary relations
//! derived from tie patterns, plus integer role-distance matrices.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `PositionView` is the contract between the role
//!    algebra and any network store
//! 2. **Pure values**: `Equivalence`, `Ranking`, `BinaryRelation` and
//!    `IntDistanceMatrix` are immutable and cross every boundary
//! 3. **One matching engine**: exact, weak and approximate notions are the
//!    same p-matching test with a different capacity `p`
//! 4. **Traits are data**: an operator declares isotone / nonincreasing /
//!    nondecreasing / constant, and the fixpoint engine trusts it
//!
//! ## Quick Start
//!
//! ```rust
//! use netroles::{Equivalence, Network, Notion, OperatorBuilder, RoleOperator};
//!
//! # fn example() -> netroles::Result<()> {
//! // 0 → 1 → 2 → 0 is a cycle, 3 only points at itself
//! let net = Network::from_arcs(4, [(0, 1), (1, 2), (2, 0), (3, 3)])?;
//! let view = net.outgoing();
//!
//! let op = OperatorBuilder::<_, Equivalence>::new(&view, Notion::WeaklyEquitable).build()?;
//! let roles = op.interior(4);
//! assert_eq!(roles.classes(), vec![vec![0, 1, 2], vec![3]]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Notions
//!
//! | Notion | Matching | Recursive |
//! |--------|----------|-----------|
//! | Regular / Weak | some partner per tie | yes |
//! | Equitable / WeaklyEquitable | one-to-one | yes |
//! | Generic | at most `p` ties per partner | yes |
//! | Strong / Weak structural | targets equal up to swapping the pair | no |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod network;
pub mod comparator;
pub mod matching;
pub mod operator;
pub mod fixpoint;
pub mod distance;
pub mod builder;

// ============================================================================
// Re-exports: Model (the role structures)
// ============================================================================

pub use model::{
    RoleKind, RoleStructure,
    Equivalence, Ranking, BinaryRelation, IntDistanceMatrix,
};

// ============================================================================
// Re-exports: Network
// ============================================================================

pub use network::{
    PositionView, TransposablePositionView, Transposed,
    Network, NetworkView, Orientation, Tie,
};

// ============================================================================
// Re-exports: Operators
// ============================================================================

pub use comparator::{Comparator, ComparatorMode, ComparatorSource};
pub use matching::{p_match, max_matching, PMatching};
pub use operator::{
    RoleOperator, OperatorTraits, FnOperator, Constant, WithTraits,
    Parallel, Series, Reducer, MatchRefine, RegularOperator, StructuralOperator,
};
pub use fixpoint::Fixpoint;
pub use distance::{CostFunction, DistanceOperator, RegularDistance, StructuralDistance, SumDistance};
pub use builder::{Notion, OperatorSpec, OperatorBuilder};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Domain mismatch: expected {expected} nodes, got {got}")]
    DomainMismatch { expected: usize, got: usize },

    #[error("Node {node} out of range for {count} nodes")]
    NodeOutOfRange { node: usize, count: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
