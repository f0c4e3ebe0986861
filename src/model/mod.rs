//! # Role Structures
//!
//! The three role-structure kinds and the distance matrix. These types
//! cross every boundary: matching engine ↔ fixpoint engine ↔ user.
//!
//! Design rule: pure values. No views, no operators, no mutation after
//! construction; every lattice operation returns a new instance.

mod bits;
pub mod lattice;
pub mod equivalence;
pub mod ranking;
pub mod relation;
pub mod distance;

pub use lattice::{RoleKind, RoleStructure};
pub use equivalence::Equivalence;
pub use ranking::Ranking;
pub use relation::BinaryRelation;
pub use distance::IntDistanceMatrix;
