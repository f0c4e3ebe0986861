//! # Fixpoint Engine
//!
//! Iterates a role operator to its greatest fixpoint below a start value
//! (interior) or its least fixpoint above one (closure).
//!
//! | Declared traits   | Interior step                       |
//! |-------------------|-------------------------------------|
//! | constant          | one `relative_refining(x, x)`       |
//! | nonincreasing     | `relative(x)` until stable          |
//! | otherwise         | `relative_refining(x, x)` until stable |
//!
//! Closure is the dual with `relative_coarsening` and `nondecreasing`.
//!
//! Every step moves strictly down (up) the finite lattice until it stops,
//! so iteration terminates. Traits are trusted: an operator declared
//! `nonincreasing` that is not may fail to converge.

use crate::model::RoleStructure;
use crate::operator::RoleOperator;

/// Result of a fixpoint run.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixpoint<U> {
    pub value: U,
    /// Operator applications performed, including the final one that
    /// confirmed stability.
    pub iterations: usize,
}

/// Greatest fixpoint of `op` on `n` nodes, starting from the top structure.
pub fn interior<U, O>(op: &O, n: usize) -> Fixpoint<U>
where
    U: RoleStructure,
    O: RoleOperator<U> + ?Sized,
{
    interior_from(op, U::top(n))
}

/// Greatest fixpoint of `op` that refines `start`.
pub fn interior_from<U, O>(op: &O, start: U) -> Fixpoint<U>
where
    U: RoleStructure,
    O: RoleOperator<U> + ?Sized,
{
    let traits = op.traits();
    if traits.constant {
        let value = op.relative_refining(&start, &start);
        tracing::debug!(kind = %U::KIND, iterations = 1, "interior of constant operator");
        return Fixpoint { value, iterations: 1 };
    }

    let mut current = start;
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        let next = if traits.nonincreasing {
            op.relative(&current)
        } else {
            op.relative_refining(&current, &current)
        };
        debug_assert!(next.refines(&current), "interior step moved up");
        if next == current {
            break;
        }
        tracing::trace!(kind = %U::KIND, iteration = iterations, "interior step refined");
        current = next;
    }
    tracing::debug!(kind = %U::KIND, iterations, "interior converged");
    Fixpoint { value: current, iterations }
}

/// Least fixpoint of `op` on `n` nodes, starting from the bottom structure.
pub fn closure<U, O>(op: &O, n: usize) -> Fixpoint<U>
where
    U: RoleStructure,
    O: RoleOperator<U> + ?Sized,
{
    closure_from(op, U::bottom(n))
}

/// Least fixpoint of `op` above `start`.
pub fn closure_from<U, O>(op: &O, start: U) -> Fixpoint<U>
where
    U: RoleStructure,
    O: RoleOperator<U> + ?Sized,
{
    let traits = op.traits();
    if traits.constant {
        let value = op.relative_coarsening(&start, &start);
        tracing::debug!(kind = %U::KIND, iterations = 1, "closure of constant operator");
        return Fixpoint { value, iterations: 1 };
    }

    let mut current = start;
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        let next = if traits.nondecreasing {
            op.relative(&current)
        } else {
            op.relative_coarsening(&current, &current)
        };
        debug_assert!(current.refines(&next), "closure step moved down");
        if next == current {
            break;
        }
        tracing::trace!(kind = %U::KIND, iteration = iterations, "closure step coarsened");
        current = next;
    }
    tracing::debug!(kind = %U::KIND, iterations, "closure converged");
    Fixpoint { value: current, iterations }
}
