//! # Operator Builder
//!
//! Resolves a notion of role similarity, a matching tolerance and a
//! comparator into a ready-to-run operator. All configuration errors
//! surface here, before anything is computed.
//!
//! | Notion            | p          | Orientations        | Constant |
//! |-------------------|------------|---------------------|----------|
//! | `Regular`         | ∞ (or p)   | view                | no       |
//! | `Equitable`       | 1          | view                | no       |
//! | `Weak`            | ∞ (or p)   | view ∧ transposed   | no       |
//! | `WeaklyEquitable` | 1          | view ∧ transposed   | no       |
//! | `Generic`         | required   | view                | no       |
//! | `StrongStructural`| 1 (or p)   | view                | yes      |
//! | `WeakStructural`  | ∞          | view ∧ transposed   | yes      |
//!
//! "view ∧ transposed" is the infimum of the operator on the view and on
//! its transpose; for distances the two matrices are summed.
//!
//! ## Example
//!
//! ```
//! use netroles::{Equivalence, Network, Notion, OperatorBuilder, RoleOperator};
//!
//! let net = Network::from_arcs(4, [(0, 1), (1, 2), (2, 0), (3, 3)]).unwrap();
//! let view = net.outgoing();
//! let op = OperatorBuilder::<_, Equivalence>::new(&view, Notion::Weak).build().unwrap();
//! assert_eq!(op.interior(4), Equivalence::from_classes([0, 0, 0, 1]));
//! ```

use serde::{Deserialize, Serialize};
use crate::comparator::{Comparator, ComparatorMode, ComparatorSource};
use crate::distance::{CostFunction, DistanceOperator, RegularDistance, StructuralDistance, SumDistance};
use crate::matching::PMatching;
use crate::model::RoleKind;
use crate::network::{PositionView, TransposablePositionView, Transposed};
use crate::operator::{MatchRefine, OperatorTraits, Parallel, RegularOperator, RoleOperator, StructuralOperator, WithTraits};
use crate::{Error, Result};

// ============================================================================
// Notion / OperatorSpec
// ============================================================================

/// The supported notions of role similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notion {
    Regular,
    Equitable,
    Weak,
    WeaklyEquitable,
    Generic,
    StrongStructural,
    WeakStructural,
}

impl Notion {
    /// Structural notions ignore the operator input.
    pub fn is_structural(self) -> bool {
        matches!(self, Notion::StrongStructural | Notion::WeakStructural)
    }

    /// Whether the notion reads the view and its transpose.
    pub fn uses_both_orientations(self) -> bool {
        matches!(self, Notion::Weak | Notion::WeaklyEquitable | Notion::WeakStructural)
    }
}

impl std::fmt::Display for Notion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Notion::Regular => "regular",
            Notion::Equitable => "equitable",
            Notion::Weak => "weak",
            Notion::WeaklyEquitable => "weakly equitable",
            Notion::Generic => "generic",
            Notion::StrongStructural => "strong structural",
            Notion::WeakStructural => "weak structural",
        };
        f.write_str(name)
    }
}

/// Serializable part of an operator configuration.
///
/// ```json
/// { "notion": "generic", "p": 2 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorSpec {
    pub notion: Notion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<usize>,
}

impl OperatorSpec {
    pub fn new(notion: Notion) -> Self {
        Self { notion, p: None }
    }

    pub fn with_p(mut self, p: usize) -> Self {
        self.p = Some(p);
        self
    }

    /// # Errors
    /// `Error::Config` for malformed JSON or unknown notions.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The matching tolerance this spec resolves to.
    ///
    /// # Errors
    /// - `InvalidParameter` for `p = 0`
    /// - `UnsupportedConfiguration` for `Generic` without `p`, or `p` given
    ///   to a notion that fixes it
    pub fn matching(&self) -> Result<PMatching> {
        let explicit = self.p.map(PMatching::new).transpose()?;
        match (self.notion, explicit) {
            (Notion::Regular | Notion::Weak, p) => Ok(p.unwrap_or_else(PMatching::unbounded)),
            (Notion::StrongStructural, p) => Ok(p.unwrap_or_else(PMatching::exact)),
            (Notion::Generic, Some(p)) => Ok(p),
            (Notion::Generic, None) => Err(Error::UnsupportedConfiguration(
                "generic notion requires an explicit p".into(),
            )),
            (Notion::Equitable | Notion::WeaklyEquitable, None) => Ok(PMatching::exact()),
            (Notion::WeakStructural, None) => Ok(PMatching::unbounded()),
            (notion @ (Notion::Equitable | Notion::WeaklyEquitable | Notion::WeakStructural), Some(_)) => {
                Err(Error::UnsupportedConfiguration(format!("{notion} notion fixes p; remove the parameter")))
            }
        }
    }
}

// ============================================================================
// OperatorBuilder
// ============================================================================

/// Builds role and distance operators over a borrowed view.
pub struct OperatorBuilder<'v, V: PositionView, U> {
    view: &'v V,
    spec: OperatorSpec,
    comparator: ComparatorSource<U, V::Tie>,
    traits: Option<OperatorTraits>,
}

impl<'v, V, U> OperatorBuilder<'v, V, U>
where
    V: TransposablePositionView,
    V::Tie: 'v,
    U: MatchRefine + 'v,
{
    pub fn new(view: &'v V, notion: Notion) -> Self {
        Self::from_spec(view, OperatorSpec::new(notion))
    }

    pub fn from_spec(view: &'v V, spec: OperatorSpec) -> Self {
        Self { view, spec, comparator: ComparatorSource::default(), traits: None }
    }

    pub fn p(mut self, p: usize) -> Self {
        self.spec.p = Some(p);
        self
    }

    pub fn comparator(mut self, comparator: impl Into<ComparatorSource<U, V::Tie>>) -> Self {
        self.comparator = comparator.into();
        self
    }

    /// Replace the declared traits of the built operator.
    pub fn traits(mut self, traits: OperatorTraits) -> Self {
        self.traits = Some(traits);
        self
    }

    pub fn spec(&self) -> OperatorSpec {
        self.spec
    }

    fn validate(&self) -> Result<PMatching> {
        let p = self.spec.matching()?;
        if self.comparator.mode() == ComparatorMode::Predicate
            && matches!(U::KIND, RoleKind::Equivalence | RoleKind::Ranking)
        {
            return Err(Error::UnsupportedConfiguration(format!(
                "predicate comparators cannot build a {}; use an order or none",
                U::KIND
            )));
        }
        if let Some(traits) = self.traits {
            traits.validate()?;
        }
        Ok(p)
    }

    fn fixed_comparator(&self) -> Result<Comparator<V::Tie>> {
        match &self.comparator {
            ComparatorSource::Fixed(comparator) => Ok(comparator.clone()),
            ComparatorSource::Relative { .. } => Err(Error::UnsupportedConfiguration(format!(
                "{} notion is constant and cannot use a comparator relative to its input",
                self.spec.notion
            ))),
        }
    }

    /// # Errors
    /// Any configuration error described on `OperatorSpec::matching`, plus
    /// predicate comparators for equivalences and rankings, relative
    /// comparators for structural notions and invalid trait overrides.
    pub fn build(self) -> Result<Box<dyn RoleOperator<U> + 'v>> {
        let p = self.validate()?;
        let notion = self.spec.notion;
        let transposed = Transposed::new(self.view);
        let op: Box<dyn RoleOperator<U> + 'v> = if notion.is_structural() {
            let comparator = self.fixed_comparator()?;
            let forward = StructuralOperator::<_, U>::new(self.view).with_comparator(comparator.clone()).with_p(p);
            if notion.uses_both_orientations() {
                let backward = StructuralOperator::<_, U>::new(transposed).with_comparator(comparator).with_p(p);
                Box::new(Parallel::meet(forward, backward))
            } else {
                Box::new(forward)
            }
        } else {
            let forward = RegularOperator::<_, U>::new(self.view).with_comparator(self.comparator.clone()).with_p(p);
            if notion.uses_both_orientations() {
                let backward = RegularOperator::<_, U>::new(transposed).with_comparator(self.comparator).with_p(p);
                Box::new(Parallel::meet(forward, backward))
            } else {
                Box::new(forward)
            }
        };
        tracing::debug!(%notion, kind = %U::KIND, p = p.p(), "role operator built");
        Ok(match self.traits {
            Some(traits) => Box::new(WithTraits::new(op, traits)),
            None => op,
        })
    }

    /// # Errors
    /// As `build`.
    pub fn build_distance(self, cost: CostFunction<V::Tie>) -> Result<Box<dyn DistanceOperator<U> + 'v>> {
        let p = self.validate()?;
        let notion = self.spec.notion;
        let transposed = Transposed::new(self.view);
        let op: Box<dyn DistanceOperator<U> + 'v> = if notion.is_structural() {
            let comparator = self.fixed_comparator()?;
            let forward = StructuralDistance::<_, U>::new(self.view, cost.clone()).with_comparator(comparator.clone()).with_p(p);
            if notion.uses_both_orientations() {
                let backward = StructuralDistance::<_, U>::new(transposed, cost).with_comparator(comparator).with_p(p);
                Box::new(SumDistance::new(forward, backward))
            } else {
                Box::new(forward)
            }
        } else {
            let forward = RegularDistance::<_, U>::new(self.view, cost.clone()).with_comparator(self.comparator.clone()).with_p(p);
            if notion.uses_both_orientations() {
                let backward = RegularDistance::<_, U>::new(transposed, cost).with_comparator(self.comparator).with_p(p);
                Box::new(SumDistance::new(forward, backward))
            } else {
                Box::new(forward)
            }
        };
        tracing::debug!(%notion, kind = %U::KIND, p = p.p(), "distance operator built");
        Ok(op)
    }
}
