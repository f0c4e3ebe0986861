//! IntDistanceMatrix: pairwise role distances.

use serde::{Deserialize, Serialize};
use crate::Error;

/// An immutable `n × n` matrix of non-negative integer distances.
///
/// Entry `(i, j)` is the cost of reading position `i` as position `j`. The
/// matrix is symmetric only if the view and the cost functions that
/// produced it are; nothing here symmetrizes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDistances")]
pub struct IntDistanceMatrix {
    n: usize,
    values: Vec<u64>,
}

#[derive(Deserialize)]
struct RawDistances {
    n: usize,
    values: Vec<u64>,
}

impl TryFrom<RawDistances> for IntDistanceMatrix {
    type Error = Error;

    fn try_from(raw: RawDistances) -> Result<Self, Error> {
        if Some(raw.values.len()) != raw.n.checked_mul(raw.n) {
            return Err(Error::InvalidParameter(format!(
                "distance matrix of {} nodes cannot hold {} values",
                raw.n,
                raw.values.len()
            )));
        }
        Ok(Self { n: raw.n, values: raw.values })
    }
}

impl IntDistanceMatrix {
    pub fn zeros(n: usize) -> Self {
        Self { n, values: vec![0; n * n] }
    }

    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> u64) -> Self {
        let mut values = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                values.push(f(i, j));
            }
        }
        Self { n, values }
    }

    pub fn domain_size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.values[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        (0..self.n).map(move |i| self.row(i))
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn max_distance(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Entry-wise sum, used to combine per-orientation distances.
    pub fn sum(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        let values = self.values.iter().zip(&other.values).map(|(a, b)| a.saturating_add(*b)).collect();
        Self { n: self.n, values }
    }
}
