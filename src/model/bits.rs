//! Dense bit matrix shared by `Ranking` and `BinaryRelation`.
//!
//! Row `i` holds the set `{ j : (i, j) ∈ R }` packed into `u64` words. Bits
//! beyond column `n - 1` are always zero, so derived equality and hashing
//! compare relations, not padding.

use serde::{Deserialize, Serialize};
use crate::Error;

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitMatrix")]
pub(crate) struct BitMatrix {
    n: usize,
    words: usize,
    bits: Vec<u64>,
}

/// Wire form of `BitMatrix`, checked before it becomes one.
#[derive(Deserialize)]
struct RawBitMatrix {
    n: usize,
    words: usize,
    bits: Vec<u64>,
}

impl TryFrom<RawBitMatrix> for BitMatrix {
    type Error = Error;

    fn try_from(raw: RawBitMatrix) -> Result<Self, Error> {
        let words = raw.n.div_ceil(WORD_BITS);
        if raw.words != words || raw.bits.len() != raw.n * words {
            return Err(Error::InvalidParameter(format!(
                "bit matrix of {} nodes needs {} words per row and {} words in total, got {} and {}",
                raw.n,
                words,
                raw.n * words,
                raw.words,
                raw.bits.len()
            )));
        }
        let mut m = Self { n: raw.n, words, bits: raw.bits };
        m.clear_padding();
        Ok(m)
    }
}

impl BitMatrix {
    pub fn zeros(n: usize) -> Self {
        let words = n.div_ceil(WORD_BITS);
        Self { n, words, bits: vec![0; n * words] }
    }

    pub fn full(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            let row = m.row_mut(i);
            row.fill(u64::MAX);
        }
        m.clear_padding();
        m
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i);
        }
        m
    }

    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            for j in 0..n {
                if f(i, j) {
                    m.set(i, j);
                }
            }
        }
        m
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        debug_assert!(i < self.n && j < self.n);
        (self.bits[i * self.words + j / WORD_BITS] >> (j % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.n && j < self.n);
        self.bits[i * self.words + j / WORD_BITS] |= 1 << (j % WORD_BITS);
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u64] {
        &self.bits[i * self.words..(i + 1) * self.words]
    }

    #[inline]
    fn row_mut(&mut self, i: usize) -> &mut [u64] {
        &mut self.bits[i * self.words..(i + 1) * self.words]
    }

    fn clear_padding(&mut self) {
        let tail = self.n % WORD_BITS;
        if tail == 0 || self.words == 0 {
            return;
        }
        let mask = (1u64 << tail) - 1;
        for i in 0..self.n {
            let last = i * self.words + self.words - 1;
            self.bits[last] &= mask;
        }
    }

    pub fn and(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        let bits = self.bits.iter().zip(&other.bits).map(|(a, b)| a & b).collect();
        Self { n: self.n, words: self.words, bits }
    }

    pub fn or(&self, other: &Self) -> Self {
        debug_assert_eq!(self.n, other.n);
        let bits = self.bits.iter().zip(&other.bits).map(|(a, b)| a | b).collect();
        Self { n: self.n, words: self.words, bits }
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.n);
        for i in 0..self.n {
            for j in self.iter_row(i) {
                t.set(j, i);
            }
        }
        t
    }

    /// `self ⊆ other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.n == other.n && self.bits.iter().zip(&other.bits).all(|(a, b)| a & !b == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Warshall's algorithm over packed rows.
    pub fn close_transitively(&mut self) {
        let mut pivot = vec![0u64; self.words];
        for k in 0..self.n {
            pivot.copy_from_slice(self.row(k));
            for i in 0..self.n {
                if self.get(i, k) {
                    for (w, p) in self.row_mut(i).iter_mut().zip(&pivot) {
                        *w |= p;
                    }
                }
            }
        }
    }

    pub fn set_reflexive(&mut self) {
        for i in 0..self.n {
            self.set(i, i);
        }
    }

    /// Columns set in row `i`, ascending.
    pub fn iter_row(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i).iter().enumerate().flat_map(|(w, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_matrix_has_no_padding_bits() {
        let m = BitMatrix::full(70);
        assert_eq!(m.count_ones(), 70 * 70);
        assert_eq!(m, BitMatrix::from_fn(70, |_, _| true));
    }

    #[test]
    fn iter_row_crosses_word_boundaries() {
        let mut m = BitMatrix::zeros(130);
        m.set(3, 0);
        m.set(3, 63);
        m.set(3, 64);
        m.set(3, 129);
        assert_eq!(m.iter_row(3).collect::<Vec<_>>(), vec![0, 63, 64, 129]);
    }

    #[test]
    fn warshall_closes_a_chain() {
        let mut m = BitMatrix::zeros(4);
        m.set(0, 1);
        m.set(1, 2);
        m.set(2, 3);
        m.close_transitively();
        assert!(m.get(0, 3));
        assert!(m.get(1, 3));
        assert!(!m.get(3, 0));
        assert_eq!(m.count_ones(), 6);
    }

    #[test]
    fn deserialize_checks_shape() {
        let m: BitMatrix = serde_json::from_str(r#"{"n":2,"words":1,"bits":[2,1]}"#).unwrap();
        assert!(m.get(0, 1));
        assert!(m.get(1, 0));
        assert!(serde_json::from_str::<BitMatrix>(r#"{"n":2,"words":1,"bits":[0]}"#).is_err());
        assert!(serde_json::from_str::<BitMatrix>(r#"{"n":2,"words":2,"bits":[0,0,0,0]}"#).is_err());
    }

    #[test]
    fn deserialize_clears_padding() {
        let m: BitMatrix = serde_json::from_str(r#"{"n":1,"words":1,"bits":[7]}"#).unwrap();
        assert_eq!(m, BitMatrix::full(1));
    }

    #[test]
    fn transpose_swaps_pairs() {
        let mut m = BitMatrix::zeros(3);
        m.set(0, 2);
        let t = m.transpose();
        assert!(t.get(2, 0));
        assert!(!t.get(0, 2));
    }
}
