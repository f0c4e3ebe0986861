//! In-memory network.
//!
//! This is the reference implementation of `PositionView`. It stores a
//! directed multigraph as a tie list plus per-node adjacency, and hands out
//! lightweight views for each orientation.
//!
//! ## Limitations
//!
//! - **Append-only**: ties can be added but not removed. Role computations
//!   borrow the network immutably, so nothing changes underneath them.
//! - **Values are cloned**: every `Tie` carries a clone of its value. Keep
//!   `W` small (integers, enums) or wrap it in an `Arc`.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use super::{PositionView, TransposablePositionView};

// ============================================================================
// Orientation
// ============================================================================

/// How a view reads the directed ties of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// A node's ties are the ties it sends.
    Outgoing,
    /// A node's ties are the ties it receives; targets are the senders.
    Incoming,
    /// Both, with every loop reported once.
    Undirected,
}

impl Orientation {
    pub fn reversed(self) -> Self {
        match self {
            Orientation::Outgoing => Orientation::Incoming,
            Orientation::Incoming => Orientation::Outgoing,
            Orientation::Undirected => Orientation::Undirected,
        }
    }
}

// ============================================================================
// Tie
// ============================================================================

/// A tie as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tie<W> {
    /// Position of the tie in insertion order.
    pub index: usize,
    /// The other endpoint.
    pub target: usize,
    pub value: W,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TieRecord<W> {
    source: usize,
    target: usize,
    value: W,
}

// ============================================================================
// Network
// ============================================================================

/// A directed multigraph on nodes `0..n` whose ties carry values of type `W`.
///
/// Deserialization replays the tie list through `add_tie` and rejects
/// adjacency lists that disagree with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork<W>", bound(deserialize = "W: Deserialize<'de> + Clone"))]
pub struct Network<W = ()> {
    records: Vec<TieRecord<W>>,
    /// node → indices of ties it sends
    outgoing: Vec<Vec<usize>>,
    /// node → indices of ties it receives
    incoming: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
struct RawNetwork<W> {
    records: Vec<TieRecord<W>>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<W: Clone> TryFrom<RawNetwork<W>> for Network<W> {
    type Error = Error;

    fn try_from(raw: RawNetwork<W>) -> Result<Self> {
        let n = raw.outgoing.len();
        let ties = raw.records.into_iter().map(|r| (r.source, r.target, r.value));
        let network = Self::from_ties(n, ties)?;
        if network.outgoing != raw.outgoing || network.incoming != raw.incoming {
            return Err(Error::InvalidParameter(
                "network adjacency does not match its tie list".into(),
            ));
        }
        Ok(network)
    }
}

impl<W: Clone> Network<W> {
    pub fn new(n: usize) -> Self {
        Self {
            records: Vec::new(),
            outgoing: vec![Vec::new(); n],
            incoming: vec![Vec::new(); n],
        }
    }

    /// Build a network from `(source, target, value)` triples.
    pub fn from_ties(n: usize, ties: impl IntoIterator<Item = (usize, usize, W)>) -> Result<Self> {
        let mut network = Self::new(n);
        for (source, target, value) in ties {
            network.add_tie(source, target, value)?;
        }
        Ok(network)
    }

    /// Append a tie and return its index.
    pub fn add_tie(&mut self, source: usize, target: usize, value: W) -> Result<usize> {
        let count = self.count_nodes();
        for node in [source, target] {
            if node >= count {
                return Err(Error::NodeOutOfRange { node, count });
            }
        }
        let index = self.records.len();
        self.records.push(TieRecord { source, target, value });
        self.outgoing[source].push(index);
        self.incoming[target].push(index);
        Ok(index)
    }

    pub fn count_nodes(&self) -> usize {
        self.outgoing.len()
    }

    pub fn count_ties(&self) -> usize {
        self.records.len()
    }

    pub fn view(&self, orientation: Orientation) -> NetworkView<'_, W> {
        NetworkView { network: self, orientation }
    }

    pub fn outgoing(&self) -> NetworkView<'_, W> {
        self.view(Orientation::Outgoing)
    }

    pub fn incoming(&self) -> NetworkView<'_, W> {
        self.view(Orientation::Incoming)
    }

    pub fn undirected(&self) -> NetworkView<'_, W> {
        self.view(Orientation::Undirected)
    }

    fn oriented(&self, orientation: Orientation, node: usize) -> impl Iterator<Item = Tie<W>> + '_ {
        let (sent, received): (&[usize], &[usize]) = match orientation {
            Orientation::Outgoing => (self.outgoing[node].as_slice(), &[][..]),
            Orientation::Incoming => (&[][..], self.incoming[node].as_slice()),
            Orientation::Undirected => (self.outgoing[node].as_slice(), self.incoming[node].as_slice()),
        };
        let skip_loops = orientation == Orientation::Undirected;
        let sent = sent.iter().map(move |&index| {
            let record = &self.records[index];
            Tie { index, target: record.target, value: record.value.clone() }
        });
        let received = received
            .iter()
            .filter(move |&&index| !(skip_loops && self.records[index].source == self.records[index].target))
            .map(move |&index| {
                let record = &self.records[index];
                Tie { index, target: record.source, value: record.value.clone() }
            });
        sent.chain(received)
    }

    fn count_oriented(&self, orientation: Orientation, node: usize) -> usize {
        match orientation {
            Orientation::Outgoing => self.outgoing[node].len(),
            Orientation::Incoming => self.incoming[node].len(),
            Orientation::Undirected => self.oriented(orientation, node).count(),
        }
    }
}

impl Network<()> {
    /// Build an unvalued network from `(source, target)` arcs.
    pub fn from_arcs(n: usize, arcs: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        Self::from_ties(n, arcs.into_iter().map(|(s, t)| (s, t, ())))
    }
}

// ============================================================================
// NetworkView
// ============================================================================

/// One orientation of a `Network`. Ignores the comparison slots.
#[derive(Debug)]
pub struct NetworkView<'a, W> {
    network: &'a Network<W>,
    orientation: Orientation,
}

impl<W> Clone for NetworkView<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for NetworkView<'_, W> {}

impl<'a, W: Clone> NetworkView<'a, W> {
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn transposed(&self) -> NetworkView<'a, W> {
        NetworkView { network: self.network, orientation: self.orientation.reversed() }
    }
}

impl<W: Clone> PositionView for NetworkView<'_, W> {
    type Tie = Tie<W>;

    fn count_nodes(&self) -> usize {
        self.network.count_nodes()
    }

    fn ties(&self, _lhs: usize, _rhs: usize, node: usize) -> impl Iterator<Item = Tie<W>> + '_ {
        self.network.oriented(self.orientation, node)
    }

    fn count_ties(&self, _lhs: usize, _rhs: usize, node: usize) -> usize {
        self.network.count_oriented(self.orientation, node)
    }

    fn tie_target(&self, tie: &Tie<W>) -> usize {
        tie.target
    }

    fn tie_index(&self, tie: &Tie<W>) -> usize {
        tie.index
    }
}

impl<W: Clone> TransposablePositionView for NetworkView<'_, W> {
    fn transposed_ties(&self, _lhs: usize, _rhs: usize, node: usize) -> impl Iterator<Item = Tie<W>> + '_ {
        self.network.oriented(self.orientation.reversed(), node)
    }

    fn count_transposed_ties(&self, _lhs: usize, _rhs: usize, node: usize) -> usize {
        self.network.count_oriented(self.orientation.reversed(), node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Transposed;

    fn targets<V: PositionView>(view: &V, node: usize) -> Vec<usize> {
        let mut t: Vec<usize> = view.ties(node, node, node).map(|tie| view.tie_target(&tie)).collect();
        t.sort_unstable();
        t
    }

    #[test]
    fn test_orientations() {
        let net = Network::from_arcs(3, [(0, 1), (0, 2), (2, 0)]).unwrap();
        assert_eq!(targets(&net.outgoing(), 0), vec![1, 2]);
        assert_eq!(targets(&net.incoming(), 0), vec![2]);
        assert_eq!(targets(&net.undirected(), 0), vec![1, 2, 2]);
        assert_eq!(net.outgoing().count_ties(0, 0, 1), 0);
        assert_eq!(net.incoming().count_ties(0, 0, 1), 1);
    }

    #[test]
    fn test_undirected_loop_reported_once() {
        let net = Network::from_arcs(2, [(1, 1)]).unwrap();
        assert_eq!(targets(&net.undirected(), 1), vec![1]);
        assert_eq!(net.undirected().count_ties(1, 1, 1), 1);
    }

    #[test]
    fn test_transposed_adapter_reads_incoming() {
        let net = Network::from_arcs(3, [(0, 1), (2, 1)]).unwrap();
        let out = net.outgoing();
        let transposed = Transposed::new(&out);
        assert_eq!(targets(&transposed, 1), vec![0, 2]);
        assert_eq!(transposed.count_ties(1, 1, 1), 2);
        assert_eq!(targets(&out.transposed(), 1), vec![0, 2]);
    }

    #[test]
    fn test_tie_values_and_indices() {
        let net = Network::from_ties(2, [(0, 1, 5i64), (0, 1, 7)]).unwrap();
        let view = net.outgoing();
        let ties: Vec<Tie<i64>> = view.ties(0, 0, 0).collect();
        assert_eq!(ties.iter().map(|t| t.value).collect::<Vec<_>>(), vec![5, 7]);
        assert_eq!(ties.iter().map(|t| view.tie_index(t)).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_out_of_range_tie_is_rejected() {
        let err = Network::from_arcs(2, [(0, 2)]).unwrap_err();
        assert!(matches!(err, Error::NodeOutOfRange { node: 2, count: 2 }));
    }

    #[test]
    fn test_deserialize_replays_ties() {
        let net = Network::from_ties(3, [(0, 1, 4u8), (2, 0, 1)]).unwrap();
        let json = serde_json::to_string(&net).unwrap();
        let back: Network<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(targets(&back.outgoing(), 2), vec![0]);
        assert_eq!(back.count_ties(), 2);

        let dangling = r#"{"records":[{"source":0,"target":5,"value":null}],"outgoing":[[0],[]],"incoming":[[],[]]}"#;
        assert!(serde_json::from_str::<Network>(dangling).is_err());
        let skewed = r#"{"records":[{"source":0,"target":1,"value":null}],"outgoing":[[],[0]],"incoming":[[],[0]]}"#;
        assert!(serde_json::from_str::<Network>(skewed).is_err());
    }
}
