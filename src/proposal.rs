use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A totally ordered, globally unique proposal identifier.
///
/// Encoded as `round * cluster_size + node_index`, so two nodes can never hand
/// out the same number even though they count independently. Higher number
/// wins every comparison in the protocol; equality only ever compares a number
/// against itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProposalNumber(u64);

impl ProposalNumber {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic per-node source of [`ProposalNumber`]s.
///
/// Each node strides through its own residue class modulo the cluster size,
/// so the numbers of all nodes interleave into one strictly ordered, collision
/// free sequence. Only this node's proposer calls [`next`](Self::next).
#[derive(Debug)]
pub struct ProposalNumberGenerator {
    counter: AtomicU64,
    stride: u64,
    offset: u64,
}

impl ProposalNumberGenerator {
    /// `node_index` is this node's position in the ordered peer set and must
    /// be below `cluster_size`; [`crate::config::ClusterConfig`] guarantees
    /// both when it wires a node up.
    pub fn new(cluster_size: usize, node_index: usize) -> Self {
        debug_assert!(node_index < cluster_size.max(1));
        Self {
            counter: AtomicU64::new(0),
            stride: cluster_size.max(1) as u64,
            offset: node_index as u64,
        }
    }

    /// Atomically advance the counter and return the encoded number.
    pub fn next(&self) -> ProposalNumber {
        let round = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        ProposalNumber(round * self.stride + self.offset)
    }

    /// How many numbers this generator has handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
