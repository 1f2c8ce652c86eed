use std::env;
use std::time::Duration;

use crate::error::PaxosError;

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_LEARN_TIMEOUT: Duration = Duration::from_secs(2);

/// Static cluster wiring for one node.
///
/// Every node of a cluster is configured with the same ordered peer set and
/// the same leader; only `node_id` differs. The bootstrap layer owns where
/// these values come from - [`ClusterConfig::from_env`] covers the common
/// container setup - and the core only ever sees the validated struct.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// This node's identity; must be a member of `peers`.
    pub node_id: String,
    /// The ordered peer set, including this node. Order matters: a node's
    /// position in it seeds the proposal-number stride.
    pub peers: Vec<String>,
    /// The statically assigned leader. Only the leader runs proposal rounds;
    /// every other node tells its callers to forward there.
    pub leader: String,
    /// Bound on each remote Prepare/Accept call.
    pub rpc_timeout: Duration,
    /// Bound on each best-effort Learn notification.
    pub learn_timeout: Duration,

    node_index: usize,
}

impl ClusterConfig {
    pub fn new(
        node_id: impl Into<String>,
        peers: Vec<String>,
        leader: impl Into<String>,
    ) -> Result<Self, PaxosError> {
        let node_id = node_id.into();
        let leader = leader.into();

        if peers.is_empty() {
            return Err(PaxosError::EmptyPeerSet);
        }
        for (index, peer) in peers.iter().enumerate() {
            if peers[..index].contains(peer) {
                return Err(PaxosError::DuplicatePeer { peer: peer.clone() });
            }
        }
        let node_index = peers
            .iter()
            .position(|peer| *peer == node_id)
            .ok_or_else(|| PaxosError::UnknownNode {
                node: node_id.clone(),
            })?;
        if !peers.contains(&leader) {
            return Err(PaxosError::UnknownLeader { leader });
        }

        Ok(Self {
            node_id,
            peers,
            leader,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            learn_timeout: DEFAULT_LEARN_TIMEOUT,
            node_index,
        })
    }

    /// Read the cluster wiring from `NODE_ID`, `PEERS` (comma separated) and
    /// `LEADER`. `LEADER` may be omitted, in which case the first peer leads.
    pub fn from_env() -> Result<Self, PaxosError> {
        let node_id = env::var("NODE_ID").map_err(|_| PaxosError::MissingEnvVar("NODE_ID"))?;
        let peers: Vec<String> = env::var("PEERS")
            .map_err(|_| PaxosError::MissingEnvVar("PEERS"))?
            .split(',')
            .map(|peer| peer.trim().to_owned())
            .filter(|peer| !peer.is_empty())
            .collect();
        let leader = match env::var("LEADER") {
            Ok(leader) => leader,
            Err(_) => peers.first().cloned().ok_or(PaxosError::EmptyPeerSet)?,
        };
        Self::new(node_id, peers, leader)
    }

    /// Set the bound on remote Prepare/Accept calls (validated).
    pub fn with_rpc_timeout(mut self, rpc_timeout: Duration) -> Result<Self, PaxosError> {
        if rpc_timeout.is_zero() {
            return Err(PaxosError::ZeroTimeout);
        }
        self.rpc_timeout = rpc_timeout;
        Ok(self)
    }

    /// Set the bound on Learn notifications (validated).
    pub fn with_learn_timeout(mut self, learn_timeout: Duration) -> Result<Self, PaxosError> {
        if learn_timeout.is_zero() {
            return Err(PaxosError::ZeroTimeout);
        }
        self.learn_timeout = learn_timeout;
        Ok(self)
    }

    pub fn is_leader(&self) -> bool {
        self.node_id == self.leader
    }

    pub fn cluster_size(&self) -> usize {
        self.peers.len()
    }

    /// This node's position in the ordered peer set, established at
    /// construction time.
    pub fn node_index(&self) -> usize {
        self.node_index
    }
}
