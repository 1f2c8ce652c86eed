#[derive(Debug, thiserror::Error)]
pub enum PaxosError {
    #[error("a proposal round is already in flight on this node")]
    ProposalInFlight,

    #[error("this node is not the leader; forward the request to {leader}")]
    NotLeader { leader: String },

    #[error("peer set is empty")]
    EmptyPeerSet,
    #[error("peer set contains duplicate entry {peer}")]
    DuplicatePeer { peer: String },
    #[error("node {node} is not a member of the configured peer set")]
    UnknownNode { node: String },
    #[error("leader {leader} is not a member of the configured peer set")]
    UnknownLeader { leader: String },
    #[error("timeout must be non-zero")]
    ZeroTimeout,

    #[error("missing required environment variable {0}")]
    MissingEnvVar(&'static str),
}

/// Failure to deliver one request to one peer.
///
/// Never surfaced to a proposing client: the proposer counts a failed call as a
/// rejection for quorum purposes and moves on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("peer {peer} is unreachable")]
    Unreachable { peer: String },
    #[error("request to peer {peer} timed out")]
    Timeout { peer: String },
    #[error("peer {peer} is not registered with this transport")]
    UnknownPeer { peer: String },
    #[error("malformed reply from peer {peer}: {reason}")]
    MalformedReply { peer: String, reason: String },
}
