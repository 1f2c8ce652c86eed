//! Wire shapes for the four protocol operations.
//!
//! Absent fields carry the "nothing accepted yet" case, so no in-band sentinel
//! number exists on the wire: a [`PrepareReply`] either reports a full
//! previously-accepted pair or neither half of it.

/// Phase 1a: ask an acceptor to promise proposal `proposal_number`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrepareRequest {
    #[prost(uint64, tag = "1")]
    pub proposal_number: u64,
}

/// Phase 1b: the acceptor's promise or rejection.
///
/// On a promise, `accepted_proposal`/`accepted_value` report the highest
/// proposal this acceptor has already accepted, if any. On a rejection both
/// are absent.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PrepareReply {
    #[prost(bool, tag = "1")]
    pub promised: bool,
    #[prost(uint64, optional, tag = "2")]
    pub accepted_proposal: Option<u64>,
    #[prost(string, optional, tag = "3")]
    pub accepted_value: Option<String>,
}

/// Phase 2a: ask an acceptor to accept `value` under `proposal_number`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AcceptRequest {
    #[prost(uint64, tag = "1")]
    pub proposal_number: u64,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// Phase 2b: the acceptor's accept or rejection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AcceptReply {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
}

/// Advisory notification that `value` has been chosen.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LearnRequest {
    #[prost(string, tag = "1")]
    pub value: String,
}

/// Fire-and-forget acknowledgment of a [`LearnRequest`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LearnAck {}

/// Read-only snapshot of one node's protocol state, for diagnostics and tests.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeStatus {
    #[prost(string, tag = "1")]
    pub node_id: String,
    /// How many proposal numbers this node has handed out as a proposer.
    #[prost(uint64, tag = "2")]
    pub proposal_counter: u64,
    #[prost(uint64, optional, tag = "3")]
    pub promised_proposal: Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub accepted_proposal: Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub accepted_value: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub learned_value: Option<String>,
}
