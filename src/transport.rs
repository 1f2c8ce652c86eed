use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    acceptor::Acceptor,
    error::TransportError,
    messages::{AcceptReply, AcceptRequest, LearnAck, LearnRequest, PrepareReply, PrepareRequest},
    proposal::ProposalNumber,
};

/// Delivers one protocol request to one named peer and returns its reply.
///
/// Owned by the embedding service layer; the proposer only ever sees this
/// trait. Implementations decide the actual wire (HTTP, RPC, in-process) and
/// report delivery problems as [`TransportError`], which the proposer counts
/// as rejections. The proposer additionally bounds every call with its own
/// timeout, so an implementation may block indefinitely without wedging a
/// round.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    async fn prepare(
        &self,
        peer: &str,
        request: PrepareRequest,
    ) -> Result<PrepareReply, TransportError>;

    async fn accept(
        &self,
        peer: &str,
        request: AcceptRequest,
    ) -> Result<AcceptReply, TransportError>;

    async fn learn(&self, peer: &str, request: LearnRequest) -> Result<LearnAck, TransportError>;
}

#[derive(Default)]
struct Registry {
    acceptors: HashMap<String, Arc<Acceptor>>,
    unreachable: HashSet<String>,
    drop_learns: bool,
}

/// [`PeerTransport`] over a registry of acceptors living in this process.
///
/// Connects a whole cluster inside one binary, with switches to cut peers off
/// or drop learn traffic so tests can replay fixed fault patterns.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    registry: Arc<RwLock<Registry>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, peer: impl Into<String>, acceptor: Arc<Acceptor>) {
        let mut registry = self.registry.write().await;
        registry.acceptors.insert(peer.into(), acceptor);
    }

    /// Make `peer` unreachable: every request to it fails until
    /// [`reconnect`](Self::reconnect).
    pub async fn disconnect(&self, peer: impl Into<String>) {
        let mut registry = self.registry.write().await;
        registry.unreachable.insert(peer.into());
    }

    pub async fn reconnect(&self, peer: &str) {
        let mut registry = self.registry.write().await;
        registry.unreachable.remove(peer);
    }

    /// Drop all learn notifications without delivering them.
    pub async fn set_drop_learns(&self, drop: bool) {
        let mut registry = self.registry.write().await;
        registry.drop_learns = drop;
    }

    async fn acceptor_for(&self, peer: &str) -> Result<Arc<Acceptor>, TransportError> {
        let registry = self.registry.read().await;
        if registry.unreachable.contains(peer) {
            return Err(TransportError::Unreachable {
                peer: peer.to_owned(),
            });
        }
        registry
            .acceptors
            .get(peer)
            .cloned()
            .ok_or_else(|| TransportError::UnknownPeer {
                peer: peer.to_owned(),
            })
    }
}

#[async_trait]
impl PeerTransport for InMemoryTransport {
    async fn prepare(
        &self,
        peer: &str,
        request: PrepareRequest,
    ) -> Result<PrepareReply, TransportError> {
        let acceptor = self.acceptor_for(peer).await?;
        Ok(acceptor.handle_prepare(ProposalNumber::from_raw(request.proposal_number)))
    }

    async fn accept(
        &self,
        peer: &str,
        request: AcceptRequest,
    ) -> Result<AcceptReply, TransportError> {
        let acceptor = self.acceptor_for(peer).await?;
        Ok(acceptor.handle_accept(
            ProposalNumber::from_raw(request.proposal_number),
            &request.value,
        ))
    }

    async fn learn(&self, peer: &str, request: LearnRequest) -> Result<LearnAck, TransportError> {
        if self.registry.read().await.drop_learns {
            return Err(TransportError::Timeout {
                peer: peer.to_owned(),
            });
        }
        let acceptor = self.acceptor_for(peer).await?;
        acceptor.handle_learn(&request.value);
        Ok(LearnAck {})
    }
}
