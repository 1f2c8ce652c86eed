use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::{
    acceptor::Acceptor,
    config::ClusterConfig,
    error::PaxosError,
    events::{DecreeEvent, DecreeEventBus, RoundPhase},
    messages::{AcceptReply, AcceptRequest, LearnAck, LearnRequest, NodeStatus, PrepareReply, PrepareRequest},
    proposal::ProposalNumber,
    proposer::{Proposer, RoundOutcome},
    transport::{InMemoryTransport, PeerTransport},
};

/// One Paxos peer: the acceptor everyone may call, the proposer that runs
/// when this node leads, and the advisory event bus.
///
/// The embedding service layer maps its network surface onto the four
/// operations one-to-one and keeps no protocol state of its own.
pub struct PaxosNode<T: PeerTransport> {
    config: ClusterConfig,
    acceptor: Arc<Acceptor>,
    proposer: Proposer<T>,
    events: DecreeEventBus,
}

pub type InMemoryPaxosNode = PaxosNode<InMemoryTransport>;

impl<T: PeerTransport> PaxosNode<T> {
    pub fn new(config: ClusterConfig, transport: Arc<T>) -> Self {
        let acceptor = Arc::new(Acceptor::new(config.node_id.clone()));
        let proposer = Proposer::new(config.clone(), Arc::clone(&acceptor), transport);
        Self {
            config,
            acceptor,
            proposer,
            events: DecreeEventBus::default(),
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// The acceptor backing this node, for wiring into a transport registry.
    pub fn acceptor(&self) -> &Arc<Acceptor> {
        &self.acceptor
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DecreeEvent> {
        self.events.subscribe()
    }

    /// Client-facing propose. Runs a full round if this node is the leader;
    /// otherwise reports who is, so the caller can forward the request
    /// unchanged. A round already in flight rejects the call immediately.
    pub async fn propose(&self, value: impl Into<String>) -> Result<RoundOutcome, PaxosError> {
        if !self.config.is_leader() {
            info!(
                node = %self.config.node_id,
                leader = %self.config.leader,
                "propose received by non-leader"
            );
            return Err(PaxosError::NotLeader {
                leader: self.config.leader.clone(),
            });
        }

        let outcome = self.proposer.propose(value.into()).await?;
        match &outcome {
            RoundOutcome::Committed { proposal, value } => {
                self.events.publish(DecreeEvent::DecreeCommitted {
                    proposal: proposal.as_u64(),
                    value: value.clone(),
                });
            }
            RoundOutcome::Aborted { promises, needed } => {
                self.events.publish(DecreeEvent::RoundAbandoned {
                    phase: RoundPhase::Prepare,
                    responses: *promises,
                    needed: *needed,
                });
            }
            RoundOutcome::Failed {
                acceptances,
                needed,
            } => {
                self.events.publish(DecreeEvent::RoundAbandoned {
                    phase: RoundPhase::Accept,
                    responses: *acceptances,
                    needed: *needed,
                });
            }
        }
        Ok(outcome)
    }

    /// Acceptor surface for an inbound Prepare.
    pub fn handle_prepare(&self, request: PrepareRequest) -> PrepareReply {
        self.acceptor
            .handle_prepare(ProposalNumber::from_raw(request.proposal_number))
    }

    /// Acceptor surface for an inbound Accept.
    pub fn handle_accept(&self, request: AcceptRequest) -> AcceptReply {
        self.acceptor.handle_accept(
            ProposalNumber::from_raw(request.proposal_number),
            &request.value,
        )
    }

    /// Learner surface for an inbound Learn notification.
    pub fn handle_learn(&self, request: LearnRequest) -> LearnAck {
        self.acceptor.handle_learn(&request.value);
        self.events.publish(DecreeEvent::ValueLearned {
            value: request.value,
        });
        LearnAck {}
    }

    /// Read-only snapshot for diagnostics; no effect on protocol state.
    pub fn status(&self) -> NodeStatus {
        let accepted = self.acceptor.accepted();
        NodeStatus {
            node_id: self.config.node_id.clone(),
            proposal_counter: self.proposer.proposal_counter(),
            promised_proposal: self.acceptor.promised().map(ProposalNumber::as_u64),
            accepted_proposal: accepted.as_ref().map(|(number, _)| number.as_u64()),
            accepted_value: accepted.map(|(_, value)| value),
            learned_value: self.acceptor.learned(),
        }
    }
}
