use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    acceptor::Acceptor,
    config::ClusterConfig,
    error::PaxosError,
    messages::{AcceptRequest, LearnRequest, PrepareReply, PrepareRequest},
    proposal::{ProposalNumber, ProposalNumberGenerator},
    quorum,
    transport::PeerTransport,
};

/// Terminal outcome of one proposal round.
///
/// Rounds never retry on their own: an abandoned round reports how far it got
/// and a fresh client request starts over with a new proposal number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// An accept quorum was reached; `value` is chosen for the whole cluster.
    /// This may be an earlier proposer's value adopted during Prepare rather
    /// than the one the client asked for.
    Committed {
        proposal: ProposalNumber,
        value: String,
    },
    /// The promise set fell short of a quorum; the Accept phase was never
    /// entered.
    Aborted { promises: usize, needed: usize },
    /// Promises sufficed but the acceptance set fell short of a quorum.
    Failed { acceptances: usize, needed: usize },
}

/// Drives the two-phase protocol end-to-end for one decree value.
///
/// One round at a time per node: a `propose` call that arrives while another
/// round is in flight is rejected immediately rather than queued. Requests to
/// this node's own acceptor are plain method calls; everything else goes
/// through the transport under a per-call timeout, and any failed or timed out
/// call simply counts as a rejection for that phase.
pub struct Proposer<T: PeerTransport> {
    config: ClusterConfig,
    acceptor: Arc<Acceptor>,
    generator: ProposalNumberGenerator,
    transport: Arc<T>,
    in_flight: Mutex<()>,
}

impl<T: PeerTransport> Proposer<T> {
    pub fn new(config: ClusterConfig, acceptor: Arc<Acceptor>, transport: Arc<T>) -> Self {
        let generator = ProposalNumberGenerator::new(config.cluster_size(), config.node_index());
        Self {
            config,
            acceptor,
            generator,
            transport,
            in_flight: Mutex::new(()),
        }
    }

    /// How many proposal numbers this node has drawn, for status reporting.
    pub fn proposal_counter(&self) -> u64 {
        self.generator.issued()
    }

    /// Run one full round for `value`.
    ///
    /// Fails fast with [`PaxosError::ProposalInFlight`] if a round is already
    /// running; every protocol-level result, including missed quorums, comes
    /// back as a [`RoundOutcome`].
    pub async fn propose(&self, value: String) -> Result<RoundOutcome, PaxosError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| PaxosError::ProposalInFlight)?;

        let proposal = self.generator.next();
        let cluster_size = self.config.cluster_size();
        let needed = quorum::quorum_size(cluster_size);
        info!(node = %self.config.node_id, %proposal, value = %value, "starting proposal round");

        let promises = self.prepare_phase(proposal).await;
        if !quorum::has_quorum(promises.len(), cluster_size) {
            warn!(
                node = %self.config.node_id,
                %proposal,
                promises = promises.len(),
                needed,
                "prepare quorum not reached, aborting round"
            );
            return Ok(RoundOutcome::Aborted {
                promises: promises.len(),
                needed,
            });
        }

        let value = match Self::highest_accepted(&promises) {
            Some((earlier, adopted)) => {
                info!(
                    node = %self.config.node_id,
                    %proposal,
                    earlier_proposal = earlier,
                    value = %adopted,
                    "adopting previously accepted value over the client's"
                );
                adopted
            }
            None => value,
        };

        let acceptances = self.accept_phase(proposal, &value).await;
        if !quorum::has_quorum(acceptances, cluster_size) {
            warn!(
                node = %self.config.node_id,
                %proposal,
                acceptances,
                needed,
                "accept quorum not reached, round failed"
            );
            return Ok(RoundOutcome::Failed { acceptances, needed });
        }

        info!(node = %self.config.node_id, %proposal, value = %value, "decree chosen");
        self.broadcast_learn(&value).await;

        Ok(RoundOutcome::Committed { proposal, value })
    }

    /// Fan Prepare out to every peer, loopback included, and keep the
    /// promises. Transport failures and rejections fall out of the set alike.
    async fn prepare_phase(&self, proposal: ProposalNumber) -> Vec<PrepareReply> {
        let calls = self.config.peers.iter().map(|peer| {
            let transport = Arc::clone(&self.transport);
            async move {
                if *peer == self.config.node_id {
                    return Some(self.acceptor.handle_prepare(proposal));
                }
                let request = PrepareRequest {
                    proposal_number: proposal.as_u64(),
                };
                match timeout(self.config.rpc_timeout, transport.prepare(peer, request)).await {
                    Ok(Ok(reply)) => Some(reply),
                    Ok(Err(error)) => {
                        warn!(%peer, %error, "prepare delivery failed");
                        None
                    }
                    Err(_) => {
                        warn!(%peer, "prepare timed out");
                        None
                    }
                }
            }
        });

        join_all(calls)
            .await
            .into_iter()
            .flatten()
            .filter(|reply| reply.promised)
            .collect()
    }

    /// The Paxos safety rule: among the promises that report a previously
    /// accepted pair, take the value of the strictly highest accepted
    /// proposal number. `None` means the round is free to use the client's
    /// value.
    fn highest_accepted(promises: &[PrepareReply]) -> Option<(u64, String)> {
        promises
            .iter()
            .filter_map(|reply| match (&reply.accepted_proposal, &reply.accepted_value) {
                (Some(number), Some(value)) => Some((*number, value)),
                _ => None,
            })
            .max_by_key(|(number, _)| *number)
            .map(|(number, value)| (number, value.clone()))
    }

    /// Fan Accept out to every peer and count the acceptances.
    async fn accept_phase(&self, proposal: ProposalNumber, value: &str) -> usize {
        let calls = self.config.peers.iter().map(|peer| {
            let transport = Arc::clone(&self.transport);
            async move {
                if *peer == self.config.node_id {
                    return self.acceptor.handle_accept(proposal, value).accepted;
                }
                let request = AcceptRequest {
                    proposal_number: proposal.as_u64(),
                    value: value.to_owned(),
                };
                match timeout(self.config.rpc_timeout, transport.accept(peer, request)).await {
                    Ok(Ok(reply)) => reply.accepted,
                    Ok(Err(error)) => {
                        warn!(%peer, %error, "accept delivery failed");
                        false
                    }
                    Err(_) => {
                        warn!(%peer, "accept timed out");
                        false
                    }
                }
            }
        });

        join_all(calls)
            .await
            .into_iter()
            .filter(|accepted| *accepted)
            .count()
    }

    /// Tell every learner about the chosen value. Purely advisory: safety is
    /// already established by the accept quorum, so lost notifications are
    /// logged and forgotten.
    async fn broadcast_learn(&self, value: &str) {
        let calls = self.config.peers.iter().map(|peer| {
            let transport = Arc::clone(&self.transport);
            async move {
                if *peer == self.config.node_id {
                    self.acceptor.handle_learn(value);
                    return;
                }
                let request = LearnRequest {
                    value: value.to_owned(),
                };
                match timeout(self.config.learn_timeout, transport.learn(peer, request)).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(error)) => debug!(%peer, %error, "learn notification lost"),
                    Err(_) => debug!(%peer, "learn notification timed out"),
                }
            }
        });

        join_all(calls).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{PrepareReply, Proposer};
    use crate::transport::InMemoryTransport;

    fn promise(accepted: Option<(u64, &str)>) -> PrepareReply {
        PrepareReply {
            promised: true,
            accepted_proposal: accepted.map(|(number, _)| number),
            accepted_value: accepted.map(|(_, value)| value.to_owned()),
        }
    }

    #[test]
    fn highest_accepted_prefers_the_largest_number() {
        let promises = vec![
            promise(None),
            promise(Some((4, "older"))),
            promise(Some((9, "newest"))),
            promise(Some((7, "middle"))),
        ];
        assert_eq!(
            Proposer::<InMemoryTransport>::highest_accepted(&promises),
            Some((9, "newest".to_owned()))
        );
    }

    #[test]
    fn highest_accepted_is_none_for_fresh_promises() {
        let promises = vec![promise(None), promise(None)];
        assert_eq!(
            Proposer::<InMemoryTransport>::highest_accepted(&promises),
            None
        );
    }
}
