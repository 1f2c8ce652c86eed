use parking_lot::Mutex;
use tracing::debug;

use crate::{
    messages::{AcceptReply, PrepareReply},
    proposal::ProposalNumber,
};

#[derive(Debug, Default)]
struct AcceptorInner {
    /// Highest proposal number this node has promised; never decreases.
    promised: Option<ProposalNumber>,
    /// Highest accepted proposal paired with its value; the two halves are
    /// only ever written together.
    accepted: Option<(ProposalNumber, String)>,
    /// What this node believes the cluster chose. Set only by learn
    /// notifications, never consulted by the promise/accept rules.
    learned: Option<String>,
}

/// The acceptor role of one node.
///
/// One instance lives for the whole process and is shared between the local
/// proposer (loopback calls) and the network surface, so every handler takes
/// the one state lock for its full read-decide-write step. Requests from
/// concurrent proposers therefore serialize; none of them can observe a
/// half-applied decision.
#[derive(Debug)]
pub struct Acceptor {
    node_id: String,
    inner: Mutex<AcceptorInner>,
}

impl Acceptor {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            inner: Mutex::new(AcceptorInner::default()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Phase 1b: promise `proposal` iff it is strictly higher than every
    /// promise given so far. A promise reports the highest accepted pair so
    /// the proposer can adopt a value that may already be chosen. Rejection
    /// leaves no trace.
    pub fn handle_prepare(&self, proposal: ProposalNumber) -> PrepareReply {
        let mut inner = self.inner.lock();
        if inner.promised.is_none_or(|promised| proposal > promised) {
            inner.promised = Some(proposal);
            debug!(node = %self.node_id, %proposal, "promised");
            let (accepted_proposal, accepted_value) = match &inner.accepted {
                Some((number, value)) => (Some(number.as_u64()), Some(value.clone())),
                None => (None, None),
            };
            PrepareReply {
                promised: true,
                accepted_proposal,
                accepted_value,
            }
        } else {
            debug!(
                node = %self.node_id,
                %proposal,
                promised = ?inner.promised,
                "rejected prepare below current promise"
            );
            PrepareReply {
                promised: false,
                accepted_proposal: None,
                accepted_value: None,
            }
        }
    }

    /// Phase 2b: accept iff `proposal` is at least the current promise.
    ///
    /// Non-strict on purpose, unlike [`handle_prepare`](Self::handle_prepare):
    /// the proposer whose prepare set the current promise must be able to
    /// follow up with an accept under the very same number.
    pub fn handle_accept(&self, proposal: ProposalNumber, value: &str) -> AcceptReply {
        let mut inner = self.inner.lock();
        if inner.promised.is_none_or(|promised| proposal >= promised) {
            inner.promised = Some(proposal);
            inner.accepted = Some((proposal, value.to_owned()));
            debug!(node = %self.node_id, %proposal, value, "accepted");
            AcceptReply { accepted: true }
        } else {
            debug!(
                node = %self.node_id,
                %proposal,
                promised = ?inner.promised,
                "rejected accept below current promise"
            );
            AcceptReply { accepted: false }
        }
    }

    /// Learner role: record the chosen value unconditionally. Advisory only;
    /// promise and accept state are untouched.
    pub fn handle_learn(&self, value: &str) {
        let mut inner = self.inner.lock();
        debug!(node = %self.node_id, value, "learned");
        inner.learned = Some(value.to_owned());
    }

    pub fn promised(&self) -> Option<ProposalNumber> {
        self.inner.lock().promised
    }

    pub fn accepted(&self) -> Option<(ProposalNumber, String)> {
        self.inner.lock().accepted.clone()
    }

    pub fn learned(&self) -> Option<String> {
        self.inner.lock().learned.clone()
    }
}
