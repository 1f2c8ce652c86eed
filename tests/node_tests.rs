use std::sync::Arc;

use paxos_decree::{
    config::ClusterConfig,
    error::PaxosError,
    events::{DecreeEvent, RoundPhase},
    messages::{AcceptRequest, LearnRequest, PrepareRequest},
    node::{InMemoryPaxosNode, PaxosNode},
    proposer::RoundOutcome,
    transport::InMemoryTransport,
};

const PEERS: [&str; 3] = ["node-1", "node-2", "node-3"];

fn peer_ids() -> Vec<String> {
    PEERS.iter().map(|peer| peer.to_string()).collect()
}

async fn build_cluster(leader: &str) -> (Arc<InMemoryTransport>, Vec<Arc<InMemoryPaxosNode>>) {
    let transport = Arc::new(InMemoryTransport::new());
    let mut nodes = Vec::new();
    for id in PEERS {
        let config = ClusterConfig::new(id, peer_ids(), leader).expect("valid cluster config");
        let node = Arc::new(PaxosNode::new(config, Arc::clone(&transport)));
        transport.register(id, Arc::clone(node.acceptor())).await;
        nodes.push(node);
    }
    (transport, nodes)
}

// A non-leader refuses to drive a round and names the leader so the caller
// can forward the request unchanged.
#[tokio::test]
async fn non_leader_propose_names_the_leader() {
    let (_transport, nodes) = build_cluster("node-2").await;

    let error = nodes[0].propose("value").await.expect_err("not the leader");
    let PaxosError::NotLeader { leader } = error else {
        panic!("expected NotLeader, got {error:?}");
    };
    assert_eq!(leader, "node-2");

    // Rejected before any protocol work: no proposal number was drawn.
    assert_eq!(nodes[0].status().proposal_counter, 0);
}

// A committed round shows up on the event bus with the chosen value.
#[tokio::test]
async fn committed_round_is_published() {
    let (_transport, nodes) = build_cluster("node-1").await;
    let mut events = nodes[0].subscribe();

    let outcome = nodes[0].propose("bar1").await.expect("leader may propose");
    let RoundOutcome::Committed { proposal, value } = outcome else {
        panic!("expected commit, got {outcome:?}");
    };

    let event = events.recv().await.expect("event published");
    assert_eq!(
        event,
        DecreeEvent::DecreeCommitted {
            proposal: proposal.as_u64(),
            value,
        }
    );
}

// An aborted round reports the phase it died in and the counts behind the
// decision.
#[tokio::test]
async fn abandoned_round_is_published() {
    let (transport, nodes) = build_cluster("node-1").await;
    transport.disconnect("node-2").await;
    transport.disconnect("node-3").await;
    let mut events = nodes[0].subscribe();

    let outcome = nodes[0].propose("bar1").await.expect("leader may propose");
    assert!(matches!(outcome, RoundOutcome::Aborted { .. }));

    let event = events.recv().await.expect("event published");
    assert_eq!(
        event,
        DecreeEvent::RoundAbandoned {
            phase: RoundPhase::Prepare,
            responses: 1,
            needed: 2,
        }
    );
}

// The learn surface records the value, acknowledges, and publishes.
#[tokio::test]
async fn learn_surface_updates_state_and_publishes() {
    let (_transport, nodes) = build_cluster("node-1").await;
    let mut events = nodes[1].subscribe();

    nodes[1].handle_learn(LearnRequest {
        value: "chosen".into(),
    });

    assert_eq!(nodes[1].status().learned_value.as_deref(), Some("chosen"));
    assert_eq!(
        events.recv().await.expect("event published"),
        DecreeEvent::ValueLearned {
            value: "chosen".into()
        }
    );
}

// The wire surface maps one-to-one onto the acceptor rules.
#[tokio::test]
async fn wire_surface_applies_acceptor_rules() {
    let (_transport, nodes) = build_cluster("node-1").await;
    let follower = &nodes[1];

    let promise = follower.handle_prepare(PrepareRequest { proposal_number: 9 });
    assert!(promise.promised);
    assert_eq!(promise.accepted_proposal, None);

    assert!(
        follower
            .handle_accept(AcceptRequest {
                proposal_number: 9,
                value: "v".into(),
            })
            .accepted
    );
    assert!(
        !follower
            .handle_prepare(PrepareRequest { proposal_number: 9 })
            .promised
    );

    let status = follower.status();
    assert_eq!(status.promised_proposal, Some(9));
    assert_eq!(status.accepted_proposal, Some(9));
    assert_eq!(status.accepted_value.as_deref(), Some("v"));
}

// The status snapshot tracks a full round on the leader.
#[tokio::test]
async fn status_reflects_a_completed_round() {
    let (_transport, nodes) = build_cluster("node-1").await;

    assert_eq!(nodes[0].status().proposal_counter, 0);
    let outcome = nodes[0].propose("bar1").await.expect("leader may propose");
    let RoundOutcome::Committed { proposal, .. } = outcome else {
        panic!("expected commit, got {outcome:?}");
    };

    let status = nodes[0].status();
    assert_eq!(status.node_id, "node-1");
    assert_eq!(status.proposal_counter, 1);
    assert_eq!(status.promised_proposal, Some(proposal.as_u64()));
    assert_eq!(status.accepted_proposal, Some(proposal.as_u64()));
    assert_eq!(status.accepted_value.as_deref(), Some("bar1"));
    assert_eq!(status.learned_value.as_deref(), Some("bar1"));
}
