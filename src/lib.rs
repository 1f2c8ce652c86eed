//! A single-decree Paxos consensus engine for small peer-to-peer clusters.
//!
//! This library implements the three classic Paxos roles (proposer, acceptor, learner)
//! inside one process that also participates as a peer over a network. A cluster of
//! nodes agrees on exactly one value: the statically configured leader drives a
//! two-phase Prepare/Accept round against every acceptor, and once a majority has
//! accepted, the chosen value is broadcast to all learners best-effort.
//!
//! ## How it works
//!
//! A client hands a value to the leader's [`node::PaxosNode::propose`]. The proposer
//! draws a globally unique proposal number, asks every acceptor (including its own,
//! via a direct loopback call) to promise it, and adopts the value of the
//! highest-numbered previously accepted proposal it hears about - the rule that keeps
//! two overlapping rounds from choosing different values. If a majority promises and
//! then a majority accepts, the decree is chosen and learners are notified.
//!
//! Every node answers Prepare/Accept/Learn requests addressed to it regardless of
//! role; wiring between peers goes through the [`transport::PeerTransport`] trait.
//! The bundled [`transport::InMemoryTransport`] connects nodes living in one process,
//! which is also how the integration tests exercise whole clusters.

pub mod acceptor;
pub mod config;
pub mod error;
pub mod events;
pub mod messages;
pub mod node;
pub mod proposal;
pub mod proposer;
pub mod quorum;
pub mod transport;
