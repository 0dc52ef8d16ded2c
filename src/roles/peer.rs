//! Peer role: negotiate which side sends first, run a transfer in that
//! direction, then swap roles and run one in the other direction.

use std::net::SocketAddr;

use super::{PayloadSink, PayloadSource};
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::events::{Event, EventSink, Phase};
use crate::handshake::Role;
use crate::{handshake, receiver, sender};

/// Runs the peer role to completion: negotiate, transfer in both
/// directions (receive-then-send or send-then-receive depending on the
/// negotiated role), and hand the inbound payload to `output`.
pub fn run<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    input: &mut impl PayloadSource,
    output: &mut impl PayloadSink,
    sink: &mut impl EventSink,
) -> Result<()> {
    let outgoing = input.load().map_err(crate::err::Error::Io)?;
    let role = handshake::negotiate(ep, remote, sink)?;

    let incoming = match role {
        Role::Receiver => {
            let incoming = receiver::receive(ep, remote, sink)?;

            sink.emit(Event::info(Phase::Handshake, "Peer now acting as sender"));
            handshake::active_handshake(ep, remote, sink)?;
            sender::send(ep, remote, &outgoing, sink)?;

            incoming
        }
        Role::Sender => {
            sender::send(ep, remote, &outgoing, sink)?;

            sink.emit(Event::info(Phase::Handshake, "Peer now acting as receiver"));
            let from = handshake::passive_handshake(ep, sink)?;
            receiver::receive(ep, from, sink)?
        }
    };

    output.store(&incoming).map_err(crate::err::Error::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::tests::{addr, pair};
    use crate::events::CollectingSink;
    use crate::roles::tests::{FixedSource, RecordingSink};
    use crate::segment::Segment;

    #[test]
    fn receiver_side_swaps_to_sender_after_first_transfer() {
        let (mut a_ep, mut b_ep) = pair(addr(1), addr(2));
        // A plays the scripted remote: it SYNs first, so B negotiates as
        // receiver, then after B's incoming transfer, B actively re-opens a
        // handshake to become sender for the return leg.
        a_ep.send(addr(2), &Segment::syn(0)).unwrap();

        let handle = std::thread::spawn(move || {
            let (_, syn_ack) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert!(syn_ack.is_syn_ack());
            a_ep.send(addr(2), &Segment::ack(0, 0)).unwrap();

            a_ep.send(addr(2), &Segment::data(0, 0, b"in".to_vec())).unwrap();
            let (_, ack) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert_eq!(ack, Segment::ack(0, 0));
            a_ep.send(addr(2), &Segment::fin()).unwrap();
            let (_, fin_ack) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert!(fin_ack.is_fin_ack());

            let (_, syn) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert!(syn.is_syn());
            a_ep.send(addr(2), &Segment::syn_ack()).unwrap();
            let (_, final_ack) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert!(final_ack.is_ack());

            let (_, out_seg) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert_eq!(out_seg.payload, b"out");
            a_ep.send(addr(2), &Segment::ack(0, 0)).unwrap();
            let (_, fin2) = a_ep.recv(crate::config::RecvTimeout::Blocking).unwrap();
            assert!(fin2.is_fin());
            a_ep.send(addr(2), &Segment::fin_ack()).unwrap();
        });

        let mut input = FixedSource(b"out".to_vec());
        let mut output = RecordingSink::default();
        let mut sink = CollectingSink::default();

        run(&mut b_ep, addr(1), &mut input, &mut output, &mut sink).unwrap();
        handle.join().unwrap();

        assert_eq!(output.0, Some(b"in".to_vec()));
    }
}
