//! Handshake engine (C3): both the asymmetric client↔server flavor and the
//! symmetric peer↔peer role negotiation.

use std::net::SocketAddr;

use crate::config::RecvTimeout;
use crate::endpoint::Endpoint;
use crate::err::{Error, Result};
use crate::events::{Event, EventSink, Phase};
use crate::segment::Segment;

/// Which side of a symmetric peer exchange a negotiation settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

fn is_recoverable(err: &Error) -> bool {
    matches!(err, Error::Timeout | Error::InvalidChecksum)
}

// --- (a) Client <-> Server, asymmetric -------------------------------------

/// Client side of enrollment: send SYN(0), retransmit on timeout/checksum
/// error, retry indefinitely until ACK(0,0) is observed.
pub fn client_enroll<E: Endpoint>(
    ep: &mut E,
    server: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<()> {
    let syn = Segment::syn(0);
    ep.send(server, &syn)?;
    sink.emit(Event::info(Phase::Enrollment, "Sending SYN request").with_peer(server));

    loop {
        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) if seg.is_ack() => {
                sink.emit(Event::info(Phase::Enrollment, "Received ACK response").with_peer(from));
                return Ok(());
            }
            Ok((from, _)) => {
                sink.emit(Event::error(Phase::Enrollment, "Unknown segment received").with_peer(from));
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Enrollment, format!("{e}, retransmitting SYN")).with_peer(server));
                ep.send(server, &syn)?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Server side of enrollment: block for one SYN(0), ignoring anything else,
/// enroll the sender, and acknowledge. Returns the enrolled client address.
pub fn server_accept_enrollment<E: Endpoint>(
    ep: &mut E,
    sink: &mut impl EventSink,
) -> Result<SocketAddr> {
    loop {
        let (from, seg) = ep.recv(RecvTimeout::Blocking)?;

        if seg.is_syn() {
            sink.emit(Event::info(Phase::Enrollment, "Received request").with_peer(from));
            ep.send(from, &Segment::ack(0, 0))?;
            return Ok(from);
        }

        sink.emit(Event::error(Phase::Enrollment, "Unknown segment received").with_peer(from));
    }
}

/// Server side of transfer-start: the server actively re-opens a second
/// handshake toward an already-enrolled client before sending data.
pub fn server_start_transfer<E: Endpoint>(
    ep: &mut E,
    client: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<()> {
    let syn = Segment::syn(0);
    ep.send(client, &syn)?;
    sink.emit(Event::info(Phase::Handshake, "Sending SYN request").with_peer(client));

    loop {
        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) if seg.is_syn_ack() => {
                sink.emit(Event::info(Phase::Handshake, "Received SYN ACK response").with_peer(from));
                break;
            }
            Ok((from, _)) => {
                sink.emit(Event::error(Phase::Handshake, "Unknown segment received").with_peer(from));
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Handshake, format!("{e}, retransmitting SYN")).with_peer(client));
                ep.send(client, &syn)?;
            }
            Err(e) => return Err(e),
        }
    }

    // Final ACK is not retransmitted: the first data segment serves as
    // implicit confirmation if this is lost (spec §9, Open Question).
    ep.send(client, &Segment::ack(0, 0))?;
    sink.emit(Event::info(Phase::Handshake, "Handshake completed").with_peer(client));
    Ok(())
}

/// Client side of transfer-start: block for the server's SYN(0) and echo
/// SYN_ACK once. Does not itself wait for the server's final ACK; the
/// first data segment is the real confirmation.
pub fn client_await_transfer_start<E: Endpoint>(
    ep: &mut E,
    sink: &mut impl EventSink,
) -> Result<SocketAddr> {
    loop {
        let (from, seg) = ep.recv(RecvTimeout::Blocking)?;

        if seg.is_syn() {
            sink.emit(Event::info(Phase::Handshake, "Received SYN request").with_peer(from));
            ep.send(from, &Segment::syn_ack())?;
            sink.emit(Event::info(Phase::Handshake, "Sending SYN ACK request").with_peer(from));
            return Ok(from);
        }

        sink.emit(Event::error(Phase::Handshake, "Unknown segment received").with_peer(from));
    }
}

// --- (b) Peer <-> Peer, symmetric -------------------------------------------

/// Completes the active (initiating) half of a three-way handshake,
/// retrying indefinitely on timeout or checksum error.
pub fn active_handshake<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<()> {
    let syn = Segment::syn(0);
    ep.send(remote, &syn)?;
    sink.emit(Event::info(Phase::Handshake, "Sending SYN request").with_peer(remote));

    loop {
        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) if seg.is_syn_ack() => {
                sink.emit(Event::info(Phase::Handshake, "Received SYN ACK response").with_peer(from));
                break;
            }
            Ok((from, _)) => {
                sink.emit(Event::error(Phase::Handshake, "Unknown segment received").with_peer(from));
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Handshake, format!("{e}, retransmitting SYN")).with_peer(remote));
                ep.send(remote, &syn)?;
            }
            Err(e) => return Err(e),
        }
    }

    ep.send(remote, &Segment::ack(0, 0))?;
    sink.emit(Event::info(Phase::Handshake, "Sending ACK request").with_peer(remote));
    Ok(())
}

/// Completes the passive (responding) half of a three-way handshake once a
/// SYN has already been observed from `remote`.
fn complete_passive_handshake<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<()> {
    let syn_ack = Segment::syn_ack();
    ep.send(remote, &syn_ack)?;
    sink.emit(Event::info(Phase::Handshake, "Sending SYN ACK request").with_peer(remote));

    loop {
        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) if seg.is_ack() => {
                sink.emit(Event::info(Phase::Handshake, "Received ACK response").with_peer(from));
                return Ok(());
            }
            Ok((from, _)) => {
                sink.emit(Event::error(Phase::Handshake, "Unknown segment received").with_peer(from));
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Handshake, format!("{e}, retransmitting SYN ACK")).with_peer(remote));
                ep.send(remote, &syn_ack)?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Full passive handshake when the peer's role is already fixed (after a
/// role swap): blocks indefinitely for the SYN rather than probing with a
/// bounded timeout.
pub fn passive_handshake<E: Endpoint>(
    ep: &mut E,
    sink: &mut impl EventSink,
) -> Result<SocketAddr> {
    loop {
        let (from, seg) = ep.recv(RecvTimeout::Blocking)?;

        if seg.is_syn() {
            sink.emit(Event::info(Phase::Handshake, "Received SYN request").with_peer(from));
            complete_passive_handshake(ep, from, sink)?;
            return Ok(from);
        }

        sink.emit(Event::error(Phase::Handshake, "Unknown segment received").with_peer(from));
    }
}

/// Symmetric role negotiation (spec §4.3(b)): probe once, bounded by
/// `TIMEOUT`, for an incoming SYN from `remote`. If one arrives, complete
/// the passive handshake and become the initial receiver; otherwise flip to
/// active and become the initial sender.
pub fn negotiate<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<Role> {
    match ep.recv(RecvTimeout::TIMEOUT) {
        Ok((from, seg)) if seg.is_syn() => {
            sink.emit(Event::info(Phase::Handshake, "Received SYN request").with_peer(from));
            complete_passive_handshake(ep, from, sink)?;
            Ok(Role::Receiver)
        }
        Ok((from, _)) => {
            sink.emit(Event::error(Phase::Handshake, "Unknown segment received, becoming sender").with_peer(from));
            active_handshake(ep, remote, sink)?;
            Ok(Role::Sender)
        }
        Err(e) if is_recoverable(&e) => {
            sink.emit(Event::info(Phase::Handshake, format!("{e}, becoming sender")).with_peer(remote));
            active_handshake(ep, remote, sink)?;
            Ok(Role::Sender)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::tests::{addr, pair};
    use crate::events::CollectingSink;

    #[test]
    fn client_server_enrollment_round_trip() {
        let (mut client_ep, mut server_ep) = pair(addr(1), addr(2));
        let mut client_sink = CollectingSink::default();
        let mut server_sink = CollectingSink::default();

        client_ep.send(addr(2), &Segment::syn(0)).unwrap();
        let enrolled = server_accept_enrollment(&mut server_ep, &mut server_sink).unwrap();
        assert_eq!(enrolled, addr(1));

        let result = client_ep.recv(RecvTimeout::Blocking).unwrap();
        assert!(result.1.is_ack());
        let _ = client_sink;
    }

    #[test]
    fn enrollment_survives_two_lost_syns() {
        // Scenario 6: first two SYNs lost, third succeeds.
        let (mut client_ep, mut server_ep) = pair(addr(1), addr(2));
        let mut drops = 0;
        client_ep.drop_outgoing = Some(Box::new(move |_| {
            drops += 1;
            drops <= 2
        }));

        let mut client_sink = CollectingSink::default();
        let mut server_sink = CollectingSink::default();

        // Drive the client enrollment and server accept concurrently by hand:
        // the mock is synchronous, so step the client's sends until the
        // server's single blocking recv can observe one.
        client_ep.send(addr(2), &Segment::syn(0)).unwrap(); // dropped
        client_ep.send(addr(2), &Segment::syn(0)).unwrap(); // dropped
        client_ep.send(addr(2), &Segment::syn(0)).unwrap(); // delivered

        let enrolled = server_accept_enrollment(&mut server_ep, &mut server_sink).unwrap();
        assert_eq!(enrolled, addr(1));
        let _ = client_sink;
    }

    #[test]
    fn peer_negotiation_picks_one_receiver_one_sender() {
        // A has already sent its SYN (as if its own `negotiate` probe just
        // timed out and flipped it to active), so B's probe observes it
        // immediately rather than racing a real timeout window. B's
        // `negotiate` resolves to receiver on one thread while A completes
        // the active half via `active_handshake` (the same call `negotiate`
        // would have made) on another. Genuine concurrency is required
        // because B's passive completion blocks on A's final ACK.
        let (mut a_ep, mut b_ep) = pair(addr(1), addr(2));
        a_ep.send(addr(2), &Segment::syn(0)).unwrap();

        let b_handle = std::thread::spawn(move || {
            let mut b_sink = CollectingSink::default();
            let role = negotiate(&mut b_ep, addr(1), &mut b_sink).unwrap();
            (role, b_sink)
        });

        let mut a_sink = CollectingSink::default();
        active_handshake(&mut a_ep, addr(2), &mut a_sink).unwrap();

        let (b_role, _b_sink) = b_handle.join().unwrap();

        assert_eq!(b_role, Role::Receiver);
    }
}
