//! Go-back-N sender (C4): transmits a byte buffer as a sequence of segments
//! under a static sliding window, then tears the connection down with FIN.

use std::net::SocketAddr;

use crate::config::{RecvTimeout, PAYLOAD_SIZE, WINDOW_SIZE};
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::events::{Event, EventSink, Phase};
use crate::segment::Segment;

fn is_recoverable(err: &crate::err::Error) -> bool {
    matches!(err, crate::err::Error::Timeout | crate::err::Error::InvalidChecksum)
}

/// Splits `data` into up-to-`PAYLOAD_SIZE` chunks. An empty buffer yields no
/// chunks at all, so [`send`] transmits zero segments and proceeds straight
/// to teardown.
fn chunks(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    data.chunks(PAYLOAD_SIZE).collect()
}

/// Sends the full contents of `data` to `remote` under go-back-N, then
/// issues FIN and blocks for FIN_ACK before returning.
pub fn send<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    data: &[u8],
    sink: &mut impl EventSink,
) -> Result<()> {
    send_data(ep, remote, data, sink)?;
    send_fin(ep, remote, sink)
}

fn send_data<E: Endpoint>(
    ep: &mut E,
    remote: SocketAddr,
    data: &[u8],
    sink: &mut impl EventSink,
) -> Result<()> {
    let pieces = chunks(data);
    let total_segments = pieces.len();
    let window_size = total_segments.min(WINDOW_SIZE).max(1);

    let mut seq_base = 0usize;
    let mut on_transfer = 0usize;

    while seq_base != total_segments {
        while on_transfer < window_size && seq_base + on_transfer < total_segments {
            let idx = seq_base + on_transfer;
            let segment = Segment::data(idx as u32, seq_base as u32, pieces[idx].to_vec());
            ep.send(remote, &segment)?;
            sink.emit(Event::info(Phase::Transfer, format!("Sending segment {idx}")).with_peer(remote));
            on_transfer += 1;
        }

        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) => {
                sink.emit(
                    Event::info(Phase::Transfer, format!("Received ACK response {}", seg.ack_num)).with_peer(from),
                );

                if seg.ack_num == seq_base as u32 {
                    sink.emit(Event::info(Phase::Transfer, "ACK received sequentially, sending the next segment"));
                    seq_base += 1;
                    on_transfer -= 1;
                } else {
                    sink.emit(Event::error(
                        Phase::Transfer,
                        format!("ACK number does not match, retransmit {window_size} segments starting from {seq_base}"),
                    ));
                    on_transfer = 0;
                }
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Transfer, format!("{e}")));
                on_transfer = 0;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn send_fin<E: Endpoint>(ep: &mut E, remote: SocketAddr, sink: &mut impl EventSink) -> Result<()> {
    let fin = Segment::fin();
    ep.send(remote, &fin)?;

    loop {
        sink.emit(Event::info(Phase::Teardown, "Waiting for response...").with_peer(remote));

        match ep.recv(RecvTimeout::TIMEOUT) {
            Ok((from, seg)) if seg.is_fin_ack() => {
                sink.emit(Event::info(Phase::Teardown, "Received FIN ACK response").with_peer(from));
                sink.emit(Event::info(Phase::Teardown, "File transfer completed").with_peer(remote));
                return Ok(());
            }
            Ok((from, _)) => {
                sink.emit(Event::error(Phase::Teardown, "Unknown segment received").with_peer(from));
                sink.emit(Event::info(Phase::Teardown, "Retransmit FIN request").with_peer(remote));
                ep.send(remote, &fin)?;
            }
            Err(e) if is_recoverable(&e) => {
                sink.emit(Event::error(Phase::Teardown, format!("{e}")).with_peer(remote));
                sink.emit(Event::info(Phase::Teardown, "Retransmit FIN request").with_peer(remote));
                ep.send(remote, &fin)?;
            }
            Err(e) => return Err(e),
        }
    }
}
