//! In-order receiver (C5): accepts segments from a single sender in strict
//! sequence order, buffering payload and replying FIN_ACK on teardown.

use std::net::SocketAddr;

use crate::config::RecvTimeout;
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::events::{Event, EventSink, Phase};
use crate::segment::Segment;

/// Blocks until `sender` completes a full transfer (bare FIN observed),
/// returning the concatenated, in-order payload.
///
/// Any segment whose `seq_num` is below the next expected sequence number is
/// a duplicate of one already accepted, re-acknowledged rather than
/// dropped, since the peer's go-back-N sender treats any ack mismatch as
/// license to retransmit its whole window and needs to resync. A segment
/// ahead of the expected sequence number, or one that fails its checksum, is
/// dropped silently.
pub fn receive<E: Endpoint>(
    ep: &mut E,
    sender: SocketAddr,
    sink: &mut impl EventSink,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut expected: u32 = 0;

    loop {
        match ep.recv(RecvTimeout::Blocking) {
            Ok((from, seg)) if seg.is_fin() => {
                sink.emit(Event::info(Phase::Teardown, "Received FIN request").with_peer(from));
                ep.send(sender, &Segment::fin_ack())?;
                sink.emit(Event::info(Phase::Teardown, "Sending FIN ACK response").with_peer(sender));
                return Ok(output);
            }
            Ok((from, seg)) if seg.is_data() && seg.seq_num == expected => {
                output.extend_from_slice(&seg.payload);
                sink.emit(Event::info(Phase::Transfer, format!("Received segment number {expected}")).with_peer(from));

                ep.send(sender, &Segment::ack(expected, expected))?;
                sink.emit(Event::info(Phase::Transfer, format!("Sending ACK response {expected}")).with_peer(sender));
                expected += 1;
            }
            Ok((from, seg)) if seg.is_data() && seg.seq_num < expected => {
                ep.send(sender, &Segment::ack(seg.seq_num, seg.seq_num))?;
                sink.emit(
                    Event::info(Phase::Transfer, format!("Resending ACK response {}", seg.seq_num)).with_peer(from),
                );
            }
            Ok((from, seg)) => {
                sink.emit(Event::error(Phase::Transfer, format!("Rejected segment number {}", seg.seq_num)).with_peer(from));
            }
            Err(e) if matches!(e, crate::err::Error::Timeout | crate::err::Error::InvalidChecksum) => {
                sink.emit(Event::error(Phase::Transfer, format!("{e}")));
            }
            Err(e) => return Err(e),
        }
    }
}
