use std::time::Duration;

/// Datagram MTU for this transport. Bounds the total size of a segment
/// (12-byte header + payload) on the wire.
pub const SEGMENT_SIZE: usize = 32 * 1024;

/// Maximum payload a single segment can carry.
pub const PAYLOAD_SIZE: usize = SEGMENT_SIZE - crate::segment::HEADER_SIZE;

/// Sender window width, in segments.
pub const WINDOW_SIZE: usize = 4;

/// Finite retransmission timer used throughout the handshake, sender, and
/// receiver whenever a bounded wait is required.
pub const TIMEOUT: Duration = Duration::from_secs(1);

/// How long a single `recv` call is willing to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeout {
    /// Wait indefinitely for a datagram.
    Blocking,
    /// Wait at most this long before failing with [`crate::Error::Timeout`].
    After(Duration),
}

impl RecvTimeout {
    /// The design-default finite timeout (`TIMEOUT`, ~1s).
    pub const TIMEOUT: RecvTimeout = RecvTimeout::After(TIMEOUT);
}
