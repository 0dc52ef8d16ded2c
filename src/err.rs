use std::net::SocketAddr;

/// Error kinds surfaced by the core transport.
///
/// `Timeout`, `InvalidChecksum`, and `UnknownSegment` are recoverable: every
/// caller inside this crate handles them locally (retransmit, drop, ignore)
/// and never lets them escape a phase. `Bind` and `Io` are fatal and unwind
/// to the role orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no datagram received within the configured timeout")]
    Timeout,

    #[error("checksum mismatch on received segment")]
    InvalidChecksum,

    #[error("segment with unexpected flags 0x{flags:02x} from {from}")]
    UnknownSegment { flags: u8, from: SocketAddr },

    #[error("failed to bind local socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
