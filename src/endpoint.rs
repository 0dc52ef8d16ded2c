//! Datagram endpoint (C2): bind, send-one, receive-one-with-timeout, close.

use std::net::{SocketAddr, UdpSocket};

use crate::config::RecvTimeout;
use crate::err::{Error, Result};
use crate::segment::Segment;

/// The C2 contract, abstracted so the handshake/sender/receiver components
/// are generic over the transport. Production code uses [`UdpEndpoint`];
/// tests use an in-memory mock (see `endpoint::tests::MockEndpoint`) to
/// reproduce loss/duplication/reordering deterministically.
pub trait Endpoint {
    fn send(&mut self, remote: SocketAddr, segment: &Segment) -> Result<()>;
    fn recv(&mut self, timeout: RecvTimeout) -> Result<(SocketAddr, Segment)>;
}

/// Production endpoint: one UDP socket owned for the lifetime of a role.
pub struct UdpEndpoint {
    socket: UdpSocket,
}

impl UdpEndpoint {
    pub fn bind(local: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local).map_err(Error::Bind)?;
        Ok(UdpEndpoint { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Endpoint for UdpEndpoint {
    fn send(&mut self, remote: SocketAddr, segment: &Segment) -> Result<()> {
        self.socket.send_to(&segment.encode(), remote)?;
        Ok(())
    }

    fn recv(&mut self, timeout: RecvTimeout) -> Result<(SocketAddr, Segment)> {
        match timeout {
            RecvTimeout::Blocking => self.socket.set_read_timeout(None)?,
            RecvTimeout::After(d) => self.socket.set_read_timeout(Some(d))?,
        }

        let mut buf = [0u8; crate::config::SEGMENT_SIZE];
        let (n, from) = match self.socket.recv_from(&mut buf) {
            Ok(v) => v,
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                return Err(Error::Timeout)
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let segment = Segment::decode(&buf[..n])?;
        Ok((from, segment))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::sync::{Arc, Condvar, Mutex};
    use std::time::Duration;

    /// Shared in-memory wire between two [`MockEndpoint`]s. Segments travel
    /// as already-encoded bytes so that `corrupt_outgoing` flipping a byte
    /// produces a genuine checksum failure on the receiving side's decode,
    /// just as it would over a real, lossy UDP path. `Arc`/`Mutex`-backed so
    /// a pair of endpoints can be driven from two real threads, the same
    /// shape a `BLOCKING` recv has in production.
    #[derive(Default)]
    struct Wire {
        inbox: VecDeque<(SocketAddr, Vec<u8>)>,
    }

    struct Shared {
        wire: Mutex<Wire>,
        notify: Condvar,
    }

    impl Default for Shared {
        fn default() -> Self {
            Shared { wire: Mutex::new(Wire::default()), notify: Condvar::new() }
        }
    }

    pub struct MockEndpoint {
        pub addr: SocketAddr,
        inbox: Arc<Shared>,
        peer_inbox: Arc<Shared>,
        /// Predicate deciding whether an outgoing segment should be dropped
        /// (simulating channel loss) before reaching the peer's inbox.
        pub drop_outgoing: Option<Box<dyn FnMut(&Segment) -> bool + Send>>,
        /// Predicate deciding whether an outgoing segment's encoded bytes
        /// should be corrupted before reaching the peer's inbox.
        pub corrupt_outgoing: Option<Box<dyn FnMut(&Segment) -> bool + Send>>,
    }

    pub fn addr(port: u16) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
    }

    /// Builds a connected pair of mock endpoints with independent inboxes.
    pub fn pair(addr_a: SocketAddr, addr_b: SocketAddr) -> (MockEndpoint, MockEndpoint) {
        let inbox_a = Arc::new(Shared::default());
        let inbox_b = Arc::new(Shared::default());

        let a = MockEndpoint {
            addr: addr_a,
            inbox: inbox_a.clone(),
            peer_inbox: inbox_b.clone(),
            drop_outgoing: None,
            corrupt_outgoing: None,
        };
        let b = MockEndpoint {
            addr: addr_b,
            inbox: inbox_b,
            peer_inbox: inbox_a,
            drop_outgoing: None,
            corrupt_outgoing: None,
        };
        (a, b)
    }

    impl Endpoint for MockEndpoint {
        fn send(&mut self, remote: SocketAddr, segment: &Segment) -> Result<()> {
            let _ = remote;

            if let Some(drop) = self.drop_outgoing.as_mut() {
                if drop(segment) {
                    return Ok(());
                }
            }

            let mut bytes = segment.encode();
            if let Some(corrupt) = self.corrupt_outgoing.as_mut() {
                if corrupt(segment) {
                    let last = bytes.len() - 1;
                    bytes[last] ^= 0xff;
                }
            }

            self.peer_inbox.wire.lock().unwrap().inbox.push_back((self.addr, bytes));
            self.peer_inbox.notify.notify_one();
            Ok(())
        }

        fn recv(&mut self, timeout: RecvTimeout) -> Result<(SocketAddr, Segment)> {
            let mut wire = self.inbox.wire.lock().unwrap();

            if wire.inbox.is_empty() {
                wire = match timeout {
                    RecvTimeout::Blocking => self.inbox.notify.wait_while(wire, |w| w.inbox.is_empty()).unwrap(),
                    RecvTimeout::After(d) => {
                        let deadline = deadline_wait(&self.inbox, wire, d);
                        match deadline {
                            Some(w) => w,
                            None => return Err(Error::Timeout),
                        }
                    }
                };
            }

            match wire.inbox.pop_front() {
                Some((from, bytes)) => Ok((from, Segment::decode(&bytes)?)),
                None => Err(Error::Timeout),
            }
        }
    }

    fn deadline_wait<'a>(
        shared: &'a Shared,
        wire: std::sync::MutexGuard<'a, Wire>,
        timeout: Duration,
    ) -> Option<std::sync::MutexGuard<'a, Wire>> {
        let (guard, result) = shared
            .notify
            .wait_timeout_while(wire, timeout, |w| w.inbox.is_empty())
            .unwrap();

        if result.timed_out() && guard.inbox.is_empty() {
            None
        } else {
            Some(guard)
        }
    }

    #[test]
    fn delivers_in_order() {
        let (mut a, mut b) = pair(addr(1), addr(2));
        a.send(addr(2), &Segment::syn(0)).unwrap();
        a.send(addr(2), &Segment::ack(0, 0)).unwrap();

        let (from, first) = b.recv(RecvTimeout::Blocking).unwrap();
        assert_eq!(from, addr(1));
        assert!(first.is_syn());

        let (_, second) = b.recv(RecvTimeout::Blocking).unwrap();
        assert!(second.is_ack());
    }

    #[test]
    fn empty_inbox_times_out() {
        let (_a, mut b) = pair(addr(1), addr(2));
        assert!(matches!(
            b.recv(RecvTimeout::After(Duration::from_millis(20))),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn dropped_segment_never_arrives() {
        let (mut a, mut b) = pair(addr(1), addr(2));
        a.drop_outgoing = Some(Box::new(|_| true));
        a.send(addr(2), &Segment::syn(0)).unwrap();
        assert!(matches!(
            b.recv(RecvTimeout::After(Duration::from_millis(20))),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn corrupted_segment_fails_checksum_on_receipt() {
        let (mut a, mut b) = pair(addr(1), addr(2));
        a.corrupt_outgoing = Some(Box::new(|_| true));
        a.send(addr(2), &Segment::data(0, 0, b"AB".to_vec())).unwrap();
        assert!(matches!(b.recv(RecvTimeout::Blocking), Err(Error::InvalidChecksum)));
    }
}
