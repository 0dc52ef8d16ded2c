//! Client role: enroll with a server, wait for it to start the transfer,
//! then receive the full payload.

use std::net::SocketAddr;

use super::PayloadSink;
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::events::EventSink;
use crate::{handshake, receiver};

/// Runs the client role to completion: enroll, await the server's
/// transfer-start handshake, receive the payload, and hand it to `sink`.
pub fn run<E: Endpoint>(
    ep: &mut E,
    server: SocketAddr,
    sink: &mut impl PayloadSink,
    events: &mut impl EventSink,
) -> Result<()> {
    handshake::client_enroll(ep, server, events)?;
    let server_addr = handshake::client_await_transfer_start(ep, events)?;
    let data = receiver::receive(ep, server_addr, events)?;
    sink.store(&data).map_err(crate::err::Error::Io)
}
