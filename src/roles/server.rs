//! Server role: enroll an arbitrary number of clients, then transfer the
//! same payload to each in turn.

use std::io::{self, Write};

use super::{EnrollmentOracle, PayloadSource};
use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::events::{Event, EventSink, Phase};
use crate::registry::ClientRegistry;
use crate::{handshake, sender};

/// Prompts on stdin with `[?] [Request] Listen more? (y/n)`, re-prompting
/// until the operator answers `y` or `n`, exactly as the reference
/// implementation's enrollment loop does.
pub struct StdinOracle;

impl EnrollmentOracle for StdinOracle {
    fn keep_enrolling(&mut self) -> bool {
        loop {
            print!("[?] [Request] Listen more? (y/n) ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return false;
            }

            match line.trim() {
                "y" => return true,
                "n" => return false,
                _ => println!("[X] [Request] Please choose between (y) and (n)"),
            }
        }
    }
}

/// Runs the server role to completion: enroll clients until the oracle says
/// stop, then hand each one the same payload in enrollment order.
pub fn run<E: Endpoint>(
    ep: &mut E,
    source: &mut impl PayloadSource,
    oracle: &mut impl EnrollmentOracle,
    sink: &mut impl EventSink,
) -> Result<()> {
    let data = source.load().map_err(crate::err::Error::Io)?;
    sink.emit(Event::info(Phase::Enrollment, format!("Source file | {} bytes", data.len())));

    let mut registry = ClientRegistry::new();

    loop {
        let addr = handshake::server_accept_enrollment(ep, sink)?;
        registry.enroll(addr);

        if !oracle.keep_enrolling() {
            break;
        }
    }

    sink.emit(Event::info(Phase::Enrollment, "Client list:"));
    for client in registry.iter() {
        sink.emit(Event::info(Phase::Enrollment, format!("- {}", client.addr)));
    }

    for client in registry.iter() {
        handshake::server_start_transfer(ep, client.addr, sink)?;
        sender::send(ep, client.addr, &data, sink)?;
    }

    Ok(())
}
