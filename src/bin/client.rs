use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reliable_transfer::endpoint::UdpEndpoint;
use reliable_transfer::events::StderrSink;
use reliable_transfer::roles::client;
use reliable_transfer::roles::FileSink;

/// Reliable-transfer client: enrolls with a server and receives one file.
#[derive(Parser)]
struct Args {
    /// Local UDP port this client binds to.
    client_port: u16,

    /// Server's broadcast port, on localhost.
    broadcast_port: u16,

    /// Path to write the received file to.
    output_path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.client_port);
    let server = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.broadcast_port);

    let mut ep = match UdpEndpoint::bind(local) {
        Ok(ep) => ep,
        Err(e) => {
            log::error!("failed to start client: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("[!] Client started at {local}");

    let mut sink = FileSink { path: args.output_path };
    let mut events = StderrSink;

    match client::run(&mut ep, server, &mut sink, &mut events) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("client failed: {e}");
            ExitCode::FAILURE
        }
    }
}
