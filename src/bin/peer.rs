use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reliable_transfer::endpoint::UdpEndpoint;
use reliable_transfer::events::StderrSink;
use reliable_transfer::roles::peer;
use reliable_transfer::roles::{FileSink, FileSource};

/// Reliable-transfer peer: negotiates a direction with a remote peer, then
/// exchanges one file in each direction.
#[derive(Parser)]
struct Args {
    /// Local UDP port this peer binds to.
    user_port: u16,

    /// Remote peer's port, on localhost.
    remote_port: u16,

    /// File to send to the remote peer.
    input_path: PathBuf,

    /// Path to write the file received from the remote peer.
    output_path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.user_port);
    let remote = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.remote_port);

    let mut ep = match UdpEndpoint::bind(local) {
        Ok(ep) => ep,
        Err(e) => {
            log::error!("failed to start peer: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("[!] Initiating request to {remote}...");

    let mut input = FileSource { path: args.input_path };
    let mut output = FileSink { path: args.output_path };
    let mut sink = StderrSink;

    match peer::run(&mut ep, remote, &mut input, &mut output, &mut sink) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("peer failed: {e}");
            ExitCode::FAILURE
        }
    }
}
