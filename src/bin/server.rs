use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reliable_transfer::endpoint::UdpEndpoint;
use reliable_transfer::events::StderrSink;
use reliable_transfer::roles::server::{self, StdinOracle};
use reliable_transfer::roles::FileSource;

/// Reliable-transfer server: broadcasts one file to every client that
/// enrolls before the operator closes enrollment.
#[derive(Parser)]
struct Args {
    /// Local UDP port to listen on for client enrollment and transfers.
    broadcast_port: u16,

    /// File to send to every enrolled client.
    input_path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let local = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), args.broadcast_port);
    let mut ep = match UdpEndpoint::bind(local) {
        Ok(ep) => ep,
        Err(e) => {
            log::error!("failed to start server: {e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("[!] Server started at {local}");

    let mut source = FileSource { path: args.input_path };
    let mut oracle = StdinOracle;
    let mut sink = StderrSink;

    match server::run(&mut ep, &mut source, &mut oracle, &mut sink) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
