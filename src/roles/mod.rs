//! Role orchestrators (C6): wires the handshake, sender, and receiver
//! engines together into the three CLI-facing roles, behind trait seams so
//! file I/O and interactive prompting never leak into the protocol core.

pub mod client;
pub mod peer;
pub mod server;

use std::io;

/// Supplies the outgoing byte buffer for a transfer. The production impl
/// reads a file into memory once, up front.
pub trait PayloadSource {
    fn load(&mut self) -> io::Result<Vec<u8>>;
}

/// Consumes a received byte buffer. The production impl writes it to a path
/// once, after the transfer completes.
pub trait PayloadSink {
    fn store(&mut self, data: &[u8]) -> io::Result<()>;
}

/// The server's "accept more clients?" gate from the enrollment phase.
pub trait EnrollmentOracle {
    fn keep_enrolling(&mut self) -> bool;
}

/// Reads a whole file into memory once.
pub struct FileSource {
    pub path: std::path::PathBuf,
}

impl PayloadSource for FileSource {
    fn load(&mut self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// Writes a whole file once, after a transfer has completed.
pub struct FileSink {
    pub path: std::path::PathBuf,
}

impl PayloadSink for FileSink {
    fn store(&mut self, data: &[u8]) -> io::Result<()> {
        std::fs::write(&self.path, data)
    }
}
