pub mod checksum;
pub mod config;
pub mod endpoint;
pub mod err;
pub mod events;
pub mod handshake;
pub mod receiver;
pub mod registry;
pub mod roles;
pub mod segment;
pub mod sender;

pub use err::{Error, Result};
