//! Segment codec (C1): wire layout, checksum, and the per-kind constructors.

use crate::checksum;
use crate::err::{Error, Result};

/// Size of the fixed segment header, in bytes.
pub const HEADER_SIZE: usize = 12;

pub const FIN: u8 = 0x01;
pub const SYN: u8 = 0x02;
pub const ACK: u8 = 0x10;
/// Vendor marker for bare data segments; non-overlapping with the control bits.
pub const MSG: u8 = 0x04;

/// One wire datagram: a 12-byte header plus up to `PAYLOAD_SIZE` bytes of
/// payload.
///
/// `PartialEq` compares the four logical fields only: two segments built
/// independently with the same seq/ack/flags/payload are equal regardless of
/// how their checksum happened to be computed, matching the reference
/// implementation's value semantics.
#[derive(Debug, Clone)]
pub struct Segment {
    pub seq_num: u32,
    pub ack_num: u32,
    pub flags: u8,
    pub payload: Vec<u8>,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.seq_num == other.seq_num
            && self.ack_num == other.ack_num
            && self.flags == other.flags
            && self.payload == other.payload
    }
}

impl Eq for Segment {}

impl Segment {
    pub fn syn(seq: u32) -> Self {
        Segment { seq_num: seq, ack_num: 0, flags: SYN, payload: Vec::new() }
    }

    pub fn syn_ack() -> Self {
        Segment { seq_num: 0, ack_num: 0, flags: SYN | ACK, payload: Vec::new() }
    }

    pub fn ack(seq: u32, ack: u32) -> Self {
        Segment { seq_num: seq, ack_num: ack, flags: ACK, payload: Vec::new() }
    }

    pub fn fin() -> Self {
        Segment { seq_num: 0, ack_num: 0, flags: FIN, payload: Vec::new() }
    }

    pub fn fin_ack() -> Self {
        Segment { seq_num: 0, ack_num: 0, flags: FIN | ACK, payload: Vec::new() }
    }

    pub fn data(seq: u32, ack: u32, payload: Vec<u8>) -> Self {
        Segment { seq_num: seq, ack_num: ack, flags: MSG, payload }
    }

    pub fn is_syn(&self) -> bool {
        self.flags == SYN
    }

    pub fn is_syn_ack(&self) -> bool {
        self.flags == SYN | ACK
    }

    pub fn is_ack(&self) -> bool {
        self.flags == ACK
    }

    pub fn is_fin(&self) -> bool {
        self.flags == FIN
    }

    pub fn is_fin_ack(&self) -> bool {
        self.flags == FIN | ACK
    }

    pub fn is_data(&self) -> bool {
        self.flags == MSG
    }

    /// Serializes this segment to its wire layout, computing the checksum.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE + self.payload.len()];

        buf[0..4].copy_from_slice(&self.seq_num.to_be_bytes());
        buf[4..8].copy_from_slice(&self.ack_num.to_be_bytes());
        buf[8] = self.flags;
        buf[9] = 0; // reserved
                    // buf[10..12] left zeroed for the checksum computation below
        buf[12..].copy_from_slice(&self.payload);

        let checksum = checksum::compute(&buf[0..HEADER_SIZE], &self.payload);
        buf[10..12].copy_from_slice(&checksum.to_be_bytes());

        buf
    }

    /// Parses a segment from its wire layout and verifies the checksum.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::InvalidChecksum);
        }

        let seq_num = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        let ack_num = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        let flags = bytes[8];
        let received_checksum = u16::from_be_bytes(bytes[10..12].try_into().unwrap());
        let payload = bytes[HEADER_SIZE..].to_vec();

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&bytes[0..4]);
        header[4..8].copy_from_slice(&bytes[4..8]);
        header[8] = flags;
        // header[9], header[10..12] stay zero: reserved byte and the
        // checksum field itself are zeroed during recomputation.

        let expected = checksum::compute(&header, &payload);
        if expected != received_checksum {
            return Err(Error::InvalidChecksum);
        }

        Ok(Segment { seq_num, ack_num, flags, payload })
    }
}
