//! CRC-16 as specified by the wire protocol: poly 0x8005, init 0x0000, no
//! input/output reflection, xorout 0x0000, computed MSB-first bit-by-bit.
//!
//! This is the CRC-16/BUYPASS parameterization, not the (reflected)
//! CRC-16/ARC one despite the informal name used in spec §6. Reflection is
//! explicitly ruled out there, so the `crc` crate is given a custom
//! [`Algorithm`] rather than one of its named presets.

use crc::{Algorithm, Crc};

const ALGORITHM: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x8005,
    init: 0x0000,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0xfee8,
    residue: 0x0000,
};

static CRC16: Crc<u16> = Crc::<u16>::new(&ALGORITHM);

/// Computes the segment checksum over `header_with_checksum_zeroed ‖ payload`.
pub fn compute(header_with_checksum_zeroed: &[u8], payload: &[u8]) -> u16 {
    let mut digest = CRC16.digest();
    digest.update(header_with_checksum_zeroed);
    digest.update(payload);
    digest.finalize()
}
