//! Stable `HASH-XXXXXXXX` identifiers.
//!
//! CRC-32 (ISO-HDLC, the zip/PNG polynomial) rendered as eight upper-case hex
//! digits. Identical inputs always produce identical identifiers across runs
//! and machines.
use crc_fast::{CrcAlgorithm, checksum};

/// Prefix shared by every identifier produced here.
pub const HASH_PREFIX: &str = "HASH-";

/// CRC-32 of `data`.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    checksum(CrcAlgorithm::Crc32IsoHdlc, data) as u32
}

/// Identifier derived from raw file bytes.
pub fn content_hash(data: &[u8]) -> String {
    format!("{}{:08X}", HASH_PREFIX, crc32(data))
}

/// Identifier derived from a `(guid, timestamp)` pair.
pub fn identity_hash(guid: &str, timestamp: &str) -> String {
    let mut key = String::with_capacity(guid.len() + 1 + timestamp.len());
    key.push_str(guid);
    key.push('|');
    key.push_str(timestamp);
    content_hash(key.as_bytes())
}
