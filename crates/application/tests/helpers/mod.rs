#![allow(dead_code)]

mod mock_ports;

pub use mock_ports::*;

/// Minimal A query for `example.com` carrying `id`.
pub fn raw_query(id: u16) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
    buf.extend_from_slice(b"\x07example\x03com\x00");
    buf.extend_from_slice(&[0, 1, 0, 1]);
    buf
}
