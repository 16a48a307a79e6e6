//! Wake-on-LAN magic packet layout.
//!
//! No I/O happens here; [`crate::wol`] owns the socket.
//!
//! # Wire format
//!
//! ```text
//!  offset  0                6               12              96             102
//!         +----------------+---------------+-------  ...  --+---------------+
//!         | FF FF FF FF FF | MAC address   | MAC address    | MAC address   |
//!         | FF  (sync)     | (copy 0)      | (copy 1)       | (copy 15)     |
//!         +----------------+---------------+-------  ...  --+---------------+
//! ```
//!
//! Total length: [`MAGIC_PACKET_LEN`] = 6 + 16 * 6 = 102 bytes.  Network cards
//! match this pattern bit for bit, so the layout must never change.

use crate::mac::{MacAddress, MAC_LEN};

/// Value of each synchronisation byte.
pub const SYNC_BYTE: u8 = 0xFF;

/// Number of synchronisation bytes at the start of the packet.
pub const SYNC_LEN: usize = 6;

/// Number of times the MAC address is repeated after the sync stream.
pub const MAC_REPETITIONS: usize = 16;

/// Byte length of a magic packet on the wire.
pub const MAGIC_PACKET_LEN: usize = SYNC_LEN + MAC_LEN * MAC_REPETITIONS;

/// An encoded magic packet for one target machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac: &MacAddress) -> Self {
        let mut buf = [SYNC_BYTE; MAGIC_PACKET_LEN];
        let octets = mac.octets();
        for i in 0..MAC_REPETITIONS {
            let start = SYNC_LEN + i * MAC_LEN;
            buf[start..start + MAC_LEN].copy_from_slice(&octets);
        }
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
