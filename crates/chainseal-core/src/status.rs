//! Status bytes: the one-byte trailer on every chunk.
//!
//! The status byte is covered by the chunk's commitment digest, so a forger
//! cannot alter it without breaking the chain.

use serde::{Deserialize, Serialize};

/// A chunk's status byte.
///
/// `Ok` terminates every chunk the encoder emits; on the last chunk it
/// doubles as the clean end-of-stream marker (the last chunk is identified
/// by layout position, not by a distinct byte). The remaining values are
/// reserved for sender-side error signaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChunkStatus {
    /// Chunk is good; on the last chunk, the stream ended cleanly.
    Ok = 0x00,
    /// The sender aborted the stream at this chunk.
    Aborted = 0x01,
    /// The sender's upstream source failed at this chunk.
    SenderFailed = 0x02,
}

impl ChunkStatus {
    /// The wire representation.
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire byte. Unassigned values return `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Ok),
            0x01 => Some(Self::Aborted),
            0x02 => Some(Self::SenderFailed),
            _ => None,
        }
    }

    /// Check for the OK value.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}
