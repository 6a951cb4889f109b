//! Chunk geometry: how a stream's total length divides into chunks.
//!
//! Validation happens exactly once, at encoder/decoder construction. A
//! layout that validates can be streamed to completion without any further
//! geometric checks; a layout that does not is rejected before the first
//! byte moves.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Validated chunk geometry for one encoded stream.
///
/// Every chunk but the last has the wire shape
/// `data[part_size] || chain_digest[digest_size] || status[1]`;
/// the last chunk omits the digest field:
/// `data[last_chunk_len - 1] || status[1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLayout {
    part_size: usize,
    digest_size: usize,
    total_len: u64,
    full_chunk_count: u64,
    last_chunk_len: u64,
}

impl ChunkLayout {
    /// Validate a layout from the encoded stream's total length.
    ///
    /// Checks, in order: the digest produces output, the stream holds at
    /// least one data byte plus one status byte, the part size fits the
    /// stream, and the trailing chunk is neither empty of data nor longer
    /// than a full chunk's data-plus-status.
    pub fn validate(
        total_len: u64,
        part_size: usize,
        digest_size: usize,
    ) -> Result<Self, LayoutError> {
        if digest_size == 0 {
            return Err(LayoutError::ZeroDigestSize);
        }
        if total_len < 2 {
            return Err(LayoutError::StreamTooShort(total_len));
        }
        if part_size == 0 || part_size as u64 > total_len - 1 {
            return Err(LayoutError::PartSizeOutOfRange { part_size, total_len });
        }

        let stride = (part_size + digest_size + 1) as u64;
        let full_chunk_count = total_len / stride;
        let last_chunk_len = total_len - full_chunk_count * stride;

        if last_chunk_len < 2 {
            return Err(LayoutError::LastChunkTooShort(last_chunk_len));
        }
        if last_chunk_len > part_size as u64 + 1 {
            return Err(LayoutError::LastChunkTooLong {
                last_chunk_len,
                part_size,
            });
        }

        Ok(Self {
            part_size,
            digest_size,
            total_len,
            full_chunk_count,
            last_chunk_len,
        })
    }

    /// Compute the layout that encoding `plaintext_len` bytes produces.
    ///
    /// The resulting geometry is identical to what [`ChunkLayout::validate`]
    /// derives on the decoding side from the emitted total length.
    pub fn for_plaintext(
        plaintext_len: u64,
        part_size: usize,
        digest_size: usize,
    ) -> Result<Self, LayoutError> {
        let part = part_size.max(1) as u64;
        let last_data = if plaintext_len == 0 {
            0
        } else if plaintext_len % part == 0 {
            part
        } else {
            plaintext_len % part
        };
        let full = (plaintext_len - last_data) / part;
        let total_len = full * (part_size as u64 + digest_size as u64 + 1) + last_data + 1;
        Self::validate(total_len, part_size, digest_size)
    }

    /// Bytes of plaintext per full chunk.
    pub fn part_size(&self) -> usize {
        self.part_size
    }

    /// Bytes per chain digest.
    pub fn digest_size(&self) -> usize {
        self.digest_size
    }

    /// Byte length of the entire encoded stream.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Number of full chunks (the ones carrying an embedded chain digest).
    pub fn full_chunk_count(&self) -> u64 {
        self.full_chunk_count
    }

    /// Wire length of the trailing chunk, status byte included.
    pub fn last_chunk_len(&self) -> u64 {
        self.last_chunk_len
    }

    /// Total number of chunks. The trailing partial chunk always exists.
    pub fn chunk_count(&self) -> u64 {
        self.full_chunk_count + 1
    }

    /// Whether `chunk` (0-indexed) is the trailing chunk.
    pub fn is_last(&self, chunk: u64) -> bool {
        chunk == self.full_chunk_count
    }

    /// Plaintext bytes carried by `chunk` (0-indexed).
    pub fn data_len(&self, chunk: u64) -> usize {
        if self.is_last(chunk) {
            (self.last_chunk_len - 1) as usize
        } else {
            self.part_size
        }
    }

    /// Control bytes trailing `chunk`: digest plus status, or status alone
    /// on the trailing chunk.
    pub fn control_len(&self, chunk: u64) -> usize {
        if self.is_last(chunk) {
            1
        } else {
            self.digest_size + 1
        }
    }

    /// Total plaintext bytes carried by the stream.
    pub fn plaintext_len(&self) -> u64 {
        self.full_chunk_count * self.part_size as u64 + self.last_chunk_len - 1
    }
}
