//! Error types for Chainseal streams.

use std::io;

use thiserror::Error;

/// A stream configuration rejected before any byte is read or written.
///
/// Every variant identifies the layout invariant that failed. These errors
/// are only produced at construction time; a layout that validates cannot
/// fail geometrically mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("digest size must be at least 1 byte")]
    ZeroDigestSize,

    #[error("total stream length {0} is below the 2-byte minimum")]
    StreamTooShort(u64),

    #[error("part size {part_size} must be at least 1 and below the total stream length {total_len}")]
    PartSizeOutOfRange { part_size: usize, total_len: u64 },

    #[error("last chunk of {0} bytes leaves no data before its status byte")]
    LastChunkTooShort(u64),

    #[error("last chunk of {last_chunk_len} bytes exceeds part size {part_size} plus one status byte")]
    LastChunkTooLong { last_chunk_len: u64, part_size: usize },

    #[error("initial digest is {got} bytes, digest algorithm produces {expected}")]
    InitialDigestLength { expected: usize, got: usize },
}

/// Errors raised while encoding or decoding a chained stream.
///
/// Any error returned from a [`ChainDecoder`](crate::ChainDecoder) poisons
/// the instance: every subsequent read reports the same fault. The chain
/// state cannot be rewound, so recovery means re-fetching and decoding from
/// scratch.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The layout invariants were violated (construction-time only).
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A chunk failed verification against its committed digest, or carried
    /// a non-OK status byte. `status` is the status byte observed on the
    /// wire; see [`ChainError::status_hint`].
    #[error("chunk {chunk}: chain digest verification failed (status byte 0x{status:02x})")]
    Integrity { chunk: u64, status: u8 },

    /// The transport ended before the declared layout was satisfied.
    #[error("chunk {chunk}: stream ended before its declared layout was satisfied")]
    Truncated { chunk: u64 },

    /// An opaque transport failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ChainError {
    /// The protocol-level status signal attached to an integrity failure,
    /// if the observed status byte maps to a known non-OK value.
    pub fn status_hint(&self) -> Option<crate::status::ChunkStatus> {
        match self {
            ChainError::Integrity { status, .. } => {
                crate::status::ChunkStatus::from_byte(*status).filter(|s| !s.is_ok())
            }
            _ => None,
        }
    }

    /// Convert into an [`io::Error`] for use behind [`std::io::Read`].
    pub fn into_io(self) -> io::Error {
        match self {
            ChainError::Io(e) => e,
            ChainError::Truncated { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, self),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// The latched copy of a decoder fault, replayed on every read after the
/// first failure. [`io::Error`] is not `Clone`, so I/O faults are replayed
/// by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Integrity { chunk: u64, status: u8 },
    Truncated { chunk: u64 },
    Io(io::ErrorKind),
}

impl Fault {
    pub(crate) fn to_error(self) -> ChainError {
        match self {
            Fault::Integrity { chunk, status } => ChainError::Integrity { chunk, status },
            Fault::Truncated { chunk } => ChainError::Truncated { chunk },
            Fault::Io(kind) => ChainError::Io(kind.into()),
        }
    }
}
