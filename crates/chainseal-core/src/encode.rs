//! ChainEncoder: turn plaintext into a chained wire stream.
//!
//! Each chunk's trailing commitment is the digest of the *next* chunk, so
//! the encoder runs a backward pass over the chunk boundaries to compute
//! the digest chain, then emits the chunks forward. This is inherent to the
//! chaining construction, not an implementation shortcut.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::digest::StreamDigest;
use crate::error::ChainError;
use crate::layout::ChunkLayout;
use crate::status::ChunkStatus;

/// What the receiver needs, out-of-band, to start verifying: the root
/// digest of the chain and the encoded stream's total byte length.
///
/// How this value is authenticated in transit (signed manifest, TLS
/// channel) is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTag {
    /// Digest committed to by chunk 0; the only value trusted a priori.
    #[serde(with = "hex::serde")]
    pub root_digest: Vec<u8>,
    /// Byte length of the entire encoded stream.
    pub total_len: u64,
}

impl StreamTag {
    /// The root digest as a hex string.
    pub fn root_hex(&self) -> String {
        hex::encode(&self.root_digest)
    }
}

impl fmt::Display for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.root_hex(), self.total_len)
    }
}

/// Encoder for chained streams.
///
/// One instance encodes one stream at a time; the digest state is reset
/// between chunks and between streams.
pub struct ChainEncoder<D: StreamDigest> {
    digest: D,
    part_size: usize,
}

impl<D: StreamDigest> ChainEncoder<D> {
    /// Create an encoder emitting `part_size` plaintext bytes per full
    /// chunk.
    pub fn new(digest: D, part_size: usize) -> Self {
        Self { digest, part_size }
    }

    /// Plaintext bytes per full chunk.
    pub fn part_size(&self) -> usize {
        self.part_size
    }

    /// Encode `plaintext` into `sink`.
    ///
    /// The layout is validated before any byte is written; after that, the
    /// only possible failure is a sink I/O error, passed through unchanged.
    /// Returns the [`StreamTag`] the receiver needs.
    pub fn encode<W: Write>(
        &mut self,
        plaintext: &[u8],
        sink: &mut W,
    ) -> Result<StreamTag, ChainError> {
        let layout = ChunkLayout::for_plaintext(
            plaintext.len() as u64,
            self.part_size,
            self.digest.digest_size(),
        )?;

        let chunks = data_chunks(plaintext, &layout);
        let count = chunks.len();

        // Backward pass: chunk i's digest covers its data, the digest of
        // chunk i+1, and its status byte.
        let mut digests: Vec<Vec<u8>> = vec![Vec::new(); count];
        for i in (0..count).rev() {
            self.digest.update(chunks[i]);
            if i + 1 < count {
                self.digest.update(&digests[i + 1]);
            }
            self.digest.update_byte(ChunkStatus::Ok.to_byte());
            digests[i] = self.digest.finalize_reset();
        }

        // Forward pass: emit in wire order.
        for i in 0..count {
            sink.write_all(chunks[i])?;
            if i + 1 < count {
                sink.write_all(&digests[i + 1])?;
            }
            sink.write_all(&[ChunkStatus::Ok.to_byte()])?;
        }

        Ok(StreamTag {
            root_digest: digests.swap_remove(0),
            total_len: layout.total_len(),
        })
    }

    /// Encode into a freshly allocated buffer.
    pub fn encode_to_vec(&mut self, plaintext: &[u8]) -> Result<(Vec<u8>, StreamTag), ChainError> {
        let mut wire = Vec::new();
        let tag = self.encode(plaintext, &mut wire)?;
        Ok((wire, tag))
    }
}

/// Split plaintext along the layout's chunk boundaries.
fn data_chunks<'a>(plaintext: &'a [u8], layout: &ChunkLayout) -> Vec<&'a [u8]> {
    let part = layout.part_size();
    let full = layout.full_chunk_count() as usize;
    let mut chunks = Vec::with_capacity(full + 1);
    for i in 0..full {
        chunks.push(&plaintext[i * part..(i + 1) * part]);
    }
    chunks.push(&plaintext[full * part..]);
    chunks
}
