//! Test fixtures and helpers.
//!
//! Common setup code for integration and property tests: a tiny
//! hand-computable digest for golden vectors, an accounting reader for
//! resource assertions, and encode/decode shorthands.

use std::io::{self, Cursor, Read};

use chainseal_core::{
    decode_to_vec, Blake3Digest, ChainDecoder, ChainEncoder, ChainError, StreamDigest, StreamTag,
};
use rand::RngCore;

/// A 4-byte additive digest, weak on purpose.
///
/// Bytes are folded into a rotating 4-lane sum, so the expected digest of
/// any short input can be computed by hand. Golden vectors use this; real
/// property tests use BLAKE3.
#[derive(Debug, Clone, Default)]
pub struct ToyDigest {
    state: [u8; 4],
    pos: usize,
}

impl ToyDigest {
    /// Create a fresh toy digest.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamDigest for ToyDigest {
    fn digest_size(&self) -> usize {
        4
    }

    fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state[self.pos % 4] = self.state[self.pos % 4].wrapping_add(byte);
            self.pos += 1;
        }
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let out = self.state.to_vec();
        self.state = [0; 4];
        self.pos = 0;
        out
    }
}

/// A reader that records the size of every read request made of it.
///
/// Used to assert the decoder's constant-memory property by resource
/// accounting: no single request may exceed the caller's buffer or the
/// control-byte buffer, regardless of stream length.
pub struct AccountingReader<R> {
    inner: R,
    /// Number of read calls observed.
    pub reads: usize,
    /// Largest single request (buffer length handed to `read`).
    pub max_request: usize,
}

impl<R: Read> AccountingReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            reads: 0,
            max_request: 0,
        }
    }
}

impl<R: Read> Read for AccountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.max_request = self.max_request.max(buf.len());
        self.inner.read(buf)
    }
}

/// A fixture fixing one `(part_size, digest_size)` configuration.
pub struct StreamFixture {
    pub part_size: usize,
    pub digest_size: usize,
}

impl StreamFixture {
    /// Create a fixture with explicit geometry.
    pub fn new(part_size: usize, digest_size: usize) -> Self {
        Self {
            part_size,
            digest_size,
        }
    }

    /// A fixture using BLAKE3's native 32-byte output.
    pub fn blake3(part_size: usize) -> Self {
        Self::new(part_size, 32)
    }

    fn digest(&self) -> Blake3Digest {
        Blake3Digest::with_digest_size(self.digest_size)
    }

    /// Encode `plaintext`, panicking on invalid fixture geometry.
    pub fn encode(&self, plaintext: &[u8]) -> (Vec<u8>, StreamTag) {
        ChainEncoder::new(self.digest(), self.part_size)
            .encode_to_vec(plaintext)
            .expect("fixture geometry must encode")
    }

    /// Build a decoder over an in-memory wire stream.
    pub fn decoder(
        &self,
        wire: &[u8],
        tag: &StreamTag,
    ) -> ChainDecoder<Cursor<Vec<u8>>, Blake3Digest> {
        ChainDecoder::with_tag(Cursor::new(wire.to_vec()), self.digest(), self.part_size, tag)
            .expect("fixture geometry must validate")
    }

    /// Decode an in-memory wire stream to completion.
    pub fn decode(&self, wire: &[u8], tag: &StreamTag) -> Result<Vec<u8>, ChainError> {
        decode_to_vec(
            Cursor::new(wire.to_vec()),
            self.digest(),
            self.part_size,
            tag.total_len,
            &tag.root_digest,
        )
    }

    /// Random plaintext of the given length.
    pub fn random_plaintext(&self, len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut data);
        data
    }
}

/// Flip one bit in a wire stream.
pub fn flip_bit(wire: &mut [u8], byte_index: usize, bit: u8) {
    wire[byte_index] ^= 1 << (bit % 8);
}

/// Drain a decoder, returning everything delivered before the outcome.
pub fn decode_collect<R: Read, D: StreamDigest>(
    decoder: &mut ChainDecoder<R, D>,
) -> (Vec<u8>, Result<(), ChainError>) {
    let mut delivered = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        match decoder.read_into(&mut buf) {
            Ok(0) => return (delivered, Ok(())),
            Ok(n) => delivered.extend_from_slice(&buf[..n]),
            Err(e) => return (delivered, Err(e)),
        }
    }
}
