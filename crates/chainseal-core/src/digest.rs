//! The incremental digest capability consumed by the encoder and decoder.
//!
//! Any hash primitive that can be fed bytes across multiple calls and
//! finalized into a fixed-size output can drive a chained stream. BLAKE3 is
//! the shipped default; its XOF lets the adapter produce any output size.

/// An incremental hash primitive.
///
/// Implementations must support updates spanning an arbitrary number of
/// non-contiguous calls without buffering the input, and must reset to a
/// fresh state on finalization so one instance can hash every chunk of a
/// stream in turn.
pub trait StreamDigest {
    /// The fixed output size in bytes. Must not change over the lifetime of
    /// the instance.
    fn digest_size(&self) -> usize;

    /// Absorb bytes into the running state.
    fn update(&mut self, bytes: &[u8]);

    /// Absorb a single byte.
    fn update_byte(&mut self, byte: u8) {
        self.update(&[byte]);
    }

    /// Produce the digest of everything absorbed since the last
    /// finalization, and reset to a fresh state.
    fn finalize_reset(&mut self) -> Vec<u8>;
}

/// BLAKE3 as a [`StreamDigest`].
///
/// The output size defaults to BLAKE3's native 32 bytes; shorter or longer
/// outputs come from the extendable-output mode.
#[derive(Debug, Clone)]
pub struct Blake3Digest {
    hasher: blake3::Hasher,
    digest_size: usize,
}

impl Blake3Digest {
    /// Create with the native 32-byte output.
    pub fn new() -> Self {
        Self::with_digest_size(32)
    }

    /// Create with an explicit output size in bytes (must be non-zero; a
    /// zero size is rejected later by layout validation).
    pub fn with_digest_size(digest_size: usize) -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            digest_size,
        }
    }
}

impl Default for Blake3Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDigest for Blake3Digest {
    fn digest_size(&self) -> usize {
        self.digest_size
    }

    fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let mut out = vec![0u8; self.digest_size];
        self.hasher.finalize_xof().fill(&mut out);
        self.hasher.reset();
        out
    }
}
