//! ChainDecoder: the streaming verifier.
//!
//! A forward-only pull cursor over the wire stream. Data bytes are handed
//! to the caller as they are hashed; each chunk's control phase finalizes
//! the running digest against the expected commitment and either promotes
//! the embedded digest to the next expected value or fails the stream at
//! that exact boundary. Memory use is constant in the stream length: the
//! only buffer held is the current chunk's control bytes.

use std::io::{self, Read};

use crate::digest::StreamDigest;
use crate::error::{ChainError, Fault, LayoutError};
use crate::layout::ChunkLayout;
use crate::status::ChunkStatus;
use crate::StreamTag;

/// Where the cursor stands within the stream.
///
/// An explicit tagged state instead of a signed-position sentinel: the
/// control-byte replay of non-stripping mode is its own variant rather
/// than a negative offset.
enum State {
    /// Delivering a chunk's data bytes; `left` counts down to the control
    /// phase.
    Streaming { left: usize },
    /// Non-stripping mode: handing the just-verified control bytes to the
    /// caller before the next chunk's data.
    Replaying { control: Vec<u8>, pos: usize },
    /// The final status byte verified; every further read is end-of-stream.
    Done,
    /// A fault latched; every further read reproduces it.
    Poisoned(Fault),
}

/// Decoder and verifier for chained streams.
///
/// Construction validates the layout and trusts only `initial_digest`,
/// obtained out-of-band. Bytes already returned from a fully verified chunk
/// are guaranteed authentic; bytes of a chunk whose control phase has not
/// completed must be discarded if the decode is abandoned.
pub struct ChainDecoder<R: Read, D: StreamDigest> {
    source: R,
    digest: D,
    layout: ChunkLayout,
    expected: Vec<u8>,
    chunk: u64,
    strip_control: bool,
    state: State,
}

impl<R: Read, D: StreamDigest> ChainDecoder<R, D> {
    /// Create a decoder over `source`.
    ///
    /// `total_len` is the byte length of the encoded stream and
    /// `initial_digest` the trusted root commitment, both received
    /// out-of-band. Fails without reading a byte if the layout invariants
    /// do not hold or the initial digest has the wrong length.
    pub fn new(
        source: R,
        digest: D,
        part_size: usize,
        total_len: u64,
        initial_digest: &[u8],
    ) -> Result<Self, LayoutError> {
        let layout = ChunkLayout::validate(total_len, part_size, digest.digest_size())?;
        if initial_digest.len() != digest.digest_size() {
            return Err(LayoutError::InitialDigestLength {
                expected: digest.digest_size(),
                got: initial_digest.len(),
            });
        }
        let first_data = layout.data_len(0);
        Ok(Self {
            source,
            digest,
            layout,
            expected: initial_digest.to_vec(),
            chunk: 0,
            strip_control: true,
            state: State::Streaming { left: first_data },
        })
    }

    /// Create a decoder from the [`StreamTag`] an encoder produced.
    pub fn with_tag(
        source: R,
        digest: D,
        part_size: usize,
        tag: &StreamTag,
    ) -> Result<Self, LayoutError> {
        Self::new(source, digest, part_size, tag.total_len, &tag.root_digest)
    }

    /// Switch to non-stripping mode: the commitment and status bytes of
    /// each verified chunk are delivered to the caller, interleaved with
    /// the data, instead of being discarded. The replayed bytes are already
    /// verified; they are not hashed a second time.
    pub fn with_control_bytes(mut self) -> Self {
        self.strip_control = false;
        self
    }

    /// The validated geometry this decoder runs under.
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// The 0-indexed chunk the cursor currently stands in.
    pub fn chunk_index(&self) -> u64 {
        self.chunk
    }

    /// Read verified bytes into `out`, returning how many were written.
    ///
    /// Returns `Ok(0)` only at a clean end of stream. Data bytes of the
    /// current chunk are delivered before that chunk's control phase runs,
    /// so a caller that aborts early must discard bytes from the chunk in
    /// flight.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<usize, ChainError> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            match &mut self.state {
                State::Poisoned(fault) => return Err(fault.to_error()),
                State::Done => return Ok(0),
                State::Replaying { control, pos } => {
                    let n = out.len().min(control.len() - *pos);
                    out[..n].copy_from_slice(&control[*pos..*pos + n]);
                    *pos += n;
                    let drained = *pos == control.len();
                    if drained {
                        self.advance_chunk();
                    }
                    return Ok(n);
                }
                State::Streaming { left: 0 } => {
                    self.finish_chunk()?;
                }
                State::Streaming { left } => {
                    let want = out.len().min(*left);
                    match read_some(&mut self.source, &mut out[..want]) {
                        Ok(0) => {
                            let chunk = self.chunk;
                            self.state = State::Poisoned(Fault::Truncated { chunk });
                            return Err(ChainError::Truncated { chunk });
                        }
                        Ok(n) => {
                            self.digest.update(&out[..n]);
                            *left -= n;
                            return Ok(n);
                        }
                        Err(e) => {
                            self.state = State::Poisoned(Fault::Io(e.kind()));
                            return Err(ChainError::Io(e));
                        }
                    }
                }
            }
        }
    }

    /// Read a single verified byte; `Ok(None)` at end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>, ChainError> {
        let mut byte = [0u8; 1];
        match self.read_into(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Run the control phase at the current chunk boundary: pull the
    /// commitment and status bytes, finalize the running digest, and
    /// compare it to the expected commitment.
    fn finish_chunk(&mut self) -> Result<(), ChainError> {
        let control_len = self.layout.control_len(self.chunk);
        let mut control = vec![0u8; control_len];
        let mut filled = 0;
        while filled < control_len {
            match read_some(&mut self.source, &mut control[filled..]) {
                Ok(0) => {
                    let chunk = self.chunk;
                    self.state = State::Poisoned(Fault::Truncated { chunk });
                    return Err(ChainError::Truncated { chunk });
                }
                Ok(n) => filled += n,
                Err(e) => {
                    self.state = State::Poisoned(Fault::Io(e.kind()));
                    return Err(ChainError::Io(e));
                }
            }
        }

        // The embedded next-chunk digest and the status byte both enter
        // the commitment.
        self.digest.update(&control);
        let computed = self.digest.finalize_reset();

        let status = control[control_len - 1];
        if computed != self.expected || status != ChunkStatus::Ok.to_byte() {
            let chunk = self.chunk;
            self.state = State::Poisoned(Fault::Integrity { chunk, status });
            return Err(ChainError::Integrity { chunk, status });
        }

        if !self.layout.is_last(self.chunk) {
            self.expected.clear();
            self.expected
                .extend_from_slice(&control[..self.layout.digest_size()]);
        }

        if self.strip_control {
            self.advance_chunk();
        } else {
            self.state = State::Replaying { control, pos: 0 };
        }
        Ok(())
    }

    /// Move the cursor past the current chunk's control phase.
    fn advance_chunk(&mut self) {
        if self.layout.is_last(self.chunk) {
            self.state = State::Done;
        } else {
            self.chunk += 1;
            self.state = State::Streaming {
                left: self.layout.data_len(self.chunk),
            };
        }
    }
}

impl<R: Read, D: StreamDigest> Read for ChainDecoder<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf).map_err(ChainError::into_io)
    }
}

/// Decode an entire stream into memory. Convenience over the streaming API
/// for bounded inputs and tests.
pub fn decode_to_vec<R: Read, D: StreamDigest>(
    source: R,
    digest: D,
    part_size: usize,
    total_len: u64,
    initial_digest: &[u8],
) -> Result<Vec<u8>, ChainError> {
    let mut decoder = ChainDecoder::new(source, digest, part_size, total_len, initial_digest)?;
    let mut out = Vec::with_capacity(decoder.layout().plaintext_len() as usize);
    let mut buf = [0u8; 4096];
    loop {
        let n = decoder.read_into(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// `read` that retries on `Interrupted` so callers see it as infallible
/// noise.
fn read_some<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Blake3Digest;
    use crate::encode::ChainEncoder;
    use std::io::Cursor;

    fn encode(plaintext: &[u8], part_size: usize, digest_size: usize) -> (Vec<u8>, StreamTag) {
        let mut encoder = ChainEncoder::new(Blake3Digest::with_digest_size(digest_size), part_size);
        encoder.encode_to_vec(plaintext).unwrap()
    }

    fn decoder_for(
        wire: &[u8],
        tag: &StreamTag,
        part_size: usize,
        digest_size: usize,
    ) -> ChainDecoder<Cursor<Vec<u8>>, Blake3Digest> {
        ChainDecoder::with_tag(
            Cursor::new(wire.to_vec()),
            Blake3Digest::with_digest_size(digest_size),
            part_size,
            tag,
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip_two_chunks() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let plaintext = decode_to_vec(
            Cursor::new(wire),
            Blake3Digest::with_digest_size(4),
            4,
            tag.total_len,
            &tag.root_digest,
        )
        .unwrap();
        assert_eq!(plaintext, b"ABCDEFGH");
    }

    #[test]
    fn test_roundtrip_byte_at_a_time() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let mut decoder = decoder_for(&wire, &tag, 4, 4);

        let mut plaintext = Vec::new();
        while let Some(byte) = decoder.read_byte().unwrap() {
            plaintext.push(byte);
        }
        assert_eq!(plaintext, b"ABCDEFGH");
        // exhausted stream stays exhausted
        assert_eq!(decoder.read_byte().unwrap(), None);
        assert_eq!(decoder.read_byte().unwrap(), None);
    }

    #[test]
    fn test_roundtrip_single_chunk() {
        let (wire, tag) = encode(b"xy", 2, 4);
        let plaintext = decode_to_vec(
            Cursor::new(wire),
            Blake3Digest::with_digest_size(4),
            2,
            tag.total_len,
            &tag.root_digest,
        )
        .unwrap();
        assert_eq!(plaintext, b"xy");
    }

    #[test]
    fn test_wrong_initial_digest_fails_at_first_boundary() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let mut decoder = ChainDecoder::new(
            Cursor::new(wire),
            Blake3Digest::with_digest_size(4),
            4,
            tag.total_len,
            &[0u8; 4],
        )
        .unwrap();

        // chunk 0's data is still delivered before the check runs
        let mut buf = [0u8; 4];
        assert_eq!(decoder.read_into(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"ABCD");

        let err = decoder.read_into(&mut buf).unwrap_err();
        assert!(matches!(err, ChainError::Integrity { chunk: 0, .. }));
    }

    #[test]
    fn test_tampered_data_byte_detected_at_own_chunk() {
        let (mut wire, tag) = encode(b"ABCDEFGH", 4, 4);
        wire[10] ^= 0x01; // a data byte of chunk 1

        let mut decoder = decoder_for(&wire, &tag, 4, 4);
        let mut delivered = Vec::new();
        let err = loop {
            let mut buf = [0u8; 3];
            match decoder.read_into(&mut buf) {
                Ok(0) => panic!("tampered stream decoded cleanly"),
                Ok(n) => delivered.extend_from_slice(&buf[..n]),
                Err(e) => break e,
            }
        };

        // chunk 0 verified and was delivered; chunk 1's data went out
        // before its control phase caught the flip
        assert!(matches!(err, ChainError::Integrity { chunk: 1, .. }));
        assert_eq!(&delivered[..4], b"ABCD");
    }

    #[test]
    fn test_tampered_embedded_digest_detected_at_carrying_chunk() {
        let (mut wire, tag) = encode(b"ABCDEFGH", 4, 4);
        wire[5] ^= 0x80; // inside chunk 0's embedded digest field

        let mut decoder = decoder_for(&wire, &tag, 4, 4);
        let mut buf = [0u8; 4];
        assert_eq!(decoder.read_into(&mut buf).unwrap(), 4);
        let err = decoder.read_into(&mut buf).unwrap_err();
        assert!(matches!(err, ChainError::Integrity { chunk: 0, .. }));
    }

    #[test]
    fn test_tampered_status_byte_detected() {
        let (mut wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let last = wire.len() - 1;
        wire[last] = ChunkStatus::Aborted.to_byte();

        let mut decoder = decoder_for(&wire, &tag, 4, 4);
        let mut out = Vec::new();
        let err = loop {
            match decoder.read_byte() {
                Ok(Some(b)) => out.push(b),
                Ok(None) => panic!("tampered stream decoded cleanly"),
                Err(e) => break e,
            }
        };
        assert!(matches!(
            err,
            ChainError::Integrity {
                chunk: 1,
                status: 0x01
            }
        ));
    }

    #[test]
    fn test_verified_abort_status_carries_hint() {
        // A sender-side abort: status byte 0x01, correctly covered by the
        // commitment. The chain verifies but the decode still fails, and
        // the status surfaces as the hint.
        let mut digest = Blake3Digest::with_digest_size(4);
        digest.update(b"AB");
        digest.update_byte(ChunkStatus::Aborted.to_byte());
        let root = digest.finalize_reset();

        let wire = vec![b'A', b'B', ChunkStatus::Aborted.to_byte()];
        let err = decode_to_vec(Cursor::new(wire), digest, 2, 3, &root).unwrap_err();
        assert!(matches!(err, ChainError::Integrity { chunk: 0, status: 0x01 }));
        assert_eq!(err.status_hint(), Some(ChunkStatus::Aborted));
    }

    #[test]
    fn test_truncated_stream() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let truncated = &wire[..wire.len() - 3];

        let err = decode_to_vec(
            Cursor::new(truncated.to_vec()),
            Blake3Digest::with_digest_size(4),
            4,
            tag.total_len,
            &tag.root_digest,
        )
        .unwrap_err();
        assert!(matches!(err, ChainError::Truncated { chunk: 1 }));
    }

    #[test]
    fn test_poisoned_decoder_repeats_fault() {
        let (mut wire, tag) = encode(b"ABCDEFGH", 4, 4);
        wire[5] ^= 0x01;

        let mut decoder = decoder_for(&wire, &tag, 4, 4);
        let mut buf = [0u8; 16];
        let first = loop {
            match decoder.read_into(&mut buf) {
                Ok(_) => continue,
                Err(e) => break e,
            }
        };
        assert!(matches!(first, ChainError::Integrity { chunk: 0, .. }));

        for _ in 0..3 {
            let again = decoder.read_into(&mut buf).unwrap_err();
            assert!(matches!(again, ChainError::Integrity { chunk: 0, .. }));
        }
    }

    #[test]
    fn test_non_stripping_mode_replays_wire_verbatim() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let mut decoder = decoder_for(&wire, &tag, 4, 4).with_control_bytes();

        let mut seen = Vec::new();
        while let Some(byte) = decoder.read_byte().unwrap() {
            seen.push(byte);
        }
        // data and control interleaved exactly as on the wire
        assert_eq!(seen, wire);
    }

    #[test]
    fn test_io_read_adapter() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let mut decoder = decoder_for(&wire, &tag, 4, 4);

        let mut plaintext = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut plaintext).unwrap();
        assert_eq!(plaintext, b"ABCDEFGH");
    }

    #[test]
    fn test_io_read_adapter_surfaces_integrity_error() {
        let (mut wire, tag) = encode(b"ABCDEFGH", 4, 4);
        wire[5] ^= 0x01;
        let mut decoder = decoder_for(&wire, &tag, 4, 4);

        let mut plaintext = Vec::new();
        let err = std::io::Read::read_to_end(&mut decoder, &mut plaintext).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_construction_rejects_bad_layout_without_reading() {
        let result = ChainDecoder::new(
            Cursor::new(vec![0u8; 20]),
            Blake3Digest::with_digest_size(4),
            25,
            20,
            &[0u8; 4],
        );
        assert!(matches!(
            result,
            Err(LayoutError::PartSizeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_construction_rejects_short_initial_digest() {
        let result = ChainDecoder::new(
            Cursor::new(vec![0u8; 14]),
            Blake3Digest::with_digest_size(4),
            4,
            14,
            &[0u8; 3],
        );
        assert_eq!(
            result.err(),
            Some(LayoutError::InitialDigestLength {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn test_chunk_index_tracks_progress() {
        let (wire, tag) = encode(b"ABCDEFGH", 4, 4);
        let mut decoder = decoder_for(&wire, &tag, 4, 4);
        assert_eq!(decoder.chunk_index(), 0);

        let mut buf = [0u8; 5];
        decoder.read_into(&mut buf).unwrap(); // chunk 0 data (4 bytes)
        decoder.read_into(&mut buf).unwrap(); // crosses into chunk 1
        assert_eq!(decoder.chunk_index(), 1);
    }
}
