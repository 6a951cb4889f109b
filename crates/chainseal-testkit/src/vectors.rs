//! Golden test vectors with hand-computed expected bytes.
//!
//! The vectors use [`ToyDigest`](crate::fixtures::ToyDigest), whose 4-byte
//! additive state can be followed on paper, so every expected wire stream
//! and root digest below was computed by hand and pins the format across
//! implementations.

use chainseal_core::{decode_to_vec, ChainEncoder, StreamTag};

use crate::fixtures::ToyDigest;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Plaintext input.
    pub plaintext: &'static [u8],
    /// Part size used for encoding.
    pub part_size: usize,
    /// Expected encoded stream (hex).
    pub expected_wire: &'static str,
    /// Expected root digest (hex).
    pub expected_root: &'static str,
    /// Expected total encoded length.
    pub expected_total_len: u64,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            // digest2 = H("EFGH" || 00) = 45464748
            // root    = H("ABCD" || digest2 || 00) = 86888a8c
            name: "two chunks, part 4",
            plaintext: b"ABCDEFGH",
            part_size: 4,
            expected_wire: "4142434445464748004546474800",
            expected_root: "86888a8c",
            expected_total_len: 14,
        },
        GoldenVector {
            // single chunk: root = H("HI" || 00) = 48490000
            name: "single chunk, part equals length",
            plaintext: b"HI",
            part_size: 2,
            expected_wire: "484900",
            expected_root: "48490000",
            expected_total_len: 3,
        },
        GoldenVector {
            // digest3 = H("gh" || 00)              = 67680000
            // digest2 = H("def" || digest3 || 00)  = cc656667
            // root    = H("abc" || digest2 || 00)  = c6c8cacc
            name: "three chunks, short last chunk",
            plaintext: b"abcdefgh",
            part_size: 3,
            expected_wire: "616263cc656667006465666768000000676800",
            expected_root: "c6c8cacc",
            expected_total_len: 19,
        },
    ]
}

/// Encode a vector's plaintext with the toy digest.
pub fn encode_vector(vector: &GoldenVector) -> (Vec<u8>, StreamTag) {
    ChainEncoder::new(ToyDigest::new(), vector.part_size)
        .encode_to_vec(vector.plaintext)
        .expect("golden vector geometry must encode")
}

/// Verify every vector end to end: encode matches the pinned bytes, and
/// the pinned bytes decode back to the plaintext. Panics on the first
/// divergence.
pub fn verify_all_vectors() {
    for vector in all_vectors() {
        let (wire, tag) = encode_vector(&vector);
        assert_eq!(
            tag.total_len, vector.expected_total_len,
            "{}: total length",
            vector.name
        );
        assert_eq!(
            tag.root_hex(),
            vector.expected_root,
            "{}: root digest",
            vector.name
        );
        assert_eq!(
            hex::encode(&wire),
            vector.expected_wire,
            "{}: wire bytes",
            vector.name
        );

        let decoded = decode_to_vec(
            std::io::Cursor::new(wire),
            ToyDigest::new(),
            vector.part_size,
            tag.total_len,
            &tag.root_digest,
        )
        .expect("golden vector must decode");
        assert_eq!(decoded, vector.plaintext, "{}: round trip", vector.name);
    }
}
