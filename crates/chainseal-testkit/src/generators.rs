//! Proptest generators for property-based testing.

use proptest::prelude::*;

/// Generate plaintext bytes of length `1..=max_len`.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len)
}

/// Generate a digest size in the range real algorithms occupy.
pub fn digest_size() -> impl Strategy<Value = usize> {
    1usize..=32
}

/// Parameters for one encodable stream: a plaintext plus a geometry that
/// is valid for it (`part_size <= plaintext.len()`).
#[derive(Debug, Clone)]
pub struct StreamParams {
    pub plaintext: Vec<u8>,
    pub part_size: usize,
    pub digest_size: usize,
}

impl StreamParams {
    /// Wire length the encoder will emit for these parameters.
    pub fn total_len(&self) -> u64 {
        let len = self.plaintext.len() as u64;
        let part = self.part_size as u64;
        let last_data = if len % part == 0 { part } else { len % part };
        let full = (len - last_data) / part;
        full * (part + self.digest_size as u64 + 1) + last_data + 1
    }
}

impl Arbitrary for StreamParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (1usize..=300)
            .prop_flat_map(|len| {
                (
                    prop::collection::vec(any::<u8>(), len..=len),
                    1usize..=len,
                    digest_size(),
                )
            })
            .prop_map(|(plaintext, part_size, digest_size)| StreamParams {
                plaintext,
                part_size,
                digest_size,
            })
            .boxed()
    }
}

/// A stream plus one bit position inside its encoded wire form, for tamper
/// properties.
#[derive(Debug, Clone)]
pub struct TamperParams {
    pub stream: StreamParams,
    /// Byte offset into the wire stream.
    pub byte_index: usize,
    /// Bit to flip within that byte.
    pub bit: u8,
}

impl Arbitrary for TamperParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<StreamParams>()
            .prop_flat_map(|stream| {
                let total = stream.total_len() as usize;
                (Just(stream), 0..total, 0u8..8)
            })
            .prop_map(|(stream, byte_index, bit)| TamperParams {
                stream,
                byte_index,
                bit,
            })
            .boxed()
    }
}
