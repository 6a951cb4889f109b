//! # Chainseal Testkit
//!
//! Testing utilities for Chainseal streams.
//!
//! This crate provides:
//!
//! - **Golden vectors**: hand-computed wire streams and root digests that
//!   pin the format (see [`vectors`])
//! - **Generators**: proptest strategies for valid stream geometries and
//!   tamper positions (see [`generators`])
//! - **Fixtures**: encode/decode shorthands, the [`fixtures::ToyDigest`]
//!   used by the vectors, and an accounting reader for constant-memory
//!   assertions (see [`fixtures`])
//!
//! ## Property testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use chainseal_testkit::generators::StreamParams;
//! use chainseal_testkit::fixtures::StreamFixture;
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(params: StreamParams) {
//!         let fixture = StreamFixture::new(params.part_size, params.digest_size);
//!         let (wire, tag) = fixture.encode(&params.plaintext);
//!         prop_assert_eq!(fixture.decode(&wire, &tag).unwrap(), params.plaintext);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{decode_collect, flip_bit, AccountingReader, StreamFixture, ToyDigest};
pub use generators::{StreamParams, TamperParams};
pub use vectors::{all_vectors, encode_vector, verify_all_vectors, GoldenVector};
