//! # Chainseal Core
//!
//! Progressive chained-hash stream verification, after the
//! Gennaro–Rohatgi streaming-signature construction: a long byte stream is
//! validated chunk by chunk against a single trusted digest received
//! out-of-band, in constant memory, without ever exposing unverified bytes
//! to the caller.
//!
//! This crate is transport-agnostic and pure: no networking, no storage,
//! no async. It consumes any [`std::io::Read`]/[`std::io::Write`] and any
//! incremental hash behind the [`StreamDigest`] trait.
//!
//! ## Key types
//!
//! - [`ChainEncoder`] - emits the wire stream and the [`StreamTag`] the
//!   receiver needs
//! - [`ChainDecoder`] - the streaming verifier: a pull cursor that fails at
//!   the first provably tampered chunk boundary
//! - [`ChunkLayout`] - validated chunk geometry, computed once at
//!   construction
//! - [`StreamDigest`] - the incremental digest capability, with
//!   [`Blake3Digest`] as the shipped default
//!
//! ## Wire format
//!
//! Every chunk but the last is `data || next_chunk_digest || status`; the
//! last is `data || status`. Chunk *i*'s commitment is
//! `H(data_i || digest_of_chunk_i+1 || status_i)`, so the chain is rooted
//! in the single out-of-band digest and any alteration surfaces exactly at
//! the boundary of the chunk it touched.

pub mod decode;
pub mod digest;
pub mod encode;
pub mod error;
pub mod layout;
pub mod status;

pub use decode::{decode_to_vec, ChainDecoder};
pub use digest::{Blake3Digest, StreamDigest};
pub use encode::{ChainEncoder, StreamTag};
pub use error::{ChainError, LayoutError};
pub use layout::ChunkLayout;
pub use status::ChunkStatus;
