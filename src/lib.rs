//! Bit-exact compressors and decompressors for 8-bit-era formats.
//!
//! Each codec couples an optimal parser (dynamic programming under the
//! format's bit-cost model) with an emitter and decoder that reproduce the
//! original stream format byte for byte: MDK-RLE, LZF, Pletter v0.5, DAN1,
//! DAN3, ZX7, ZX0 and BitBuster v1.2.
//!
//! The programmatic surface is `compress(&[u8]) -> Vec<u8>` and
//! `decompress(&[u8]) -> Vec<u8>` per codec, behind the [`Codec`] trait;
//! [`CodecKind`] enumerates the family and maps file extensions.

pub mod bits;
pub mod codec;
pub mod compare;
pub mod error;
pub mod gamma;
pub mod matcher;
pub mod parse;

pub use codec::{Codec, CodecKind};
pub use compare::{compare_all, Comparison};
pub use error::{Error, Result};

/// Compress, decompress, and verify the result matches the input.
///
/// Used by the CLI's `--verify` mode; surfaces `RoundTripMismatch` if the
/// codec pair disagrees.
pub fn verify_roundtrip(codec: &dyn Codec, input: &[u8]) -> Result<Vec<u8>> {
    let packed = codec.compress(input)?;
    let unpacked = codec.decompress(&packed)?;
    if unpacked != input {
        return Err(Error::RoundTripMismatch);
    }
    Ok(packed)
}
