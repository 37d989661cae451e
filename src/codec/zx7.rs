//! ZX7: optimal LZ77 with Elias-gamma lengths and two offset tiers.
//!
//! First input byte verbatim, then tokens: bit `0` → literal byte; bit `1`
//! → match, gamma of `length - 1` followed by an offset byte. A clear high
//! bit means a near offset (`byte + 1`); a set high bit keeps the low 7
//! bits and pulls 4 more from the bit stream for offsets 129..=2176. The
//! end marker is the gamma sentinel: bit `1`, sixteen zeros, bit `1`.

use crate::bits::{BitReader, BitWriter};
use crate::codec::lzf::copy_match;
use crate::codec::Codec;
use crate::error::Result;
use crate::gamma::{gamma_bits, read_gamma, write_gamma};
use crate::matcher::{Candidate, MatchFinder};
use crate::parse::{useful_lengths, ParseTable};

/// Near-tier ceiling: offsets encoded in the byte alone.
const MAX_OFFSET1: u32 = 128;
/// Far-tier ceiling: 7 low bits plus 4 high bits.
const MAX_OFFSET2: u32 = 2176;
/// Gamma carries `length - 1`, so lengths stay below the 16-zero sentinel.
const MAX_LEN: u32 = 65536;

pub struct Zx7;

impl Codec for Zx7 {
    fn name(&self) -> &'static str {
        "zx7"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(compress(input))
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        decompress(input)
    }
}

/// Exact emitted size of a match token.
#[inline]
fn match_bits(offset: u32, len: u32) -> u64 {
    let offset_bits = if offset <= MAX_OFFSET1 { 8 } else { 12 };
    1 + gamma_bits(len - 1) as u64 + offset_bits
}

pub fn compress(input: &[u8]) -> Vec<u8> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut table = ParseTable::new(input.len(), 1);
    let mut finder = MatchFinder::new(input, MAX_OFFSET2 as usize, MAX_LEN as usize);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut lengths: Vec<u32> = Vec::new();

    finder.insert(input, 0);
    for pos in 1..input.len() {
        table.relax(pos + 1, 1, 0, 9);
        finder.candidates(input, pos, &mut candidates);
        for candidate in &candidates {
            useful_lengths(2, candidate.max_len, 1, &mut lengths);
            for &len in &lengths {
                table.relax(
                    pos + len as usize,
                    len,
                    candidate.offset,
                    match_bits(candidate.offset, len),
                );
            }
        }
        finder.insert(input, pos);
    }

    let mut writer = BitWriter::with_capacity(input.len() / 2 + 16);
    writer.write_byte(input[0]);
    let mut pos = 1;
    for token in table.tokens(input.len(), 1) {
        if token.offset == 0 {
            writer.write_bit(false);
            writer.write_byte(input[pos]);
        } else {
            writer.write_bit(true);
            write_gamma(&mut writer, token.len - 1);
            if token.offset <= MAX_OFFSET1 {
                writer.write_byte((token.offset - 1) as u8);
            } else {
                let distance = token.offset - MAX_OFFSET1 - 1;
                writer.write_byte(0x80 | (distance & 0x7F) as u8);
                writer.write_bits(distance >> 7, 4);
            }
        }
        pos += token.len as usize;
    }

    // End marker: the consuming gamma sentinel.
    writer.write_bit(true);
    writer.write_bits(0, 16);
    writer.write_bit(true);
    writer.finish()
}

pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = BitReader::new(input);
    let mut out = Vec::new();
    out.push(reader.read_byte()?);
    loop {
        if !reader.read_bit()? {
            out.push(reader.read_byte()?);
            continue;
        }
        let value = match read_gamma(&mut reader)? {
            Some(value) => value,
            None => return Ok(out),
        };
        let len = value as usize + 1;
        let byte = reader.read_byte()?;
        let offset = if byte < 0x80 {
            byte as usize + 1
        } else {
            let high = reader.read_bits(4)? as usize;
            (high << 7 | (byte & 0x7F) as usize) + MAX_OFFSET1 as usize + 1
        };
        copy_match(&mut out, offset, len)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn roundtrip(input: &[u8]) -> Vec<u8> {
        let packed = compress(input);
        assert_eq!(decompress(&packed).unwrap(), input, "round trip failed");
        packed
    }

    #[test]
    fn test_empty() {
        assert_eq!(roundtrip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_single_byte_stream_layout() {
        // Literal byte, then 1 + sixteen zeros + 1 in three bit bytes.
        assert_eq!(roundtrip(&[0x41]), vec![0x41, 0x80, 0x00, 0x40]);
    }

    #[test]
    fn test_run() {
        let packed = roundtrip(&vec![0x55u8; 300]);
        assert!(packed.len() < 16);
    }

    #[test]
    fn test_alternating_pattern() {
        let input: Vec<u8> = (0..1024).map(|i| [1u8, 2u8][i % 2]).collect();
        let packed = roundtrip(&input);
        assert!(packed.len() < 16);
    }

    #[test]
    fn test_far_tier_offsets() {
        // A repeat 2000 bytes back forces the 7+4-bit offset form.
        let mut input: Vec<u8> = (0..2000u32).map(|i| (i % 199) as u8).collect();
        input.extend_from_slice(&input.clone()[..64]);
        roundtrip(&input);
    }

    #[test]
    fn test_offset_window_is_2176() {
        // The same 64-byte block 3000 bytes apart is out of reach, so the
        // stream stays literal-heavy but must still round-trip.
        let mut input = vec![0u8; 3000];
        for (i, byte) in input.iter_mut().enumerate().take(64) {
            *byte = (i * 17 % 251) as u8;
        }
        let tail: Vec<u8> = input[..64].to_vec();
        input.extend_from_slice(&tail);
        roundtrip(&input);
    }

    #[test]
    fn test_text_roundtrip() {
        roundtrip(b"a simple sentence, a simple sentence, and a twist");
    }

    #[test]
    fn test_truncated_stream() {
        let packed = roundtrip(b"hold the last byte back, hold the last byte back");
        assert!(matches!(
            decompress(&packed[..packed.len() - 1]),
            Err(Error::TruncatedStream) | Err(Error::InvalidBackReference { .. })
        ));
    }
}
