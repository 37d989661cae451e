//! Pletter v0.5: bit-packed LZ77 with a trial-selected offset subset.
//!
//! A 3-bit header stores `q - 1`; `q` widens the long-offset form. The
//! first input byte is stored verbatim, then tokens: bit `0` → literal
//! byte, bit `1` → match with interlaced-gamma `length - 1` and an offset
//! byte `B` (`B < 128` → `B + 1`, else the low 7 bits join a `q - 1`-bit
//! field from the bit stream). End of data overflows the decoder's gamma
//! accumulator with a run of continuation bits.
//!
//! The encoder parses once per `q` in 1..=6 and keeps the cheapest; `q = 7`
//! streams decode but are never produced. `dsk2rom` streams carry no header
//! and fix `q = 2` with a wider end-of-data threshold.

use crate::bits::{BitReader, BitWriter};
use crate::codec::lzf::copy_match;
use crate::codec::{check_input_size, Codec};
use crate::error::{Error, Result};
use crate::gamma::{gamma_bits, write_interlaced_gamma};
use crate::matcher::{Candidate, MatchFinder};
use crate::parse::{useful_lengths, ParseTable, Token};

pub const MAX_INPUT: usize = 65536;
/// Gamma-accumulator value treated as end-of-data.
const END_THRESHOLD: u32 = 65536;
/// The dsk2rom depacker uses a wider accumulator.
const DSK2ROM_END_THRESHOLD: u32 = 131072;
/// Continuation bits emitted for end-of-data: exactly enough pairs to
/// overflow the decoder's accumulator, so EOF consumes the whole stream.
const END_RUN: u32 = 32;
const DSK2ROM_END_RUN: u32 = 34;

#[derive(Clone, Copy, Debug, Default)]
pub struct PletterOptions {
    /// Headerless stream for the dsk2rom depacker: `q` fixed at 2.
    pub dsk2rom: bool,
}

#[derive(Default)]
pub struct Pletter {
    pub options: PletterOptions,
}

impl Codec for Pletter {
    fn name(&self) -> &'static str {
        "pletter"
    }

    fn max_input(&self) -> Option<usize> {
        Some(MAX_INPUT)
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        compress(input, self.options)
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        decompress(input, self.options)
    }
}

#[inline]
fn max_offset(q: u8) -> usize {
    128usize << (q - 1)
}

/// Exact emitted size of a match token under subset `q`.
#[inline]
fn match_bits(q: u8, offset: u32, len: u32) -> u64 {
    let offset_bits = if offset <= 128 { 8 } else { 8 + q as u64 - 1 };
    1 + gamma_bits(len - 1) as u64 + offset_bits
}

fn parse_with_q(input: &[u8], q: u8) -> (u64, Vec<Token>) {
    let mut table = ParseTable::new(input.len(), 1);
    let mut finder = MatchFinder::new(input, max_offset(q), input.len());
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut lengths: Vec<u32> = Vec::new();

    finder.insert(input, 0);
    for pos in 1..input.len() {
        table.relax(pos + 1, 1, 0, 9);
        finder.candidates(input, pos, &mut candidates);
        for candidate in &candidates {
            useful_lengths(2, candidate.max_len, 1, &mut lengths);
            for &len in &lengths {
                table.relax(pos + len as usize, len, candidate.offset, match_bits(q, candidate.offset, len));
            }
        }
        finder.insert(input, pos);
    }
    (table.cost(input.len()), table.tokens(input.len(), 1))
}

pub fn compress(input: &[u8], options: PletterOptions) -> Result<Vec<u8>> {
    check_input_size(input.len(), MAX_INPUT)?;
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let (q, tokens) = if options.dsk2rom {
        let (_, tokens) = parse_with_q(input, 2);
        (2, tokens)
    } else {
        let mut best: Option<(u64, u8, Vec<Token>)> = None;
        for q in 1..=6u8 {
            let (bits, tokens) = parse_with_q(input, q);
            if best.as_ref().map_or(true, |(b, _, _)| bits < *b) {
                best = Some((bits, q, tokens));
            }
        }
        let (bits, q, tokens) = best.unwrap();
        log::debug!("pletter: q={} parse cost {} bits", q, bits);
        (q, tokens)
    };

    let mut writer = BitWriter::with_capacity(input.len() / 2 + 16);
    if !options.dsk2rom {
        writer.write_bits(q as u32 - 1, 3);
    }
    writer.write_byte(input[0]);

    let mut pos = 1;
    for token in tokens {
        if token.offset == 0 {
            writer.write_bit(false);
            writer.write_byte(input[pos]);
        } else {
            writer.write_bit(true);
            write_interlaced_gamma(&mut writer, token.len - 1, false, false);
            let distance = token.offset - 1;
            if token.offset <= 128 {
                writer.write_byte(distance as u8);
            } else {
                writer.write_byte(0x80 | (distance & 0x7F) as u8);
                writer.write_bits(distance >> 7, q as u32 - 1);
            }
        }
        pos += token.len as usize;
    }

    writer.write_bit(true);
    let end_run = if options.dsk2rom { DSK2ROM_END_RUN } else { END_RUN };
    for _ in 0..end_run {
        writer.write_bit(true);
    }
    Ok(writer.finish())
}

/// Read a match length, or `None` at the end-of-data overflow.
fn read_length(reader: &mut BitReader<'_>, threshold: u32) -> Result<Option<u32>> {
    let mut value = 1u32;
    while reader.read_bit()? {
        value = (value << 1) | reader.read_bit()? as u32;
        if value >= threshold {
            return Ok(None);
        }
    }
    Ok(Some(value))
}

pub fn decompress(input: &[u8], options: PletterOptions) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = BitReader::new(input);
    let (q, threshold) = if options.dsk2rom {
        (2u8, DSK2ROM_END_THRESHOLD)
    } else {
        let q = reader.read_bits(3)? as u8 + 1;
        if q > 7 {
            return Err(Error::InvalidQValue(q));
        }
        (q, END_THRESHOLD)
    };

    let mut out = Vec::new();
    out.push(reader.read_byte()?);
    loop {
        if !reader.read_bit()? {
            out.push(reader.read_byte()?);
            continue;
        }
        let value = match read_length(&mut reader, threshold)? {
            Some(value) => value,
            None => return Ok(out),
        };
        let len = value as usize + 1;
        let byte = reader.read_byte()?;
        let offset = if byte < 128 {
            byte as usize + 1
        } else {
            let extra = reader.read_bits(q as u32 - 1)? as usize;
            (extra << 7 | (byte & 0x7F) as usize) + 1
        };
        copy_match(&mut out, offset, len)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) -> Vec<u8> {
        let packed = compress(input, PletterOptions::default()).unwrap();
        assert_eq!(decompress(&packed, PletterOptions::default()).unwrap(), input);
        packed
    }

    #[test]
    fn test_empty() {
        assert_eq!(roundtrip(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_single_byte() {
        roundtrip(&[0x41]);
    }

    #[test]
    fn test_run() {
        let packed = roundtrip(&vec![0x55u8; 300]);
        assert!(packed.len() < 32);
    }

    #[test]
    fn test_alternating_pattern() {
        let input: Vec<u8> = (0..1024).map(|i| [1u8, 2u8][i % 2]).collect();
        let packed = roundtrip(&input);
        assert!(packed.len() < 32);
    }

    #[test]
    fn test_text_roundtrip() {
        roundtrip(b"minimal is the MSX packer this format came from, more or less");
    }

    #[test]
    fn test_chosen_q_is_minimal() {
        // Matches far enough apart that wider subsets pay off; the chosen
        // q must not lose to any forced alternative.
        let mut input = Vec::new();
        for i in 0..4096u32 {
            input.push((i % 251) as u8);
            input.push((i * 7 % 13) as u8);
        }
        let chosen = compress(&input, PletterOptions::default()).unwrap();
        for q in 1..=6u8 {
            let (bits, _) = parse_with_q(&input, q);
            let total_bytes = (3 + 8 + bits + 1 + END_RUN as u64 + 7) / 8;
            assert!(chosen.len() as u64 <= total_bytes);
        }
    }

    #[test]
    fn test_dsk2rom_headerless() {
        let input = b"abcabcabcabc";
        let options = PletterOptions { dsk2rom: true };
        let packed = compress(input, options).unwrap();
        let plain = compress(input, PletterOptions::default()).unwrap();
        assert_ne!(packed, plain);
        assert_eq!(decompress(&packed, options).unwrap(), input);
    }

    #[test]
    fn test_q_eight_rejected() {
        // Header bits 111 declare q = 8, which no encoder produces.
        let mut writer = crate::bits::BitWriter::new();
        writer.write_bits(7, 3);
        writer.write_byte(0x41);
        let stream = writer.finish();
        assert!(matches!(
            decompress(&stream, PletterOptions::default()),
            Err(Error::InvalidQValue(8))
        ));
    }

    #[test]
    fn test_input_too_large() {
        let input = vec![0u8; MAX_INPUT + 1];
        assert!(matches!(
            compress(&input, PletterOptions::default()),
            Err(Error::InputTooLarge { .. })
        ));
    }

    #[test]
    fn test_max_input_accepted() {
        let input = vec![0xAAu8; MAX_INPUT];
        let packed = compress(&input, PletterOptions::default()).unwrap();
        assert_eq!(decompress(&packed, PletterOptions::default()).unwrap(), input);
    }
}
