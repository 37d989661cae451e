//! DAN1: LZ77 with Elias-gamma lengths and four length-gated offset tiers.
//!
//! The first input byte is stored verbatim. Tokens: bit `1` → literal byte;
//! bit `0` → a gamma-coded item. A real gamma value is a match length; the
//! 16-zero escape is followed by one bit selecting a RAW block (`1`: a byte
//! holding `length - 27`, then that many raw bytes) or end-of-data (`0`).
//!
//! Offsets pick one of four tiers (widths 1, 4, 8 and 12 bits; bases 1, 3,
//! 19 and 275). Short matches cannot profit from far tiers, so their
//! selector prefixes shrink: a length-1 match reaches tier 2 with a single
//! selector bit, a length-2 match reaches tier 3 with two.

use crate::bits::{BitReader, BitWriter};
use crate::codec::lzf::copy_match;
use crate::codec::{check_input_size, Codec};
use crate::error::{Error, Result};
use crate::gamma::{gamma_bits, read_gamma_escaped, write_gamma};
use crate::matcher::{best_short_match, Candidate, MatchFinder};
use crate::parse::{useful_lengths, ParseTable};

pub const DEFAULT_MAX_INPUT: usize = 262144;

/// Cumulative tier bounds.
const MAX_OFFSET1: u32 = 2;
const MAX_OFFSET2: u32 = 18;
const MAX_OFFSET3: u32 = 274;
const MAX_OFFSET4: u32 = 4370;

/// Longest match length the gamma can carry below the escape.
const MAX_LEN: u32 = 65535;

/// RAW block length range (`length - 27` must fit a byte).
const MIN_RAW: usize = 27;
const MAX_RAW: usize = 282;

/// Token offset marking a RAW block in the parse.
const RAW_TOKEN: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
pub struct Dan1Options {
    /// Allow RAW literal blocks in the parse.
    pub rle: bool,
    /// Log per-call parse statistics.
    pub verbose: bool,
    /// Largest accepted input.
    pub max_input: usize,
}

impl Default for Dan1Options {
    fn default() -> Self {
        Self { rle: false, verbose: false, max_input: DEFAULT_MAX_INPUT }
    }
}

#[derive(Default)]
pub struct Dan1 {
    pub options: Dan1Options,
}

impl Codec for Dan1 {
    fn name(&self) -> &'static str {
        "dan1"
    }

    fn max_input(&self) -> Option<usize> {
        Some(self.options.max_input)
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        compress(input, self.options)
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        decompress(input)
    }
}

/// Widest offset a match of `len` can express.
#[inline]
fn offset_ceiling(len: u32) -> u32 {
    match len {
        1 => MAX_OFFSET2,
        2 => MAX_OFFSET3,
        _ => MAX_OFFSET4,
    }
}

/// Selector-prefix length plus field width for `offset` under a match of
/// `len`, in bits.
fn offset_bits(offset: u32, len: u32) -> u32 {
    if offset <= MAX_OFFSET1 {
        1 + 1
    } else if offset <= MAX_OFFSET2 {
        if len == 1 {
            1 + 4
        } else {
            2 + 4
        }
    } else if offset <= MAX_OFFSET3 {
        if len == 2 {
            2 + 8
        } else {
            3 + 8
        }
    } else {
        3 + 12
    }
}

/// Exact emitted size of a match token.
#[inline]
fn count_bits(offset: u32, len: u32) -> u64 {
    1 + gamma_bits(len) as u64 + offset_bits(offset, len) as u64
}

fn write_offset(writer: &mut BitWriter, offset: u32, len: u32) {
    if offset <= MAX_OFFSET1 {
        writer.write_bit(false);
        writer.write_bits(offset - 1, 1);
    } else if offset <= MAX_OFFSET2 {
        writer.write_bit(true);
        if len > 1 {
            writer.write_bit(false);
        }
        writer.write_bits(offset - 3, 4);
    } else if offset <= MAX_OFFSET3 {
        writer.write_bit(true);
        writer.write_bit(true);
        if len > 2 {
            writer.write_bit(false);
        }
        writer.write_byte((offset - 19) as u8);
    } else {
        writer.write_bit(true);
        writer.write_bit(true);
        writer.write_bit(true);
        writer.write_bits(offset - 275, 12);
    }
}

fn read_offset(reader: &mut BitReader<'_>, len: u32) -> Result<u32> {
    if !reader.read_bit()? {
        return Ok(1 + reader.read_bits(1)?);
    }
    if len == 1 || !reader.read_bit()? {
        return Ok(3 + reader.read_bits(4)?);
    }
    if len == 2 || !reader.read_bit()? {
        return Ok(19 + reader.read_byte()? as u32);
    }
    Ok(275 + reader.read_bits(12)?)
}

pub fn compress(input: &[u8], options: Dan1Options) -> Result<Vec<u8>> {
    check_input_size(input.len(), options.max_input)?;
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut table = ParseTable::new(input.len(), 1);
    let mut finder = MatchFinder::new(input, MAX_OFFSET4 as usize, MAX_LEN as usize);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut lengths: Vec<u32> = Vec::new();

    finder.insert(input, 0);
    for pos in 1..input.len() {
        table.relax(pos + 1, 1, 0, 9);
        if let Some(offset) = best_short_match(input, pos, MAX_OFFSET2 as usize) {
            table.relax(pos + 1, 1, offset, count_bits(offset, 1));
        }
        if options.rle {
            let limit = MAX_RAW.min(input.len() - pos);
            for len in MIN_RAW..=limit {
                table.relax(pos + len, len as u32, RAW_TOKEN, 26 + 8 * len as u64);
            }
        }
        finder.candidates(input, pos, &mut candidates);
        for candidate in &candidates {
            useful_lengths(2, candidate.max_len, 0, &mut lengths);
            for &len in &lengths {
                if candidate.offset <= offset_ceiling(len) {
                    table.relax(
                        pos + len as usize,
                        len,
                        candidate.offset,
                        count_bits(candidate.offset, len),
                    );
                }
            }
        }
        finder.insert(input, pos);
    }

    if options.verbose {
        log::debug!(
            "dan1: {} bytes parsed to {} bits (rle {})",
            input.len(),
            table.cost(input.len()),
            options.rle
        );
    }

    let mut writer = BitWriter::with_capacity(input.len() / 2 + 16);
    writer.write_byte(input[0]);
    let mut pos = 1;
    for token in table.tokens(input.len(), 1) {
        match token.offset {
            0 => {
                writer.write_bit(true);
                writer.write_byte(input[pos]);
            }
            RAW_TOKEN => {
                writer.write_bit(false);
                writer.write_bits(0, 16);
                writer.write_bit(true);
                writer.write_byte((token.len as usize - MIN_RAW) as u8);
                writer.write_bytes(&input[pos..pos + token.len as usize]);
            }
            offset => {
                writer.write_bit(false);
                write_gamma(&mut writer, token.len);
                write_offset(&mut writer, offset, token.len);
            }
        }
        pos += token.len as usize;
    }

    // End of data: the gamma escape with discriminator 0.
    writer.write_bit(false);
    writer.write_bits(0, 16);
    writer.write_bit(false);
    Ok(writer.finish())
}

pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = BitReader::new(input);
    let mut out = Vec::new();
    out.push(reader.read_byte()?);
    loop {
        if reader.read_bit()? {
            out.push(reader.read_byte()?);
            continue;
        }
        match read_gamma_escaped(&mut reader)? {
            Some(len) => {
                let offset = read_offset(&mut reader, len)?;
                copy_match(&mut out, offset as usize, len as usize)?;
            }
            None => {
                if !reader.read_bit()? {
                    return Ok(out);
                }
                let len = reader.read_byte()? as usize + MIN_RAW;
                let payload = reader.read_slice(len)?;
                out.extend_from_slice(payload);
            }
        }
    }
}
