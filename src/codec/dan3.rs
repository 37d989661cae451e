//! DAN3: LZ77 with Elias-gamma lengths and a trial-selected extended
//! offset tier.
//!
//! A unary preamble of `subset` ones and a zero (the byte `0xFE` written
//! on `subset + 1` bits) announces how wide the far tier is, then the first
//! input byte follows verbatim. Tokens: bit `1` → literal byte; bit `0` →
//! gamma item, where the 16-zero escape plus a discriminator selects a RAW
//! block (`1`: byte `length - 1`, then payload) or end-of-data (`0`).
//!
//! Offsets of length-1 matches use a two-tier micro scheme (offset 1, or
//! one bit for offsets 2..3). Longer matches pick between a 5-bit near
//! tier, a one-byte middle tier, and a `9 + subset`-bit far tier. The
//! encoder parses once per subset in 0..=7 and emits the cheapest.

use crate::bits::{BitReader, BitWriter};
use crate::codec::lzf::copy_match;
use crate::codec::{check_input_size, Codec};
use crate::error::{Error, Result};
use crate::gamma::{gamma_bits, read_gamma_escaped, write_gamma};
use crate::matcher::{best_short_match, Candidate, MatchFinder};
use crate::parse::{useful_lengths, ParseTable, Token};

pub const DEFAULT_MAX_INPUT: usize = 524288;

/// Near tier: 5 bits, offsets 1..=32.
const MAX_OFFSET1: u32 = 32;
/// Middle tier: one byte, offsets 33..=288.
const MAX_OFFSET2: u32 = 288;
/// Window of the length-1 micro scheme.
const SHORT_WINDOW: usize = 3;

const MAX_LEN: u32 = 65535;

/// RAW block length range (`length - 1` must fit a byte; below 27 bits
/// plain literals are never worse).
const MIN_RAW: usize = 27;
const MAX_RAW: usize = 256;

const RAW_TOKEN: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
pub struct Dan3Options {
    /// Log per-call parse statistics.
    pub verbose: bool,
    /// Largest accepted input.
    pub max_input: usize,
}

impl Default for Dan3Options {
    fn default() -> Self {
        Self { verbose: false, max_input: DEFAULT_MAX_INPUT }
    }
}

#[derive(Default)]
pub struct Dan3 {
    pub options: Dan3Options,
}

impl Codec for Dan3 {
    fn name(&self) -> &'static str {
        "dan3"
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

/// Far-tier ceiling under `subset`.
#[inline]
fn max_offset(subset: u32) -> u32 {
    (1 << (9 + subset)) + MAX_OFFSET2
}

/// Selector plus field width for `offset` under a match of `len`, in bits.
fn offset_bits(subset: u32, offset: u32, len: u32) -> u32 {
    if len == 1 {
        if offset == 1 {
            1
        } else {
            2
        }
    } else if offset <= MAX_OFFSET1 {
        1 + 5
    } else if offset <= MAX_OFFSET2 {
        2 + 8
    } else {
        2 + 9 + subset
    }
}

#[inline]
fn count_bits(subset: u32, offset: u32, len: u32) -> u64 {
    1 + gamma_bits(len) as u64 + offset_bits(subset, offset, len) as u64
}

fn write_offset(writer: &mut BitWriter, subset: u32, offset: u32, len: u32) {
    if len == 1 {
        if offset == 1 {
            writer.write_bit(false);
        } else {
            writer.write_bit(true);
            writer.write_bits(offset - 2, 1);
        }
    } else if offset <= MAX_OFFSET1 {
        writer.write_bit(false);
        writer.write_bits(offset - 1, 5);
    } else if offset <= MAX_OFFSET2 {
        writer.write_bit(true);
        writer.write_bit(false);
        writer.write_byte((offset - 33) as u8);
    } else {
        writer.write_bit(true);
        writer.write_bit(true);
        writer.write_bits(offset - MAX_OFFSET2 - 1, 9 + subset);
    }
}

fn read_offset(reader: &mut BitReader<'_>, subset: u32, len: u32) -> Result<u32> {
    if len == 1 {
        if !reader.read_bit()? {
            return Ok(1);
        }
        return Ok(2 + reader.read_bits(1)?);
    }
    if !reader.read_bit()? {
        return Ok(1 + reader.read_bits(5)?);
    }
    if !reader.read_bit()? {
        return Ok(33 + reader.read_byte()? as u32);
    }
    Ok(MAX_OFFSET2 + 1 + reader.read_bits(9 + subset)?)
}

fn parse_with_subset(input: &[u8], subset: u32) -> (u64, Vec<Token>) {
    let mut table = ParseTable::new(input.len(), 1);
    let mut finder = MatchFinder::new(input, max_offset(subset) as usize, MAX_LEN as usize);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut lengths: Vec<u32> = Vec::new();

    finder.insert(input, 0);
    for pos in 1..input.len() {
        table.relax(pos + 1, 1, 0, 9);
        if let Some(offset) = best_short_match(input, pos, SHORT_WINDOW) {
            table.relax(pos + 1, 1, offset, count_bits(subset, offset, 1));
        }
        let limit = MAX_RAW.min(input.len() - pos);
        for len in MIN_RAW..=limit {
            table.relax(pos + len, len as u32, RAW_TOKEN, 26 + 8 * len as u64);
        }
        finder.candidates(input, pos, &mut candidates);
        for candidate in &candidates {
            useful_lengths(2, candidate.max_len, 0, &mut lengths);
            for &len in &lengths {
                table.relax(
                    pos + len as usize,
                    len,
                    candidate.offset,
                    count_bits(subset, candidate.offset, len),
                );
            }
        }
        finder.insert(input, pos);
    }
    (table.cost(input.len()), table.tokens(input.len(), 1))
}

pub fn compress(input: &[u8], options: Dan3Options) -> Result<Vec<u8>> {
    check_input_size(input.len(), options.max_input)?;
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut best: Option<(u64, u32, Vec<Token>)> = None;
    for subset in 0..8u32 {
        let (bits, tokens) = parse_with_subset(input, subset);
        // Preamble grows by one bit per subset step; include it so the
        // comparison reflects emitted size.
        let total = bits + subset as u64 + 1;
        if best.as_ref().map_or(true, |(b, _, _)| total < *b) {
            best = Some((total, subset, tokens));
        }
    }
    let (total, subset, tokens) = best.unwrap();
    if options.verbose {
        log::debug!("dan3: subset {} wins at {} bits", subset, total);
    }

    let mut writer = BitWriter::with_capacity(input.len() / 2 + 16);
    writer.write_bits(0xFE, subset + 1);
    writer.write_byte(input[0]);
    let mut pos = 1;
    for token in tokens {
        match token.offset {
            0 => {
                writer.write_bit(true);
                writer.write_byte(input[pos]);
            }
            RAW_TOKEN => {
                writer.write_bit(false);
                writer.write_bits(0, 16);
                writer.write_bit(true);
                writer.write_byte((token.len - 1) as u8);
                writer.write_bytes(&input[pos..pos + token.len as usize]);
            }
            offset => {
                writer.write_bit(false);
                write_gamma(&mut writer, token.len);
                write_offset(&mut writer, subset, offset, token.len);
            }
        }
        pos += token.len as usize;
    }

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
    let mut subset = 0u32;
    while reader.read_bit()? {
        subset += 1;
        if subset > 7 {
            return Err(Error::InvalidHeader("subset indicator exceeds 7"));
        }
    }
    let mut out = Vec::new();
    out.push(reader.read_byte()?);
    loop {
        if reader.read_bit()? {
            out.push(reader.read_byte()?);
            continue;
        }
        match read_gamma_escaped(&mut reader)? {
            Some(len) => {
                let offset = read_offset(&mut reader, subset, len)?;
                copy_match(&mut out, offset as usize, len as usize)?;
            }
            None => {
                if !reader.read_bit()? {
                    return Ok(out);
                }
                let len = reader.read_byte()? as usize + 1;
                let payload = reader.read_slice(len)?;
                out.extend_from_slice(payload);
            }
        }
    }
}
