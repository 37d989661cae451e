//! ZX0: last-offset-reuse LZ77 with interlaced Elias-gamma fields.
//!
//! The decoder is a three-state machine. It starts as if a copy had just
//! ended (`last_offset = 1`): a `0` steering bit then selects literals
//! after a copy or a last-offset copy after literals, while `1` always
//! starts a new-offset copy. A new offset is an interlaced gamma of its
//! high part (payload-inverted unless `classic`/`backwards`; the value 256
//! is end-of-data), then a byte whose top 7 bits hold the complemented low
//! part and whose bit 0 already carries the first tag of the length gamma
//! (the backtrack trick). Literal runs and last-offset copies carry only a
//! length gamma.

mod optimize;

use crate::bits::{BitReader, BitWriter};
use crate::codec::lzf::copy_match;
use crate::codec::Codec;
use crate::error::Result;
use crate::gamma::{read_interlaced_gamma, write_interlaced_gamma};
use optimize::{optimize, INITIAL_OFFSET};

/// Widest offset the 255-valued gamma high part can carry.
pub const MAX_OFFSET: usize = 32640;
/// Offset cap in `quick` mode (the ZX7 window).
pub const QUICK_MAX_OFFSET: usize = 2176;
/// New-offset gamma value reserved for end-of-data.
const END_MARKER: u32 = 256;

#[derive(Clone, Copy, Debug, Default)]
pub struct Zx0Options {
    /// Disable payload inversion on the new-offset gamma.
    pub classic: bool,
    /// Compress for back-to-front decompression: input reversed going in,
    /// output reversed coming out, continuation-tag sense flipped.
    pub backwards: bool,
    /// Cap the offset window at the ZX7 value for faster parsing.
    pub quick: bool,
    /// Bytes of an already-in-place prefix the parse may reference but
    /// must not re-emit.
    pub skip: usize,
}

impl Zx0Options {
    fn inverted(self) -> bool {
        !self.classic && !self.backwards
    }

    fn offset_limit(self) -> usize {
        if self.quick {
            QUICK_MAX_OFFSET
        } else {
            MAX_OFFSET
        }
    }
}

#[derive(Default)]
pub struct Zx0 {
    pub options: Zx0Options,
}

impl Codec for Zx0 {
    fn name(&self) -> &'static str {
        "zx0"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(compress(input, self.options))
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        decompress(input, self.options)
    }
}

pub fn compress(input: &[u8], options: Zx0Options) -> Vec<u8> {
    if input.len() <= options.skip {
        return Vec::new();
    }
    let backwards = options.backwards;
    let reversed;
    let data: &[u8] = if backwards {
        reversed = input.iter().rev().copied().collect::<Vec<u8>>();
        &reversed
    } else {
        input
    };

    let lattice = optimize(data, options.skip, options.offset_limit());

    // Un-reverse the winning chain into emission order; the seed block
    // stays first and is skipped.
    let mut order: Vec<i32> = Vec::new();
    let mut at = lattice.head;
    while at >= 0 {
        order.push(at);
        at = lattice.arena[at as usize].chain;
    }
    order.reverse();

    let invert = options.inverted();
    let mut writer = BitWriter::with_capacity(data.len() / 2 + 16);
    let mut last_offset = INITIAL_OFFSET as u32;
    let mut input_index = options.skip;
    for &id in &order[1..] {
        let block = lattice.arena[id as usize];
        let length = (block.index + 1) as usize - input_index;
        if block.offset == 0 {
            // Literal run.
            writer.write_bit(false);
            write_interlaced_gamma(&mut writer, length as u32, backwards, false);
            for &byte in &data[input_index..input_index + length] {
                writer.write_byte(byte);
            }
        } else if block.offset == last_offset {
            // Copy from last offset.
            writer.write_bit(false);
            write_interlaced_gamma(&mut writer, length as u32, backwards, false);
        } else {
            // Copy from new offset.
            let distance = block.offset - 1;
            writer.write_bit(true);
            write_interlaced_gamma(&mut writer, distance / 128 + 1, backwards, invert);
            let low = (distance % 128) as u8;
            if backwards {
                writer.write_backtrack_byte(low << 1);
            } else {
                writer.write_backtrack_byte((127 - low) << 1);
            }
            write_interlaced_gamma(&mut writer, length as u32 - 1, backwards, false);
            last_offset = block.offset;
        }
        input_index += length;
    }

    writer.write_bit(true);
    write_interlaced_gamma(&mut writer, END_MARKER, backwards, invert);

    let mut out = writer.finish();
    if backwards {
        out.reverse();
    }
    out
}

pub fn decompress(input: &[u8], options: Zx0Options) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let backwards = options.backwards;
    let reversed;
    let src: &[u8] = if backwards {
        reversed = input.iter().rev().copied().collect::<Vec<u8>>();
        &reversed
    } else {
        input
    };

    let invert = options.inverted();
    let mut reader = BitReader::new(src);
    let mut out = Vec::new();
    let mut last_offset = INITIAL_OFFSET;
    let mut after_literals = false;
    loop {
        if reader.read_bit()? {
            // Copy from new offset.
            let high = read_interlaced_gamma(&mut reader, backwards, invert, None)?;
            if high == END_MARKER {
                break;
            }
            let byte = reader.read_byte()?;
            let low = (byte >> 1) as usize;
            let offset = if backwards {
                (high as usize - 1) * 128 + low + 1
            } else {
                high as usize * 128 - low
            };
            let first_tag = byte & 1 != 0;
            let length =
                read_interlaced_gamma(&mut reader, backwards, false, Some(first_tag))? as usize + 1;
            copy_match(&mut out, offset, length)?;
            last_offset = offset;
            after_literals = false;
        } else if after_literals {
            // Copy from last offset.
            let length = read_interlaced_gamma(&mut reader, backwards, false, None)? as usize;
            copy_match(&mut out, last_offset, length)?;
            after_literals = false;
        } else {
            // Literal run.
            let length = read_interlaced_gamma(&mut reader, backwards, false, None)? as usize;
            for _ in 0..length {
                let byte = reader.read_byte()?;
                out.push(byte);
            }
            after_literals = true;
        }
    }
    if backwards {
        out.reverse();
    }
    Ok(out)
}
