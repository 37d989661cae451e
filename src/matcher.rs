//! Match-candidate search over a 2-byte-key hash chain.
//!
//! The chain is an arena of two index arrays: `head[key]` holds the most
//! recent position whose two-byte window hashes to `key`, `prev[pos]` links
//! each inserted position to the previous one with the same key. Insertion
//! is two stores; no per-node allocation.

/// Number of distinct 2-byte keys.
const CHAIN_KEYS: usize = 1 << 16;

/// A back-reference candidate at some position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Distance back to the match source (1-based).
    pub offset: u32,
    /// Longest usable match length at this offset.
    pub max_len: u32,
}

/// Hash-chain match finder shared by the LZ parsers.
///
/// Walks chains newest-to-oldest and keeps only dominant candidates: a
/// farther offset survives only when it matches strictly longer than every
/// nearer one. That pruning is exact for the codecs here because each of
/// them prices offsets non-decreasingly, so for any target length the
/// nearest candidate reaching it is never more expensive.
pub struct MatchFinder {
    head: Vec<i32>,
    prev: Vec<i32>,
    /// Run length of identical bytes starting at each position.
    runs: Vec<u32>,
    max_offset: usize,
    max_len: usize,
}

impl MatchFinder {
    pub fn new(data: &[u8], max_offset: usize, max_len: usize) -> Self {
        Self {
            head: vec![-1; CHAIN_KEYS],
            prev: vec![-1; data.len()],
            runs: run_lengths(data),
            max_offset,
            max_len,
        }
    }

    #[inline]
    fn key(data: &[u8], pos: usize) -> usize {
        (data[pos] as usize) << 8 | data[pos + 1] as usize
    }

    /// Record `pos` in the chain for its 2-byte window. Positions must be
    /// inserted in increasing order; the final position of the input has no
    /// 2-byte window and is skipped.
    pub fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + 1 >= data.len() {
            return;
        }
        let key = Self::key(data, pos);
        self.prev[pos] = self.head[key];
        self.head[key] = pos as i32;
    }

    /// Collect the dominant candidates at `pos` into `out`, ordered by
    /// increasing offset and strictly increasing `max_len`. All candidates
    /// match at least 2 bytes.
    pub fn candidates(&self, data: &[u8], pos: usize, out: &mut Vec<Candidate>) {
        out.clear();
        if pos + 1 >= data.len() {
            return;
        }
        let cap = self.max_len.min(data.len() - pos);
        let mut best_len = 1usize;
        // Inside a run of identical bytes the nearest match is offset 1 and
        // its length is the remaining run, read straight off the run table
        // instead of byte comparisons.
        if pos >= 1 && data[pos - 1] == data[pos] && self.runs[pos] >= 2 {
            let len = (self.runs[pos] as usize).min(cap);
            best_len = len;
            out.push(Candidate { offset: 1, max_len: len as u32 });
            if len >= cap {
                return;
            }
        }
        let mut node = self.head[Self::key(data, pos)];
        while node >= 0 {
            let source = node as usize;
            let offset = pos - source;
            if offset > self.max_offset {
                break;
            }
            // Candidates must beat the running best; probe the byte that
            // would extend it before paying for a full comparison.
            if pos + best_len < data.len()
                && best_len < cap
                && data[source + best_len] == data[pos + best_len]
            {
                let len = match_length(data, source, pos, cap);
                if len > best_len {
                    best_len = len;
                    out.push(Candidate { offset: offset as u32, max_len: len as u32 });
                    if len >= cap {
                        break;
                    }
                }
            }
            node = self.prev[source];
        }
    }
}

/// Length of the common prefix of `data[a..]` and `data[b..]`, capped at
/// `cap`. Compares 8 bytes at a time.
#[inline]
pub fn match_length(data: &[u8], a: usize, b: usize, cap: usize) -> usize {
    debug_assert!(a < b);
    let mut len = 0;
    while len + 8 <= cap {
        let x = u64::from_le_bytes(data[a + len..a + len + 8].try_into().unwrap());
        let y = u64::from_le_bytes(data[b + len..b + len + 8].try_into().unwrap());
        if x != y {
            return len + ((x ^ y).trailing_zeros() / 8) as usize;
        }
        len += 8;
    }
    while len < cap && data[a + len] == data[b + len] {
        len += 1;
    }
    len
}

/// Run length of identical bytes starting at each position, the "reeks"
/// table that lets the parsers extend matches through repeated bytes
/// without rescanning them.
pub fn run_lengths(data: &[u8]) -> Vec<u32> {
    let mut runs = vec![0u32; data.len()];
    for i in (0..data.len()).rev() {
        runs[i] = if i + 1 < data.len() && data[i] == data[i + 1] {
            runs[i + 1] + 1
        } else {
            1
        };
    }
    runs
}

/// Nearest offset within `window` whose source byte equals `data[pos]`,
/// for the single-byte matches DAN1 and DAN3 allow: scans the short-range
/// window directly since the hash chain only sees 2-byte windows.
pub fn best_short_match(data: &[u8], pos: usize, window: usize) -> Option<u32> {
    let target = data[pos];
    (1..=window.min(pos))
        .find(|&offset| data[pos - offset] == target)
        .map(|offset| offset as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(data: &[u8], pos: usize, max_offset: usize) -> Vec<Candidate> {
        let mut finder = MatchFinder::new(data, max_offset, 65536);
        for i in 0..pos {
            finder.insert(data, i);
        }
        let mut out = Vec::new();
        finder.candidates(data, pos, &mut out);
        out
    }

    #[test]
    fn test_no_candidates_without_repeat() {
        let data = b"abcdefgh";
        assert!(collect(data, 4, 1024).is_empty());
    }

    #[test]
    fn test_simple_repeat() {
        let data = b"abcabc";
        let candidates = collect(data, 3, 1024);
        assert_eq!(candidates, vec![Candidate { offset: 3, max_len: 3 }]);
    }

    #[test]
    fn test_dominance_prefers_nearest() {
        // "ab" appears at 0 and 3; at position 6 the nearer copy matches
        // just as long, so the farther one is pruned.
        let data = b"abxabxab";
        let candidates = collect(data, 6, 1024);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].offset, 3);
    }

    #[test]
    fn test_farther_candidate_kept_when_longer() {
        let data = b"abcdXabZabcd";
        let candidates = collect(data, 8, 1024);
        assert_eq!(candidates[0], Candidate { offset: 3, max_len: 2 });
        assert_eq!(candidates[1], Candidate { offset: 8, max_len: 4 });
    }

    #[test]
    fn test_offset_window_respected() {
        let data = b"abxxxxxxab";
        assert!(collect(data, 8, 4).is_empty());
        assert_eq!(collect(data, 8, 8).len(), 1);
    }

    #[test]
    fn test_run_stops_at_cap() {
        let data = vec![0x55u8; 300];
        let candidates = collect(&data, 10, 1024);
        assert_eq!(candidates, vec![Candidate { offset: 1, max_len: 290 }]);
    }

    #[test]
    fn test_match_length_blocks() {
        let mut data = vec![7u8; 40];
        data[29] = 9;
        assert_eq!(match_length(&data, 0, 20, 20), 9);
        assert_eq!(match_length(&data, 0, 10, 19), 19);
    }

    #[test]
    fn test_best_short_match() {
        let data = b"xyzzy";
        assert_eq!(best_short_match(data, 3, 18), Some(1)); // 'z' one back
        assert_eq!(best_short_match(data, 4, 18), Some(3)); // 'y' three back
        assert_eq!(best_short_match(data, 1, 18), None);
    }
}
