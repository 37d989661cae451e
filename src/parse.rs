//! Shared optimal-parse table.
//!
//! Every LZ codec here minimises total encoded bits over the lattice of
//! literal/match coverings:
//!
//! ```text
//! optimal[i] = min over feasible (offset, length) at i of
//!              optimal[i - length] + bits(offset, length)
//! ```
//!
//! The codecs own their cost models and feasibility regions; this table
//! owns the cost array, the parent links, and the backward walk that
//! recovers the chosen token sequence. Ties keep the earlier relaxation
//! (the table overwrites on strictly lower cost only).

/// One parsed token: `offset == 0` is a literal run of `len` bytes (most
/// codecs use `len == 1`), anything else a back-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub offset: u32,
    pub len: u32,
}

pub struct ParseTable {
    cost: Vec<u64>,
    from: Vec<Token>,
}

impl ParseTable {
    /// Table over end positions `0..=len`, seeded with cost 0 at `start`.
    pub fn new(len: usize, start: usize) -> Self {
        let mut cost = vec![u64::MAX; len + 1];
        cost[start] = 0;
        Self { cost, from: vec![Token { offset: 0, len: 0 }; len + 1] }
    }

    /// Minimal cost to reach `end`, if reachable.
    #[inline]
    pub fn cost(&self, end: usize) -> u64 {
        self.cost[end]
    }

    /// Offer a token covering `[end - len, end)` for `bits` extra cost.
    #[inline]
    pub fn relax(&mut self, end: usize, len: u32, offset: u32, bits: u64) {
        let source = end - len as usize;
        debug_assert!(self.cost[source] != u64::MAX);
        let total = self.cost[source] + bits;
        if total < self.cost[end] {
            self.cost[end] = total;
            self.from[end] = Token { offset, len };
        }
    }

    /// Recover the chosen tokens for `0..=end` in forward order.
    pub fn tokens(&self, end: usize, start: usize) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut at = end;
        while at > start {
            let token = self.from[at];
            debug_assert!(token.len > 0);
            tokens.push(token);
            at -= token.len as usize;
        }
        tokens.reverse();
        tokens
    }
}

/// Token lengths worth relaxing for a match capped at `max_len`.
///
/// The gamma cost of a length is constant over dyadic classes, so beyond an
/// exhaustive short range it is enough to try each class's entry and exit
/// plus the cap itself. `shift` is the codec's length bias: the gamma value
/// on the wire is `len - shift`.
pub fn useful_lengths(min_len: u32, max_len: u32, shift: u32, out: &mut Vec<u32>) {
    out.clear();
    let exhaustive = max_len.min(32);
    out.extend(min_len..=exhaustive);
    let mut class = 32u32.saturating_sub(shift).next_power_of_two();
    while class + shift <= max_len {
        let entry = class + shift;
        let exit = (2 * class - 1).saturating_add(shift).min(max_len);
        if entry > exhaustive {
            out.push(entry);
        }
        if exit > entry && exit > exhaustive {
            out.push(exit);
        }
        class *= 2;
    }
    if max_len > exhaustive && out.last() != Some(&max_len) {
        out.push(max_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_chain() {
        let mut table = ParseTable::new(3, 0);
        for end in 1..=3 {
            table.relax(end, 1, 0, 9);
        }
        assert_eq!(table.cost(3), 27);
        assert_eq!(
            table.tokens(3, 0),
            vec![
                Token { offset: 0, len: 1 },
                Token { offset: 0, len: 1 },
                Token { offset: 0, len: 1 }
            ]
        );
    }

    #[test]
    fn test_match_beats_literals() {
        let mut table = ParseTable::new(4, 0);
        table.relax(1, 1, 0, 9);
        table.relax(2, 1, 0, 9);
        for end in 2..=4 {
            table.relax(end, 1, 0, 9);
        }
        // A 3-byte match from position 1 is cheaper than three literals.
        table.relax(4, 3, 1, 12);
        assert_eq!(table.cost(4), 21);
        let tokens = table.tokens(4, 0);
        assert_eq!(tokens, vec![Token { offset: 0, len: 1 }, Token { offset: 1, len: 3 }]);
    }

    #[test]
    fn test_equal_cost_keeps_first() {
        let mut table = ParseTable::new(2, 0);
        table.relax(2, 2, 5, 10);
        table.relax(2, 2, 9, 10);
        assert_eq!(table.tokens(2, 0), vec![Token { offset: 5, len: 2 }]);
    }
}
