//! Side-by-side compression across codecs.
//!
//! Each codec runs on its own scoped thread; the codecs are independent
//! and single-threaded internally, so fanning out whole compressions is
//! the only parallelism this crate uses.

use crate::codec::{Codec, CodecKind};
use crate::error::Error;

/// Outcome of one codec in a comparison run.
#[derive(Debug)]
pub struct Comparison {
    pub kind: CodecKind,
    pub result: Result<usize, Error>,
}

/// Compress `input` with every codec in `kinds` (default options) in
/// parallel and report compressed sizes in the order given.
pub fn compare_all(input: &[u8], kinds: &[CodecKind]) -> Vec<Comparison> {
    crossbeam::scope(|scope| {
        let handles: Vec<_> = kinds
            .iter()
            .map(|&kind| {
                scope.spawn(move |_| {
                    let codec = kind.codec();
                    Comparison { kind, result: codec.compress(input).map(|out| out.len()) }
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    })
    .expect("comparison thread panicked")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_reports_every_codec() {
        let input = b"compare me, compare me, compare me across the family";
        let results = compare_all(input, &CodecKind::ALL);
        assert_eq!(results.len(), CodecKind::ALL.len());
        for comparison in &results {
            let size = comparison.result.as_ref().unwrap();
            assert!(*size > 0 && *size < input.len() + 8);
        }
    }

    #[test]
    fn test_compare_surfaces_size_errors() {
        let input = vec![0u8; crate::codec::pletter::MAX_INPUT + 1];
        let results = compare_all(&input, &[CodecKind::Pletter]);
        assert!(matches!(results[0].result, Err(Error::InputTooLarge { .. })));
    }
}
