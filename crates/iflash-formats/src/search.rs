//! Boyer-Moore-Horspool substring search
//!
//! Container records are located by scanning the whole image for their
//! 16-byte signature. Images run to tens of megabytes and the scan happens
//! once per known record kind, so the search uses a bad-character shift
//! table to skip ahead instead of comparing at every offset.
//!
//! All ranges are half-open: a haystack slice covers `[begin, end)` and a
//! match at offset `o` covers `[o, o + pattern.len())`.

use crate::error::{IflashError, Result};

/// Precomputed searcher for a single non-empty pattern
///
/// Building the shift table is independent of the haystack, so a searcher
/// can be reused across containers.
#[derive(Debug, Clone)]
pub struct PatternSearcher<'p> {
    pattern: &'p [u8],
    skip: [usize; 256],
}

impl<'p> PatternSearcher<'p> {
    /// Build the bad-character table for `pattern`
    ///
    /// Every byte value shifts by the full pattern length unless it occurs in
    /// the pattern before the final position, in which case it shifts by the
    /// distance from its last such occurrence to the end.
    pub fn new(pattern: &'p [u8]) -> Result<Self> {
        if pattern.is_empty() {
            return Err(IflashError::InvalidArgument(
                "search pattern must not be empty".to_string(),
            ));
        }

        let last = pattern.len() - 1;
        let mut skip = [pattern.len(); 256];
        for (i, &b) in pattern[..last].iter().enumerate() {
            skip[b as usize] = last - i;
        }

        Ok(Self { pattern, skip })
    }

    /// The pattern this searcher looks for
    pub fn pattern(&self) -> &'p [u8] {
        self.pattern
    }

    /// Offset of the first occurrence of the pattern in `haystack`
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        self.find_from(haystack, 0)
    }

    /// Offset of the first occurrence starting at or after `start`
    ///
    /// The returned offset is absolute within `haystack`.
    pub fn find_from(&self, haystack: &[u8], start: usize) -> Option<usize> {
        let m = self.pattern.len();
        let last = m - 1;
        let mut pos = start;

        while pos.checked_add(m)? <= haystack.len() {
            let window = &haystack[pos..pos + m];

            let mut i = last;
            while window[i] == self.pattern[i] {
                if i == 0 {
                    return Some(pos);
                }
                i -= 1;
            }

            pos += self.skip[window[last] as usize];
        }

        None
    }

    /// Iterate over every occurrence, including overlapping ones
    pub fn find_iter<'h>(&'h self, haystack: &'h [u8]) -> impl Iterator<Item = usize> + 'h {
        let mut next = Some(0);
        std::iter::from_fn(move || {
            let found = self.find_from(haystack, next?)?;
            next = found.checked_add(1);
            Some(found)
        })
    }
}

/// Offset of the first occurrence of `pattern` in `haystack`
///
/// Degenerate inputs (empty pattern, empty haystack, pattern longer than
/// haystack) are reported as no match.
pub fn find_pattern(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    PatternSearcher::new(pattern).ok()?.find(haystack)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Straightforward O(n*m) reference
    fn naive_find(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() || pattern.len() > haystack.len() {
            return None;
        }
        haystack.windows(pattern.len()).position(|w| w == pattern)
    }

    #[test]
    fn test_skip_table() {
        let searcher = PatternSearcher::new(b"abcab").unwrap();
        // Final byte is excluded; last earlier 'a' is at index 3, 'b' at 1, 'c' at 2
        assert_eq!(searcher.skip[b'a' as usize], 1);
        assert_eq!(searcher.skip[b'b' as usize], 3);
        assert_eq!(searcher.skip[b'c' as usize], 2);
        assert_eq!(searcher.skip[b'z' as usize], 5);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            PatternSearcher::new(b""),
            Err(IflashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(find_pattern(b"", b"abc"), None);
        assert_eq!(find_pattern(b"abc", b""), None);
        assert_eq!(find_pattern(b"", b""), None);
        assert_eq!(find_pattern(b"a", b"ab"), None);
        assert_eq!(find_pattern(b"a", b"a"), Some(0));
        assert_eq!(find_pattern(b"b", b"a"), None);
    }

    #[test]
    fn test_match_positions() {
        assert_eq!(find_pattern(b"hello world", b"world"), Some(6));
        assert_eq!(find_pattern(b"hello world", b"hello"), Some(0));
        assert_eq!(find_pattern(b"hello world", b"o w"), Some(4));
        assert_eq!(find_pattern(b"hello world", b"worlds"), None);
    }

    #[test]
    fn test_match_at_last_window() {
        // A pattern ending exactly on the final byte must be found
        let mut data = vec![0u8; 100];
        data.extend_from_slice(b"$_IFLASH_BIOSCER");
        assert_eq!(find_pattern(&data, b"$_IFLASH_BIOSCER"), Some(100));
    }

    #[test]
    fn test_first_of_repeated_matches() {
        assert_eq!(find_pattern(b"abababab", b"abab"), Some(0));
        assert_eq!(find_pattern(b"xxabxxab", b"ab"), Some(2));
    }

    #[test]
    fn test_near_miss_signature() {
        let data = b"..$_IFLASH_INI_IMx..$_IFLASH_INI_IMG..";
        assert_eq!(find_pattern(data, b"$_IFLASH_INI_IMG"), Some(20));
    }

    #[test]
    fn test_find_from_and_iter() {
        let searcher = PatternSearcher::new(b"aa").unwrap();
        let data = b"aaa.aa";
        assert_eq!(searcher.find_from(data, 1), Some(1));
        assert_eq!(searcher.find_from(data, 2), Some(4));
        assert_eq!(searcher.find_from(data, 5), None);
        assert_eq!(searcher.find_from(data, usize::MAX), None);
        assert_eq!(searcher.find_iter(data).collect::<Vec<_>>(), vec![0, 1, 4]);
    }

    #[test]
    fn test_reference_agrees_on_fixed_cases() {
        let cases: [(&[u8], &[u8]); 5] = [
            (b"abcabcabd", b"abd"),
            (b"aaaaaaaab", b"aab"),
            (b"\x00\xff\x00\xff\xff", b"\xff\xff"),
            (b"mississippi", b"issip"),
            (b"mississippi", b"ssippix"),
        ];
        for (h, p) in cases {
            assert_eq!(find_pattern(h, p), naive_find(h, p), "haystack {h:?}");
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Agrees with the naive reference on arbitrary inputs
            #[test]
            fn matches_naive_reference(
                haystack in prop::collection::vec(0u8..4, 0..512),
                pattern in prop::collection::vec(0u8..4, 0..8)
            ) {
                prop_assert_eq!(find_pattern(&haystack, &pattern), naive_find(&haystack, &pattern));
            }

            /// A planted pattern is always found at or before its planted offset
            #[test]
            fn finds_planted_pattern(
                prefix in prop::collection::vec(any::<u8>(), 0..2048),
                pattern in prop::collection::vec(any::<u8>(), 1..32),
                suffix in prop::collection::vec(any::<u8>(), 0..64)
            ) {
                let mut haystack = prefix.clone();
                haystack.extend_from_slice(&pattern);
                haystack.extend_from_slice(&suffix);

                let found = find_pattern(&haystack, &pattern);
                prop_assert_eq!(found, naive_find(&haystack, &pattern));
                let offset = found.expect("planted pattern");
                prop_assert!(offset <= prefix.len());
                prop_assert_eq!(&haystack[offset..offset + pattern.len()], pattern.as_slice());
            }
        }
    }
}
