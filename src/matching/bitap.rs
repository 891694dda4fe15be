//! Anchored bounded-edit-distance matching with a bit-parallel automaton.
//!
//! This is the Wu–Manber extension of Shift-And to `k` errors, restricted to
//! alignments that start at the first base of the text. Bit `i` of the state
//! for `d` errors is set when the first `i` pattern bases align against the
//! text consumed so far with at most `d` substitutions, insertions, or
//! deletions. Each text base costs `O(k)` word operations, and the scan stops
//! after `m + k` bases or as soon as no pattern prefix is still alive.

use std::fmt;

use crate::utils::validation::MAX_PATTERN_LENGTH;

/// Best anchored alignment of a pattern against the start of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixHit {
    /// Edit distance of the alignment
    pub edits: u32,
    /// Number of text bases consumed
    pub span: usize,
}

/// A compiled literal ready for anchored matching
#[derive(Clone)]
pub struct BitapPattern {
    /// `masks[c]` has bit `i + 1` set when pattern base `i` equals `c`
    masks: Box<[u64; 256]>,
    length: usize,
    max_edits: u32,
}

impl BitapPattern {
    /// Compile `pattern`, matching case-insensitively.
    ///
    /// The caller guarantees `pattern.len() <= MAX_PATTERN_LENGTH`; element
    /// constructors enforce this.
    pub fn new(pattern: &[u8], max_edits: u32) -> Self {
        debug_assert!(pattern.len() <= MAX_PATTERN_LENGTH);

        let mut masks = Box::new([0u64; 256]);
        for (i, &base) in pattern.iter().enumerate() {
            let bit = 1u64 << (i + 1);
            masks[base.to_ascii_uppercase() as usize] |= bit;
            masks[base.to_ascii_lowercase() as usize] |= bit;
        }
        // N never matches, in the pattern or in the read
        masks[b'N' as usize] = 0;
        masks[b'n' as usize] = 0;

        Self {
            masks,
            length: pattern.len(),
            max_edits,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn max_edits(&self) -> u32 {
        self.max_edits
    }

    /// Find the alignment of the whole pattern against a prefix of `text`
    /// with the fewest edits, up to `max_edits`.
    ///
    /// Among alignments with equal edits, the one whose span is closest to
    /// the pattern length wins, then the shorter span. Returns `None` if no
    /// prefix of `text` is within `max_edits` of the pattern.
    pub fn match_prefix(&self, text: &[u8]) -> Option<PrefixHit> {
        let m = self.length;
        // More than m edits never helps: deleting the whole pattern costs m
        let k = (self.max_edits as usize).min(m);
        let accept = 1u64 << m;
        let live = u64::MAX >> (63 - m);

        // Before any text: the first d pattern bases can be deleted for d errors
        let mut states = [0u64; MAX_PATTERN_LENGTH + 1];
        let state = &mut states[..=k];
        for (d, s) in state.iter_mut().enumerate() {
            *s = u64::MAX >> (63 - d);
        }

        let mut best: Option<PrefixHit> = None;
        let mut consider = |edits: usize, span: usize| {
            let candidate = PrefixHit {
                edits: edits as u32,
                span,
            };
            let better = match best {
                None => true,
                Some(current) => {
                    (candidate.edits, candidate.span.abs_diff(m))
                        < (current.edits, current.span.abs_diff(m))
                }
            };
            if better {
                best = Some(candidate);
            }
        };

        if let Some(d) = state.iter().position(|s| s & accept != 0) {
            consider(d, 0);
        }

        let window = text.len().min(m + k);
        for (j, &base) in text[..window].iter().enumerate() {
            let mask = self.masks[base as usize];

            let mut previous_old = state[0];
            state[0] = (state[0] << 1) & mask & live;
            for d in 1..=k {
                let old = state[d];
                // match | substitution | insertion | deletion
                state[d] = (((old << 1) & mask)
                    | (previous_old << 1)
                    | previous_old
                    | (state[d - 1] << 1))
                    & live;
                previous_old = old;
            }

            if let Some(d) = state.iter().position(|s| s & accept != 0) {
                consider(d, j + 1);
            }

            if state[k] == 0 {
                break;
            }
        }

        best
    }
}

impl fmt::Debug for BitapPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitapPattern")
            .field("length", &self.length)
            .field("max_edits", &self.max_edits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(pattern: &str, k: u32, text: &str) -> Option<PrefixHit> {
        BitapPattern::new(pattern.as_bytes(), k).match_prefix(text.as_bytes())
    }

    /// Smallest edit distance between `pattern` and any prefix of `text`
    fn naive_best(pattern: &[u8], text: &[u8]) -> usize {
        let mut row: Vec<usize> = (0..=pattern.len()).collect();
        let mut best = row[pattern.len()];
        for &t in text {
            let mut next = vec![row[0] + 1; pattern.len() + 1];
            for i in 1..=pattern.len() {
                let sub = row[i - 1] + usize::from(pattern[i - 1] != t || t == b'N');
                next[i] = sub.min(row[i] + 1).min(next[i - 1] + 1);
            }
            row = next;
            best = best.min(row[pattern.len()]);
        }
        best
    }

    #[test]
    fn test_exact_prefix() {
        assert_eq!(
            hit("ACGTACGT", 0, "ACGTACGTTTTT"),
            Some(PrefixHit { edits: 0, span: 8 })
        );
        assert_eq!(hit("ACGTACGT", 0, "TACGTACGT"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            hit("ACGTAC", 0, "acgtac"),
            Some(PrefixHit { edits: 0, span: 6 })
        );
    }

    #[test]
    fn test_substitutions_up_to_tolerance() {
        // two substitutions, tolerance two
        assert_eq!(
            hit("ACGTACGT", 2, "AGGTACCTGGG"),
            Some(PrefixHit { edits: 2, span: 8 })
        );
        // same text, tolerance one
        assert_eq!(hit("ACGTACGT", 1, "AGGTACCTGGG"), None);
    }

    #[test]
    fn test_deletion_in_read() {
        // read is missing the T at pattern position 3
        assert_eq!(
            hit("ACGTACGT", 1, "ACGACGTCCC"),
            Some(PrefixHit { edits: 1, span: 7 })
        );
    }

    #[test]
    fn test_insertion_in_read() {
        // read has an extra G after ACG
        assert_eq!(
            hit("ACGTCATG", 1, "ACGGTCATGAAA"),
            Some(PrefixHit { edits: 1, span: 9 })
        );
    }

    #[test]
    fn test_prefers_nominal_span_on_ties() {
        // a trailing base equal to the pattern's last base gives an
        // equally good insertion alignment; the nominal span must win
        assert_eq!(
            hit("ACGTAC", 1, "ACGTACCCC"),
            Some(PrefixHit { edits: 0, span: 6 })
        );
        let h = hit("ACGTAC", 1, "ACGTAGGGG").unwrap();
        assert_eq!(h, PrefixHit { edits: 1, span: 6 });
    }

    #[test]
    fn test_n_never_matches() {
        assert_eq!(hit("ACGT", 0, "ANGT"), None);
        assert_eq!(hit("ACGT", 1, "ANGT"), Some(PrefixHit { edits: 1, span: 4 }));
    }

    #[test]
    fn test_text_shorter_than_min_match() {
        assert_eq!(hit("ACGTAC", 1, "ACGT"), None);
        assert_eq!(hit("ACGTAC", 2, "ACGT"), Some(PrefixHit { edits: 2, span: 4 }));
        assert_eq!(hit("ACGTAC", 1, ""), None);
    }

    #[test]
    fn test_tolerance_above_pattern_length() {
        // every prefix is within reach by deleting the whole pattern
        assert_eq!(hit("ACG", 10, ""), Some(PrefixHit { edits: 3, span: 0 }));
        assert_eq!(
            hit("ACG", 10, "ACGTTT"),
            Some(PrefixHit { edits: 0, span: 3 })
        );
    }

    #[test]
    fn test_longest_supported_pattern() {
        let pattern = "ACGT".repeat(16)[..MAX_PATTERN_LENGTH].to_string();
        let text = format!("{pattern}TTTT");
        assert_eq!(
            hit(&pattern, 2, &text),
            Some(PrefixHit {
                edits: 0,
                span: MAX_PATTERN_LENGTH
            })
        );
    }

    #[test]
    fn test_agrees_with_dynamic_programming() {
        let cases = [
            ("GATTACA", "GATACAGG"),
            ("GATTACA", "GCTTACAT"),
            ("CCGGTTAA", "CGGTTAAC"),
            ("TTAGGC", "TTTAGGCA"),
            ("ACACGT", "ACGTGT"),
            ("AAGCTT", "TTTTTT"),
        ];
        for (pattern, text) in cases {
            let expected = naive_best(pattern.as_bytes(), text.as_bytes());
            for k in 0..3u32 {
                let found = hit(pattern, k, text).map(|h| h.edits as usize);
                if expected <= k as usize {
                    assert_eq!(found, Some(expected), "{pattern} vs {text} k={k}");
                } else {
                    assert_eq!(found, None, "{pattern} vs {text} k={k}");
                }
            }
        }
    }
}
