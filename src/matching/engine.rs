use serde::{Deserialize, Serialize};

use crate::core::element::{Element, LiteralVariant};
use crate::core::layout::{LayoutError, ReadLayout};
use crate::matching::bitap::{BitapPattern, PrefixHit};

/// Default cap on the number of elements in one repeat run
pub const DEFAULT_MAX_REPEATS: usize = 64;

/// Configuration for the layout matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Stop a repeat run after this many matches even without a stop signal
    pub max_repeats: usize,
    /// Refuse layouts whose minimum span exceeds their declared read length
    pub enforce_read_length: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_repeats: DEFAULT_MAX_REPEATS,
            enforce_read_length: true,
        }
    }
}

/// Patterns for every literal variant of one element, in variant order
#[derive(Debug, Clone)]
pub(crate) struct CompiledElement {
    variants: Vec<BitapPattern>,
    stop_signal: Option<BitapPattern>,
}

impl CompiledElement {
    pub(crate) fn new(element: &Element) -> Self {
        let variants = element
            .literal_variants()
            .iter()
            .map(|v| BitapPattern::new(v.sequence.as_bytes(), v.max_mismatches))
            .collect();
        let stop_signal = element
            .stop_signal()
            .map(|s| BitapPattern::new(s.sequence().as_bytes(), s.max_mismatches()));
        Self {
            variants,
            stop_signal,
        }
    }

    pub(crate) fn num_patterns(&self) -> usize {
        self.variants.len() + usize::from(self.stop_signal.is_some())
    }

    /// Best variant anchored at the start of `text`: fewest edits, ties
    /// broken by declaration order
    fn best_variant(&self, text: &[u8]) -> Option<(usize, PrefixHit)> {
        let mut best: Option<(usize, PrefixHit)> = None;
        for (index, pattern) in self.variants.iter().enumerate() {
            if let Some(hit) = pattern.match_prefix(text) {
                if best.map_or(true, |(_, b)| hit.edits < b.edits) {
                    best = Some((index, hit));
                    if hit.edits == 0 {
                        break;
                    }
                }
            }
        }
        best
    }
}

/// One element instance found in a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedElement<'a> {
    /// The literal that matched and what it resolves to
    pub variant: LiteralVariant<'a>,
    /// Read offset where the match starts
    pub start: usize,
    /// Number of read bases consumed
    pub span: usize,
    /// Edit distance of the alignment
    pub edits: u32,
}

impl MatchedElement<'_> {
    pub fn end(&self) -> usize {
        self.start + self.span
    }
}

/// Elements found in one read, one slot per layout position
///
/// Mandatory positions hold exactly one match; repeatable positions hold
/// zero or more, in the order found.
#[derive(Debug, Clone)]
pub struct LayoutMatch<'a> {
    layout: &'a ReadLayout,
    slots: Vec<Vec<MatchedElement<'a>>>,
    end: usize,
}

impl<'a> LayoutMatch<'a> {
    pub fn layout(&self) -> &'a ReadLayout {
        self.layout
    }

    pub fn slots(&self) -> &[Vec<MatchedElement<'a>>] {
        &self.slots
    }

    pub fn slot(&self, position: usize) -> Option<&[MatchedElement<'a>]> {
        self.slots.get(position).map(Vec::as_slice)
    }

    /// Read offset just past the last consumed base
    pub fn end(&self) -> usize {
        self.end
    }

    /// Layout elements paired with what matched at each position
    pub fn positions(&self) -> impl Iterator<Item = (&'a Element, &[MatchedElement<'a>])> {
        self.layout
            .elements()
            .iter()
            .zip(self.slots.iter().map(Vec::as_slice))
    }

    /// Total edits across all matched elements
    pub fn total_edits(&self) -> u32 {
        self.slots.iter().flatten().map(|m| m.edits).sum()
    }
}

/// Walks a layout along a read, matching each element at the cursor
pub struct LayoutMatcher<'a> {
    layout: &'a ReadLayout,
    config: MatchingConfig,
}

impl<'a> LayoutMatcher<'a> {
    /// Create a matcher with default configuration
    pub fn new(layout: &'a ReadLayout) -> Self {
        Self {
            layout,
            config: MatchingConfig::default(),
        }
    }

    /// Create a matcher with custom configuration
    pub fn with_config(layout: &'a ReadLayout, config: MatchingConfig) -> Self {
        Self { layout, config }
    }

    /// Match the layout against `read`.
    ///
    /// Returns `Ok(None)` as soon as a mandatory element fails to align at
    /// the cursor. Repeatable elements never cause a failure; a run ends at
    /// its stop signal or at the first position where neither the element
    /// nor the stop signal matches.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::ExceedsReadLength` if the layout's minimum span
    /// is longer than its declared read length.
    pub fn match_read(&self, read: &[u8]) -> Result<Option<LayoutMatch<'a>>, LayoutError> {
        let layout = self.layout;
        if self.config.enforce_read_length && layout.min_span() > layout.read_length() {
            return Err(LayoutError::ExceedsReadLength {
                min_span: layout.min_span(),
                read_length: layout.read_length(),
            });
        }

        let mut cursor = 0;
        let mut slots = Vec::with_capacity(layout.len());

        for (element, compiled) in layout.elements().iter().zip(layout.compiled()) {
            if element.is_repeatable() {
                let (run, next) = self.match_repeat(element, compiled, read, cursor);
                slots.push(run);
                cursor = next;
                continue;
            }

            match Self::match_at(element, compiled, read, cursor) {
                Some(found) => {
                    cursor = found.end();
                    slots.push(vec![found]);
                }
                None => return Ok(None),
            }
        }

        Ok(Some(LayoutMatch {
            layout,
            slots,
            end: cursor,
        }))
    }

    fn match_at(
        element: &'a Element,
        compiled: &CompiledElement,
        read: &[u8],
        cursor: usize,
    ) -> Option<MatchedElement<'a>> {
        let text = read.get(cursor..)?;
        let (index, hit) = compiled.best_variant(text)?;
        let variant = element.variant(index)?;
        Some(MatchedElement {
            variant,
            start: cursor,
            span: hit.span,
            edits: hit.edits,
        })
    }

    /// Greedy tandem match; returns the run and the cursor after it
    fn match_repeat(
        &self,
        element: &'a Element,
        compiled: &CompiledElement,
        read: &[u8],
        mut cursor: usize,
    ) -> (Vec<MatchedElement<'a>>, usize) {
        let stop_span = |at: usize| -> Option<usize> {
            let stop = compiled.stop_signal.as_ref()?;
            stop.match_prefix(read.get(at..)?).map(|hit| hit.span)
        };

        let mut run = Vec::new();
        while run.len() < self.config.max_repeats {
            match Self::match_at(element, compiled, read, cursor) {
                Some(found) => {
                    cursor = found.end();
                    run.push(found);
                }
                None => {
                    if let Some(span) = stop_span(cursor) {
                        cursor += span;
                    }
                    break;
                }
            }

            if let Some(span) = stop_span(cursor) {
                cursor += span;
                break;
            }
        }

        (run, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::element::{Barcode, BarcodeSet, FixedSequence, Resolved, Switch};

    fn bc(id: &str, seq: &str, k: u32) -> Barcode {
        Barcode::new(id, seq, k).unwrap()
    }

    fn fixed(name: &str, seq: &str, k: u32) -> FixedSequence {
        FixedSequence::new(name, seq, k).unwrap()
    }

    fn ids(m: &LayoutMatch<'_>, position: usize) -> Vec<String> {
        m.slot(position)
            .unwrap()
            .iter()
            .map(|e| match e.variant.resolves_to {
                Resolved::Barcode(b) => b.id().to_string(),
                Resolved::Fixed(f) => f.name().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_exact_concatenation() {
        let layout = ReadLayout::new(
            vec![
                bc("b1", "ACGTACGT", 1).into(),
                fixed("linker", "TTGGCCAA", 1).into(),
                BarcodeSet::new("set", vec![bc("s1", "GATCGATC", 1), bc("s2", "CATGCATG", 1)])
                    .unwrap()
                    .into(),
            ],
            30,
        )
        .unwrap();

        let read = b"ACGTACGTTTGGCCAACATGCATGAAAAAA";
        let m = layout.match_read(read).unwrap().unwrap();
        assert_eq!(m.slots().len(), 3);
        assert_eq!(ids(&m, 0), vec!["b1"]);
        assert_eq!(ids(&m, 1), vec!["linker"]);
        assert_eq!(ids(&m, 2), vec!["s2"]);
        assert_eq!(m.end(), 24);
        assert_eq!(m.total_edits(), 0);
    }

    #[test]
    fn test_mandatory_failure_returns_none() {
        let layout = ReadLayout::new(
            vec![bc("b1", "ACGTACGT", 1).into(), fixed("linker", "TTGGCCAA", 1).into()],
            20,
        )
        .unwrap();
        assert!(layout.match_read(b"ACGTACGTCCCCCCCCCCCC").unwrap().is_none());
        assert!(layout.match_read(b"").unwrap().is_none());
    }

    #[test]
    fn test_cursor_advances_past_indel() {
        let layout = ReadLayout::new(
            vec![bc("b1", "ACGTACGT", 1).into(), bc("b2", "GGCCTTAA", 0).into()],
            20,
        )
        .unwrap();
        // b1 has lost its fourth base
        let m = layout.match_read(b"ACGACGTGGCCTTAAC").unwrap().unwrap();
        assert_eq!(m.slot(0).unwrap()[0].span, 7);
        assert_eq!(m.slot(1).unwrap()[0].start, 7);
        assert_eq!(ids(&m, 1), vec!["b2"]);
    }

    #[test]
    fn test_ties_go_to_declaration_order() {
        let set = BarcodeSet::new("set", vec![bc("first", "AACCGG", 1), bc("second", "AACCGT", 1)])
            .unwrap();
        let layout = ReadLayout::new(vec![set.into()], 10).unwrap();
        // one substitution away from both
        let m = layout.match_read(b"AACCGA").unwrap().unwrap();
        assert_eq!(ids(&m, 0), vec!["first"]);
        // exact match to the second wins over a one-edit match to the first
        let m = layout.match_read(b"AACCGT").unwrap().unwrap();
        assert_eq!(ids(&m, 0), vec!["second"]);
    }

    #[test]
    fn test_repeat_ends_at_stop_signal() {
        let stop = FixedSequence::stop_signal("GGGTTT", 1).unwrap();
        let layout = ReadLayout::new(
            vec![
                bc("r", "ACGTAC", 1).with_stop_signal(stop).into(),
                fixed("tail", "CCAACC", 0).into(),
            ],
            30,
        )
        .unwrap();

        let m = layout.match_read(b"ACGTACACGTACGGGTTTCCAACC").unwrap().unwrap();
        assert_eq!(ids(&m, 0), vec!["r", "r"]);
        assert_eq!(m.slot(1).unwrap()[0].start, 18);
    }

    #[test]
    fn test_partial_repeat_is_kept() {
        let stop = FixedSequence::stop_signal("GGGTTT", 0).unwrap();
        let layout = ReadLayout::new(
            vec![BarcodeSet::new("r", vec![bc("a", "ACGTAC", 0), bc("b", "TTAACC", 0)])
                .unwrap()
                .with_stop_signal(stop)
                .into()],
            30,
        )
        .unwrap();

        let m = layout.match_read(b"ACGTACTTAACCCCCCCCCC").unwrap().unwrap();
        assert_eq!(ids(&m, 0), vec!["a", "b"]);
        assert_eq!(m.end(), 12);
    }

    #[test]
    fn test_empty_repeat_consumes_stop_signal() {
        let stop = FixedSequence::stop_signal("GGGTTT", 0).unwrap();
        let layout = ReadLayout::new(
            vec![
                bc("r", "ACGTAC", 0).with_stop_signal(stop).into(),
                fixed("tail", "CCAACC", 0).into(),
            ],
            30,
        )
        .unwrap();
        let m = layout.match_read(b"GGGTTTCCAACC").unwrap().unwrap();
        assert!(m.slot(0).unwrap().is_empty());
        assert_eq!(m.end(), 12);
    }

    #[test]
    fn test_max_repeats_caps_run() {
        let stop = FixedSequence::stop_signal("GGGTTT", 0).unwrap();
        let layout = ReadLayout::new(
            vec![bc("r", "ACGTAC", 0).with_stop_signal(stop).into()],
            60,
        )
        .unwrap();
        let config = MatchingConfig {
            max_repeats: 2,
            ..MatchingConfig::default()
        };
        let read = "ACGTAC".repeat(5);
        let m = LayoutMatcher::with_config(&layout, config)
            .match_read(read.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(m.slot(0).unwrap().len(), 2);
    }

    #[test]
    fn test_switch_records_option() {
        let switch = Switch::new(
            "assay",
            vec![fixed("RPM", "ACAAGGTT", 1), fixed("DPM", "GGTTCCAA", 1)],
        )
        .unwrap();
        let layout = ReadLayout::new(vec![switch.into(), bc("b", "ACGTAC", 0).into()], 20).unwrap();
        let m = layout.match_read(b"GGTTCCTAACGTAC").unwrap().unwrap();
        assert_eq!(ids(&m, 0), vec!["DPM"]);
        assert_eq!(m.slot(0).unwrap()[0].edits, 1);
    }

    #[test]
    fn test_layout_longer_than_read_length() {
        let layout = ReadLayout::new(
            vec![bc("b1", "ACGTACGT", 0).into(), bc("b2", "GGCCTTAA", 0).into()],
            10,
        )
        .unwrap();
        let err = layout.match_read(b"ACGTACGTGGCCTTAA").unwrap_err();
        assert_eq!(
            err,
            LayoutError::ExceedsReadLength {
                min_span: 16,
                read_length: 10
            }
        );

        let relaxed = MatchingConfig {
            enforce_read_length: false,
            ..MatchingConfig::default()
        };
        let m = LayoutMatcher::with_config(&layout, relaxed)
            .match_read(b"ACGTACGTGGCCTTAA")
            .unwrap();
        assert!(m.is_some());
    }
}
