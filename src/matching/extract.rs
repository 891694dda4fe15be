//! Turning layout matches into barcode signatures and switch values.

use crate::core::element::{Element, FixedSequence, Resolved, Switch};
use crate::core::layout::{LayoutError, ReadLayout};
use crate::core::signature::{BarcodeSequence, BarcodeSequenceBuilder};
use crate::matching::engine::{LayoutMatch, LayoutMatcher, MatchingConfig};

/// Options observed for each switch, in read order
///
/// Entries are keyed by the switch itself, so two different switches that
/// share a name are kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchValues {
    entries: Vec<(Switch, Vec<FixedSequence>)>,
}

impl SwitchValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `option` of `switch` was seen
    pub fn record(&mut self, switch: &Switch, option: FixedSequence) {
        match self.entries.iter_mut().find(|(s, _)| s == switch) {
            Some((_, options)) => options.push(option),
            None => self.entries.push((switch.clone(), vec![option])),
        }
    }

    pub fn get(&self, switch: &Switch) -> Option<&[FixedSequence]> {
        self.entries
            .iter()
            .find(|(s, _)| s == switch)
            .map(|(_, options)| options.as_slice())
    }

    /// Switches in the order first seen, with their observed options
    pub fn iter(&self) -> impl Iterator<Item = (&Switch, &[FixedSequence])> {
        self.entries.iter().map(|(s, options)| (s, options.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything identified in one fragment's reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentBarcodes {
    pub signature: BarcodeSequence,
    pub switches: SwitchValues,
    /// Whether read 1 matched its layout (false when either is absent)
    pub read1_matched: bool,
    /// Whether read 2 matched its layout (false when either is absent)
    pub read2_matched: bool,
}

impl FragmentBarcodes {
    pub fn any_matched(&self) -> bool {
        self.read1_matched || self.read2_matched
    }
}

fn append_signature(found: &LayoutMatch<'_>, builder: &mut BarcodeSequenceBuilder) {
    for (element, hits) in found.positions() {
        if !element.is_barcode_derived() {
            continue;
        }
        for hit in hits {
            if let Some(barcode) = hit.variant.resolves_to.barcode() {
                builder.push(barcode);
            }
        }
    }
}

fn append_switches(found: &LayoutMatch<'_>, switches: &mut SwitchValues) {
    for (element, hits) in found.positions() {
        let Element::Switch(switch) = element else {
            continue;
        };
        for hit in hits {
            if let Resolved::Fixed(option) = hit.variant.resolves_to {
                switches.record(switch, option.clone());
            }
        }
    }
}

/// Barcode-derived matches in layout order, resolved to canonical barcodes.
/// Fixed sequences and switches contribute nothing.
pub fn extract_signature(found: &LayoutMatch<'_>) -> BarcodeSequence {
    let mut builder = BarcodeSequenceBuilder::new();
    append_signature(found, &mut builder);
    builder.build()
}

/// Switch options observed in one match
pub fn extract_switches(found: &LayoutMatch<'_>) -> SwitchValues {
    let mut switches = SwitchValues::new();
    append_switches(found, &mut switches);
    switches
}

/// Identify barcodes and switches across both reads of a fragment.
///
/// Each side is matched independently; a missing layout or sequence for a
/// side, or a layout that does not match, contributes nothing. Read-1
/// barcodes come before read-2 barcodes in the signature.
///
/// # Errors
///
/// Returns `LayoutError` if a layout cannot fit in its declared read length.
pub fn identify_barcodes(
    read1: Option<(&ReadLayout, &[u8])>,
    read2: Option<(&ReadLayout, &[u8])>,
    config: &MatchingConfig,
) -> Result<FragmentBarcodes, LayoutError> {
    let mut builder = BarcodeSequenceBuilder::new();
    let mut switches = SwitchValues::new();
    let mut matched = [false; 2];

    for (side, read) in [read1, read2].into_iter().enumerate() {
        let Some((layout, sequence)) = read else {
            continue;
        };
        let matcher = LayoutMatcher::with_config(layout, config.clone());
        if let Some(found) = matcher.match_read(sequence)? {
            append_signature(&found, &mut builder);
            append_switches(&found, &mut switches);
            matched[side] = true;
        }
    }

    Ok(FragmentBarcodes {
        signature: builder.build(),
        switches,
        read1_matched: matched[0],
        read2_matched: matched[1],
    })
}
