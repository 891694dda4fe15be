use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::core::element::{Barcode, Element};
use crate::matching::engine::{CompiledElement, LayoutMatch, LayoutMatcher};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Read layout has no elements")]
    Empty,

    #[error(
        "Read layout needs at least {min_span} bases but declares a read length of {read_length}"
    )]
    ExceedsReadLength { min_span: usize, read_length: usize },
}

/// The ordered grammar of elements expected in one read
///
/// Layouts are immutable once built and can be shared across threads; the
/// literal patterns of every element are compiled at construction.
#[derive(Debug, Clone)]
pub struct ReadLayout {
    elements: Vec<Element>,
    read_length: usize,
    min_span: usize,
    compiled: Vec<CompiledElement>,
}

impl ReadLayout {
    /// # Errors
    ///
    /// Returns `LayoutError::Empty` if `elements` is empty.
    pub fn new(elements: Vec<Element>, read_length: usize) -> Result<Self, LayoutError> {
        if elements.is_empty() {
            return Err(LayoutError::Empty);
        }

        // Repeatable runs may be empty, so only mandatory elements count
        let min_span = elements
            .iter()
            .filter(|e| !e.is_repeatable())
            .map(Element::min_match_length)
            .sum();

        let compiled: Vec<CompiledElement> = elements.iter().map(CompiledElement::new).collect();

        debug!(
            "Compiled read layout: {} elements, {} literal patterns, minimum span {}",
            elements.len(),
            compiled.iter().map(CompiledElement::num_patterns).sum::<usize>(),
            min_span
        );

        Ok(Self {
            elements,
            read_length,
            min_span,
            compiled,
        })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Declared read length
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Bases consumed when every mandatory element matches at its minimum length
    pub fn min_span(&self) -> usize {
        self.min_span
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn compiled(&self) -> &[CompiledElement] {
        &self.compiled
    }

    /// Every barcode declared at a barcode or barcode-set position,
    /// de-duplicated and sorted
    pub fn all_barcodes(&self) -> BTreeSet<&Barcode> {
        let mut barcodes = BTreeSet::new();
        for element in &self.elements {
            match element {
                Element::Barcode(barcode) => {
                    barcodes.insert(barcode);
                }
                Element::BarcodeSet(set) => barcodes.extend(set.barcodes()),
                _ => {}
            }
        }
        barcodes
    }

    /// Match this layout against a read with the default matcher configuration.
    ///
    /// `Ok(None)` means a mandatory element could not be found; the layout
    /// does not apply to this read.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::ExceedsReadLength` if the layout cannot fit in
    /// its own declared read length.
    pub fn match_read<'a>(&'a self, read: &[u8]) -> Result<Option<LayoutMatch<'a>>, LayoutError> {
        LayoutMatcher::new(self).match_read(read)
    }
}
