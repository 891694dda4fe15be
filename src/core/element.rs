use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::utils::validation::{is_valid_identifier, normalize_sequence, MAX_PATTERN_LENGTH};

/// Name given to the fixed sequence that terminates a repeatable element
pub const STOP_SIGNAL_NAME: &str = "stop_signal";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Invalid nucleotide sequence for {name}: '{sequence}'")]
    InvalidSequence { name: String, sequence: String },

    #[error("Invalid identifier '{0}': must be non-empty with no whitespace or brackets")]
    InvalidIdentifier(String),

    #[error(
        "Tolerance of {tolerance} for {name} must be less than its sequence length ({length})"
    )]
    ToleranceTooLarge {
        name: String,
        tolerance: u32,
        length: usize,
    },

    #[error("Sequence for {name} is {length} bases; at most {MAX_PATTERN_LENGTH} are supported")]
    SequenceTooLong { name: String, length: usize },

    #[error("{0} has no candidate sequences")]
    NoCandidates(String),
}

/// Validate and normalize one literal sequence with its tolerance
fn checked_literal(name: &str, sequence: &str, tolerance: u32) -> Result<String, ElementError> {
    let normalized =
        normalize_sequence(sequence).ok_or_else(|| ElementError::InvalidSequence {
            name: name.to_string(),
            sequence: sequence.to_string(),
        })?;

    if normalized.len() > MAX_PATTERN_LENGTH {
        return Err(ElementError::SequenceTooLong {
            name: name.to_string(),
            length: normalized.len(),
        });
    }

    // minimum match length (length - tolerance) must stay >= 1
    if tolerance as usize >= normalized.len() {
        return Err(ElementError::ToleranceTooLarge {
            name: name.to_string(),
            tolerance,
            length: normalized.len(),
        });
    }

    Ok(normalized)
}

/// A literal sequence with no barcode semantics (linker, anchor, stop signal, switch option)
#[derive(Debug, Clone)]
pub struct FixedSequence {
    name: String,
    sequence: String,
    max_mismatches: u32,
}

impl FixedSequence {
    /// # Errors
    ///
    /// Returns `ElementError` if the sequence is not nucleotides, is too long,
    /// or is not longer than `max_mismatches`.
    pub fn new(
        name: impl Into<String>,
        sequence: &str,
        max_mismatches: u32,
    ) -> Result<Self, ElementError> {
        let name = name.into();
        let sequence = checked_literal(&name, sequence, max_mismatches)?;
        Ok(Self {
            name,
            sequence,
            max_mismatches,
        })
    }

    /// Build the stop signal that ends a run of a repeatable element
    ///
    /// # Errors
    ///
    /// Same conditions as [`FixedSequence::new`].
    pub fn stop_signal(sequence: &str, max_mismatches: u32) -> Result<Self, ElementError> {
        Self::new(STOP_SIGNAL_NAME, sequence, max_mismatches)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn max_mismatches(&self) -> u32 {
        self.max_mismatches
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl PartialEq for FixedSequence {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sequence == other.sequence
    }
}

impl Eq for FixedSequence {}

impl Hash for FixedSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sequence.hash(state);
    }
}

impl fmt::Display for FixedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.sequence)
    }
}

/// A single identified barcode
///
/// Barcodes order by sequence, then by identifier. Two barcodes are equal
/// when both their identifier and sequence are equal.
#[derive(Debug, Clone)]
pub struct Barcode {
    id: String,
    sequence: String,
    max_mismatches: u32,
    stop_signal: Option<FixedSequence>,
}

impl Barcode {
    /// # Errors
    ///
    /// Returns `ElementError` if the identifier cannot be written into a
    /// signature, or the sequence fails validation against `max_mismatches`.
    pub fn new(
        id: impl Into<String>,
        sequence: &str,
        max_mismatches: u32,
    ) -> Result<Self, ElementError> {
        let id = id.into();
        if !is_valid_identifier(&id) {
            return Err(ElementError::InvalidIdentifier(id));
        }
        let sequence = checked_literal(&id, sequence, max_mismatches)?;
        Ok(Self {
            id,
            sequence,
            max_mismatches,
            stop_signal: None,
        })
    }

    /// A barcode without an explicit identifier; the sequence serves as its ID.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Barcode::new`].
    pub fn from_sequence(sequence: &str, max_mismatches: u32) -> Result<Self, ElementError> {
        Self::new(sequence.to_ascii_uppercase(), sequence, max_mismatches)
    }

    /// Make this barcode repeatable in tandem, ending at `stop_signal`
    #[must_use]
    pub fn with_stop_signal(mut self, stop_signal: FixedSequence) -> Self {
        self.stop_signal = Some(stop_signal);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn max_mismatches(&self) -> u32 {
        self.max_mismatches
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn stop_signal(&self) -> Option<&FixedSequence> {
        self.stop_signal.as_ref()
    }
}

impl PartialEq for Barcode {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence && self.id == other.id
    }
}

impl Eq for Barcode {}

impl Hash for Barcode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
        self.id.hash(state);
    }
}

impl PartialOrd for Barcode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Barcode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.id, self.sequence)
    }
}

/// Keep the first occurrence of each item, preserving declaration order
fn dedup_preserving_order<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Candidate barcodes at one layout position; exactly one is expected to match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeSet {
    name: String,
    barcodes: Vec<Barcode>,
    stop_signal: Option<FixedSequence>,
}

impl BarcodeSet {
    /// # Errors
    ///
    /// Returns `ElementError::NoCandidates` if `barcodes` is empty.
    pub fn new(
        name: impl Into<String>,
        barcodes: impl IntoIterator<Item = Barcode>,
    ) -> Result<Self, ElementError> {
        let name = name.into();
        let barcodes = dedup_preserving_order(barcodes);
        if barcodes.is_empty() {
            return Err(ElementError::NoCandidates(name));
        }
        Ok(Self {
            name,
            barcodes,
            stop_signal: None,
        })
    }

    #[must_use]
    pub fn with_stop_signal(mut self, stop_signal: FixedSequence) -> Self {
        self.stop_signal = Some(stop_signal);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn barcodes(&self) -> &[Barcode] {
        &self.barcodes
    }

    pub fn stop_signal(&self) -> Option<&FixedSequence> {
        self.stop_signal.as_ref()
    }
}

/// Several literal variants that all stand for one canonical barcode
///
/// The canonical sequence is always the first variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeEquivalenceClass {
    canonical: Barcode,
    variants: Vec<String>,
}

impl BarcodeEquivalenceClass {
    /// Variants share the canonical barcode's mismatch tolerance.
    ///
    /// # Errors
    ///
    /// Returns `ElementError` if any variant fails sequence validation.
    pub fn new(
        canonical: Barcode,
        variants: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ElementError> {
        let mut all = vec![canonical.sequence().to_string()];
        for variant in variants {
            all.push(checked_literal(
                canonical.id(),
                variant.as_ref(),
                canonical.max_mismatches(),
            )?);
        }
        Ok(Self {
            variants: dedup_preserving_order(all),
            canonical,
        })
    }

    pub fn id(&self) -> &str {
        self.canonical.id()
    }

    /// The barcode every variant resolves to
    pub fn to_barcode(&self) -> &Barcode {
        &self.canonical
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

/// Equivalence classes competing at one layout position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceClassSet {
    name: String,
    classes: Vec<BarcodeEquivalenceClass>,
    stop_signal: Option<FixedSequence>,
}

impl EquivalenceClassSet {
    /// # Errors
    ///
    /// Returns `ElementError::NoCandidates` if `classes` is empty.
    pub fn new(
        name: impl Into<String>,
        classes: impl IntoIterator<Item = BarcodeEquivalenceClass>,
    ) -> Result<Self, ElementError> {
        let name = name.into();
        let classes: Vec<_> = classes.into_iter().collect();
        if classes.is_empty() {
            return Err(ElementError::NoCandidates(name));
        }
        Ok(Self {
            name,
            classes,
            stop_signal: None,
        })
    }

    #[must_use]
    pub fn with_stop_signal(mut self, stop_signal: FixedSequence) -> Self {
        self.stop_signal = Some(stop_signal);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[BarcodeEquivalenceClass] {
        &self.classes
    }
}

/// Alternative fixed sequences at one position; records which one was seen
/// but never contributes to a barcode signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    name: String,
    options: Vec<FixedSequence>,
}

impl Switch {
    /// # Errors
    ///
    /// Returns `ElementError::NoCandidates` if `options` is empty.
    pub fn new(
        name: impl Into<String>,
        options: impl IntoIterator<Item = FixedSequence>,
    ) -> Result<Self, ElementError> {
        let name = name.into();
        let options = dedup_preserving_order(options);
        if options.is_empty() {
            return Err(ElementError::NoCandidates(name));
        }
        Ok(Self { name, options })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &[FixedSequence] {
        &self.options
    }
}

/// The logical element a literal variant stands for once it has matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Fixed(&'a FixedSequence),
    Barcode(&'a Barcode),
}

impl<'a> Resolved<'a> {
    /// The barcode this variant contributes to a signature, if any
    pub fn barcode(&self) -> Option<&'a Barcode> {
        match self {
            Self::Barcode(barcode) => Some(barcode),
            Self::Fixed(_) => None,
        }
    }

    fn label(&self) -> &'a str {
        match self {
            Self::Fixed(fixed) => fixed.name(),
            Self::Barcode(barcode) => barcode.id(),
        }
    }
}

/// One literal sequence an element can present, with what it resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralVariant<'a> {
    pub sequence: &'a str,
    pub max_mismatches: u32,
    pub resolves_to: Resolved<'a>,
}

impl<'a> LiteralVariant<'a> {
    fn fixed(fixed: &'a FixedSequence) -> Self {
        Self {
            sequence: fixed.sequence(),
            max_mismatches: fixed.max_mismatches(),
            resolves_to: Resolved::Fixed(fixed),
        }
    }

    fn barcode(barcode: &'a Barcode) -> Self {
        Self {
            sequence: barcode.sequence(),
            max_mismatches: barcode.max_mismatches(),
            resolves_to: Resolved::Barcode(barcode),
        }
    }

    fn class_variant(class: &'a BarcodeEquivalenceClass, index: usize) -> Option<Self> {
        class.variants.get(index).map(|sequence| Self {
            sequence: sequence.as_str(),
            max_mismatches: class.canonical.max_mismatches(),
            resolves_to: Resolved::Barcode(&class.canonical),
        })
    }
}

/// One matchable unit of a read layout
#[derive(Debug, Clone)]
pub enum Element {
    Fixed(FixedSequence),
    Barcode(Barcode),
    BarcodeSet(BarcodeSet),
    EquivalenceClass(BarcodeEquivalenceClass),
    EquivalenceClassSet(EquivalenceClassSet),
    Switch(Switch),
}

impl Element {
    /// Kind tag for this element
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed_sequence",
            Self::Barcode(_) => "barcode",
            Self::BarcodeSet(_) => "barcode_set",
            Self::EquivalenceClass(_) => "barcode_equivalence_class",
            Self::EquivalenceClassSet(_) => "barcode_equivalence_class_set",
            Self::Switch(_) => "switch",
        }
    }

    /// Element name or barcode identifier
    pub fn id(&self) -> &str {
        match self {
            Self::Fixed(fixed) => fixed.name(),
            Self::Barcode(barcode) => barcode.id(),
            Self::BarcodeSet(set) => set.name(),
            Self::EquivalenceClass(class) => class.id(),
            Self::EquivalenceClassSet(set) => set.name(),
            Self::Switch(switch) => switch.name(),
        }
    }

    /// Number of literal variants, in matching order
    pub fn num_variants(&self) -> usize {
        match self {
            Self::Fixed(_) | Self::Barcode(_) => 1,
            Self::BarcodeSet(set) => set.barcodes.len(),
            Self::EquivalenceClass(class) => class.variants.len(),
            Self::EquivalenceClassSet(set) => set.classes.iter().map(|c| c.variants.len()).sum(),
            Self::Switch(switch) => switch.options.len(),
        }
    }

    /// The literal variant at `index` in matching order
    pub fn variant(&self, index: usize) -> Option<LiteralVariant<'_>> {
        match self {
            Self::Fixed(fixed) => (index == 0).then(|| LiteralVariant::fixed(fixed)),
            Self::Barcode(barcode) => (index == 0).then(|| LiteralVariant::barcode(barcode)),
            Self::BarcodeSet(set) => set.barcodes.get(index).map(LiteralVariant::barcode),
            Self::EquivalenceClass(class) => LiteralVariant::class_variant(class, index),
            Self::EquivalenceClassSet(set) => {
                let mut remaining = index;
                for class in &set.classes {
                    if remaining < class.variants.len() {
                        return LiteralVariant::class_variant(class, remaining);
                    }
                    remaining -= class.variants.len();
                }
                None
            }
            Self::Switch(switch) => switch.options.get(index).map(LiteralVariant::fixed),
        }
    }

    /// Every literal this element can present, mapped to the logical element
    /// it resolves to (identity for simple elements, the canonical barcode for
    /// equivalence classes).
    pub fn literal_variants(&self) -> Vec<LiteralVariant<'_>> {
        (0..self.num_variants())
            .filter_map(|i| self.variant(i))
            .collect()
    }

    /// Longest literal length
    pub fn length(&self) -> usize {
        self.literal_variants()
            .iter()
            .map(|v| v.sequence.len())
            .max()
            .unwrap_or(0)
    }

    /// Fewest read bases any variant can match (length minus tolerance)
    pub fn min_match_length(&self) -> usize {
        self.literal_variants()
            .iter()
            .map(|v| v.sequence.len() - v.max_mismatches as usize)
            .min()
            .unwrap_or(0)
    }

    /// Largest tolerance of any variant
    pub fn max_edit_distance(&self) -> u32 {
        self.literal_variants()
            .iter()
            .map(|v| v.max_mismatches)
            .max()
            .unwrap_or(0)
    }

    pub fn stop_signal(&self) -> Option<&FixedSequence> {
        match self {
            Self::Barcode(barcode) => barcode.stop_signal(),
            Self::BarcodeSet(set) => set.stop_signal(),
            Self::EquivalenceClass(class) => class.canonical.stop_signal(),
            Self::EquivalenceClassSet(set) => set.stop_signal.as_ref(),
            Self::Fixed(_) | Self::Switch(_) => None,
        }
    }

    pub fn is_repeatable(&self) -> bool {
        self.stop_signal().is_some()
    }

    /// Whether matches at this position contribute barcodes to a signature
    pub fn is_barcode_derived(&self) -> bool {
        matches!(
            self,
            Self::Barcode(_)
                | Self::BarcodeSet(_)
                | Self::EquivalenceClass(_)
                | Self::EquivalenceClassSet(_)
        )
    }

    /// Value identity: kind, name/ID, and the literal-to-element mapping
    fn identity(&self) -> (&'static str, &str, Vec<(&str, &str)>) {
        let mut mapping: Vec<(&str, &str)> = self
            .literal_variants()
            .iter()
            .map(|v| (v.sequence, v.resolves_to.label()))
            .collect();
        mapping.sort_unstable();
        (self.element_name(), self.id(), mapping)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.element_name(), self.id())
    }
}

impl From<FixedSequence> for Element {
    fn from(fixed: FixedSequence) -> Self {
        Self::Fixed(fixed)
    }
}

impl From<Barcode> for Element {
    fn from(barcode: Barcode) -> Self {
        Self::Barcode(barcode)
    }
}

impl From<BarcodeSet> for Element {
    fn from(set: BarcodeSet) -> Self {
        Self::BarcodeSet(set)
    }
}

impl From<BarcodeEquivalenceClass> for Element {
    fn from(class: BarcodeEquivalenceClass) -> Self {
        Self::EquivalenceClass(class)
    }
}

impl From<EquivalenceClassSet> for Element {
    fn from(set: EquivalenceClassSet) -> Self {
        Self::EquivalenceClassSet(set)
    }
}

impl From<Switch> for Element {
    fn from(switch: Switch) -> Self {
        Self::Switch(switch)
    }
}
