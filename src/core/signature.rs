//! Barcode signatures and their canonical text encoding.
//!
//! A signature with barcodes `(id1, seq1), (id2, seq2)` encodes as
//! `[id1]seq1[id2]seq2`. The empty signature has no encoding at all, which is
//! how an absent tag on a stored record is read back.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::element::Barcode;
use crate::utils::validation::is_valid_identifier;

/// Shape every encoded signature must follow
pub const SIGNATURE_FORMAT: &str = "[id1]barcode1[id2]barcode2...";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid barcode signature '{input}': expected format {SIGNATURE_FORMAT}")]
    InvalidFormat { input: String },

    #[error(
        "Barcode [{id}]{sequence} cannot be encoded: the ID must be non-empty with no whitespace or brackets, and the sequence non-empty with no brackets"
    )]
    InvalidBarcode { id: String, sequence: String },
}

/// One barcode as it appears in a signature
///
/// Only pairs that survive a round trip through the encoding can be built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentifiedBarcode {
    id: String,
    sequence: String,
}

impl IdentifiedBarcode {
    /// # Errors
    ///
    /// Returns `SignatureError::InvalidBarcode` if the ID is not a valid
    /// identifier or the sequence is empty or contains a bracket.
    pub fn new(
        id: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Result<Self, SignatureError> {
        let id = id.into();
        let sequence = sequence.into();
        if !is_valid_identifier(&id) || sequence.is_empty() || sequence.contains(['[', ']']) {
            return Err(SignatureError::InvalidBarcode { id, sequence });
        }
        Ok(Self { id, sequence })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }
}

impl From<&Barcode> for IdentifiedBarcode {
    // Barcode constructors already validate both fields
    fn from(barcode: &Barcode) -> Self {
        Self {
            id: barcode.id().to_string(),
            sequence: barcode.sequence().to_string(),
        }
    }
}

impl fmt::Display for IdentifiedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.id, self.sequence)
    }
}

/// The ordered barcodes identified for one fragment
///
/// Order is significant: the same barcodes in a different order are a
/// different signature. Equality, ordering and hashing all follow the
/// encoded string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub struct BarcodeSequence {
    barcodes: Vec<IdentifiedBarcode>,
    key: String,
}

impl BarcodeSequence {
    /// The signature with no barcodes
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(barcodes: Vec<IdentifiedBarcode>) -> Self {
        let key = barcodes.iter().map(ToString::to_string).collect();
        Self { barcodes, key }
    }

    /// Parse an encoded signature.
    ///
    /// # Errors
    ///
    /// Returns `SignatureError::InvalidFormat` if text comes before the first
    /// `[` or a non-empty bracketed field does not split into a valid
    /// identifier and a non-empty sequence. Empty fields are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use barcode_solver::core::signature::BarcodeSequence;
    ///
    /// let sig = BarcodeSequence::decode("[Y4]ACGT[E2]TTGA").unwrap();
    /// assert_eq!(sig.num_barcodes(), 2);
    /// assert!(BarcodeSequence::decode("[a]AC[b").is_err());
    /// ```
    pub fn decode(encoded: &str) -> Result<Self, SignatureError> {
        let invalid = || SignatureError::InvalidFormat {
            input: encoded.to_string(),
        };

        if encoded.is_empty() {
            return Ok(Self::empty());
        }
        let fields = encoded.strip_prefix('[').ok_or_else(invalid)?;

        let mut barcodes = Vec::new();
        for field in fields.split('[').filter(|f| !f.is_empty()) {
            let mut parts = field.split(']');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(sequence), None) => {
                    barcodes.push(IdentifiedBarcode::new(id, sequence).map_err(|_| invalid())?);
                }
                _ => return Err(invalid()),
            }
        }
        Ok(Self::new(barcodes))
    }

    /// Read a signature from an optional stored tag; an absent tag is the
    /// empty signature.
    ///
    /// # Errors
    ///
    /// Same conditions as [`BarcodeSequence::decode`].
    pub fn from_tag(tag: Option<&str>) -> Result<Self, SignatureError> {
        tag.map_or_else(|| Ok(Self::empty()), Self::decode)
    }

    /// Canonical encoding, or `None` for the empty signature
    pub fn encode(&self) -> Option<String> {
        (!self.key.is_empty()).then(|| self.key.clone())
    }

    /// Grouping key: the encoding, or `""` for the empty signature
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn barcodes(&self) -> &[IdentifiedBarcode] {
        &self.barcodes
    }

    pub fn num_barcodes(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    /// The last `n` barcodes, or the whole signature if it has `n` or fewer
    #[must_use]
    pub fn last(&self, n: usize) -> Self {
        let skip = self.barcodes.len().saturating_sub(n);
        Self::new(self.barcodes[skip..].to_vec())
    }

    /// A new signature with `barcode` added at the end
    #[must_use]
    pub fn appended(&self, barcode: IdentifiedBarcode) -> Self {
        let mut barcodes = self.barcodes.clone();
        barcodes.push(barcode);
        Self::new(barcodes)
    }
}

impl PartialEq for BarcodeSequence {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for BarcodeSequence {}

impl Hash for BarcodeSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for BarcodeSequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BarcodeSequence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for BarcodeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl TryFrom<Option<String>> for BarcodeSequence {
    type Error = SignatureError;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        Self::from_tag(value.as_deref())
    }
}

impl From<BarcodeSequence> for Option<String> {
    fn from(signature: BarcodeSequence) -> Self {
        signature.encode()
    }
}

impl FromIterator<IdentifiedBarcode> for BarcodeSequence {
    fn from_iter<I: IntoIterator<Item = IdentifiedBarcode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Accumulates barcodes during matching and freezes them into a signature
#[derive(Debug, Default)]
pub struct BarcodeSequenceBuilder {
    barcodes: Vec<IdentifiedBarcode>,
}

impl BarcodeSequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, barcode: &Barcode) {
        self.barcodes.push(barcode.into());
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    pub fn build(self) -> BarcodeSequence {
        BarcodeSequence::new(self.barcodes)
    }
}
