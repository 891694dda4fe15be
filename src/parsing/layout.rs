//! JSON layout files.
//!
//! A layout file declares the read length and the elements in read order:
//!
//! ```json
//! {
//!   "read_length": 100,
//!   "elements": [
//!     { "kind": "barcode_set", "name": "Y", "table": "y_barcodes.txt", "max_mismatches": 1 },
//!     { "kind": "fixed", "name": "linker", "sequence": "ACACACAC", "max_mismatches": 1 },
//!     { "kind": "switch", "name": "assay", "max_mismatches": 1,
//!       "options": [ { "name": "RPM", "sequence": "ATCGATCG" },
//!                    { "name": "DPM", "sequence": "GCTAGCTA" } ] },
//!     { "kind": "barcode_set", "name": "odd", "max_mismatches": 1,
//!       "barcodes": [ { "id": "O1", "sequence": "TTTTCCCC" } ],
//!       "stop_signal": { "sequence": "GGGGAAAA", "max_mismatches": 1 } }
//!   ]
//! }
//! ```
//!
//! Table and list paths are relative to the layout file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::element::{
    Barcode, BarcodeEquivalenceClass, BarcodeSet, Element, EquivalenceClassSet, FixedSequence,
    Switch,
};
use crate::core::layout::ReadLayout;
use crate::parsing::barcodes::{barcodes_from_list, barcodes_from_table};
use crate::parsing::{read_text, ParseError};

/// Serializable layout file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    pub read_length: usize,
    pub elements: Vec<ElementConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopSignalConfig {
    pub sequence: String,
    #[serde(default)]
    pub max_mismatches: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarcodeEntry {
    /// Defaults to the sequence
    #[serde(default)]
    pub id: Option<String>,
    pub sequence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassEntry {
    pub id: String,
    pub sequence: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry {
    pub name: String,
    pub sequence: String,
}

/// One element of a layout file, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementConfig {
    Fixed {
        name: String,
        sequence: String,
        #[serde(default)]
        max_mismatches: u32,
    },
    Barcode {
        #[serde(default)]
        id: Option<String>,
        sequence: String,
        #[serde(default)]
        max_mismatches: u32,
        #[serde(default)]
        stop_signal: Option<StopSignalConfig>,
    },
    /// Candidates come from inline `barcodes`, a two-column `table`, a
    /// one-column `list`, or any combination
    BarcodeSet {
        name: String,
        #[serde(default)]
        barcodes: Vec<BarcodeEntry>,
        #[serde(default)]
        table: Option<PathBuf>,
        #[serde(default)]
        list: Option<PathBuf>,
        #[serde(default)]
        max_mismatches: u32,
        #[serde(default)]
        stop_signal: Option<StopSignalConfig>,
    },
    EquivalenceClass {
        id: String,
        sequence: String,
        #[serde(default)]
        variants: Vec<String>,
        #[serde(default)]
        max_mismatches: u32,
        #[serde(default)]
        stop_signal: Option<StopSignalConfig>,
    },
    EquivalenceClassSet {
        name: String,
        classes: Vec<ClassEntry>,
        #[serde(default)]
        max_mismatches: u32,
        #[serde(default)]
        stop_signal: Option<StopSignalConfig>,
    },
    Switch {
        name: String,
        options: Vec<OptionEntry>,
        #[serde(default)]
        max_mismatches: u32,
    },
}

fn stop_signal(config: Option<&StopSignalConfig>) -> Result<Option<FixedSequence>, ParseError> {
    config
        .map(|s| FixedSequence::stop_signal(&s.sequence, s.max_mismatches))
        .transpose()
        .map_err(ParseError::from)
}

fn barcode(id: Option<&str>, sequence: &str, max_mismatches: u32) -> Result<Barcode, ParseError> {
    Ok(match id {
        Some(id) => Barcode::new(id, sequence, max_mismatches)?,
        None => Barcode::from_sequence(sequence, max_mismatches)?,
    })
}

impl ElementConfig {
    /// Build the element, resolving table and list paths against `base_dir`
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a referenced file cannot be loaded or an
    /// element is invalid.
    pub fn to_element(&self, base_dir: &Path) -> Result<Element, ParseError> {
        let element = match self {
            Self::Fixed {
                name,
                sequence,
                max_mismatches,
            } => FixedSequence::new(name.as_str(), sequence, *max_mismatches)?.into(),

            Self::Barcode {
                id,
                sequence,
                max_mismatches,
                stop_signal: stop,
            } => {
                let mut barcode = barcode(id.as_deref(), sequence, *max_mismatches)?;
                if let Some(stop) = stop_signal(stop.as_ref())? {
                    barcode = barcode.with_stop_signal(stop);
                }
                barcode.into()
            }

            Self::BarcodeSet {
                name,
                barcodes,
                table,
                list,
                max_mismatches,
                stop_signal: stop,
            } => {
                let mut candidates = barcodes
                    .iter()
                    .map(|b| barcode(b.id.as_deref(), &b.sequence, *max_mismatches))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(table) = table {
                    candidates.extend(barcodes_from_table(&base_dir.join(table), *max_mismatches)?);
                }
                if let Some(list) = list {
                    candidates.extend(barcodes_from_list(&base_dir.join(list), *max_mismatches)?);
                }
                let mut set = BarcodeSet::new(name.as_str(), candidates)?;
                if let Some(stop) = stop_signal(stop.as_ref())? {
                    set = set.with_stop_signal(stop);
                }
                set.into()
            }

            Self::EquivalenceClass {
                id,
                sequence,
                variants,
                max_mismatches,
                stop_signal: stop,
            } => {
                let mut canonical = Barcode::new(id.as_str(), sequence, *max_mismatches)?;
                if let Some(stop) = stop_signal(stop.as_ref())? {
                    canonical = canonical.with_stop_signal(stop);
                }
                BarcodeEquivalenceClass::new(canonical, variants)?.into()
            }

            Self::EquivalenceClassSet {
                name,
                classes,
                max_mismatches,
                stop_signal: stop,
            } => {
                let classes = classes
                    .iter()
                    .map(|c| {
                        let canonical = Barcode::new(c.id.as_str(), &c.sequence, *max_mismatches)?;
                        BarcodeEquivalenceClass::new(canonical, &c.variants)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut set = EquivalenceClassSet::new(name.as_str(), classes)?;
                if let Some(stop) = stop_signal(stop.as_ref())? {
                    set = set.with_stop_signal(stop);
                }
                set.into()
            }

            Self::Switch {
                name,
                options,
                max_mismatches,
            } => {
                let options = options
                    .iter()
                    .map(|o| FixedSequence::new(o.name.as_str(), &o.sequence, *max_mismatches))
                    .collect::<Result<Vec<_>, _>>()?;
                Switch::new(name.as_str(), options)?.into()
            }
        };
        Ok(element)
    }
}

impl LayoutConfig {
    /// # Errors
    ///
    /// Returns `ParseError` if any element cannot be built or the layout is
    /// empty.
    pub fn to_layout(&self, base_dir: &Path) -> Result<ReadLayout, ParseError> {
        let elements = self
            .elements
            .iter()
            .map(|e| e.to_element(base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReadLayout::new(elements, self.read_length)?)
    }
}

/// Parse layout JSON, resolving relative paths against `base_dir`
///
/// # Errors
///
/// Returns `ParseError::InvalidLayout` if the JSON does not describe a
/// layout, or the errors of [`LayoutConfig::to_layout`].
pub fn parse_layout_json(json: &str, base_dir: &Path) -> Result<ReadLayout, ParseError> {
    let config: LayoutConfig =
        serde_json::from_str(json).map_err(|e| ParseError::InvalidLayout(e.to_string()))?;
    config.to_layout(base_dir)
}

/// Load a layout file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_layout_json`].
pub fn load_layout_file(path: &Path) -> Result<ReadLayout, ParseError> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_layout_json(&read_text(path)?, base_dir)
}
