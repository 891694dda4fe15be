use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::element::{BarcodeSet, Element};
use crate::core::layout::{LayoutError, ReadLayout};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown ligation design '{name}'. Ligation design names: {valid}")]
pub struct UnknownDesign {
    pub name: String,
    pub valid: String,
}

/// Named read designs for split-pool ligation libraries
///
/// Both designs expect read 1 to have had its RPM/DPM tag removed upstream,
/// so only read 2 carries a barcoded layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LigationDesign {
    /// Read 2 barcodes: Y, even, odd, even, odd
    #[serde(rename = "paired_design_april_2016_5_barcode")]
    PairedApril2016FiveBarcode,
    /// Read 2 barcodes: Y, even, odd, even
    #[serde(rename = "paired_design_april_2016_4_barcode")]
    PairedApril2016FourBarcode,
}

impl LigationDesign {
    pub const ALL: [Self; 2] = [
        Self::PairedApril2016FiveBarcode,
        Self::PairedApril2016FourBarcode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PairedApril2016FiveBarcode => "paired_design_april_2016_5_barcode",
            Self::PairedApril2016FourBarcode => "paired_design_april_2016_4_barcode",
        }
    }

    /// Comma-separated list of every design name
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Number of barcodes the design ligates onto read 2
    pub fn num_barcodes(self) -> usize {
        match self {
            Self::PairedApril2016FiveBarcode => 5,
            Self::PairedApril2016FourBarcode => 4,
        }
    }

    /// Build the read-2 layout from the design's barcode pools
    ///
    /// # Errors
    ///
    /// Never fails for the current designs; the result type matches
    /// [`ReadLayout::new`].
    pub fn read2_layout(
        self,
        y: BarcodeSet,
        even: BarcodeSet,
        odd: BarcodeSet,
        read_length: usize,
    ) -> Result<ReadLayout, LayoutError> {
        let mut elements: Vec<Element> = vec![
            y.into(),
            even.clone().into(),
            odd.clone().into(),
            even.into(),
        ];
        if self == Self::PairedApril2016FiveBarcode {
            elements.push(odd.into());
        }
        ReadLayout::new(elements, read_length)
    }
}

impl fmt::Display for LigationDesign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LigationDesign {
    type Err = UnknownDesign;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDesign {
                name: s.to_string(),
                valid: Self::names(),
            })
    }
}
