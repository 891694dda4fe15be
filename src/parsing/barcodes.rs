use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::core::element::Barcode;
use crate::parsing::{read_text, ParseError};
use crate::utils::validation::check_barcode_limit;

/// Line shape every barcode table row must have
pub const BARCODE_TABLE_FORMAT: &str = "barcode_id  barcode_sequence";

fn push_barcode(barcodes: &mut BTreeSet<Barcode>, barcode: Barcode) -> Result<(), ParseError> {
    // Check barcode limit for DOS protection
    if check_barcode_limit(barcodes.len()).is_some() {
        return Err(ParseError::TooManyBarcodes(barcodes.len()));
    }
    barcodes.insert(barcode);
    Ok(())
}

/// Parse a barcode table: one `id sequence` pair per whitespace-delimited line.
///
/// Blank lines are skipped. The result is de-duplicated and sorted by
/// sequence, then identifier.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the required line shape if a
/// line does not have exactly two fields, or `ParseError::Element` if a
/// barcode is invalid.
pub fn parse_barcode_table(text: &str, max_mismatches: u32) -> Result<Vec<Barcode>, ParseError> {
    let mut barcodes = BTreeSet::new();

    for (i, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [id, sequence] => {
                push_barcode(&mut barcodes, Barcode::new(*id, sequence, max_mismatches)?)?;
            }
            _ => {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {} of barcode table has {} fields. Format: {BARCODE_TABLE_FORMAT}",
                    i + 1,
                    fields.len()
                )));
            }
        }
    }

    Ok(barcodes.into_iter().collect())
}

/// Build barcodes without identifiers; each sequence is its own ID
///
/// # Errors
///
/// Returns `ParseError::Element` if a sequence is invalid.
pub fn barcodes_from_sequences<'a>(
    sequences: impl IntoIterator<Item = &'a str>,
    max_mismatches: u32,
) -> Result<Vec<Barcode>, ParseError> {
    let mut barcodes = BTreeSet::new();
    for sequence in sequences {
        push_barcode(&mut barcodes, Barcode::from_sequence(sequence, max_mismatches)?)?;
    }
    Ok(barcodes.into_iter().collect())
}

/// Parse a list with one barcode sequence per line
///
/// # Errors
///
/// Returns `ParseError::Element` if a sequence is invalid.
pub fn parse_barcode_list(text: &str, max_mismatches: u32) -> Result<Vec<Barcode>, ParseError> {
    barcodes_from_sequences(
        text.lines().map(str::trim).filter(|l| !l.is_empty()),
        max_mismatches,
    )
}

/// Load a two-column barcode table file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_barcode_table`].
pub fn barcodes_from_table(path: &Path, max_mismatches: u32) -> Result<Vec<Barcode>, ParseError> {
    let barcodes = parse_barcode_table(&read_text(path)?, max_mismatches)?;
    info!("Loaded {} barcodes from {}", barcodes.len(), path.display());
    Ok(barcodes)
}

/// Load a one-column barcode list file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_barcode_list`].
pub fn barcodes_from_list(path: &Path, max_mismatches: u32) -> Result<Vec<Barcode>, ParseError> {
    let barcodes = parse_barcode_list(&read_text(path)?, max_mismatches)?;
    info!("Loaded {} barcodes from {}", barcodes.len(), path.display());
    Ok(barcodes)
}
