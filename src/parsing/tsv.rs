use std::path::Path;

use crate::core::signature::BarcodeSequence;
use crate::parsing::{read_text, ParseError};

/// One row of a signature table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRow {
    pub fragment_id: String,
    pub signature: BarcodeSequence,
}

/// Parse a signature table file with columns: `fragment_id`, signature
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_signature_file(path: &Path) -> Result<Vec<SignatureRow>, ParseError> {
    parse_signature_text(&read_text(path)?)
}

/// Parse tab-separated signature rows.
///
/// An optional header line starting with `fragment_id` or `id` is skipped, as
/// are comments. A missing, empty or `.` signature column is the empty
/// signature. Columns after the second are ignored.
///
/// # Errors
///
/// Returns `ParseError::Signature` if a signature is malformed.
pub fn parse_signature_text(text: &str) -> Result<Vec<SignatureRow>, ParseError> {
    let mut rows = Vec::new();
    let mut first_data_line = true;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        // Check if first non-empty/non-comment line is a header
        if first_data_line {
            first_data_line = false;
            let first = fields[0].to_lowercase();
            if first == "fragment_id" || first == "id" {
                continue;
            }
        }

        let signature = match fields.get(1) {
            None | Some(&("" | ".")) => BarcodeSequence::empty(),
            Some(encoded) => BarcodeSequence::decode(encoded)?,
        };

        rows.push(SignatureRow {
            fragment_id: fields[0].to_string(),
            signature,
        });
    }

    Ok(rows)
}
