//! Parsers for the files barcode identification consumes.
//!
//! This module provides parsers for:
//!
//! - **Barcode tables**: two columns (`barcode_id  barcode_sequence`) or a
//!   one-column list of sequences
//! - **Layout files**: JSON descriptions of read layouts
//! - **FASTQ files**: single or paired reads, plain or gzip compressed
//! - **Signature tables**: fragment ID and encoded signature per line
//!
//! ## Example
//!
//! ```rust,no_run
//! use barcode_solver::parsing::barcodes::barcodes_from_table;
//! use std::path::Path;
//!
//! let odd = barcodes_from_table(Path::new("odd_barcodes.txt"), 1).unwrap();
//! println!("{} odd barcodes", odd.len());
//! ```
//!
//! Every path may end in `.gz`.

pub mod barcodes;
pub mod fastq;
pub mod layout;
pub mod tsv;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::core::element::ElementError;
use crate::core::layout::LayoutError;
use crate::core::signature::SignatureError;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid layout file: {0}")]
    InvalidLayout(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error(transparent)]
    Element(#[from] ElementError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Too many barcodes: {0} exceeds maximum allowed (1000000)")]
    TooManyBarcodes(usize),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a file for buffered reading, decompressing gzip by extension
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead + Send>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a whole text file, decompressing gzip by extension
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or is not UTF-8.
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    let mut content = String::new();
    open_reader(path)?.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("reads.fq.gz")));
        assert!(is_gzipped(Path::new("READS.FQ.GZ")));
        assert!(!is_gzipped(Path::new("reads.fq")));
    }

    #[test]
    fn test_read_text_plain_and_gz() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("a.txt");
        std::fs::write(&plain, "A1\tACGT\n").unwrap();
        assert_eq!(read_text(&plain).unwrap(), "A1\tACGT\n");

        let gz = dir.path().join("a.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"A1\tACGT\n").unwrap();
        encoder.finish().unwrap();
        assert_eq!(read_text(&gz).unwrap(), "A1\tACGT\n");
    }
}
