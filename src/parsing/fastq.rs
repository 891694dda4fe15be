//! FASTQ reading for barcode identification, using noodles.
//!
//! Supports plain and gzip compressed files, single-end or paired.

use std::io::BufRead;
use std::path::Path;

use noodles::fastq;
use tracing::warn;

use crate::matching::batch::ReadPair;
use crate::parsing::{open_reader, ParseError};
use crate::utils::validation::fragment_id_from_read_name;

/// Name and bases of one FASTQ record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRead {
    pub name: String,
    pub sequence: String,
}

/// Records of one FASTQ file
pub struct FastqReads {
    reader: fastq::io::Reader<Box<dyn BufRead + Send>>,
    record: fastq::Record,
}

impl FastqReads {
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        Ok(Self::from_reader(open_reader(path)?))
    }

    pub fn from_reader(inner: Box<dyn BufRead + Send>) -> Self {
        Self {
            reader: fastq::io::Reader::new(inner),
            record: fastq::Record::default(),
        }
    }
}

impl Iterator for FastqReads {
    type Item = Result<FastqRead, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(0) => None,
            Ok(_) => Some(Ok(FastqRead {
                name: String::from_utf8_lossy(self.record.name()).to_string(),
                sequence: String::from_utf8_lossy(self.record.sequence()).to_string(),
            })),
            Err(e) => Some(Err(ParseError::Noodles(format!(
                "Failed to parse FASTQ record: {e}"
            )))),
        }
    }
}

/// Read 1 and read 2 files walked in step
///
/// Pairs whose fragment identifiers disagree are skipped with a warning.
pub struct PairedReads {
    read1: Option<FastqReads>,
    read2: Option<FastqReads>,
}

impl PairedReads {
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if neither file is given, or
    /// `ParseError::Io` if a file cannot be opened.
    pub fn open(read1: Option<&Path>, read2: Option<&Path>) -> Result<Self, ParseError> {
        if read1.is_none() && read2.is_none() {
            return Err(ParseError::InvalidFormat(
                "At least one of read 1 or read 2 is required".to_string(),
            ));
        }
        Ok(Self::new(
            read1.map(FastqReads::open).transpose()?,
            read2.map(FastqReads::open).transpose()?,
        ))
    }

    pub fn new(read1: Option<FastqReads>, read2: Option<FastqReads>) -> Self {
        Self { read1, read2 }
    }
}

fn next_from(reads: &mut Option<FastqReads>) -> Result<Option<FastqRead>, ParseError> {
    reads.as_mut().and_then(Iterator::next).transpose()
}

impl Iterator for PairedReads {
    type Item = Result<ReadPair, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (r1, r2) = match (next_from(&mut self.read1), next_from(&mut self.read2)) {
                (Ok(r1), Ok(r2)) => (r1, r2),
                (Err(e), _) | (_, Err(e)) => return Some(Err(e)),
            };

            let pair = match (r1, r2) {
                (None, None) => return None,
                (Some(r1), None) if self.read2.is_none() => {
                    ReadPair::new(r1.name, Some(r1.sequence), None)
                }
                (None, Some(r2)) if self.read1.is_none() => {
                    ReadPair::new(r2.name, None, Some(r2.sequence))
                }
                (Some(r1), Some(r2)) => {
                    if fragment_id_from_read_name(&r1.name) != fragment_id_from_read_name(&r2.name)
                    {
                        warn!(
                            "Skipping read pair with mismatched names: '{}' and '{}'",
                            r1.name, r2.name
                        );
                        continue;
                    }
                    ReadPair::new(r1.name, Some(r1.sequence), Some(r2.sequence))
                }
                _ => {
                    return Some(Err(ParseError::InvalidFormat(
                        "Read 1 and read 2 files have different numbers of records".to_string(),
                    )))
                }
            };
            return Some(Ok(pair));
        }
    }
}
