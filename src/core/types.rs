use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid genomic location '{0}': expected chrom:start-end")]
pub struct LocationParseError(pub String);

/// Mapped position of a fragment
///
/// Locations are opaque to matching; they order fragments by chromosome,
/// then start, then end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomicLocation {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicLocation {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for GenomicLocation {
    type Err = LocationParseError;

    /// Parse `chrom:start-end`; the chromosome may itself contain colons
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || LocationParseError(s.to_string());
        let (chrom, range) = s.rsplit_once(':').ok_or_else(err)?;
        let (start, end) = range.split_once('-').ok_or_else(err)?;
        if chrom.is_empty() {
            return Err(err());
        }
        Ok(Self::new(
            chrom,
            start.parse().map_err(|_| err())?,
            end.parse().map_err(|_| err())?,
        ))
    }
}
