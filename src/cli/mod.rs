//! Command-line interface for barcode-solver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **identify**: Identify barcode signatures in FASTQ reads and group fragments
//! - **group**: Group fragments from a table of precomputed signatures
//! - **layout**: Load a layout file and describe it
//!
//! ## Usage
//!
//! ```text
//! # Identify barcodes with a layout file for read 2
//! barcode-solver identify --read1 r1.fq.gz --read2 r2.fq.gz --layout2 read2.json
//!
//! # Use a ligation design preset instead of a layout file
//! barcode-solver identify --read2 r2.fq.gz --design paired_design_april_2016_5_barcode \
//!     --y-barcodes y.txt --even-barcodes even.txt --odd-barcodes odd.txt
//!
//! # TSV output for downstream grouping
//! barcode-solver identify --read2 r2.fq --layout2 read2.json --format tsv > sigs.tsv
//! barcode-solver group sigs.tsv
//! ```

use clap::{Parser, Subcommand};

pub mod group;
pub mod identify;
pub mod layout;

#[derive(Parser)]
#[command(name = "barcode-solver")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Identify combinatorial barcodes in sequencing reads")]
#[command(
    long_about = "barcode-solver finds the barcodes ligated onto each sequencing fragment.\n\nReads are matched against a declared read layout of fixed sequences, barcodes, barcode sets and switches, tolerating a per-element number of errors. Fragments with identical ordered barcodes are grouped together."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify barcodes in FASTQ reads
    Identify(identify::IdentifyArgs),

    /// Group fragments by signature from a signature table
    Group(group::GroupArgs),

    /// Describe a read layout file
    Layout(layout::LayoutArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Signature column value: the encoding, or `.` when there are no barcodes
pub(crate) fn signature_cell(signature: &crate::core::signature::BarcodeSequence) -> String {
    signature.encode().unwrap_or_else(|| ".".to_string())
}
