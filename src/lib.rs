//! # barcode-solver
//!
//! A library for identifying combinatorial split-pool barcodes in sequencing reads.
//!
//! Split-pool ligation assays tag every molecule in a complex with the same
//! ordered series of barcodes. Each read carries some of those barcodes at
//! known positions, interleaved with fixed adapter sequences, and sequencing
//! errors mean no position can be trusted to be exact.
//!
//! `barcode-solver` matches each read against a declared read layout,
//! tolerating a per-element number of substitutions, insertions and deletions,
//! and extracts the ordered barcode signature of every fragment. Fragments
//! with identical signatures are grouped together.
//!
//! ## Features
//!
//! - **Read layouts**: Fixed sequences, barcodes, barcode sets, equivalence classes and switches
//! - **Error tolerant matching**: Bounded edit distance per element, anchored to the read position
//! - **Repeated barcodes**: Runs of the same element terminated by a stop signal
//! - **Signatures**: Canonical `[id]sequence` encoding, usable as a grouping key
//! - **Concurrent grouping**: One shared group per signature across worker threads
//! - **Fragment store**: Lookups of fragments by the barcodes they carry
//!
//! ## Example
//!
//! ```rust
//! use barcode_solver::{Barcode, BarcodeSet, FixedSequence, ReadLayout};
//!
//! let odd = BarcodeSet::new(
//!     "odd",
//!     vec![
//!         Barcode::new("O1", "ACGTACGT", 1).unwrap(),
//!         Barcode::new("O2", "TTGGCCAA", 1).unwrap(),
//!     ],
//! )
//! .unwrap();
//! let linker = FixedSequence::new("linker", "GATC", 0).unwrap();
//! let layout = ReadLayout::new(vec![odd.into(), linker.into()], 150).unwrap();
//!
//! // One substitution in the barcode is tolerated
//! let hit = layout.match_read(b"TTGGCAAAGATCNNNN").unwrap().unwrap();
//! let signature = barcode_solver::matching::extract_signature(&hit);
//! assert_eq!(signature.to_string(), "[O2]TTGGCCAA");
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Fragment grouping registry and fragment store
//! - [`core`]: Core data types for elements, layouts, signatures and fragments
//! - [`matching`]: Approximate matching of reads against layouts
//! - [`parsing`]: Parsers for FASTQ, barcode tables, layout files and signature tables
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::registry::FragmentGroupRegistry;
pub use catalog::store::{FragmentStore, InMemoryFragmentStore};
pub use core::design::LigationDesign;
pub use core::element::{
    Barcode, BarcodeEquivalenceClass, BarcodeSet, Element, EquivalenceClassSet, FixedSequence,
    Switch,
};
pub use core::fragment::{BarcodedFragment, FragmentLayouts, FragmentRecord};
pub use core::group::FragmentGroup;
pub use core::layout::{LayoutError, ReadLayout};
pub use core::signature::{BarcodeSequence, BarcodeSequenceBuilder, IdentifiedBarcode};
pub use core::types::*;
pub use matching::engine::{LayoutMatch, LayoutMatcher, MatchingConfig};
