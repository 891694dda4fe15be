//! Approximate matching of read layouts against raw reads.
//!
//! - [`LayoutMatcher`]: walks a layout along a read and records what matched
//! - [`BitapPattern`]: anchored bounded-edit-distance matching of one literal
//! - [`identify_barcodes`]: signature and switch extraction for a read pair
//! - [`match_batch`]: parallel identification and grouping of many fragments
//!
//! ## Matching Algorithm
//!
//! Elements are matched left to right at a cursor into the read:
//!
//! 1. **Anchored alignment**: every literal variant of the element is aligned
//!    against the read starting exactly at the cursor, allowing up to the
//!    element's tolerance in substitutions, insertions and deletions
//! 2. **Variant selection**: the variant with the fewest edits wins; ties go
//!    to the variant declared first
//! 3. **Repeats**: a repeatable element is matched again and again until its
//!    stop signal is seen (and consumed) or neither matches
//! 4. **Failure**: a mandatory element that does not align ends the match
//!    with no result for that layout
//!
//! ## Example
//!
//! ```rust
//! use barcode_solver::core::element::{Barcode, FixedSequence};
//! use barcode_solver::core::layout::ReadLayout;
//! use barcode_solver::matching::extract_signature;
//!
//! let layout = ReadLayout::new(
//!     vec![
//!         Barcode::new("Y1", "ACGTACGT", 1).unwrap().into(),
//!         FixedSequence::new("linker", "TTTTGGGG", 1).unwrap().into(),
//!     ],
//!     30,
//! )
//! .unwrap();
//!
//! let found = layout.match_read(b"ACGTACCTTTTTGGGGAAAA").unwrap().unwrap();
//! assert_eq!(extract_signature(&found).to_string(), "[Y1]ACGTACGT");
//! ```

pub mod batch;
pub mod bitap;
pub mod engine;
pub mod extract;

pub use batch::{match_batch, ReadPair};
pub use bitap::{BitapPattern, PrefixHit};
pub use engine::{LayoutMatch, LayoutMatcher, MatchedElement, MatchingConfig};
pub use extract::{extract_signature, extract_switches, identify_barcodes, FragmentBarcodes};
