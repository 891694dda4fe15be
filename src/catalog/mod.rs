//! Fragment groups and fragment storage.
//!
//! - [`registry::FragmentGroupRegistry`]: concurrent signature -> group lookup,
//!   one group per distinct signature
//! - [`store::FragmentStore`]: keyed fragment storage, with an in-memory
//!   implementation indexed by mapping and by signature
//! - [`join::MergeJoin`]: merges sorted lookups into one ordered stream
//!
//! ## Example
//!
//! ```rust
//! use barcode_solver::catalog::registry::FragmentGroupRegistry;
//! use barcode_solver::core::signature::BarcodeSequence;
//!
//! let registry = FragmentGroupRegistry::new();
//! let signature = BarcodeSequence::decode("[Y1]ACGT[O2]GGTA").unwrap();
//!
//! registry.assign(&signature, "read1");
//! let group = registry.assign(&signature, "read2");
//! assert_eq!(group.len(), 2);
//! ```
//!
//! ## Stored fragments
//!
//! The in-memory store exports to JSON and loads back:
//!
//! ```rust,no_run
//! use barcode_solver::catalog::store::InMemoryFragmentStore;
//! use std::path::Path;
//!
//! let store = InMemoryFragmentStore::load(Path::new("fragments.json")).unwrap();
//! for record in store.fragments_with_any_barcodes(&["[Y1]ACGT", "[Y2]TTGA"]) {
//!     println!("{}", record.info_string());
//! }
//! ```

pub mod join;
pub mod registry;
pub mod store;
