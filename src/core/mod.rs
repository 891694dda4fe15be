//! Core data types for barcode identification.
//!
//! - [`element::Element`]: one matchable unit of a read (fixed sequence,
//!   barcode, barcode set, equivalence class, switch)
//! - [`layout::ReadLayout`]: the ordered elements expected in one read
//! - [`signature::BarcodeSequence`]: the ordered barcodes found in a fragment
//! - [`fragment::BarcodedFragment`]: a fragment with its reads, location and signature
//! - [`group::FragmentGroup`]: fragments sharing one signature
//! - [`design::LigationDesign`]: preset read-2 layouts
//!
//! ## Signature encoding
//!
//! | Barcodes | Encoding |
//! |----------|----------|
//! | `(Y4, ACGT)`, `(E2, TTGA)` | `[Y4]ACGT[E2]TTGA` |
//! | none | absent |
//!
//! Order is part of a signature's identity.

pub mod design;
pub mod element;
pub mod fragment;
pub mod group;
pub mod layout;
pub mod signature;
pub mod types;
