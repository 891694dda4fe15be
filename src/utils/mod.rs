//! Shared helpers for validating sequences, identifiers, and read names.

pub mod validation;
