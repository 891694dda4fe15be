//! Centralized validation and helper functions.

/// Longest literal the bit-parallel matcher can hold in one machine word
/// (one bit per pattern position plus the empty-prefix bit).
pub const MAX_PATTERN_LENGTH: usize = 63;

/// Maximum number of barcodes accepted from a single table (DOS protection)
pub const MAX_BARCODES: usize = 1_000_000;

/// Characters that may appear in a barcode or linker sequence
const NUCLEOTIDES: &[u8] = b"ACGTN";

/// Check whether a string is a non-empty nucleotide sequence (ACGTN, any case).
///
/// # Examples
///
/// ```
/// use barcode_solver::utils::validation::is_valid_sequence;
///
/// assert!(is_valid_sequence("ACGTN"));
/// assert!(is_valid_sequence("acgt"));
/// assert!(!is_valid_sequence("ACGU"));
/// assert!(!is_valid_sequence(""));
/// ```
#[must_use]
pub fn is_valid_sequence(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| NUCLEOTIDES.contains(&b.to_ascii_uppercase()))
}

/// Normalize a nucleotide sequence to uppercase.
/// Returns None if the input is not a valid sequence.
#[must_use]
pub fn normalize_sequence(s: &str) -> Option<String> {
    if is_valid_sequence(s) {
        Some(s.to_ascii_uppercase())
    } else {
        None
    }
}

/// Check that an identifier can be written into a signature string.
///
/// Brackets delimit identifiers in the encoded form, so they cannot appear
/// inside one.
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && !s.contains(['[', ']']) && !s.chars().any(char::is_whitespace)
}

/// First whitespace-delimited field of a read name, with any `/1` or `/2`
/// mate suffix removed.
///
/// ```
/// use barcode_solver::utils::validation::fragment_id_from_read_name;
///
/// assert_eq!(fragment_id_from_read_name("read7/1 extra"), "read7");
/// assert_eq!(fragment_id_from_read_name("read7 1:N:0:ACGT"), "read7");
/// ```
#[must_use]
pub fn fragment_id_from_read_name(name: &str) -> &str {
    let first = name.split_whitespace().next().unwrap_or_default();
    first
        .strip_suffix("/1")
        .or_else(|| first.strip_suffix("/2"))
        .unwrap_or(first)
}

/// Check if adding another barcode would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new barcode.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_barcode_limit(count: usize) -> Option<String> {
    if count >= MAX_BARCODES {
        Some(format!(
            "Too many barcodes: adding another would exceed maximum of {MAX_BARCODES}"
        ))
    } else {
        None
    }
}
