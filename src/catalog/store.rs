use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::join::MergeJoin;
use crate::core::fragment::{BarcodedFragment, FragmentRecord};
use crate::core::types::GenomicLocation;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read or write fragment store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse fragment store: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fragment '{0}' is already stored")]
    Duplicate(String),
}

/// Store format version for compatibility checking
pub const STORE_VERSION: &str = "1.0.0";

/// Serializable store format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    pub version: String,
    pub created_at: String,
    pub fragments: Vec<FragmentRecord>,
}

/// Keyed storage of fragments by mapping and by signature
pub trait FragmentStore {
    /// Insert or replace a fragment, keyed by its info string
    ///
    /// # Errors
    ///
    /// Implementations backed by external storage may fail on write.
    fn put(&mut self, fragment: &BarcodedFragment) -> Result<(), StoreError>;

    /// Fragments whose encoded signature equals `signature`, ordered by
    /// location then identifier
    fn fragments_with_barcodes<'a>(
        &'a self,
        signature: &str,
    ) -> Box<dyn Iterator<Item = &'a FragmentRecord> + 'a>;
}

/// Secondary index entry: sorts like the fragment it points at
type SignatureEntry = (Option<GenomicLocation>, String, String);

/// A fragment store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryFragmentStore {
    /// Index: info string -> record
    primary: BTreeMap<String, FragmentRecord>,

    /// Index: signature key -> (location, id, info string)
    by_signature: HashMap<String, BTreeSet<SignatureEntry>>,
}

impl InMemoryFragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_record(&mut self, record: FragmentRecord) {
        let key = record.info_string();
        if let Some(old) = self.primary.remove(&key) {
            self.unindex(&old, &key);
        }
        self.by_signature
            .entry(record.barcodes.key().to_string())
            .or_default()
            .insert((record.location.clone(), record.id.clone(), key.clone()));
        self.primary.insert(key, record);
    }

    fn unindex(&mut self, record: &FragmentRecord, key: &str) {
        let signature = record.barcodes.key();
        if let Some(entries) = self.by_signature.get_mut(signature) {
            entries.remove(&(record.location.clone(), record.id.clone(), key.to_string()));
            if entries.is_empty() {
                self.by_signature.remove(signature);
            }
        }
    }

    /// Insert a fragment that must not already be stored
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if a fragment with the same info string
    /// is present.
    pub fn insert_new(&mut self, fragment: &BarcodedFragment) -> Result<(), StoreError> {
        let key = fragment.info_string();
        if self.primary.contains_key(&key) {
            return Err(StoreError::Duplicate(key));
        }
        self.insert_record(fragment.to_record());
        Ok(())
    }

    /// Look up a fragment by info string
    pub fn get(&self, info_string: &str) -> Option<&FragmentRecord> {
        self.primary.get(info_string)
    }

    /// Fragments carrying any of `signatures`, as one stream ordered by
    /// location then identifier, with no fragment repeated
    pub fn fragments_with_any_barcodes<'a>(
        &'a self,
        signatures: &[&str],
    ) -> impl Iterator<Item = &'a FragmentRecord> + 'a {
        let sources: Vec<_> = signatures
            .iter()
            .filter_map(|s| self.by_signature.get(*s))
            .map(|entries| entries.iter())
            .collect();
        MergeJoin::new(sources).filter_map(move |(_, _, key)| self.primary.get(key))
    }

    /// Distinct signature keys with their fragment counts, sorted
    pub fn signature_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<_> = self
            .by_signature
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        counts.sort_unstable();
        counts
    }

    /// All records in info-string order
    pub fn records(&self) -> impl Iterator<Item = &FragmentRecord> {
        self.primary.values()
    }

    /// Number of stored fragments
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Parse a store from JSON
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Json` if the JSON does not describe a store.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let data: StoreData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != STORE_VERSION {
            warn!(
                "Fragment store version mismatch (expected {}, found {})",
                STORE_VERSION, data.version
            );
        }

        let mut store = Self::new();
        for record in data.fragments {
            store.insert_record(record);
        }
        Ok(store)
    }

    /// Export the store to JSON
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let data = StoreData {
            version: STORE_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            fragments: self.primary.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Load a store from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        info!("Loaded {} fragments from {}", store.len(), path.display());
        Ok(store)
    }

    /// Write the store to a JSON file
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, self.to_json()?)?;
        info!("Saved {} fragments to {}", self.len(), path.display());
        Ok(())
    }
}

impl FragmentStore for InMemoryFragmentStore {
    fn put(&mut self, fragment: &BarcodedFragment) -> Result<(), StoreError> {
        self.insert_record(fragment.to_record());
        Ok(())
    }

    fn fragments_with_barcodes<'a>(
        &'a self,
        signature: &str,
    ) -> Box<dyn Iterator<Item = &'a FragmentRecord> + 'a> {
        match self.by_signature.get(signature) {
            Some(entries) => Box::new(
                entries
                    .iter()
                    .filter_map(move |(_, _, key)| self.primary.get(key)),
            ),
            None => Box::new(std::iter::empty()),
        }
    }
}
