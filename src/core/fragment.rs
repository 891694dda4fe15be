use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::group::FragmentGroup;
use crate::core::layout::{LayoutError, ReadLayout};
use crate::core::signature::BarcodeSequence;
use crate::core::types::GenomicLocation;
use crate::matching::engine::MatchingConfig;
use crate::matching::extract::{identify_barcodes, SwitchValues};
use crate::utils::validation::fragment_id_from_read_name;

/// Expected layouts for the two reads of a fragment
#[derive(Debug, Clone, Default)]
pub struct FragmentLayouts {
    pub read1: Option<Arc<ReadLayout>>,
    pub read2: Option<Arc<ReadLayout>>,
}

impl FragmentLayouts {
    pub fn new(read1: Option<ReadLayout>, read2: Option<ReadLayout>) -> Self {
        Self {
            read1: read1.map(Arc::new),
            read2: read2.map(Arc::new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read1.is_none() && self.read2.is_none()
    }
}

fn info_string(id: &str, location: Option<&GenomicLocation>) -> String {
    match location {
        Some(location) => format!("{id}:{location}"),
        None => id.to_string(),
    }
}

fn side<'a>(
    layout: &'a Option<Arc<ReadLayout>>,
    read: Option<&'a str>,
) -> Option<(&'a ReadLayout, &'a [u8])> {
    layout.as_deref().zip(read.map(str::as_bytes))
}

/// A sequencing fragment with its barcode signature
///
/// Fragments order by mapped location (unmapped first), then by identifier.
#[derive(Debug, Clone)]
pub struct BarcodedFragment {
    id: String,
    read1: Option<String>,
    read2: Option<String>,
    unpaired: Option<String>,
    layouts: FragmentLayouts,
    location: Option<GenomicLocation>,
    barcodes: BarcodeSequence,
    switches: SwitchValues,
    group: Option<Arc<FragmentGroup>>,
}

impl BarcodedFragment {
    /// Identify barcodes in a fragment's reads.
    ///
    /// The identifier is taken from the first field of `read_name`. A side
    /// with no sequence or no layout contributes no barcodes.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` if a layout cannot fit in its declared read length.
    pub fn from_reads(
        read_name: &str,
        read1: Option<&str>,
        read2: Option<&str>,
        layouts: &FragmentLayouts,
        config: &MatchingConfig,
    ) -> Result<Self, LayoutError> {
        let found = identify_barcodes(
            side(&layouts.read1, read1),
            side(&layouts.read2, read2),
            config,
        )?;

        Ok(Self {
            id: fragment_id_from_read_name(read_name).to_string(),
            read1: read1.map(str::to_string),
            read2: read2.map(str::to_string),
            unpaired: None,
            layouts: layouts.clone(),
            location: None,
            barcodes: found.signature,
            switches: found.switches,
            group: None,
        })
    }

    /// A fragment whose signature is already known, e.g. read back from a
    /// tagged alignment record
    pub fn with_signature(
        read_name: &str,
        barcodes: BarcodeSequence,
        location: Option<GenomicLocation>,
    ) -> Self {
        Self {
            id: fragment_id_from_read_name(read_name).to_string(),
            read1: None,
            read2: None,
            unpaired: None,
            layouts: FragmentLayouts::default(),
            location,
            barcodes,
            switches: SwitchValues::new(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_unpaired(mut self, sequence: impl Into<String>) -> Self {
        self.unpaired = Some(sequence.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn read1(&self) -> Option<&str> {
        self.read1.as_deref()
    }

    pub fn read2(&self) -> Option<&str> {
        self.read2.as_deref()
    }

    pub fn unpaired(&self) -> Option<&str> {
        self.unpaired.as_deref()
    }

    pub fn layouts(&self) -> &FragmentLayouts {
        &self.layouts
    }

    pub fn location(&self) -> Option<&GenomicLocation> {
        self.location.as_ref()
    }

    pub fn set_mapped_location(&mut self, location: GenomicLocation) {
        self.location = Some(location);
    }

    pub fn barcodes(&self) -> &BarcodeSequence {
        &self.barcodes
    }

    pub fn num_barcodes(&self) -> usize {
        self.barcodes.num_barcodes()
    }

    /// Switch options observed in the reads, by switch
    pub fn switches(&self) -> &SwitchValues {
        &self.switches
    }

    pub fn group(&self) -> Option<&Arc<FragmentGroup>> {
        self.group.as_ref()
    }

    pub(crate) fn set_group(&mut self, group: Arc<FragmentGroup>) {
        self.group = Some(group);
    }

    /// Unique key for one mapping of this fragment: `id:chrom:start-end`,
    /// or just the identifier while unmapped
    pub fn info_string(&self) -> String {
        info_string(&self.id, self.location.as_ref())
    }

    /// Whitespace-free description of the fragment's location and signature
    pub fn full_info_string(&self) -> String {
        let location = self
            .location
            .as_ref()
            .map_or_else(|| "unmapped".to_string(), ToString::to_string);
        format!("{}:{}:{}", self.id, location, self.barcodes)
    }

    /// Storable form of this fragment
    pub fn to_record(&self) -> FragmentRecord {
        FragmentRecord {
            id: self.id.clone(),
            read1: self.read1.clone(),
            read2: self.read2.clone(),
            unpaired: self.unpaired.clone(),
            location: self.location.clone(),
            barcodes: self.barcodes.clone(),
        }
    }
}

impl From<FragmentRecord> for BarcodedFragment {
    fn from(record: FragmentRecord) -> Self {
        Self {
            id: record.id,
            read1: record.read1,
            read2: record.read2,
            unpaired: record.unpaired,
            layouts: FragmentLayouts::default(),
            location: record.location,
            barcodes: record.barcodes,
            switches: SwitchValues::new(),
            group: None,
        }
    }
}

impl PartialEq for BarcodedFragment {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.id == other.id
    }
}

impl Eq for BarcodedFragment {}

impl PartialOrd for BarcodedFragment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BarcodedFragment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location
            .cmp(&other.location)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Serializable fragment as held by a fragment store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpaired: Option<String>,
    #[serde(default)]
    pub location: Option<GenomicLocation>,
    /// Encoded signature; `null` when the fragment has no barcodes
    #[serde(default)]
    pub barcodes: BarcodeSequence,
}

impl FragmentRecord {
    /// Primary key, matching [`BarcodedFragment::info_string`]
    pub fn info_string(&self) -> String {
        info_string(&self.id, self.location.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::element::{Barcode, FixedSequence};

    fn layouts() -> FragmentLayouts {
        let read2 = ReadLayout::new(
            vec![
                Barcode::new("Y1", "ACGTACGT", 1).unwrap().into(),
                FixedSequence::new("linker", "TTTTGGGG", 1).unwrap().into(),
                Barcode::new("O3", "CCAACCAA", 1).unwrap().into(),
            ],
            40,
        )
        .unwrap();
        FragmentLayouts::new(None, Some(read2))
    }

    #[test]
    fn test_from_reads() {
        let fragment = BarcodedFragment::from_reads(
            "M00123:5:1101 1:N:0",
            Some("GATTACA"),
            Some("ACGTACGTTTTTGGGGCCAACCAAGATC"),
            &layouts(),
            &MatchingConfig::default(),
        )
        .unwrap();

        assert_eq!(fragment.id(), "M00123:5:1101");
        assert_eq!(fragment.barcodes().to_string(), "[Y1]ACGTACGT[O3]CCAACCAA");
        assert_eq!(fragment.num_barcodes(), 2);
        assert_eq!(fragment.read1(), Some("GATTACA"));
        assert!(fragment.group().is_none());
        assert_eq!(fragment.info_string(), "M00123:5:1101");
    }

    #[test]
    fn test_info_strings() {
        let mut fragment = BarcodedFragment::with_signature(
            "frag1/1",
            BarcodeSequence::decode("[a]AC").unwrap(),
            None,
        );
        assert_eq!(fragment.full_info_string(), "frag1:unmapped:[a]AC");
        fragment.set_mapped_location(GenomicLocation::new("chr2", 10, 60));
        assert_eq!(fragment.info_string(), "frag1:chr2:10-60");
        assert_eq!(fragment.full_info_string(), "frag1:chr2:10-60:[a]AC");
        assert_eq!(fragment.to_record().info_string(), fragment.info_string());
    }

    #[test]
    fn test_order_by_location_then_id() {
        let sig = BarcodeSequence::empty;
        let a = BarcodedFragment::with_signature("b", sig(), Some(GenomicLocation::new("chr1", 5, 9)));
        let b = BarcodedFragment::with_signature("a", sig(), Some(GenomicLocation::new("chr1", 7, 9)));
        let c = BarcodedFragment::with_signature("a", sig(), Some(GenomicLocation::new("chr1", 5, 9)));
        let unmapped = BarcodedFragment::with_signature("z", sig(), None);

        let mut all = vec![b.clone(), a.clone(), unmapped.clone(), c.clone()];
        all.sort();
        let ids: Vec<&str> = all.iter().map(BarcodedFragment::id).collect();
        assert_eq!(ids, vec!["z", "a", "b", "a"]);
        assert_eq!(all[1], c);
    }

    #[test]
    fn test_record_round_trip() {
        let fragment = BarcodedFragment::with_signature(
            "frag9",
            BarcodeSequence::decode("[a]AC[b]GG").unwrap(),
            Some(GenomicLocation::new("chrX", 1, 2)),
        )
        .with_unpaired("ACGT");
        let json = serde_json::to_string(&fragment.to_record()).unwrap();
        let record: FragmentRecord = serde_json::from_str(&json).unwrap();
        let back = BarcodedFragment::from(record);
        assert_eq!(back, fragment);
        assert_eq!(back.barcodes(), fragment.barcodes());
        assert_eq!(back.unpaired(), Some("ACGT"));
    }
}
