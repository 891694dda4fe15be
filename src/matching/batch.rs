use rayon::prelude::*;
use tracing::debug;

use crate::catalog::registry::FragmentGroupRegistry;
use crate::core::fragment::{BarcodedFragment, FragmentLayouts};
use crate::core::layout::LayoutError;
use crate::matching::engine::MatchingConfig;

/// The reads of one fragment as they come off the sequencer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub name: String,
    pub read1: Option<String>,
    pub read2: Option<String>,
}

impl ReadPair {
    pub fn new(name: impl Into<String>, read1: Option<String>, read2: Option<String>) -> Self {
        Self {
            name: name.into(),
            read1,
            read2,
        }
    }
}

/// Identify barcodes in many fragments in parallel and group them.
///
/// Fragments with at least one barcode are registered with `registry`; the
/// rest are returned ungrouped. Output order follows input
/// order.
///
/// # Errors
///
/// Returns `LayoutError` if a layout cannot fit in its declared read length.
pub fn match_batch(
    pairs: &[ReadPair],
    layouts: &FragmentLayouts,
    config: &MatchingConfig,
    registry: &FragmentGroupRegistry,
) -> Result<Vec<BarcodedFragment>, LayoutError> {
    let fragments = pairs
        .par_iter()
        .map(|pair| {
            let mut fragment = BarcodedFragment::from_reads(
                &pair.name,
                pair.read1.as_deref(),
                pair.read2.as_deref(),
                layouts,
                config,
            )?;
            if !fragment.barcodes().is_empty() {
                registry.register(&mut fragment);
            }
            Ok(fragment)
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    debug!(
        "Matched batch of {} fragments; {} groups so far",
        fragments.len(),
        registry.len()
    );
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::element::{Barcode, BarcodeSet};
    use crate::core::layout::ReadLayout;
    use std::sync::Arc;

    fn layouts() -> FragmentLayouts {
        let set = |name: &str, a: &str, b: &str| {
            BarcodeSet::new(
                name,
                vec![
                    Barcode::new(format!("{name}1"), a, 1).unwrap(),
                    Barcode::new(format!("{name}2"), b, 1).unwrap(),
                ],
            )
            .unwrap()
        };
        let read2 = ReadLayout::new(
            vec![
                set("Y", "AAAACCCC", "CCCCAAAA").into(),
                set("Odd", "GGGGTTTT", "TTTTGGGG").into(),
            ],
            30,
        )
        .unwrap();
        FragmentLayouts::new(None, Some(read2))
    }

    #[test]
    fn test_match_batch_groups_equal_signatures() {
        let pairs = vec![
            ReadPair::new("f1 1:N", None, Some("AAAACCCCGGGGTTTTAC".to_string())),
            ReadPair::new("f2", None, Some("AAAACCCCGGGGTTTAAC".to_string())),
            ReadPair::new("f3", None, Some("CCCCAAAATTTTGGGGAC".to_string())),
            ReadPair::new("f4", None, Some("GATTACAGATTACAGATT".to_string())),
            ReadPair::new("f5", Some("ACGT".to_string()), None),
        ];
        let registry = FragmentGroupRegistry::new();
        let fragments =
            match_batch(&pairs, &layouts(), &MatchingConfig::default(), &registry).unwrap();

        assert_eq!(fragments.len(), 5);
        assert_eq!(fragments[0].id(), "f1");
        assert_eq!(registry.len(), 2);

        let g1 = fragments[0].group().unwrap();
        let g2 = fragments[1].group().unwrap();
        assert!(Arc::ptr_eq(g1, g2));
        assert_eq!(g1.members(), vec!["f1", "f2"]);
        assert_eq!(fragments[2].barcodes().to_string(), "[Y2]CCCCAAAA[Odd2]TTTTGGGG");
        assert!(fragments[3].group().is_none());
        assert!(fragments[4].group().is_none());
    }
}
