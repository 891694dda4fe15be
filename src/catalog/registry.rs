use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::core::fragment::BarcodedFragment;
use crate::core::group::FragmentGroup;
use crate::core::signature::BarcodeSequence;

/// One fragment group per distinct signature for the length of a run
///
/// Lookups are concurrent. The first caller to ask for a signature creates
/// its group and every later caller, on any thread, receives that same group.
#[derive(Debug, Default)]
pub struct FragmentGroupRegistry {
    /// Index: signature key -> group
    groups: DashMap<String, Arc<FragmentGroup>>,
}

impl FragmentGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The group for `signature`, created if absent
    pub fn group_for(&self, signature: &BarcodeSequence) -> Arc<FragmentGroup> {
        if let Some(group) = self.groups.get(signature.key()) {
            return Arc::clone(group.value());
        }

        let entry = self
            .groups
            .entry(signature.key().to_string())
            .or_insert_with(|| {
                debug!("New fragment group for signature '{}'", signature);
                Arc::new(FragmentGroup::new(signature.clone()))
            });
        Arc::clone(entry.value())
    }

    /// Add `fragment_id` to the group for `signature` and return the group
    pub fn assign(&self, signature: &BarcodeSequence, fragment_id: &str) -> Arc<FragmentGroup> {
        let group = self.group_for(signature);
        group.add_member(fragment_id);
        group
    }

    /// Assign a fragment to the group for its own signature
    pub fn register(&self, fragment: &mut BarcodedFragment) -> Arc<FragmentGroup> {
        let group = self.assign(fragment.barcodes(), fragment.id());
        fragment.set_group(Arc::clone(&group));
        group
    }

    pub fn get(&self, signature: &BarcodeSequence) -> Option<Arc<FragmentGroup>> {
        self.groups.get(signature.key()).map(|g| Arc::clone(g.value()))
    }

    /// Number of distinct signatures seen
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All groups, ordered by signature
    pub fn groups(&self) -> Vec<Arc<FragmentGroup>> {
        let mut groups: Vec<_> = self.groups.iter().map(|g| Arc::clone(g.value())).collect();
        groups.sort_by(|a, b| a.signature().cmp(b.signature()));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    fn sig(s: &str) -> BarcodeSequence {
        BarcodeSequence::decode(s).unwrap()
    }

    #[test]
    fn test_same_signature_same_group() {
        let registry = FragmentGroupRegistry::new();
        let a = registry.assign(&sig("[a]AC[b]GT"), "f1");
        let b = registry.assign(&sig("[a]AC[b]GT"), "f2");
        let c = registry.assign(&sig("[b]GT[a]AC"), "f3");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.len(), 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&sig("[c]TT")).is_none());
    }

    #[test]
    fn test_assign_twice_keeps_one_member() {
        let registry = FragmentGroupRegistry::new();
        registry.assign(&sig("[a]AC"), "f1");
        let group = registry.assign(&sig("[a]AC"), "f1");
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_groups_sorted_by_signature() {
        let registry = FragmentGroupRegistry::new();
        registry.assign(&sig("[z]AC"), "f1");
        registry.assign(&sig("[a]GG"), "f2");
        let keys: Vec<String> = registry
            .groups()
            .iter()
            .map(|g| g.signature().to_string())
            .collect();
        assert_eq!(keys, vec!["[a]GG", "[z]AC"]);
    }

    #[test]
    fn test_concurrent_first_writer_wins() {
        let registry = FragmentGroupRegistry::new();
        let signature = sig("[a]AC[b]GT");

        let groups: Vec<Arc<FragmentGroup>> = (0..1000)
            .into_par_iter()
            .map(|i| registry.assign(&signature, &format!("frag{}", i % 250)))
            .collect();

        assert_eq!(registry.len(), 1);
        assert!(groups.iter().all(|g| Arc::ptr_eq(g, &groups[0])));
        assert_eq!(groups[0].len(), 250);
    }
}
