use dashmap::DashSet;

use crate::core::signature::BarcodeSequence;

/// Identifiers of every fragment sharing one exact signature
///
/// Membership only grows. Adding an identifier twice has no effect, and
/// concurrent adds need no external locking.
#[derive(Debug)]
pub struct FragmentGroup {
    signature: BarcodeSequence,
    members: DashSet<String>,
}

impl FragmentGroup {
    pub fn new(signature: BarcodeSequence) -> Self {
        Self {
            signature,
            members: DashSet::new(),
        }
    }

    pub fn signature(&self) -> &BarcodeSequence {
        &self.signature
    }

    /// Returns true if the fragment was not already a member
    pub fn add_member(&self, fragment_id: impl Into<String>) -> bool {
        self.members.insert(fragment_id.into())
    }

    pub fn contains(&self, fragment_id: &str) -> bool {
        self.members.contains(fragment_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member identifiers, sorted
    pub fn members(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.members.iter().map(|id| id.key().clone()).collect();
        ids.sort_unstable();
        ids
    }
}
