//! Old-to-new revision bookkeeping for one deployment.

use super::{FamilyRef, TaskDefinitionArn};
use serde::Serialize;

/// Maps a stripped source reference to the revision registered for it.
///
/// Entries keep registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionMapping {
    entries: Vec<(FamilyRef, TaskDefinitionArn)>,
}

impl RevisionMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records the new revision for `source`, replacing an earlier entry for
    /// the same family.
    pub fn record(&mut self, source: &TaskDefinitionArn, revision: TaskDefinitionArn) {
        let key = source.family_ref();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = revision;
        } else {
            self.entries.push((key, revision));
        }
    }

    /// Returns the new revision registered for a stripped reference.
    #[must_use]
    pub fn get(&self, key: &FamilyRef) -> Option<&TaskDefinitionArn> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, revision)| revision)
    }

    /// Returns `true` when nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of registered revisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FamilyRef, &TaskDefinitionArn)> {
        self.entries.iter().map(|(key, revision)| (key, revision))
    }
}
