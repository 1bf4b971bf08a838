use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::Tag;

/// Per-batch record of which nodes changed props or children.
///
/// Keyed by tag; entries are validated against the registry when the batch commits, so a node
/// purged mid-batch is skipped rather than kept alive.
#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    props: BTreeMap<Tag, BTreeSet<String>>,
    children: BTreeSet<Tag>,
}

/// Changes swapped out of a [`ChangeTracker`] at a batch boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Changed prop names per node.
    pub props: BTreeMap<Tag, BTreeSet<String>>,
    /// Nodes whose child list changed.
    pub children: BTreeSet<Tag>,
}

impl ChangeSet {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.children.is_empty()
    }
}

impl ChangeTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `names` into the set recorded for `tag`.
    pub fn record_props_changed<I>(&mut self, tag: Tag, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.props.entry(tag).or_default().extend(names);
    }

    /// Note that `tag` had its children changed.
    pub fn record_children_changed(&mut self, tag: Tag) {
        self.children.insert(tag);
    }

    /// Drop any record for a purged node.
    pub fn forget(&mut self, tag: Tag) {
        self.props.remove(&tag);
        self.children.remove(&tag);
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.children.is_empty()
    }

    /// Swap both collections out for fresh empty ones.
    pub fn take(&mut self) -> ChangeSet {
        ChangeSet {
            props: std::mem::take(&mut self.props),
            children: std::mem::take(&mut self.children),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/change_tracker.rs"]
mod tests;
