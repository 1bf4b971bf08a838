use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;

use crate::foundation::core::Tag;
use crate::foundation::error::{ShadowResult, invariant};

/// Arguments of one combined `manageChildren` reparent call.
///
/// Every index refers to the container's child list as it was before this call mutated it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManageChildren {
    /// Indices of children to detach and re-insert.
    pub move_from: Vec<usize>,
    /// Destination index for each `move_from` entry.
    pub move_to: Vec<usize>,
    /// Tags to attach.
    pub add_tags: Vec<Tag>,
    /// Destination index for each `add_tags` entry.
    pub add_at: Vec<usize>,
    /// Indices of children to remove and purge.
    pub remove_at: Vec<usize>,
}

/// Result of applying [`ManageChildren`] to a child list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ChildReorder {
    /// Final child order.
    pub(crate) children: Vec<Tag>,
    /// Children removed permanently (their subtrees get purged).
    pub(crate) removed: Vec<Tag>,
    /// Children detached but overwritten in the insertion map (last writer wins).
    pub(crate) dropped: Vec<Tag>,
}

impl ManageChildren {
    /// Remove every current child.
    pub fn remove_all(count: usize) -> Self {
        Self {
            remove_at: (0..count).collect(),
            ..Self::default()
        }
    }

    /// Swap the child at `index` for `with`.
    pub fn replace_at(index: usize, with: Tag) -> Self {
        Self {
            add_tags: vec![with],
            add_at: vec![index],
            remove_at: vec![index],
            ..Self::default()
        }
    }

    /// Whether the call mutates nothing.
    pub fn is_empty(&self) -> bool {
        self.move_from.is_empty() && self.add_tags.is_empty() && self.remove_at.is_empty()
    }

    pub(crate) fn validate(&self) -> ShadowResult<()> {
        if self.move_from.len() != self.move_to.len() {
            return Err(invariant(format!(
                "manageChildren: moveFrom has {} entries but moveTo has {}",
                self.move_from.len(),
                self.move_to.len()
            )));
        }
        if self.add_tags.len() != self.add_at.len() {
            return Err(invariant(format!(
                "manageChildren: addTags has {} entries but addAt has {}",
                self.add_tags.len(),
                self.add_at.len()
            )));
        }
        Ok(())
    }

    /// Compute the new child order for `current`.
    ///
    /// Indices past the end are skipped; with `strict` set, any shortfall between requested and
    /// resolved distinct indices is an invariant violation.
    pub(crate) fn apply(&self, current: &[Tag], strict: bool) -> ShadowResult<ChildReorder> {
        self.validate()?;

        let removed_idx = resolve_indices(current, &self.remove_at, strict, "removeAt")?;
        let moved_idx = resolve_indices(current, &self.move_from, strict, "moveFrom")?;

        let removed: Vec<Tag> = removed_idx.iter().map(|&i| current[i]).collect();

        // Both detach phases work from the same pre-mutation snapshot.
        let mut remaining: Vec<Tag> = current
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed_idx.contains(i) && !moved_idx.contains(i))
            .map(|(_, &t)| t)
            .collect();
        // A tag re-added while still attached here is moved, not duplicated.
        remaining.retain(|t| !self.add_tags.contains(t));

        let mut inserts = BTreeMap::<usize, Tag>::new();
        let mut dropped = Vec::new();
        let moves = self.move_from.iter().zip(&self.move_to);
        for (&from, &to) in moves {
            let Some(&tag) = current.get(from) else {
                continue;
            };
            if removed_idx.contains(&from) {
                continue;
            }
            if let Some(prev) = inserts.insert(to, tag) {
                dropped.push(prev);
            }
        }
        for (&tag, &at) in self.add_tags.iter().zip(&self.add_at) {
            if let Some(prev) = inserts.insert(at, tag) {
                dropped.push(prev);
            }
        }
        dropped.retain(|t| !inserts.values().any(|v| v == t));

        let mut children = remaining;
        children.reserve(inserts.len());
        for (offset, (dest, tag)) in inserts.into_iter().enumerate() {
            let at = dest.saturating_add(offset).min(children.len());
            children.insert(at, tag);
        }

        Ok(ChildReorder {
            children,
            removed,
            dropped,
        })
    }
}

fn resolve_indices(
    current: &[Tag],
    requested: &[usize],
    strict: bool,
    what: &str,
) -> ShadowResult<BTreeSet<usize>> {
    let resolved: BTreeSet<usize> = requested
        .iter()
        .copied()
        .filter(|&i| i < current.len())
        .collect();
    if strict && resolved.len() != requested.len() {
        let missing: SmallVec<[usize; 4]> = requested
            .iter()
            .copied()
            .filter(|&i| i >= current.len())
            .collect();
        return Err(invariant(format!(
            "manageChildren: {what} resolved {} of {} indices against {} children (out of range: {missing:?})",
            resolved.len(),
            requested.len(),
            current.len()
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "../../tests/unit/shadow/children.rs"]
mod tests;
