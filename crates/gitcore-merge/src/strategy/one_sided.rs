//! The "ours"/"theirs" resolution: take one input tree verbatim.

use gitcore_hash::ObjectId;

/// Pick the tree of the tip at `index`. `None` when fewer tips were given,
/// which the caller reports as a failed (not erroneous) merge.
pub(crate) fn resolve(source_trees: &[ObjectId], index: usize) -> Option<ObjectId> {
    source_trees.get(index).copied()
}
