//! Merge base computation using the paint algorithm.
//!
//! The paint algorithm marks commits reachable from each input with
//! different "colors" (flags). When a commit is painted with both colors,
//! it is a common ancestor. The lowest common ancestors are the merge bases.

use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use gitcore_hash::ObjectId;
use gitcore_object::{Commit, Object};
use gitcore_odb::ObjectStore;

use crate::RevWalkError;

const PARENT1: u8 = 1;
const PARENT2: u8 = 2;
const STALE: u8 = 4;

/// Entry in the paint queue, ordered by commit date (newest first).
struct PaintEntry {
    oid: ObjectId,
    date: i64,
}

impl PartialEq for PaintEntry {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
    }
}

impl Eq for PaintEntry {}

impl PartialOrd for PaintEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PaintEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap by date.
        self.date.cmp(&other.date)
    }
}

/// Find all merge bases of two commits.
///
/// Returns the lowest common ancestor(s): commits reachable from both `a`
/// and `b` that are not ancestors of any other common ancestor. The result
/// is empty when the histories are fully disjoint.
pub fn merge_base(
    odb: &dyn ObjectStore,
    a: &ObjectId,
    b: &ObjectId,
) -> Result<Vec<ObjectId>, RevWalkError> {
    if a == b {
        return Ok(vec![*a]);
    }

    let results = paint_down_to_common(odb, a, b)?;

    // Drop any base that is an ancestor of another base.
    remove_redundant(odb, results)
}

/// Find the single best merge base of two commits.
pub fn merge_base_one(
    odb: &dyn ObjectStore,
    a: &ObjectId,
    b: &ObjectId,
) -> Result<Option<ObjectId>, RevWalkError> {
    let bases = merge_base(odb, a, b)?;
    Ok(bases.into_iter().next())
}

/// Check if `ancestor` is an ancestor of `descendant`.
pub fn is_ancestor(
    odb: &dyn ObjectStore,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool, RevWalkError> {
    if ancestor == descendant {
        return Ok(true);
    }
    let bases = merge_base(odb, ancestor, descendant)?;
    Ok(bases.contains(ancestor))
}

/// Walk down from both commits, painting reachability flags.
fn paint_down_to_common(
    odb: &dyn ObjectStore,
    a: &ObjectId,
    b: &ObjectId,
) -> Result<Vec<ObjectId>, RevWalkError> {
    let mut flags: HashMap<ObjectId, u8> = HashMap::new();
    let mut queue: BinaryHeap<PaintEntry> = BinaryHeap::new();
    let mut results: Vec<ObjectId> = Vec::new();

    let commit_a = read_commit(odb, a)?;
    let commit_b = read_commit(odb, b)?;

    flags.insert(*a, PARENT1);
    flags.insert(*b, PARENT2);

    queue.push(PaintEntry {
        oid: *a,
        date: commit_a.commit_time(),
    });
    queue.push(PaintEntry {
        oid: *b,
        date: commit_b.commit_time(),
    });

    while let Some(entry) = queue.pop() {
        let current_flags = flags.get(&entry.oid).copied().unwrap_or(0);

        if current_flags & STALE != 0 {
            continue;
        }

        // Painted with both colors: a common ancestor.
        if current_flags & (PARENT1 | PARENT2) == (PARENT1 | PARENT2) {
            flags.insert(entry.oid, current_flags | STALE);
            results.push(entry.oid);

            if !queue_has_nonstale(&queue, &flags) {
                break;
            }
            continue;
        }

        let commit = read_commit(odb, &entry.oid)?;
        for parent in &commit.parents {
            let parent_flags = flags.entry(*parent).or_insert(0);
            let new_flags = *parent_flags | current_flags;
            if new_flags != *parent_flags {
                *parent_flags = new_flags;
                let parent_commit = read_commit(odb, parent)?;
                queue.push(PaintEntry {
                    oid: *parent,
                    date: parent_commit.commit_time(),
                });
            }
        }
    }

    Ok(results)
}

fn queue_has_nonstale(queue: &BinaryHeap<PaintEntry>, flags: &HashMap<ObjectId, u8>) -> bool {
    queue
        .iter()
        .any(|entry| flags.get(&entry.oid).copied().unwrap_or(0) & STALE == 0)
}

/// Remove redundant bases: if X is an ancestor of Y, drop X.
fn remove_redundant(
    odb: &dyn ObjectStore,
    bases: Vec<ObjectId>,
) -> Result<Vec<ObjectId>, RevWalkError> {
    if bases.len() <= 1 {
        return Ok(bases);
    }

    let mut to_remove: HashSet<usize> = HashSet::new();

    for i in 0..bases.len() {
        if to_remove.contains(&i) {
            continue;
        }
        for j in (i + 1)..bases.len() {
            if to_remove.contains(&j) {
                continue;
            }
            if is_ancestor_direct(odb, &bases[i], &bases[j])? {
                to_remove.insert(i);
                break;
            } else if is_ancestor_direct(odb, &bases[j], &bases[i])? {
                to_remove.insert(j);
            }
        }
    }

    Ok(bases
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !to_remove.contains(idx))
        .map(|(_, oid)| oid)
        .collect())
}

/// Plain BFS ancestor check, used during redundant-base elimination to avoid
/// recursing into `merge_base`.
fn is_ancestor_direct(
    odb: &dyn ObjectStore,
    ancestor: &ObjectId,
    descendant: &ObjectId,
) -> Result<bool, RevWalkError> {
    if ancestor == descendant {
        return Ok(true);
    }

    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();
    queue.push_back(*descendant);
    visited.insert(*descendant);

    while let Some(current) = queue.pop_front() {
        if current == *ancestor {
            return Ok(true);
        }
        let commit = read_commit(odb, &current)?;
        for parent in &commit.parents {
            if visited.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }

    Ok(false)
}

fn read_commit(odb: &dyn ObjectStore, oid: &ObjectId) -> Result<Commit, RevWalkError> {
    let obj = odb.read(oid)?.ok_or(RevWalkError::CommitNotFound(*oid))?;
    match obj {
        Object::Commit(c) => Ok(c),
        _ => Err(RevWalkError::NotACommit(*oid)),
    }
}
