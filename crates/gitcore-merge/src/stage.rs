//! The in-core staging area produced by tree merges.
//!
//! Mirrors the git index staging convention: a clean path gets one stage-0
//! entry; a conflicted path gets one-to-three entries among stages 1 (base),
//! 2 (ours) and 3 (theirs).

use bstr::{BStr, BString, ByteSlice};
use gitcore_hash::ObjectId;
use gitcore_object::{FileMode, Object, Tree, TreeEntry};
use gitcore_odb::ObjectStore;

use crate::MergeError;

/// Index stage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Resolved entry.
    Merged = 0,
    /// Common ancestor side of a conflict.
    Base = 1,
    /// "Ours" side of a conflict.
    Ours = 2,
    /// "Theirs" side of a conflict.
    Theirs = 3,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// One staged entry: a blob at a path with a stage tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    /// Full slash-separated path from the merge root.
    pub path: BString,
    pub mode: FileMode,
    pub oid: ObjectId,
    pub stage: Stage,
}

/// Append-only builder for a [`StagedIndex`].
///
/// Entries usually arrive in increasing `(path, stage)` order straight off
/// the walk, but a directory pulled into a file's row can expand its blobs
/// ahead of a sibling that sorts between the file name and the `name/`
/// prefix. [`finish`](Self::finish) restores the total order.
#[derive(Debug)]
pub struct StageBuilder {
    entries: Vec<StageEntry>,
    sorted: bool,
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sorted: true,
        }
    }
}

impl StageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn add(&mut self, entry: StageEntry) {
        if let Some(last) = self.entries.last() {
            if (last.path.as_slice(), last.stage) >= (entry.path.as_slice(), entry.stage) {
                self.sorted = false;
            }
        }
        self.entries.push(entry);
    }

    /// Append every blob beneath `tree_oid` at the given stage, prefixing
    /// paths with `prefix` (empty, or ending in `'/'`).
    ///
    /// Subtrees are expanded depth-first in git tree order, which preserves
    /// the builder's byte ordering of emitted paths.
    pub fn add_tree(
        &mut self,
        odb: &dyn ObjectStore,
        prefix: &BStr,
        stage: Stage,
        tree_oid: &ObjectId,
    ) -> Result<(), MergeError> {
        let tree = read_tree(odb, tree_oid)?;
        for entry in &tree.entries {
            let mut path = BString::from(prefix);
            path.extend_from_slice(&entry.name);
            if entry.mode.is_tree() {
                path.push(b'/');
                self.add_tree(odb, path.as_ref(), stage, &entry.oid)?;
            } else {
                self.add(StageEntry {
                    path,
                    mode: entry.mode,
                    oid: entry.oid,
                    stage,
                });
            }
        }
        Ok(())
    }

    /// Sort and seal the staging area.
    ///
    /// Fails with [`MergeError::DuplicateStageEntry`] if two entries share a
    /// path and stage; well-formed input trees never produce that.
    pub fn finish(mut self) -> Result<StagedIndex, MergeError> {
        if !self.sorted {
            self.entries
                .sort_by(|a, b| (a.path.as_slice(), a.stage).cmp(&(b.path.as_slice(), b.stage)));
        }
        if let Some(pair) = self
            .entries
            .windows(2)
            .find(|w| w[0].path == w[1].path && w[0].stage == w[1].stage)
        {
            return Err(MergeError::DuplicateStageEntry {
                path: pair[1].path.clone(),
            });
        }
        let has_conflicts = self.entries.iter().any(|e| e.stage != Stage::Merged);
        Ok(StagedIndex {
            entries: self.entries,
            has_conflicts,
        })
    }
}

/// The finished staging area of a tree merge.
#[derive(Debug, Clone)]
pub struct StagedIndex {
    entries: Vec<StageEntry>,
    has_conflicts: bool,
}

impl StagedIndex {
    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    /// True iff any entry is staged above stage 0.
    pub fn has_conflicts(&self) -> bool {
        self.has_conflicts
    }

    /// Paths with unresolved entries, deduplicated, in index order.
    pub fn conflicted_paths(&self) -> Vec<&BStr> {
        let mut paths: Vec<&BStr> = Vec::new();
        for entry in &self.entries {
            if entry.stage != Stage::Merged {
                let path = entry.path.as_bstr();
                if paths.last() != Some(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }

    /// Write the staged entries as a nested tree structure, returning the
    /// root tree OID.
    ///
    /// Fails with [`MergeError::UnmergedPath`] if any entry is still staged
    /// above stage 0.
    pub fn write_tree(&self, odb: &dyn ObjectStore) -> Result<ObjectId, MergeError> {
        if let Some(entry) = self.entries.iter().find(|e| e.stage != Stage::Merged) {
            return Err(MergeError::UnmergedPath {
                path: entry.path.clone(),
            });
        }
        let flat: Vec<(&[u8], FileMode, ObjectId)> = self
            .entries
            .iter()
            .map(|e| (e.path.as_slice(), e.mode, e.oid))
            .collect();
        write_nested_tree(odb, &flat)
    }
}

/// Build a tree object (recursively creating subtrees) from flat
/// slash-separated paths.
fn write_nested_tree(
    odb: &dyn ObjectStore,
    entries: &[(&[u8], FileMode, ObjectId)],
) -> Result<ObjectId, MergeError> {
    let mut tree = Tree::new();
    let mut i = 0;

    while i < entries.len() {
        let (path, mode, oid) = entries[i];
        match path.iter().position(|&b| b == b'/') {
            None => {
                tree.entries.push(TreeEntry {
                    mode,
                    name: BString::from(path),
                    oid,
                });
                i += 1;
            }
            Some(slash) => {
                // Group all entries sharing this top-level directory.
                let dir = &path[..slash];
                let start = i;
                while i < entries.len()
                    && entries[i].0.len() > slash
                    && &entries[i].0[..slash] == dir
                    && entries[i].0[slash] == b'/'
                {
                    i += 1;
                }
                let children: Vec<(&[u8], FileMode, ObjectId)> = entries[start..i]
                    .iter()
                    .map(|(p, m, o)| (&p[slash + 1..], *m, *o))
                    .collect();
                let subtree_oid = write_nested_tree(odb, &children)?;
                tree.entries.push(TreeEntry {
                    mode: FileMode::Tree,
                    name: BString::from(dir),
                    oid: subtree_oid,
                });
            }
        }
    }

    Ok(odb.write(&Object::Tree(tree))?)
}

pub(crate) fn read_tree(odb: &dyn ObjectStore, oid: &ObjectId) -> Result<Tree, MergeError> {
    let obj = odb.read(oid)?.ok_or(MergeError::ObjectNotFound(*oid))?;
    match obj {
        Object::Tree(t) => Ok(t),
        other => Err(MergeError::UnexpectedObjectType {
            oid: *oid,
            expected: "tree",
            actual: other.object_type().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitcore_object::ObjectType;
    use gitcore_odb::MemoryStore;

    fn entry(path: &str, stage: Stage) -> StageEntry {
        StageEntry {
            path: BString::from(path),
            mode: FileMode::Regular,
            oid: ObjectId::NULL_SHA1,
            stage,
        }
    }

    #[test]
    fn keeps_entries_already_in_order() {
        let mut builder = StageBuilder::new();
        builder.add(entry("a.txt", Stage::Merged));
        builder.add(entry("b.txt", Stage::Base));
        builder.add(entry("b.txt", Stage::Ours));
        builder.add(entry("b.txt", Stage::Theirs));
        builder.add(entry("c.txt", Stage::Merged));
        let index = builder.finish().unwrap();
        let paths: Vec<_> = index.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, ["a.txt", "b.txt", "b.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn sorts_late_arrivals_at_finish() {
        // A directory taken wholesale at "d" stages d/x before the sibling
        // d-x is reached; the byte order is restored when sealing.
        let mut builder = StageBuilder::new();
        builder.add(entry("d/x", Stage::Merged));
        builder.add(entry("d-x", Stage::Merged));
        let index = builder.finish().unwrap();
        let paths: Vec<_> = index.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, ["d-x", "d/x"]);
    }

    #[test]
    fn sorts_stages_within_a_path() {
        let mut builder = StageBuilder::new();
        builder.add(entry("a.txt", Stage::Ours));
        builder.add(entry("a.txt", Stage::Base));
        let stages: Vec<_> = builder
            .finish()
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.stage)
            .collect();
        assert_eq!(stages, [Stage::Base, Stage::Ours]);
    }

    #[test]
    fn rejects_duplicate_path_and_stage() {
        let mut builder = StageBuilder::new();
        builder.add(entry("a.txt", Stage::Ours));
        builder.add(entry("a.txt", Stage::Ours));
        assert!(matches!(
            builder.finish().unwrap_err(),
            MergeError::DuplicateStageEntry { path } if path == "a.txt"
        ));
    }

    #[test]
    fn conflict_flag_and_paths() {
        let mut builder = StageBuilder::new();
        builder.add(entry("a.txt", Stage::Merged));
        builder.add(entry("b.txt", Stage::Ours));
        builder.add(entry("b.txt", Stage::Theirs));
        let index = builder.finish().unwrap();
        assert!(index.has_conflicts());
        assert_eq!(index.conflicted_paths(), vec![BStr::new("b.txt")]);
    }

    #[test]
    fn write_tree_rejects_conflicted_index() {
        let store = MemoryStore::new();
        let mut builder = StageBuilder::new();
        builder.add(entry("a.txt", Stage::Ours));
        let index = builder.finish().unwrap();
        assert!(matches!(
            index.write_tree(&store),
            Err(MergeError::UnmergedPath { .. })
        ));
    }

    #[test]
    fn write_tree_builds_nested_structure() {
        let store = MemoryStore::new();
        let blob = store.write_raw(ObjectType::Blob, b"content").unwrap();

        let mut builder = StageBuilder::new();
        for path in ["a.txt", "dir/inner/deep.txt", "dir/x.txt"] {
            builder.add(StageEntry {
                path: BString::from(path),
                mode: FileMode::Regular,
                oid: blob,
                stage: Stage::Merged,
            });
        }
        let root = builder.finish().unwrap().write_tree(&store).unwrap();

        let tree = read_tree(&store, &root).unwrap();
        assert_eq!(tree.len(), 2);
        let dir = tree.find(BStr::new("dir")).unwrap();
        assert!(dir.mode.is_tree());
        let dir_tree = read_tree(&store, &dir.oid).unwrap();
        assert!(dir_tree.find(BStr::new("inner")).unwrap().mode.is_tree());
        assert!(dir_tree.find(BStr::new("x.txt")).is_some());
    }

    #[test]
    fn add_tree_expands_subtrees_at_stage() {
        let store = MemoryStore::new();
        let blob = store.write_raw(ObjectType::Blob, b"x").unwrap();

        let inner = Tree {
            entries: vec![TreeEntry {
                mode: FileMode::Regular,
                name: BString::from("leaf.txt"),
                oid: blob,
            }],
        };
        let inner_oid = store.write(&Object::Tree(inner)).unwrap();
        let root = Tree {
            entries: vec![
                TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from("top.txt"),
                    oid: blob,
                },
                TreeEntry {
                    mode: FileMode::Tree,
                    name: BString::from("sub"),
                    oid: inner_oid,
                },
            ],
        };
        let root_oid = store.write(&Object::Tree(root)).unwrap();

        let mut builder = StageBuilder::new();
        builder
            .add_tree(&store, BStr::new(""), Stage::Ours, &root_oid)
            .unwrap();
        let index = builder.finish().unwrap();

        // Trees come back from the store in git sort order, so the subtree
        // expands before the sibling file.
        let paths: Vec<_> = index.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![BString::from("sub/leaf.txt"), BString::from("top.txt")]);
        assert!(index.entries().iter().all(|e| e.stage == Stage::Ours));
    }
}
