//! The stateful worker executing one merge invocation.

use std::sync::Arc;

use gitcore_hash::ObjectId;
use gitcore_object::{Object, Tree};
use gitcore_odb::ObjectStore;
use gitcore_revwalk::merge_base;

use crate::stage::{read_tree, StagedIndex};
use crate::strategy::{one_sided, simple_two_way, MergerKind};
use crate::MergeError;

/// A tip resolved down to its tree, remembering the peeled commit id when
/// there was one so a merge base can be computed.
struct Source {
    commit: Option<ObjectId>,
    tree: ObjectId,
}

/// Executes a merge of commit or tree tips against an object store.
///
/// Created by [`MergeStrategy::new_merger`](crate::MergeStrategy::new_merger).
/// [`merge`](Merger::merge) returns `Ok(true)` on success, with the result
/// tree available from [`result_tree`](Merger::result_tree); `Ok(false)`
/// means the merge could not complete (conflicts, or a tip the strategy
/// cannot use), with any conflict detail in
/// [`staged_index`](Merger::staged_index). `Err` is reserved for broken
/// inputs and store failures.
pub struct Merger {
    odb: Arc<dyn ObjectStore>,
    kind: MergerKind,
    base_override: Option<ObjectId>,
    result_tree: Option<ObjectId>,
    staged: Option<StagedIndex>,
}

impl Merger {
    pub(crate) fn new(odb: Arc<dyn ObjectStore>, kind: MergerKind) -> Self {
        Self {
            odb,
            kind,
            base_override: None,
            result_tree: None,
            staged: None,
        }
    }

    /// Use the given tree-ish as the common ancestor instead of computing
    /// one from the tips' histories.
    pub fn set_base(&mut self, base: ObjectId) {
        self.base_override = Some(base);
    }

    /// The store this merger reads from and writes results to.
    pub fn object_store(&self) -> &dyn ObjectStore {
        self.odb.as_ref()
    }

    /// Merge the given tips.
    pub fn merge(&mut self, tips: &[ObjectId]) -> Result<bool, MergeError> {
        self.result_tree = None;
        self.staged = None;

        if self.kind == MergerKind::SimpleTwoWay && tips.len() != 2 {
            return Err(MergeError::WrongTipCount {
                expected: 2,
                actual: tips.len(),
            });
        }

        let sources = tips
            .iter()
            .map(|tip| self.resolve_tip(tip))
            .collect::<Result<Vec<Source>, MergeError>>()?;

        match self.kind {
            MergerKind::OneSided(index) => {
                let trees: Vec<ObjectId> = sources.iter().map(|s| s.tree).collect();
                match one_sided::resolve(&trees, index) {
                    Some(tree) => {
                        self.result_tree = Some(tree);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            MergerKind::SimpleTwoWay => {
                let base = self.base_tree(tips, &sources)?;
                let ours = read_tree(self.odb.as_ref(), &sources[0].tree)?;
                let theirs = read_tree(self.odb.as_ref(), &sources[1].tree)?;
                let (index, tree) =
                    simple_two_way::merge_trees(self.odb.as_ref(), base, ours, theirs)?;
                let merged = tree.is_some();
                self.result_tree = tree;
                self.staged = Some(index);
                Ok(merged)
            }
        }
    }

    /// The tree written by the last successful [`merge`](Merger::merge).
    pub fn result_tree(&self) -> Option<ObjectId> {
        self.result_tree
    }

    /// The staging area produced by the last three-way
    /// [`merge`](Merger::merge), clean or conflicted.
    pub fn staged_index(&self) -> Option<&StagedIndex> {
        self.staged.as_ref()
    }

    /// Peel `tip` down to a tree, following tag chains and commits.
    fn resolve_tip(&self, tip: &ObjectId) -> Result<Source, MergeError> {
        let mut oid = *tip;
        loop {
            let obj = self
                .odb
                .read(&oid)?
                .ok_or(MergeError::ObjectNotFound(oid))?;
            match obj {
                Object::Tag(tag) => oid = tag.target,
                Object::Commit(commit) => {
                    return Ok(Source {
                        commit: Some(oid),
                        tree: commit.tree,
                    });
                }
                Object::Tree(_) => {
                    return Ok(Source {
                        commit: None,
                        tree: oid,
                    });
                }
                Object::Blob(_) => {
                    return Err(MergeError::UnexpectedObjectType {
                        oid,
                        expected: "tree-ish",
                        actual: "blob".to_string(),
                    });
                }
            }
        }
    }

    /// The common-ancestor tree for a two-tip merge: the overridden base if
    /// one was set, otherwise the tips' computed merge base. No common
    /// ancestor yields the empty tree; more than one is a hard failure.
    fn base_tree(&self, tips: &[ObjectId], sources: &[Source]) -> Result<Tree, MergeError> {
        if let Some(base) = self.base_override {
            let source = self.resolve_tip(&base)?;
            return read_tree(self.odb.as_ref(), &source.tree);
        }

        let mut commits = Vec::with_capacity(sources.len());
        for (tip, source) in tips.iter().zip(sources) {
            match source.commit {
                Some(commit) => commits.push(commit),
                None => {
                    return Err(MergeError::UnexpectedObjectType {
                        oid: *tip,
                        expected: "commit",
                        actual: "tree".to_string(),
                    });
                }
            }
        }

        let bases = merge_base(self.odb.as_ref(), &commits[0], &commits[1])?;
        match bases.as_slice() {
            [] => Ok(Tree::new()),
            [one] => {
                let source = self.resolve_tip(one)?;
                read_tree(self.odb.as_ref(), &source.tree)
            }
            [first, second, ..] => Err(MergeError::MultipleMergeBases {
                first: *first,
                second: *second,
            }),
        }
    }
}
