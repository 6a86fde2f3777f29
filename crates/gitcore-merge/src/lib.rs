//! Three-way tree merge engine.
//!
//! Provides the text-level merge-result model ([`MergeResult`],
//! [`MergeChunk`]), the Git-conformant conflict-marker formatter, the
//! name-keyed strategy registry, and the in-core tree merge strategies
//! ("ours", "theirs", "simple-two-way-in-core").
//!
//! A caller selects a strategy by name, obtains a [`Merger`] bound to an
//! object store, supplies the tip tree-ishes, and invokes merge. The result
//! is either a single tree id (clean merge) or a staged index holding the
//! conflicting sides at stages 1-3.

pub mod format;
pub mod merger;
pub mod result;
pub mod stage;
pub mod strategy;
pub mod text;
pub mod walk;

pub use format::{format_merge, format_merge_three};
pub use merger::Merger;
pub use result::{ConflictState, MergeChunk, MergeResult};
pub use stage::{Stage, StageBuilder, StageEntry, StagedIndex};
pub use strategy::MergeStrategy;
pub use text::RawText;
pub use walk::{MultiTreeWalk, WalkRow};

use bstr::BString;
use gitcore_hash::ObjectId;

/// Errors produced by merge operations.
///
/// An unresolved conflict is not an error: `Merger::merge` reports it as
/// `Ok(false)` with the conflicting entries staged.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("unknown merge strategy: {0}")]
    UnknownStrategy(String),

    #[error("merge strategy already registered: {0}")]
    DuplicateStrategy(String),

    #[error("expected {expected} merge tips, got {actual}")]
    WrongTipCount { expected: usize, actual: usize },

    #[error("multiple merge bases found: {first} and {second}")]
    MultipleMergeBases { first: ObjectId, second: ObjectId },

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("expected {expected} object, got {actual} for {oid}")]
    UnexpectedObjectType {
        oid: ObjectId,
        expected: &'static str,
        actual: String,
    },

    #[error("duplicate staged entry at {path}")]
    DuplicateStageEntry { path: BString },

    #[error("unmerged path: {path}")]
    UnmergedPath { path: BString },

    #[error(transparent)]
    Odb(#[from] gitcore_odb::OdbError),

    #[error(transparent)]
    RevWalk(#[from] gitcore_revwalk::RevWalkError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
