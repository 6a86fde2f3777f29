//! Commit graph traversal for the gitcore merge engine.
//!
//! Currently provides merge-base computation, which tree merging uses to
//! locate the common ancestor of the commits being merged.

pub mod merge_base;

pub use merge_base::{is_ancestor, merge_base, merge_base_one};

use gitcore_hash::ObjectId;

/// Errors produced by revision walking.
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error("commit not found: {0}")]
    CommitNotFound(ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error(transparent)]
    Odb(#[from] gitcore_odb::OdbError),
}
