//! Object database abstraction.
//!
//! The merge engine reads trees, commits and tags and writes merged trees
//! through the [`ObjectStore`] trait. [`MemoryStore`] is the in-memory
//! implementation used by in-core merges and tests.

mod memory;

pub use memory::MemoryStore;

use gitcore_hash::{HashAlgorithm, HashError, ObjectId};
use gitcore_object::{Object, ObjectType};

/// Errors produced by object storage.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Lightweight object info (header only, no content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    pub obj_type: ObjectType,
    pub size: usize,
}

/// Trait for pluggable object storage backends.
///
/// Implementations provide content-addressed storage: `write` hashes the
/// object and returns its OID, `read` returns `None` for unknown OIDs.
pub trait ObjectStore: Send + Sync {
    /// Read an object by OID.
    fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError>;

    /// Read just the header (type + size).
    fn read_header(&self, oid: &ObjectId) -> Result<Option<ObjectInfo>, OdbError>;

    /// Check if an object exists.
    fn contains(&self, oid: &ObjectId) -> bool;

    /// Write an object, returning its OID.
    fn write(&self, obj: &Object) -> Result<ObjectId, OdbError>;

    /// Write raw content with a known type, returning its OID.
    fn write_raw(&self, obj_type: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError>;

    /// Hash algorithm used by this store.
    fn hash_algo(&self) -> HashAlgorithm;
}
