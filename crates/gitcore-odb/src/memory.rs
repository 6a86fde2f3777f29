use std::collections::HashMap;
use std::sync::RwLock;

use gitcore_hash::{HashAlgorithm, Hasher, ObjectId};
use gitcore_object::{Object, ObjectType};

use crate::{ObjectInfo, ObjectStore, OdbError};

/// In-memory, HashMap-based object store.
///
/// Intended for in-core merges and tests. All objects are held in memory
/// behind a `RwLock` for safe concurrent access.
pub struct MemoryStore {
    objects: RwLock<HashMap<ObjectId, (ObjectType, Vec<u8>)>>,
    hash_algo: HashAlgorithm,
}

impl MemoryStore {
    /// Create a new empty store using SHA-1.
    pub fn new() -> Self {
        Self::with_algo(HashAlgorithm::Sha1)
    }

    /// Create a new empty store using the given hash algorithm.
    pub fn with_algo(hash_algo: HashAlgorithm) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            hash_algo,
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for MemoryStore {
    fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        let map = self.objects.read().expect("lock poisoned");
        match map.get(oid) {
            Some((obj_type, content)) => {
                let obj =
                    Object::parse_content(*obj_type, content).map_err(|e| OdbError::Corrupt {
                        oid: *oid,
                        reason: e.to_string(),
                    })?;
                Ok(Some(obj))
            }
            None => Ok(None),
        }
    }

    fn read_header(&self, oid: &ObjectId) -> Result<Option<ObjectInfo>, OdbError> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(oid).map(|(obj_type, content)| ObjectInfo {
            obj_type: *obj_type,
            size: content.len(),
        }))
    }

    fn contains(&self, oid: &ObjectId) -> bool {
        self.objects
            .read()
            .expect("lock poisoned")
            .contains_key(oid)
    }

    fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        self.write_raw(obj.object_type(), &obj.serialize_content())
    }

    fn write_raw(&self, obj_type: ObjectType, content: &[u8]) -> Result<ObjectId, OdbError> {
        let oid = Hasher::hash_object(self.hash_algo, obj_type.name(), content)?;
        let mut map = self.objects.write().expect("lock poisoned");
        // Idempotent: content-addressing guarantees the same OID always maps
        // to the same content.
        map.entry(oid)
            .or_insert_with(|| (obj_type, content.to_vec()));
        Ok(oid)
    }

    fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("object_count", &self.len())
            .field("hash_algo", &self.hash_algo)
            .finish()
    }
}
