//! Object identity.

use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::{HashAlgorithm, HashError};

/// A git object id: the digest of the object's header and content.
///
/// The digest bytes live inline, one variant per supported algorithm, so
/// ids are `Copy` and usable as map keys without allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectId {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl ObjectId {
    /// The all-zero SHA-1 id, used to mark absence.
    pub const NULL_SHA1: Self = Self::Sha1([0; 20]);
    /// The all-zero SHA-256 id.
    pub const NULL_SHA256: Self = Self::Sha256([0; 32]);

    /// Build an id from raw digest bytes of the given algorithm.
    pub fn from_bytes(bytes: &[u8], algo: HashAlgorithm) -> Result<Self, HashError> {
        if bytes.len() != algo.digest_len() {
            return Err(HashError::InvalidHashLength {
                expected: algo.digest_len(),
                actual: bytes.len(),
            });
        }
        let mut oid = algo.null_oid();
        oid.digest_mut().copy_from_slice(bytes);
        Ok(oid)
    }

    /// Parse a hex id, inferring the algorithm from the digit count
    /// (40 = SHA-1, 64 = SHA-256).
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let Some(algo) = HashAlgorithm::from_hex_len(hex.len()) else {
            return Err(HashError::InvalidHexLength {
                expected: HashAlgorithm::Sha1.hex_len(),
                actual: hex.len(),
            });
        };
        let mut oid = algo.null_oid();
        hex_decode(hex, oid.digest_mut())?;
        Ok(oid)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Sha1(digest) => digest,
            Self::Sha256(digest) => digest,
        }
    }

    fn digest_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Sha1(digest) => digest,
            Self::Sha256(digest) => digest,
        }
    }

    /// The algorithm this id was produced by.
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        }
    }

    /// Whether this is the all-zero id of its algorithm.
    pub fn is_null(&self) -> bool {
        *self == self.algorithm().null_oid()
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex_to_string(self.as_bytes())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Abbreviated, like git's own log output.
impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
