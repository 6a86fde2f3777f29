//! Property tests for hex encoding/decoding and OID parsing.

use gitcore_hash::hex::{hex_to_bytes, hex_to_string};
use gitcore_hash::{HashAlgorithm, ObjectId};
use proptest::prelude::*;

proptest! {
    #[test]
    fn hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let hex = hex_to_string(&bytes);
        let decoded = hex_to_bytes(&hex).unwrap();
        prop_assert_eq!(decoded, bytes);
    }

    #[test]
    fn oid_roundtrip_sha1(bytes in proptest::collection::vec(any::<u8>(), 20)) {
        let oid = ObjectId::from_bytes(&bytes, HashAlgorithm::Sha1).unwrap();
        let parsed = ObjectId::from_hex(&oid.to_hex()).unwrap();
        prop_assert_eq!(parsed, oid);
    }

    #[test]
    fn oid_roundtrip_sha256(bytes in proptest::collection::vec(any::<u8>(), 32)) {
        let oid = ObjectId::from_bytes(&bytes, HashAlgorithm::Sha256).unwrap();
        let parsed = ObjectId::from_hex(&oid.to_hex()).unwrap();
        prop_assert_eq!(parsed, oid);
    }

    #[test]
    fn hex_is_lowercase(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
        let hex = hex_to_string(&bytes);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
