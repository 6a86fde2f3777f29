use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use gitcore_hash::{HashAlgorithm, ObjectId};

use crate::ObjectError;

/// File mode for tree entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Regular file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Symbolic link (120000)
    Symlink,
    /// Git submodule link (160000)
    Gitlink,
    /// Subdirectory (040000)
    Tree,
    /// Unrecognized mode, preserved for round-trip.
    Unknown(u32),
}

impl FileMode {
    /// Parse from octal ASCII bytes (e.g., `b"100644"`).
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let raw = parse_octal(s)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))?;
        Ok(Self::from_raw(raw))
    }

    /// Create from the raw numeric value.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0o100644 => Self::Regular,
            0o100755 => Self::Executable,
            0o120000 => Self::Symlink,
            0o160000 => Self::Gitlink,
            0o040000 => Self::Tree,
            other => Self::Unknown(other),
        }
    }

    /// Get the raw numeric value.
    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Gitlink => 0o160000,
            Self::Tree => 0o40000,
            Self::Unknown(v) => *v,
        }
    }

    /// Serialize to octal ASCII (git writes trees without leading zeros).
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }

    pub fn is_gitlink(&self) -> bool {
        matches!(self, Self::Gitlink)
    }
}

fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        val = val.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(val)
}

/// A single entry in a git tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        base_name_compare(
            self.name.as_ref(),
            self.mode.is_tree(),
            other.name.as_ref(),
            other.mode.is_tree(),
        )
    }
}

/// Git's tree entry name comparison.
///
/// After the common prefix, a directory name gets an implicit trailing '/'
/// for comparison. This is why the directory "foo" sorts after "foo.c" but
/// before "foo0".
pub fn base_name_compare(name1: &[u8], is_dir1: bool, name2: &[u8], is_dir2: bool) -> Ordering {
    let min_len = name1.len().min(name2.len());
    let cmp = name1[..min_len].cmp(&name2[..min_len]);
    if cmp != Ordering::Equal {
        return cmp;
    }
    let next = |name: &[u8], is_dir: bool| -> u8 {
        if name.len() > min_len {
            name[min_len]
        } else if is_dir {
            b'/'
        } else {
            0
        }
    };
    next(name1, is_dir1).cmp(&next(name2, is_dir2))
}

/// A git tree object — a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tree content assuming SHA-1 entry OIDs.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        Self::parse_with(content, HashAlgorithm::Sha1)
    }

    /// Parse tree content from the binary format.
    ///
    /// Each entry is `<mode-octal> <name>\0<raw-oid>` with the OID length
    /// fixed by the hash algorithm.
    pub fn parse_with(content: &[u8], algo: HashAlgorithm) -> Result<Self, ObjectError> {
        let oid_len = algo.digest_len();
        let mut entries = Vec::new();
        let mut rest = content;
        let mut offset = 0;

        while !rest.is_empty() {
            let space_pos =
                rest.find_byte(b' ')
                    .ok_or_else(|| ObjectError::InvalidTreeEntry {
                        offset,
                        reason: "missing space after mode".into(),
                    })?;
            let mode = FileMode::from_bytes(&rest[..space_pos]).map_err(|_| {
                ObjectError::InvalidTreeEntry {
                    offset,
                    reason: "invalid mode".into(),
                }
            })?;

            let after_mode = &rest[space_pos + 1..];
            let null_pos =
                after_mode
                    .find_byte(0)
                    .ok_or_else(|| ObjectError::InvalidTreeEntry {
                        offset,
                        reason: "missing null after name".into(),
                    })?;
            let name = BString::from(&after_mode[..null_pos]);

            let oid_bytes = &after_mode[null_pos + 1..];
            if oid_bytes.len() < oid_len {
                return Err(ObjectError::InvalidTreeEntry {
                    offset,
                    reason: "truncated OID".into(),
                });
            }
            let oid = ObjectId::from_bytes(&oid_bytes[..oid_len], algo)?;

            entries.push(TreeEntry { mode, name, oid });
            let consumed = space_pos + 1 + null_pos + 1 + oid_len;
            offset += consumed;
            rest = &rest[consumed..];
        }

        Ok(Self { entries })
    }

    /// Serialize tree content, writing entries in git canonical sort order.
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort();

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Lookup an entry by name.
    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_mode_roundtrip() {
        for mode in [
            FileMode::Regular,
            FileMode::Executable,
            FileMode::Symlink,
            FileMode::Gitlink,
            FileMode::Tree,
        ] {
            assert_eq!(FileMode::from_bytes(&mode.as_bytes()).unwrap(), mode);
        }
    }

    #[test]
    fn tree_mode_has_no_leading_zero() {
        assert_eq!(FileMode::Tree.as_bytes(), "40000");
    }

    #[test]
    fn dir_sorts_after_dotted_file() {
        // "foo" (dir) compares as "foo/"; '/' (0x2F) > '.' (0x2E).
        assert_eq!(
            base_name_compare(b"foo", true, b"foo.c", false),
            Ordering::Greater
        );
    }

    #[test]
    fn dir_sorts_after_hyphenated_file() {
        assert_eq!(
            base_name_compare(b"foo", true, b"foo-bar", false),
            Ordering::Greater
        );
    }

    #[test]
    fn plain_file_prefix_sorts_first() {
        assert_eq!(
            base_name_compare(b"foo", false, b"foo.c", false),
            Ordering::Less
        );
    }

    #[test]
    fn parse_empty_tree() {
        assert!(Tree::parse(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_single_entry() {
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 hello.txt\0");
        data.extend_from_slice(oid.as_bytes());

        let tree = Tree::parse(&data).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.entries[0].mode, FileMode::Regular);
        assert_eq!(tree.entries[0].name, "hello.txt");
        assert_eq!(tree.entries[0].oid, oid);
    }

    #[test]
    fn serialize_sorts_entries() {
        let oid = ObjectId::NULL_SHA1;
        let tree = Tree {
            entries: vec![
                TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from("b.txt"),
                    oid,
                },
                TreeEntry {
                    mode: FileMode::Tree,
                    name: BString::from("a-dir"),
                    oid,
                },
            ],
        };
        let parsed = Tree::parse(&tree.serialize_content()).unwrap();
        assert_eq!(parsed.entries[0].name, "a-dir");
        assert_eq!(parsed.entries[1].name, "b.txt");
    }

    #[test]
    fn truncated_oid_errors() {
        let data = b"100644 a\0shortoid";
        assert!(matches!(
            Tree::parse(data),
            Err(ObjectError::InvalidTreeEntry { .. })
        ));
    }

    #[test]
    fn find_entry() {
        let oid = ObjectId::NULL_SHA1;
        let tree = Tree {
            entries: vec![TreeEntry {
                mode: FileMode::Regular,
                name: BString::from("README.md"),
                oid,
            }],
        };
        assert!(tree.find(BStr::new("README.md")).is_some());
        assert!(tree.find(BStr::new("missing")).is_none());
    }
}
