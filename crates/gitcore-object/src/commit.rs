use bstr::{BStr, BString, ByteSlice};
use gitcore_hash::ObjectId;

use crate::{ObjectError, Signature};

/// A git commit object.
///
/// Headers the merge engine does not interpret (gpgsig, encoding, mergetag)
/// are preserved in `extra_headers` so reserialization is lossless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// OID of the root tree.
    pub tree: ObjectId,
    /// Parent commit OIDs, in order. Empty for root commits.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Uninterpreted headers in original order, multi-line values joined
    /// with '\n'.
    pub extra_headers: Vec<(BString, BString)>,
    /// Commit message — everything after the blank line separator.
    pub message: BString,
}

impl Commit {
    /// Parse commit content from raw bytes (no object header).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;
        let mut extra_headers: Vec<(BString, BString)> = Vec::new();

        let mut pos = 0;
        while pos < content.len() {
            if content[pos] == b'\n' {
                // Blank line: message follows.
                pos += 1;
                break;
            }

            let line_end = content[pos..]
                .find_byte(b'\n')
                .map(|p| p + pos)
                .unwrap_or(content.len());
            let line = &content[pos..line_end];

            let Some(space_pos) = line.find_byte(b' ') else {
                pos = line_end + 1;
                continue;
            };
            let key = &line[..space_pos];
            let value = &line[space_pos + 1..];

            match key {
                b"tree" => tree = Some(parse_oid(value)?),
                b"parent" => parents.push(parse_oid(value)?),
                b"author" => author = Some(Signature::parse(BStr::new(value))?),
                b"committer" => committer = Some(Signature::parse(BStr::new(value))?),
                _ => {
                    // Multi-line headers continue with a leading space.
                    let mut val = Vec::from(value);
                    let mut next = line_end + 1;
                    while next < content.len() && content[next] == b' ' {
                        let cont_end = content[next..]
                            .find_byte(b'\n')
                            .map(|p| p + next)
                            .unwrap_or(content.len());
                        val.push(b'\n');
                        val.extend_from_slice(&content[next + 1..cont_end]);
                        next = cont_end + 1;
                    }
                    extra_headers.push((BString::from(key), BString::from(val)));
                    pos = next;
                    continue;
                }
            }

            pos = line_end + 1;
        }

        Ok(Self {
            tree: tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?,
            parents,
            author: author.ok_or(ObjectError::MissingCommitField { field: "author" })?,
            committer: committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?,
            extra_headers,
            message: BString::from(&content[pos.min(content.len())..]),
        })
    }

    /// Serialize commit content to bytes (no object header).
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        for (key, val) in &self.extra_headers {
            out.extend_from_slice(key);
            out.push(b' ');
            for (i, line) in val.split(|&b| b == b'\n').enumerate() {
                if i > 0 {
                    out.extend_from_slice(b"\n ");
                }
                out.extend_from_slice(line);
            }
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Committer timestamp in seconds since epoch.
    ///
    /// Revision walking orders commits by this value.
    pub fn commit_time(&self) -> i64 {
        self.committer.date.timestamp
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

fn parse_oid(value: &[u8]) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 OID".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}
