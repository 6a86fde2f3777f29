//! Synchronized multi-tree iteration.
//!
//! Walks N trees in parallel, producing one row per distinct path with the
//! aligned entry from every tree (absent entries have raw mode 0). Rows
//! arrive in git path order. A path that is a file in one tree and a
//! directory in another is reported as a single row, which is what lets the
//! merge algorithm detect directory/file conflicts. Descent into subtrees
//! happens only when the caller asks for it via
//! [`enter_subtree`](MultiTreeWalk::enter_subtree).

use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use gitcore_hash::ObjectId;
use gitcore_object::{base_name_compare, Tree, TreeEntry};
use gitcore_odb::ObjectStore;

use crate::stage::read_tree;
use crate::MergeError;

/// Raw mode bits of a subtree entry.
pub const MODE_TREE: u32 = 0o040000;

/// One tree's contribution to a [`WalkRow`]. Mode 0 means the tree has no
/// entry at this path; the OID is then the null OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEntry {
    mode: u32,
    oid: ObjectId,
}

/// One aligned path position across all walked trees.
#[derive(Debug, Clone)]
pub struct WalkRow {
    path: BString,
    entries: Vec<RowEntry>,
}

impl WalkRow {
    /// Full slash-separated path from the walk root.
    pub fn path(&self) -> &BStr {
        self.path.as_bstr()
    }

    /// Raw file-mode bits of tree `i` at this path (0 = absent).
    pub fn raw_mode(&self, i: usize) -> u32 {
        self.entries[i].mode
    }

    /// Object id of tree `i`'s entry (null when absent).
    pub fn oid(&self, i: usize) -> ObjectId {
        self.entries[i].oid
    }

    /// Whether trees `i` and `j` hold the same object at this path.
    /// Two absent sides compare equal.
    pub fn id_equal(&self, i: usize, j: usize) -> bool {
        self.entries[i].oid == self.entries[j].oid
    }

    /// Whether tree `i`'s entry is a subtree.
    pub fn is_tree(&self, i: usize) -> bool {
        self.entries[i].mode == MODE_TREE
    }

    /// Whether any tree has a subtree at this path.
    pub fn is_subtree(&self) -> bool {
        self.entries.iter().any(|e| e.mode == MODE_TREE)
    }
}

/// One level of a cursor's descent: the entries of a single tree object.
struct Frame {
    /// Path prefix for entries of this frame; empty or ending in `'/'`.
    prefix: BString,
    entries: Vec<TreeEntry>,
    idx: usize,
    /// Entry indices consumed ahead of `idx` by directory/file alignment.
    pulled: Vec<usize>,
    /// Pulled subtree indices still awaiting descent. The subtree's row was
    /// already reported; its children are walked when `idx` reaches the
    /// entry's own sort position, so sibling paths keep their byte order.
    deferred: Vec<usize>,
}

impl Frame {
    fn new(prefix: BString, entries: Vec<TreeEntry>) -> Self {
        Self {
            prefix,
            entries,
            idx: 0,
            pulled: Vec::new(),
            deferred: Vec::new(),
        }
    }

    fn head_pos(&self) -> Option<usize> {
        let mut i = self.idx;
        while i < self.entries.len() {
            if self.pulled.contains(&i) {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }

    fn head(&self) -> Option<&TreeEntry> {
        self.head_pos().map(|i| &self.entries[i])
    }

    fn advance(&mut self) {
        if let Some(pos) = self.head_pos() {
            self.idx = pos + 1;
        }
    }

    fn is_deferred(&self, i: usize) -> bool {
        self.deferred.contains(&i)
    }

    /// Mark a pulled entry as needing descent once `idx` catches up to it.
    fn defer(&mut self, i: usize) {
        self.pulled.retain(|&p| p != i);
        self.deferred.push(i);
    }

    /// Look ahead in this frame for a subtree entry named `name`.
    ///
    /// In git sort order a directory `d` sorts after sibling names like
    /// `d-x` or `d.txt`, so a subtree matching a file from another tree can
    /// hide a few entries beyond the head. The scan is bounded: it stops as
    /// soon as an entry sorts after where `name/` would.
    fn pull_tree(&mut self, name: &[u8]) -> Option<(usize, TreeEntry)> {
        let start = self.head_pos()?;
        for j in (start + 1)..self.entries.len() {
            if self.pulled.contains(&j) || self.deferred.contains(&j) {
                continue;
            }
            let entry = &self.entries[j];
            match base_name_compare(&entry.name, entry.mode.is_tree(), name, true) {
                Ordering::Less => continue,
                Ordering::Equal => {
                    // Equality against the dir key implies a subtree.
                    let entry = entry.clone();
                    self.pulled.push(j);
                    return Some((j, entry));
                }
                Ordering::Greater => return None,
            }
        }
        None
    }
}

/// One tree's position in the walk: a stack of frames, root at the bottom.
struct Cursor {
    frames: Vec<Frame>,
}

struct Head {
    path: BString,
    mode: u32,
    oid: ObjectId,
    is_tree: bool,
}

impl Cursor {
    /// Drop exhausted frames so `head` sees the next pending entry.
    fn prune(&mut self) {
        while let Some(top) = self.frames.last() {
            if top.head().is_none() {
                self.frames.pop();
            } else {
                break;
            }
        }
    }

    fn head_info(&self) -> Option<Head> {
        let frame = self.frames.last()?;
        let entry = frame.head()?;
        let mut path = frame.prefix.clone();
        path.extend_from_slice(&entry.name);
        Some(Head {
            path,
            mode: entry.mode.raw(),
            oid: entry.oid,
            is_tree: entry.mode.is_tree(),
        })
    }
}

/// A contribution of one cursor to the current row.
struct CurrentEntry {
    path: BString,
    oid: ObjectId,
    is_tree: bool,
    /// Index in the top frame when the entry was pulled ahead by DF
    /// alignment; the frame already marked it consumed, so the head must
    /// not advance for it.
    pulled: Option<usize>,
}

/// The synchronized walk itself.
pub struct MultiTreeWalk<'a> {
    odb: &'a dyn ObjectStore,
    cursors: Vec<Cursor>,
    current: Vec<Option<CurrentEntry>>,
    started: bool,
    enter: bool,
}

impl<'a> MultiTreeWalk<'a> {
    /// Start a walk over the given root trees.
    pub fn new(odb: &'a dyn ObjectStore, roots: Vec<Tree>) -> Self {
        let cursors: Vec<Cursor> = roots
            .into_iter()
            .map(|tree| {
                let mut entries = tree.entries;
                entries.sort();
                Cursor {
                    frames: vec![Frame::new(BString::from(""), entries)],
                }
            })
            .collect();
        let current = cursors.iter().map(|_| None).collect();
        Self {
            odb,
            cursors,
            current,
            started: false,
            enter: false,
        }
    }

    /// Number of walked trees.
    pub fn tree_count(&self) -> usize {
        self.cursors.len()
    }

    /// Request descent into the current row's subtree sides on the next
    /// [`next`](MultiTreeWalk::next) call. Sides without a subtree at this
    /// path are unaffected.
    pub fn enter_subtree(&mut self) {
        self.enter = true;
    }

    /// Advance to the next aligned path position.
    pub fn next(&mut self) -> Result<Option<WalkRow>, MergeError> {
        self.consume_current()?;
        self.settle()?;

        // Select the minimum head in git path order, where subtrees compare
        // with an implicit trailing '/'.
        let mut min: Option<Head> = None;
        for cursor in &self.cursors {
            if let Some(head) = cursor.head_info() {
                let smaller = match &min {
                    None => true,
                    Some(m) => {
                        base_name_compare(&head.path, head.is_tree, &m.path, m.is_tree)
                            == Ordering::Less
                    }
                };
                if smaller {
                    min = Some(head);
                }
            }
        }
        let Some(min) = min else {
            return Ok(None);
        };

        let null_oid = self.odb.hash_algo().null_oid();
        let mut row_entries = Vec::with_capacity(self.cursors.len());

        for (i, cursor) in self.cursors.iter_mut().enumerate() {
            let mut matched: Option<CurrentEntry> = None;

            if let Some(head) = cursor.head_info() {
                if head.path == min.path {
                    matched = Some(CurrentEntry {
                        path: head.path,
                        oid: head.oid,
                        is_tree: head.is_tree,
                        pulled: None,
                    });
                    row_entries.push(RowEntry {
                        mode: head.mode,
                        oid: head.oid,
                    });
                }
            }

            if matched.is_none() && !min.is_tree {
                // A subtree named like the minimum file may hide behind
                // intervening siblings at the same directory level.
                if let Some(frame) = cursor.frames.last_mut() {
                    if min.path.starts_with(&frame.prefix) {
                        let name = &min.path[frame.prefix.len()..];
                        if name.find_byte(b'/').is_none() {
                            if let Some((pos, entry)) = frame.pull_tree(name) {
                                matched = Some(CurrentEntry {
                                    path: min.path.clone(),
                                    oid: entry.oid,
                                    is_tree: true,
                                    pulled: Some(pos),
                                });
                                row_entries.push(RowEntry {
                                    mode: entry.mode.raw(),
                                    oid: entry.oid,
                                });
                            }
                        }
                    }
                }
            }

            if matched.is_none() {
                row_entries.push(RowEntry {
                    mode: 0,
                    oid: null_oid,
                });
            }
            self.current[i] = matched;
        }

        self.started = true;
        Ok(Some(WalkRow {
            path: min.path,
            entries: row_entries,
        }))
    }

    /// Step every cursor past the row returned by the previous `next` call,
    /// descending into subtree sides if requested.
    fn consume_current(&mut self) -> Result<(), MergeError> {
        if !self.started {
            return Ok(());
        }
        for (cursor, slot) in self.cursors.iter_mut().zip(self.current.iter_mut()) {
            let Some(cur) = slot.take() else { continue };
            match cur.pulled {
                Some(pos) => {
                    // A pulled subtree must not descend yet: its children
                    // would overtake pending siblings that sort before the
                    // directory. Descent happens in `settle` once the frame
                    // reaches the entry's own position.
                    if self.enter && cur.is_tree {
                        if let Some(frame) = cursor.frames.last_mut() {
                            frame.defer(pos);
                        }
                    }
                }
                None => {
                    if let Some(frame) = cursor.frames.last_mut() {
                        frame.advance();
                    }
                    if self.enter && cur.is_tree {
                        let tree = read_tree(self.odb, &cur.oid)?;
                        let mut prefix = cur.path;
                        prefix.push(b'/');
                        let mut entries = tree.entries;
                        entries.sort();
                        cursor.frames.push(Frame::new(prefix, entries));
                    }
                }
            }
        }
        self.enter = false;
        Ok(())
    }

    /// Bring every cursor to a reportable head: pop exhausted frames and
    /// silently descend into deferred subtrees whose position has been
    /// reached (their rows were already reported when pulled).
    fn settle(&mut self) -> Result<(), MergeError> {
        for cursor in &mut self.cursors {
            loop {
                cursor.prune();
                let Some(frame) = cursor.frames.last_mut() else {
                    break;
                };
                let Some(pos) = frame.head_pos() else { break };
                if !frame.is_deferred(pos) {
                    break;
                }
                let entry = frame.entries[pos].clone();
                frame.idx = pos + 1;
                let mut prefix = frame.prefix.clone();
                prefix.extend_from_slice(&entry.name);
                prefix.push(b'/');
                let tree = read_tree(self.odb, &entry.oid)?;
                let mut entries = tree.entries;
                entries.sort();
                cursor.frames.push(Frame::new(prefix, entries));
            }
        }
        Ok(())
    }
}
