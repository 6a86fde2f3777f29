//! The text-level merge outcome model.
//!
//! A [`MergeResult`] owns the input sequences (index 0 is the common
//! ancestor, 1.. are the merged sides) and an ordered list of chunks, each
//! attributing a line range to one sequence and tagging it with a conflict
//! state.

use crate::text::RawText;

/// Conflict state of a [`MergeChunk`].
///
/// A conflict run is exactly one `FirstConflictingRange` followed by zero or
/// more `NextConflictingRange` chunks, terminated by any `NoConflict` chunk
/// or the end of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictState {
    NoConflict,
    FirstConflictingRange,
    NextConflictingRange,
}

/// One chunk of a merge result: a half-open line range `[begin, end)` within
/// one input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeChunk {
    sequence_index: usize,
    begin: usize,
    end: usize,
    state: ConflictState,
}

impl MergeChunk {
    /// Index of the sequence this chunk takes its lines from
    /// (0 = common ancestor).
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// First line of the range (inclusive).
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// End of the range (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn conflict_state(&self) -> ConflictState {
        self.state
    }
}

/// The outcome of a text-level merge: input sequences plus an ordered list
/// of chunks.
///
/// Populated by repeated [`add`](MergeResult::add) calls from a content-diff
/// producer, then consumed read-only by a formatter. Iteration is
/// restartable; each [`chunks`](MergeResult::chunks) call yields a fresh
/// cursor.
#[derive(Debug, Clone)]
pub struct MergeResult {
    sequences: Vec<RawText>,
    chunks: Vec<MergeChunk>,
    conflicts: bool,
}

impl MergeResult {
    /// Create an empty result over the given sequences
    /// (`sequences[0]` = common ancestor).
    pub fn new(sequences: Vec<RawText>) -> Self {
        Self {
            sequences,
            chunks: Vec::new(),
            conflicts: false,
        }
    }

    /// Append a chunk attributing lines `[begin, end)` of
    /// `sequences[sequence_index]`.
    pub fn add(&mut self, sequence_index: usize, begin: usize, end: usize, state: ConflictState) {
        debug_assert!(begin <= end, "chunk range must be non-decreasing");
        debug_assert!(sequence_index < self.sequences.len());
        if state != ConflictState::NoConflict {
            self.conflicts = true;
        }
        self.chunks.push(MergeChunk {
            sequence_index,
            begin,
            end,
            state,
        });
    }

    /// Iterate the chunks in append order.
    pub fn chunks(&self) -> impl Iterator<Item = &MergeChunk> {
        self.chunks.iter()
    }

    /// True iff any appended chunk carries a conflict state.
    pub fn contains_conflicts(&self) -> bool {
        self.conflicts
    }

    /// The input sequences.
    pub fn sequences(&self) -> &[RawText] {
        &self.sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_conflicts() {
        let result = MergeResult::new(vec![RawText::from("a\n")]);
        assert!(!result.contains_conflicts());
        assert_eq!(result.chunks().count(), 0);
    }

    #[test]
    fn add_tracks_conflicts() {
        let mut result = MergeResult::new(vec![
            RawText::from("base\n"),
            RawText::from("ours\n"),
            RawText::from("theirs\n"),
        ]);
        result.add(1, 0, 1, ConflictState::NoConflict);
        assert!(!result.contains_conflicts());
        result.add(1, 0, 1, ConflictState::FirstConflictingRange);
        result.add(2, 0, 1, ConflictState::NextConflictingRange);
        assert!(result.contains_conflicts());
    }

    #[test]
    fn chunk_iteration_is_restartable() {
        let mut result = MergeResult::new(vec![RawText::from("a\nb\n")]);
        result.add(0, 0, 1, ConflictState::NoConflict);
        result.add(0, 1, 2, ConflictState::NoConflict);

        let first: Vec<_> = result.chunks().collect();
        let second: Vec<_> = result.chunks().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn chunk_accessors() {
        let mut result = MergeResult::new(vec![RawText::from("a\nb\nc\n")]);
        result.add(0, 1, 3, ConflictState::NoConflict);
        let chunk = result.chunks().next().unwrap();
        assert_eq!(chunk.sequence_index(), 0);
        assert_eq!(chunk.begin(), 1);
        assert_eq!(chunk.end(), 3);
        assert_eq!(chunk.conflict_state(), ConflictState::NoConflict);
    }
}
