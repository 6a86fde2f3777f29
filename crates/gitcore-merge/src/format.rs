//! Git-conformant conflict-marker formatting.
//!
//! Renders a [`MergeResult`] plus per-sequence names into the textual
//! `<<<<<<<` / `=======` / `>>>>>>>` format. The output is byte-for-byte
//! what C git writes for the same chunk structure.

use std::io;

use crate::result::{ConflictState, MergeResult};

/// Write `result` to `out` in conflict-marker format.
///
/// `names[i]` labels `result.sequences()[i]`; index 0 is the common
/// ancestor. Non-conflicting chunks are emitted without markers. Every line
/// is terminated by `'\n'` regardless of the source sequence's own
/// terminators.
///
/// With exactly three sequences (the classic base/ours/theirs case) the
/// separator is a bare `"=======\n"`; with more sequences each continuation
/// side is named: `"======= <name>\n"`.
pub fn format_merge<W: io::Write>(
    out: &mut W,
    result: &MergeResult,
    names: &[&str],
) -> io::Result<()> {
    let three_way = result.sequences().len() == 3;
    let mut last_conflicting_name: Option<&str> = None;

    for chunk in result.chunks() {
        let seq = &result.sequences()[chunk.sequence_index()];

        // End of a conflict run.
        if last_conflicting_name.is_some()
            && chunk.conflict_state() != ConflictState::NextConflictingRange
        {
            if let Some(name) = last_conflicting_name.take() {
                writeln!(out, ">>>>>>> {name}")?;
            }
        }

        match chunk.conflict_state() {
            ConflictState::FirstConflictingRange => {
                let name = names[chunk.sequence_index()];
                writeln!(out, "<<<<<<< {name}")?;
                last_conflicting_name = Some(name);
            }
            ConflictState::NextConflictingRange => {
                let name = names[chunk.sequence_index()];
                last_conflicting_name = Some(name);
                if three_way {
                    out.write_all(b"=======\n")?;
                } else {
                    writeln!(out, "======= {name}")?;
                }
            }
            ConflictState::NoConflict => {}
        }

        for i in chunk.begin()..chunk.end() {
            out.write_all(seq.line(i))?;
            out.write_all(b"\n")?;
        }
    }

    // The result ended inside a conflict run.
    if let Some(name) = last_conflicting_name {
        writeln!(out, ">>>>>>> {name}")?;
    }

    Ok(())
}

/// Convenience for the base/ours/theirs case.
pub fn format_merge_three<W: io::Write>(
    out: &mut W,
    result: &MergeResult,
    base: &str,
    ours: &str,
    theirs: &str,
) -> io::Result<()> {
    format_merge(out, result, &[base, ours, theirs])
}
