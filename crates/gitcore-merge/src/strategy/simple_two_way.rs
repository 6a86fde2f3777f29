//! The in-core three-way tree merge.
//!
//! Walks base, ours and theirs in lockstep and resolves each path in a
//! single pass. Content-identical sides and one-sided edits resolve to
//! stage 0; everything else is staged as a conflict (stages 1/2/3). A path
//! that is a file on one side and a directory on another is a conflict as
//! well: the file sides are staged and the directory sides are descended
//! into, so nested conflicts surface individually.

use bstr::BString;
use gitcore_hash::ObjectId;
use gitcore_object::{FileMode, Tree};
use gitcore_odb::ObjectStore;

use crate::stage::{Stage, StageBuilder, StageEntry, StagedIndex};
use crate::walk::{MultiTreeWalk, WalkRow, MODE_TREE};
use crate::MergeError;

const T_BASE: usize = 0;
const T_OURS: usize = 1;
const T_THEIRS: usize = 2;

fn non_tree(mode: u32) -> bool {
    mode != 0 && mode != MODE_TREE
}

/// Stage one side of the current row. Absent sides are skipped; a subtree
/// side is expanded so every blob beneath it lands at the given stage.
fn add(
    builder: &mut StageBuilder,
    odb: &dyn ObjectStore,
    row: &WalkRow,
    side: usize,
    stage: Stage,
) -> Result<(), MergeError> {
    let mode = row.raw_mode(side);
    if mode == 0 {
        return Ok(());
    }
    if row.is_tree(side) {
        let mut prefix = BString::from(row.path());
        prefix.push(b'/');
        builder.add_tree(odb, prefix.as_ref(), stage, &row.oid(side))
    } else {
        builder.add(StageEntry {
            path: BString::from(row.path()),
            mode: FileMode::from_raw(mode),
            oid: row.oid(side),
            stage,
        });
        Ok(())
    }
}

/// Merge `ours` and `theirs` over the common ancestor `base`.
///
/// Returns the staged index and, for a clean merge, the written result tree.
/// A `None` tree means the merge failed with conflicts recorded in the index.
pub(crate) fn merge_trees(
    odb: &dyn ObjectStore,
    base: Tree,
    ours: Tree,
    theirs: Tree,
) -> Result<(StagedIndex, Option<ObjectId>), MergeError> {
    let mut walk = MultiTreeWalk::new(odb, vec![base, ours, theirs]);
    let mut builder = StageBuilder::new();
    let mut has_conflict = false;

    while let Some(row) = walk.next()? {
        let mode_o = row.raw_mode(T_OURS);
        let mode_t = row.raw_mode(T_THEIRS);

        // Same content on both sides, whatever the base says.
        if mode_o == mode_t && row.id_equal(T_OURS, T_THEIRS) {
            add(&mut builder, odb, &row, T_OURS, Stage::Merged)?;
            continue;
        }

        let mode_b = row.raw_mode(T_BASE);
        if mode_b == mode_o && row.id_equal(T_BASE, T_OURS) {
            // Only theirs changed.
            add(&mut builder, odb, &row, T_THEIRS, Stage::Merged)?;
        } else if mode_b == mode_t && row.id_equal(T_BASE, T_THEIRS) {
            // Only ours changed.
            add(&mut builder, odb, &row, T_OURS, Stage::Merged)?;
        } else if row.is_subtree() {
            // Mixed file/directory row, or directories needing a deeper
            // look. File sides conflict here; directory sides are walked.
            if non_tree(mode_b) {
                add(&mut builder, odb, &row, T_BASE, Stage::Base)?;
                has_conflict = true;
            }
            if non_tree(mode_o) {
                add(&mut builder, odb, &row, T_OURS, Stage::Ours)?;
                has_conflict = true;
            }
            if non_tree(mode_t) {
                add(&mut builder, odb, &row, T_THEIRS, Stage::Theirs)?;
                has_conflict = true;
            }
            walk.enter_subtree();
        } else {
            add(&mut builder, odb, &row, T_BASE, Stage::Base)?;
            add(&mut builder, odb, &row, T_OURS, Stage::Ours)?;
            add(&mut builder, odb, &row, T_THEIRS, Stage::Theirs)?;
            has_conflict = true;
        }
    }

    let index = builder.finish()?;
    if has_conflict {
        return Ok((index, None));
    }
    match index.write_tree(odb) {
        Ok(tree) => Ok((index, Some(tree))),
        // An entry above stage 0 slipped through; report failure, not error.
        Err(MergeError::UnmergedPath { .. }) => Ok((index, None)),
        Err(err) => Err(err),
    }
}
