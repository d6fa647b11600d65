//! Splits a Replace span into Delete/Insert runs using key order.
//!
//! The matcher only knows that nothing inside a Replace span lines up. When
//! both sides are sorted, a two-cursor merge recovers which keys were removed
//! and which were added, in the order they would appear in a merged listing.

use crate::error::{DiffResult, ExifDiffError};
use crate::ops::{EditOperation, OpTag};

/// Refines `op` (which must be a Replace) over sorted `left`/`right` keys.
///
/// The returned operations alternate between Delete and Insert runs and
/// cover exactly `op.left()` and `op.right()`.
pub fn refine_replace<K: Ord>(
    op: &EditOperation,
    left: &[K],
    right: &[K],
) -> DiffResult<Vec<EditOperation>> {
    if op.tag() != OpTag::Replace {
        return Err(ExifDiffError::InternalConsistency(format!(
            "cannot refine a {} operation",
            op.tag()
        )));
    }
    let (i1, i2) = (op.left().start, op.left().end);
    let (j1, j2) = (op.right().start, op.right().end);
    if i2 > left.len() || j2 > right.len() {
        return Err(ExifDiffError::InternalConsistency(format!(
            "replace span {i1}..{i2} / {j1}..{j2} exceeds sequences of {} / {}",
            left.len(),
            right.len()
        )));
    }

    let mut refined = Vec::new();
    let (mut i, mut j) = (i1, j1);
    while i < i2 || j < j2 {
        let start_i = i;
        while i < i2 && (j == j2 || left[i] < right[j]) {
            i += 1;
        }
        if i > start_i {
            refined.push(EditOperation::delete(start_i, i, j)?);
        }

        let start_j = j;
        while j < j2 && (i == i2 || right[j] < left[i]) {
            j += 1;
        }
        if j > start_j {
            refined.push(EditOperation::insert(i, start_j, j)?);
        }

        // Neither side moved: the cursors sit on identical keys.
        if i == start_i && j == start_j {
            return Err(ExifDiffError::InternalConsistency(format!(
                "replace span {i1}..{i2} / {j1}..{j2} stalled at {i} / {j}: shared key"
            )));
        }
    }
    Ok(refined)
}
