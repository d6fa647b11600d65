use std::hash::Hash;

use similar::{capture_diff_slices, Algorithm, DiffTag};
use tracing::trace;

use crate::error::DiffResult;
use crate::ops::{EditOperation, OpTag};
use crate::refine::refine_replace;

/// Minimal edit script between two key sequences.
///
/// Replace spans are left as they come out of the matcher. Myers without a
/// deadline is exact, so the Equal spans form a longest common subsequence.
pub fn align<K: Ord + Hash>(left: &[K], right: &[K]) -> DiffResult<Vec<EditOperation>> {
    capture_diff_slices(Algorithm::Myers, left, right)
        .iter()
        .map(|op| {
            let (tag, old, new) = op.as_tag_tuple();
            let tag = match tag {
                DiffTag::Equal => OpTag::Equal,
                DiffTag::Replace => OpTag::Replace,
                DiffTag::Delete => OpTag::Delete,
                DiffTag::Insert => OpTag::Insert,
            };
            EditOperation::new(tag, old, new)
        })
        .collect()
}

/// Edit script for one record pair. With `sorted` keys every Replace span is
/// refined into Delete/Insert runs; otherwise Replace spans are kept for the
/// renderer's merge fallback.
pub fn edit_script<K: Ord + Hash>(
    left: &[K],
    right: &[K],
    sorted: bool,
) -> DiffResult<Vec<EditOperation>> {
    let ops = align(left, right)?;
    if !sorted {
        return Ok(ops);
    }

    let mut script = Vec::with_capacity(ops.len());
    for op in ops {
        if op.tag() == OpTag::Replace {
            trace!(left = ?op.left(), right = ?op.right(), "refining replace span");
            script.extend(refine_replace(&op, left, right)?);
        } else {
            script.push(op);
        }
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(ops: &[EditOperation]) -> Vec<OpTag> {
        ops.iter().map(EditOperation::tag).collect()
    }

    #[test]
    fn identical_sequences_are_one_equal_span() {
        let keys = ["A", "B", "C"];
        let ops = align(&keys, &keys).unwrap();
        assert_eq!(ops, [EditOperation::equal(0, 3, 0, 3).unwrap()]);
    }

    #[test]
    fn empty_sequences_produce_no_operations() {
        let empty: [&str; 0] = [];
        assert!(align(&empty, &empty).unwrap().is_empty());
        assert_eq!(
            align(&empty, &["A"]).unwrap(),
            [EditOperation::insert(0, 0, 1).unwrap()]
        );
        assert_eq!(
            align(&["A"], &empty).unwrap(),
            [EditOperation::delete(0, 1, 0).unwrap()]
        );
    }

    #[test]
    fn sorted_keys_with_one_removed_and_one_added() {
        let left = ["A", "B", "C"];
        let right = ["A", "C", "D"];
        let ops = edit_script(&left, &right, true).unwrap();
        assert_eq!(
            ops,
            [
                EditOperation::equal(0, 1, 0, 1).unwrap(),
                EditOperation::delete(1, 2, 1).unwrap(),
                EditOperation::equal(2, 3, 1, 2).unwrap(),
                EditOperation::insert(3, 2, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn disjoint_keys_produce_a_replace_span() {
        let ops = align(&["B", "D"], &["A", "C"]).unwrap();
        assert!(!ops.is_empty());
        assert!(tags(&ops).iter().all(|tag| *tag == OpTag::Replace));
    }

    #[test]
    fn sorted_script_has_no_replace() {
        let left = ["A", "C", "E", "G"];
        let right = ["B", "C", "D", "F"];
        let ops = edit_script(&left, &right, true).unwrap();
        assert!(!tags(&ops).contains(&OpTag::Replace));
    }

    #[test]
    fn unsorted_script_keeps_replace() {
        let ops = edit_script(&["B", "D"], &["A", "C"], false).unwrap();
        assert!(tags(&ops).contains(&OpTag::Replace));
    }

    #[test]
    fn equal_spans_match_keys() {
        let left = ["A", "X", "B", "C", "Y"];
        let right = ["A", "B", "Z", "C"];
        for op in align(&left, &right).unwrap() {
            if op.tag() == OpTag::Equal {
                for (i, j) in op.left().zip(op.right()) {
                    assert_eq!(left[i], right[j]);
                }
            }
        }
    }
}
