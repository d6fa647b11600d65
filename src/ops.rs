//! Edit operations produced by the aligner and consumed by the renderer.

use std::fmt;
use std::ops::Range;

use crate::error::{DiffResult, ExifDiffError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl fmt::Display for OpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpTag::Equal => "equal",
            OpTag::Replace => "replace",
            OpTag::Delete => "delete",
            OpTag::Insert => "insert",
        };
        f.write_str(name)
    }
}

/// One span of an edit script: `left[i1..i2]` relates to `right[j1..j2]`.
///
/// The range shape is checked against the tag when the operation is built,
/// so consumers can rely on it without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    tag: OpTag,
    left: Range<usize>,
    right: Range<usize>,
}

impl EditOperation {
    pub fn new(tag: OpTag, left: Range<usize>, right: Range<usize>) -> DiffResult<Self> {
        let valid = left.start <= left.end
            && right.start <= right.end
            && match tag {
                OpTag::Equal => !left.is_empty() && left.len() == right.len(),
                OpTag::Replace => !left.is_empty() && !right.is_empty(),
                OpTag::Delete => !left.is_empty() && right.is_empty(),
                OpTag::Insert => left.is_empty() && !right.is_empty(),
            };
        if !valid {
            return Err(ExifDiffError::InternalConsistency(format!(
                "malformed {tag} operation {left:?} / {right:?}"
            )));
        }
        Ok(EditOperation { tag, left, right })
    }

    pub fn equal(i1: usize, i2: usize, j1: usize, j2: usize) -> DiffResult<Self> {
        Self::new(OpTag::Equal, i1..i2, j1..j2)
    }

    pub fn replace(i1: usize, i2: usize, j1: usize, j2: usize) -> DiffResult<Self> {
        Self::new(OpTag::Replace, i1..i2, j1..j2)
    }

    pub fn delete(i1: usize, i2: usize, j: usize) -> DiffResult<Self> {
        Self::new(OpTag::Delete, i1..i2, j..j)
    }

    pub fn insert(i: usize, j1: usize, j2: usize) -> DiffResult<Self> {
        Self::new(OpTag::Insert, i..i, j1..j2)
    }

    pub fn tag(&self) -> OpTag {
        self.tag
    }

    pub fn left(&self) -> Range<usize> {
        self.left.clone()
    }

    pub fn right(&self) -> Range<usize> {
        self.right.clone()
    }
}
