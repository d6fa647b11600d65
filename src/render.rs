use std::io::{self, Write};

use crate::error::{DiffResult, ExifDiffError};
use crate::metadata::MetadataRecord;
use crate::ops::{EditOperation, OpTag};

/// Change marker printed between the two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Same,
    Changed,
    Deleted,
    Inserted,
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Marker::Same => ' ',
            Marker::Changed => '|',
            Marker::Deleted => '<',
            Marker::Inserted => '>',
        }
    }
}

/// One output row before it is fitted to the column width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub left: String,
    pub marker: Marker,
    pub right: String,
}

impl DiffLine {
    fn deleted(left: String) -> Self {
        DiffLine {
            left,
            marker: Marker::Deleted,
            right: String::new(),
        }
    }

    fn inserted(right: String) -> Self {
        DiffLine {
            left: String::new(),
            marker: Marker::Inserted,
            right,
        }
    }
}

/// Fixed-width two column layout: `<left> <marker> <right>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    column_width: usize,
}

impl Layout {
    pub const MIN_WIDTH: usize = 3;

    pub fn new(total_width: usize) -> DiffResult<Self> {
        if total_width < Self::MIN_WIDTH {
            return Err(ExifDiffError::Usage(format!(
                "width must be at least {}, got {total_width}",
                Self::MIN_WIDTH
            )));
        }
        Ok(Layout {
            column_width: (total_width - 3) / 2,
        })
    }

    pub fn column_width(&self) -> usize {
        self.column_width
    }

    /// Pads and hard-truncates both cells to the column width.
    pub fn format(&self, line: &DiffLine) -> String {
        let w = self.column_width;
        format!(
            "{:<w$.w$} {} {:<w$.w$}",
            line.left,
            line.marker.symbol(),
            line.right
        )
    }
}

fn cell(record: &MetadataRecord, index: usize) -> DiffResult<(&str, String)> {
    let (key, value) = record.entry(index).ok_or_else(|| {
        ExifDiffError::InternalConsistency(format!(
            "index {index} is outside a record of {} entries",
            record.len()
        ))
    })?;
    Ok((key, format!("{key} : {value}")))
}

/// Turns an edit script over `left`/`right` into output rows.
///
/// Nothing is written here; a fault anywhere in the block leaves the caller
/// with an error and no partial output.
pub fn render_operations(
    left: &MetadataRecord,
    right: &MetadataRecord,
    ops: &[EditOperation],
) -> DiffResult<Vec<DiffLine>> {
    let mut lines = Vec::new();
    for op in ops {
        match op.tag() {
            OpTag::Equal => {
                for (i, j) in op.left().zip(op.right()) {
                    let (lkey, ltext) = cell(left, i)?;
                    let (rkey, rtext) = cell(right, j)?;
                    if lkey != rkey {
                        return Err(ExifDiffError::InternalConsistency(format!(
                            "equal span pairs {lkey:?} with {rkey:?}"
                        )));
                    }
                    // Same key, different value: flag the row, keep the tag.
                    let marker = if left.get(lkey) == right.get(rkey) {
                        Marker::Same
                    } else {
                        Marker::Changed
                    };
                    lines.push(DiffLine {
                        left: ltext,
                        marker,
                        right: rtext,
                    });
                }
            }
            OpTag::Delete => {
                for i in op.left() {
                    lines.push(DiffLine::deleted(cell(left, i)?.1));
                }
            }
            OpTag::Insert => {
                for j in op.right() {
                    lines.push(DiffLine::inserted(cell(right, j)?.1));
                }
            }
            OpTag::Replace => merge_replace(left, right, op, &mut lines)?,
        }
    }
    Ok(lines)
}

// Unsorted fallback: emit whichever side's key is smaller, one row at a time.
fn merge_replace(
    left: &MetadataRecord,
    right: &MetadataRecord,
    op: &EditOperation,
    lines: &mut Vec<DiffLine>,
) -> DiffResult<()> {
    let (mut i, i2) = (op.left().start, op.left().end);
    let (mut j, j2) = (op.right().start, op.right().end);
    while i < i2 || j < j2 {
        let l = if i < i2 { Some(cell(left, i)?) } else { None };
        let r = if j < j2 { Some(cell(right, j)?) } else { None };
        match (l, r) {
            (Some((lkey, ltext)), Some((rkey, _))) if lkey < rkey => {
                lines.push(DiffLine::deleted(ltext));
                i += 1;
            }
            (Some((lkey, _)), Some((rkey, rtext))) if rkey < lkey => {
                lines.push(DiffLine::inserted(rtext));
                j += 1;
            }
            (Some((_, ltext)), None) => {
                lines.push(DiffLine::deleted(ltext));
                i += 1;
            }
            (None, Some((_, rtext))) => {
                lines.push(DiffLine::inserted(rtext));
                j += 1;
            }
            (Some((key, _)), Some(_)) => {
                return Err(ExifDiffError::InternalConsistency(format!(
                    "replace span holds {key:?} on both sides"
                )));
            }
            (None, None) => break,
        }
    }
    Ok(())
}

/// Writes one block of rows followed by a blank line.
pub fn write_block<W: Write>(out: &mut W, layout: &Layout, lines: &[DiffLine]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", layout.format(line))?;
    }
    writeln!(out)
}
