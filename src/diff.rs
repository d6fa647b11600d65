use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::align::edit_script;
use crate::cli::Options;
use crate::error::{DiffResult, ExifDiffError};
use crate::exiftool::MetadataSource;
use crate::metadata::MetadataRecord;
use crate::render::{render_operations, write_block, DiffLine, Layout, Marker};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DiffStats {
    pub pairs: usize,
    pub same: usize,
    pub changed: usize,
    pub deleted: usize,
    pub inserted: usize,
    pub aborted: usize,
}

impl DiffStats {
    fn count(&mut self, lines: &[DiffLine]) {
        for line in lines {
            match line.marker {
                Marker::Same => self.same += 1,
                Marker::Changed => self.changed += 1,
                Marker::Deleted => self.deleted += 1,
                Marker::Inserted => self.inserted += 1,
            }
        }
    }
}

/// Rows for one consecutive record pair. Replace spans are refined by key
/// order only when both records have been sorted.
pub fn diff_pair(left: &MetadataRecord, right: &MetadataRecord) -> DiffResult<Vec<DiffLine>> {
    let sorted = left.is_sorted() && right.is_sorted();
    let ops = edit_script(left.keys(), right.keys(), sorted)?;
    debug!(operations = ops.len(), sorted, "aligned record pair");
    render_operations(left, right, &ops)
}

/// Fetches every file's metadata in one batch, then prints a block for each
/// consecutive pair (1,2), (2,3), ... in input order.
///
/// A fetch failure returns before anything is written. A block that breaks
/// an internal invariant is skipped and counted in `aborted`.
pub fn run_exifdiff<S, W>(source: &mut S, opts: &Options, out: &mut W) -> Result<DiffStats>
where
    S: MetadataSource,
    W: Write,
{
    let layout = Layout::new(opts.width)?;
    let mut records = source
        .fetch(&opts.files)
        .context("failed to read metadata")?;
    if records.len() != opts.files.len() {
        return Err(ExifDiffError::MetadataFetch(format!(
            "expected {} records, got {}",
            opts.files.len(),
            records.len()
        ))
        .into());
    }

    if opts.sorted {
        for record in &mut records {
            record.sort();
        }
    }

    print_blocks(&records, &opts.files, &layout, out, diff_pair)
}

fn print_blocks<W, F>(
    records: &[MetadataRecord],
    files: &[PathBuf],
    layout: &Layout,
    out: &mut W,
    mut diff: F,
) -> Result<DiffStats>
where
    W: Write,
    F: FnMut(&MetadataRecord, &MetadataRecord) -> DiffResult<Vec<DiffLine>>,
{
    let mut stats = DiffStats::default();
    for (idx, pair) in records.windows(2).enumerate() {
        stats.pairs += 1;
        match diff(&pair[0], &pair[1]) {
            Ok(lines) => {
                write_block(out, layout, &lines).context("failed to write diff")?;
                stats.count(&lines);
            }
            Err(e) if e.is_block_fault() => {
                error!(
                    left = %files[idx].display(),
                    right = %files[idx + 1].display(),
                    "skipping diff block: {e}"
                );
                stats.aborted += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    out.flush().context("failed to write diff")?;
    Ok(stats)
}
