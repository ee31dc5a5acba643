//! CSV export of the three run tables.
//!
//! File names: `{test_}{posts|comments|combined}_{subreddit}.csv`, UTF-8,
//! comma-separated, header row, no index column.

use crate::tables::{ScrapeTables, Table};
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const WRITE_BUF_BYTES: usize = 256 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Posts,
    Comments,
    Combined,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Posts, TableKind::Comments, TableKind::Combined];

    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Posts => "posts",
            TableKind::Comments => "comments",
            TableKind::Combined => "combined",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn output_file_name(kind: TableKind, subreddit: &str, test_mode: bool) -> String {
    format!("{}{}_{}.csv", if test_mode { "test_" } else { "" }, kind, subreddit)
}

/// Write one table as CSV. Goes through `<path>.tmp` and is moved into place when complete;
/// on failure the temp file is removed and any existing `path` is left untouched.
pub fn write_table_csv(table: &Table, path: &Path) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    let res = write_rows(table, &tmp).and_then(|()| replace_file_atomic_backoff(&tmp, path));
    if res.is_err() && tmp.is_file() {
        if let Err(e) = fs::remove_file(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %e, "could not remove partial CSV");
        }
    }
    res
}

fn write_rows(table: &Table, tmp: &Path) -> Result<()> {
    let file = create_with_backoff(tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::with_capacity(WRITE_BUF_BYTES, file));

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    let mut inner = wtr.into_inner().map_err(|e| anyhow::anyhow!("flushing {}: {}", tmp.display(), e.error()))?;
    inner.flush()?;
    Ok(())
}

/// Write posts, comments and combined tables into `out_dir`. Returns the paths in that order.
pub fn export_tables(tables: &ScrapeTables, out_dir: &Path, subreddit: &str, test_mode: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(TableKind::ALL.len());
    for kind in TableKind::ALL {
        let table = match kind {
            TableKind::Posts => &tables.posts,
            TableKind::Comments => &tables.comments,
            TableKind::Combined => &tables.combined,
        };
        let path = out_dir.join(output_file_name(kind, subreddit, test_mode));
        write_table_csv(table, &path).with_context(|| format!("writing {} table", kind))?;
        tracing::info!(table = %kind, rows = table.len(), path = %path.display(), "wrote CSV");
        written.push(path);
    }
    Ok(written)
}
