use crate::model::{RawComment, RawRow, RAW_COLUMNS};
use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const BUF_BYTES: usize = 256 * 1024;

/// Buffered CSV writer that writes to `<final>.inprogress` and promotes the file
/// atomically on `finish`, so readers never observe a half-written table.
pub struct CsvTableWriter {
    tmp_path: PathBuf,
    final_path: PathBuf,
    w: csv::Writer<BufWriter<File>>,
    rows: usize,
}

impl CsvTableWriter {
    /// Create the temp file and write `header` immediately, so empty tables still
    /// carry their columns.
    pub fn create(final_path: &Path, header: &[&str]) -> Result<Self> {
        if let Some(parent) = final_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
            }
        }
        let mut tmp_name = final_path.as_os_str().to_owned();
        tmp_name.push(".inprogress");
        let tmp_path = PathBuf::from(tmp_name);

        let f = create_with_backoff(&tmp_path, 16, 50)
            .with_context(|| format!("create {}", tmp_path.display()))?;
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::with_capacity(BUF_BYTES, f));
        w.write_record(header).with_context(|| format!("write header {}", tmp_path.display()))?;
        Ok(Self { tmp_path, final_path: final_path.to_path_buf(), w, rows: 0 })
    }

    pub fn write<T: Serialize>(&mut self, row: &T) -> Result<()> {
        self.w.serialize(row).with_context(|| format!("write row {}", self.tmp_path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush, then replace the final path. Returns rows written (header excluded).
    pub fn finish(self) -> Result<usize> {
        let Self { tmp_path, final_path, w, rows } = self;
        let mut inner = w
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush {}: {}", tmp_path.display(), e.error()))?;
        inner.flush().with_context(|| format!("flush {}", tmp_path.display()))?;
        drop(inner);
        replace_file_atomic_backoff(&tmp_path, &final_path)?;
        Ok(rows)
    }
}

/// Write a whole table in one go.
pub fn write_table<T, I>(path: &Path, header: &[&str], rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut w = CsvTableWriter::create(path, header)?;
    for row in rows {
        w.write(&row)?;
    }
    w.finish()
}

/// Write fetched comments in the raw layout, with derived `char_len`/`word_count`.
pub fn write_raw_comments<'a, I>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a RawComment>,
{
    write_table(path, RAW_COLUMNS, rows.into_iter().map(RawRow::from))
}

/// Read every record of a headed CSV into `T`. Unknown columns are ignored.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::with_capacity(BUF_BYTES, f));
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<T>().enumerate() {
        let row = rec.with_context(|| format!("{}: bad record #{}", path.display(), i + 1))?;
        out.push(row);
    }
    Ok(out)
}
