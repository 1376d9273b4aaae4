//! Flat-file persistence.
//!
//! Two on-disk formats are involved and they are never interchangeable:
//!
//! - **Flattened file**: one `key value` line per table entry, written by
//!   [`StoreWriter::write`] and read back as raw pairs by
//!   [`StoreLoader::read_pairs`]. No escaping is done, so a key containing a
//!   space will not survive a round trip.
//! - **Diagnostic dump**: raw text from the diagnostic command, written by
//!   [`StoreWriter::dump_raw`] and turned into records by
//!   [`StoreLoader::load`].
//!
//! Writes go to a uniquely named staging file in the destination's directory,
//! which is synced and then renamed over the destination, so the destination
//! is either untouched or complete. A symlinked destination is resolved first
//! and its target is the file that gets replaced.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::extract::{Record, RecordExtractor};
use crate::platform_durability::durable_sync;
use crate::table::ChainedHashTable;

/// Separator between key and value in the flattened file
pub const PAIR_SEPARATOR: char = ' ';

fn io_error(path: &Path, e: &io::Error, what: &str) -> StoreError {
    StoreError::Io {
        path: Some(path.to_path_buf()),
        kind: e.kind(),
        message: format!("{}: {}", what, e),
    }
}

/// The file a write to `path` should replace: symlinks are followed, even
/// dangling ones, so the link itself survives.
fn resolve_destination(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    match fs::read_link(path) {
        Ok(target) if target.is_absolute() => target,
        Ok(target) => path.parent().unwrap_or_else(|| Path::new("")).join(target),
        Err(_) => path.to_path_buf(),
    }
}

/// Stage `fill`'s output next to the destination, sync it, then rename it
/// into place. On any failure the staging file is dropped (and deleted) and
/// the destination is left alone. Errors always name `path` as given.
fn write_atomically<F>(path: &Path, fill: F) -> StoreResult<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let target = resolve_destination(path);
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|e| io_error(path, &e, "Failed to open file for writing"))?;

    let result = (|| {
        let mut out = BufWriter::new(staged.as_file_mut());
        fill(&mut out)?;
        out.flush()?;
        drop(out);
        durable_sync(staged.as_file())
    })();
    if let Err(e) = result {
        return Err(io_error(path, &e, "Failed to write file"));
    }

    staged
        .persist(&target)
        .map(|_| ())
        .map_err(|e| io_error(path, &e.error, "Failed to replace file"))
}

/// Writes table contents and raw diagnostic text to disk.
pub struct StoreWriter;

impl StoreWriter {
    /// Write one `key value` line per entry, in `iter()` order, replacing any
    /// previous content. Returns the number of lines written.
    pub fn write<P: AsRef<Path>>(table: &ChainedHashTable, path: P) -> StoreResult<usize> {
        let path = path.as_ref();
        let mut lines = 0usize;

        write_atomically(path, |out| {
            for (key, value) in table.iter() {
                writeln!(out, "{}{}{}", key, PAIR_SEPARATOR, value)?;
                lines += 1;
            }
            Ok(())
        })?;

        debug!(path = %path.display(), lines, "wrote flattened table");
        Ok(lines)
    }

    /// Save raw diagnostic text verbatim, in the format `StoreLoader::load` reads.
    pub fn dump_raw<P: AsRef<Path>>(text: &str, path: P) -> StoreResult<()> {
        let path = path.as_ref();
        write_atomically(path, |out| out.write_all(text.as_bytes()))?;
        debug!(path = %path.display(), bytes = text.len(), "wrote diagnostic dump");
        Ok(())
    }
}

/// Reads records and pairs back from disk.
pub struct StoreLoader;

impl StoreLoader {
    /// Extract `A` records from a diagnostic dump file.
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Vec<Record>> {
        Self::load_with(path, &RecordExtractor::default())
    }

    /// Extract records from a diagnostic dump file with a specific extractor.
    pub fn load_with<P: AsRef<Path>>(path: P, extractor: &RecordExtractor) -> StoreResult<Vec<Record>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| io_error(path, &e, "Failed to read diagnostic dump"))?;
        let records = extractor.extract_all(&text);
        debug!(path = %path.display(), records = records.len(), "loaded diagnostic dump");
        Ok(records)
    }

    /// Read a flattened file back as `(key, value)` pairs.
    ///
    /// Each line is split at its first space. Blank lines are skipped.
    pub fn read_pairs<P: AsRef<Path>>(path: P) -> StoreResult<Vec<(String, String)>> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| io_error(path, &e, "Failed to open flattened file"))?;

        let mut pairs = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error(path, &e, "Failed to read flattened file"))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(PAIR_SEPARATOR) {
                Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
                None => {
                    return Err(StoreError::MalformedLine {
                        path: path.to_path_buf(),
                        line_number: idx + 1,
                        line: line.to_string(),
                    })
                }
            }
        }
        Ok(pairs)
    }
}
