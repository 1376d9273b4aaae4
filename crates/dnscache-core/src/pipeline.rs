//! Diagnostic text in, flattened table out.
//!
//! A [`RecordSource`] hands over one blob of diagnostic text. The pipeline
//! extracts records from it, inserts them into a fresh table in scan order
//! and writes the table to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::extract::RecordExtractor;
use crate::store::StoreWriter;
use crate::table::ChainedHashTable;

/// Anything that can produce a blob of DNS cache diagnostic text.
pub trait RecordSource {
    /// Short description used in logs and errors.
    fn name(&self) -> String;

    /// Produce the full diagnostic text.
    fn read_text(&self) -> StoreResult<String>;
}

/// Diagnostic text already held in memory.
#[derive(Debug, Clone)]
pub struct TextSource(pub String);

impl RecordSource for TextSource {
    fn name(&self) -> String {
        "<memory>".to_string()
    }

    fn read_text(&self) -> StoreResult<String> {
        Ok(self.0.clone())
    }
}

/// A diagnostic dump previously saved to disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_text(&self) -> StoreResult<String> {
        fs::read_to_string(&self.path).map_err(|e| StoreError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Failed to read diagnostic dump: {}", e),
        })
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Records extracted and inserted
    pub records_inserted: usize,
    /// Lines written to the output file
    pub lines_written: usize,
    /// Unique record names in the table
    pub distinct_keys: usize,
    /// Bucket count after all inserts
    pub capacity: usize,
    /// `records / capacity` after all inserts
    pub load_factor: f64,
}

/// Extraction, indexing and persistence wired together.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    extractor: RecordExtractor,
}

impl Pipeline {
    /// Build a pipeline, rejecting invalid configuration up front.
    pub fn new(config: Config) -> StoreResult<Self> {
        config.validate().map_err(|reason| StoreError::InvalidConfig { reason })?;
        let extractor = RecordExtractor::new(config.record_type.clone());
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    /// Insert every record found in `text`, in scan order. Returns the count.
    pub fn ingest(&self, table: &mut ChainedHashTable, text: &str) -> usize {
        let mut inserted = 0;
        for record in self.extractor.extract(text) {
            table.insert(record.name, record.value);
            inserted += 1;
        }
        inserted
    }

    /// Index the records in `text` into a new table sized by the config.
    pub fn build_table_from_text(&self, text: &str) -> StoreResult<ChainedHashTable> {
        let mut table = ChainedHashTable::from_config(&self.config)?;
        let inserted = self.ingest(&mut table, text);
        info!(records = inserted, capacity = table.capacity(), "indexed diagnostic text");
        Ok(table)
    }

    /// Read `source` and index its records into a new table.
    pub fn build_table(&self, source: &dyn RecordSource) -> StoreResult<ChainedHashTable> {
        let text = source.read_text()?;
        debug!(source = %source.name(), bytes = text.len(), "read diagnostic text");
        self.build_table_from_text(&text)
    }

    /// Write `table` to `output` and summarise the result.
    pub fn persist<P: AsRef<Path>>(&self, table: &ChainedHashTable, output: P) -> StoreResult<PipelineReport> {
        let output = output.as_ref();
        let lines_written = StoreWriter::write(table, output)?;
        let report = Self::report(table, lines_written);
        info!(
            output = %output.display(),
            records = report.records_inserted,
            distinct = report.distinct_keys,
            capacity = report.capacity,
            load_factor = report.load_factor,
            "pipeline finished"
        );
        Ok(report)
    }

    /// Source to table to flattened file.
    pub fn run<P: AsRef<Path>>(&self, source: &dyn RecordSource, output: P) -> StoreResult<PipelineReport> {
        let table = self.build_table(source)?;
        self.persist(&table, output)
    }

    /// Summarise `table` after `lines_written` lines went to disk.
    pub fn report(table: &ChainedHashTable, lines_written: usize) -> PipelineReport {
        PipelineReport {
            records_inserted: table.len(),
            lines_written,
            distinct_keys: table.distinct_keys(),
            capacity: table.capacity(),
            load_factor: table.load_factor(),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { config: Config::default(), extractor: RecordExtractor::default() }
    }
}
