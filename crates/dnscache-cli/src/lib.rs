//! dnscache command-line front end
//!
//! Captures the DNS cache (or reads a saved dump), indexes the `A` records,
//! prints what was asked for and writes the flattened table.

pub mod source;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use dnscache_core::{
    ChainedHashTable, Config, FileSource, Pipeline, RecordSource, StoreWriter,
};

pub use source::{CommandSource, DEFAULT_COMMAND};

/// Default flattened output file
pub const DEFAULT_OUTPUT: &str = "dns_cache.txt";

#[derive(Parser, Debug, Clone)]
#[command(name = "dnscache")]
#[command(about = "Index the DNS resolver cache in a chained hash table", long_about = None)]
pub struct Args {
    /// Flattened `key value` output file
    #[arg(default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Read a saved diagnostic dump instead of running the command
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Diagnostic command to run when no input file is given
    #[arg(long, default_value = DEFAULT_COMMAND)]
    pub command: String,

    /// Also save the raw diagnostic text here
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Number of buckets
    #[arg(short, long)]
    pub capacity: Option<usize>,

    /// Grow the table once this load factor would be exceeded
    #[arg(long)]
    pub max_load_factor: Option<f64>,

    /// Record type to keep
    #[arg(short = 't', long, default_value = "A")]
    pub record_type: String,

    /// Look a name up and print the result (repeatable)
    #[arg(short, long = "lookup", value_name = "NAME")]
    pub lookups: Vec<String>,

    /// Delete one entry for a name, then look it up again (repeatable)
    #[arg(short, long = "evict", value_name = "NAME")]
    pub evictions: Vec<String>,

    /// Print every entry
    #[arg(short, long)]
    pub print: bool,
}

impl Args {
    /// Map flags onto a configuration preset.
    pub fn config(&self) -> Config {
        let mut config = if self.max_load_factor.is_some() {
            Config::growable()
        } else {
            Config::fixed()
        };
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if self.max_load_factor.is_some() {
            config.max_load_factor = self.max_load_factor;
        }
        config.record_type = self.record_type.clone();
        config
    }

    fn source(&self) -> Box<dyn RecordSource> {
        match &self.input {
            Some(path) => Box::new(FileSource::new(path)),
            None => Box::new(CommandSource::new(self.command.clone())),
        }
    }
}

fn print_lookup(out: &mut dyn Write, table: &ChainedHashTable, name: &str, suffix: &str) -> std::io::Result<()> {
    match table.get(name) {
        Some(value) => writeln!(out, "Search result for {}{}: {}", name, suffix, value),
        None => writeln!(out, "Search result for {}{}: no data found", name, suffix),
    }
}

/// Run one capture/index/write cycle, writing user-facing output to `out`.
pub fn run(args: &Args, out: &mut dyn Write) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(args.config())?;
    let source = args.source();

    let text = source.read_text()?;
    if let Some(dump) = &args.dump {
        StoreWriter::dump_raw(&text, dump)
            .with_context(|| format!("saving raw dump to {}", dump.display()))?;
    }

    let mut table = pipeline.build_table_from_text(&text)?;
    debug!(source = %source.name(), entries = table.len(), "table built");

    if args.print {
        for (key, value) in &table {
            writeln!(out, "Key: {}, Value: {}", key, value)?;
        }
    }

    pipeline
        .persist(&table, &args.output)
        .with_context(|| format!("writing table to {}", args.output.display()))?;

    for name in &args.lookups {
        print_lookup(out, &table, name, "")?;
    }

    for name in &args.evictions {
        match table.delete(name) {
            Some(value) => writeln!(out, "Deleted {} ({})", name, value)?,
            None => writeln!(out, "Nothing to delete for {}", name)?,
        }
        print_lookup(out, &table, name, " after deletion")?;
    }

    Ok(())
}
