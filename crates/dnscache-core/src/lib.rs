//! dnscache core: a DNS cache snapshot indexed in a chained hash table
//!
//! Takes the text a DNS cache diagnostic command prints, pulls out
//! `(name, address)` records, indexes them in a separate-chaining hash table
//! and writes the table to a flat `key value` file.
//!
//! # Architecture
//!
//! - **Extraction**: a fixed three-line template matched left to right
//! - **Table**: polynomial hash into owned per-bucket chains, newest first
//! - **Store**: staged writes renamed into place; dumps and flattened files
//!   are kept apart
//!
//! How the diagnostic text is obtained is left to the caller through
//! [`RecordSource`]. The `dnscache-cli` crate shells out for it.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod platform_durability;
pub mod store;
pub mod table;

// Re-export key types for convenience
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use extract::{Record, RecordExtractor};
pub use pipeline::{FileSource, Pipeline, PipelineReport, RecordSource, TextSource};
pub use store::{StoreLoader, StoreWriter};
pub use table::{bucket_hash, ChainedHashTable};
