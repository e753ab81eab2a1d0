//! # TE insertion-site mapping
//!
//! Turns aligned short-read evidence into transposable-element insertion calls.
//!
//! The pipeline runs in five steps:
//!
//! - **adapter**: parse aligner records into [`AlignedRead`](temap_core::models::AlignedRead)s,
//!   skipping and counting malformed lines
//! - **classify**: label each read or read pair as junction, anchor or discard evidence
//! - **cluster**: sweep the sorted breakpoints of every (evidence, strand) stream of a
//!   contig into window-bounded clusters
//! - **resolve**: merge junction and anchor clusters into flank events, pair opposite
//!   flanks and turn each event into an [`InsertionCall`](temap_core::models::InsertionCall)
//! - **emit**: sort the calls and write them as TSV or JSON
//!
//! Contigs are processed in parallel and independently; a failure on one contig only
//! drops that contig's calls.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use temap_mapper::{CallsWrite, MapperConfig, OutputFormat, Pipeline, read_alignment_file};
//!
//! let batch = read_alignment_file(Path::new("alignments.tsv.gz")).unwrap();
//! let pipeline = Pipeline::new(&MapperConfig::default()).unwrap();
//! let output = pipeline.run(batch).unwrap();
//!
//! output.calls.write_calls("calls.tsv", OutputFormat::Tsv).unwrap();
//! println!("{}", output.summary);
//! ```
pub mod adapter;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod consts;
pub mod disjoint_set;
pub mod emit;
pub mod errors;
pub mod grouping;
pub mod library;
pub mod pipeline;
pub mod resolve;
pub mod summary;

// re-exports
pub use adapter::{RecordBatch, SkippedRecord, read_alignment_file, read_records};
pub use classify::{AnnotatedClipMatcher, ClipMatcher, ReadClassifier};
pub use config::{MapperConfig, MapperParams};
pub use emit::{CallsWrite, OutputFormat, sort_calls};
pub use errors::{ConfigError, MapperError, MapperResult};
pub use pipeline::{CancelToken, Pipeline, PipelineOutput};
pub use summary::{ClassCounts, ContigFailure, RunSummary};
