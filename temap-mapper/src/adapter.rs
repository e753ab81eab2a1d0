//! Reading aligner output into [`AlignedRead`]s.
//!
//! The expected input is one tab-separated record per aligned segment:
//!
//! | read_id | contig | position | strand | length | clip_start | clip_end | target | te_family | mate |
//! |---------|--------|----------|--------|--------|------------|----------|--------|-----------|------|
//! | r1      | 2L     | 1000     | +      | 100    | 0          | 0        | GENOME | *         | r1   |
//!
//! `*` (or an empty column) marks an absent family or mate. Blank lines, `#`
//! comments and a header (the first other line, when its first column is
//! `read_id`) are ignored. Lines that
//! fail to parse or violate the record invariants are skipped and reported.
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::warn;

use temap_core::errors::{RecordError, RecordResult};
use temap_core::models::{AlignedRead, Strand, Target};
use temap_core::utils::get_dynamic_reader;

use crate::consts::{COMMENT_PREFIX, EMPTY_FIELD, RECORD_COLUMNS, RECORD_HEADER_FIRST_FIELD};
use crate::errors::{MapperError, MapperResult};

/// A rejected input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub line: usize,
    pub reason: RecordError,
}

/// Every usable segment from one input, plus the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub reads: Vec<AlignedRead>,
    pub skipped: Vec<SkippedRecord>,
}

impl RecordBatch {
    pub fn records_read(&self) -> u64 {
        (self.reads.len() + self.skipped.len()) as u64
    }
}

///
/// Build a batch from reads constructed in memory. Reads that break the record
/// invariants are moved to `skipped`; `line` is then the 1-based index in `reads`.
///
impl From<Vec<AlignedRead>> for RecordBatch {
    fn from(reads: Vec<AlignedRead>) -> Self {
        let mut batch = RecordBatch::default();
        for (index, read) in reads.into_iter().enumerate() {
            match read.validate() {
                Ok(()) => batch.reads.push(read),
                Err(reason) => batch.skipped.push(SkippedRecord {
                    line: index + 1,
                    reason,
                }),
            }
        }
        batch
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> RecordResult<T> {
    value.parse::<T>().map_err(|_| RecordError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn optional_field(value: &str) -> Option<String> {
    match value {
        "" | EMPTY_FIELD => None,
        v => Some(v.to_string()),
    }
}

///
/// Parse and validate a single record line.
///
pub fn parse_record(line: &str) -> RecordResult<AlignedRead> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != RECORD_COLUMNS {
        return Err(RecordError::FieldCount {
            expected: RECORD_COLUMNS,
            found: fields.len(),
        });
    }

    let read = AlignedRead {
        read_id: fields[0].to_string(),
        contig: fields[1].to_string(),
        position: parse_field("position", fields[2])?,
        strand: Strand::from_str(fields[3])?,
        length: parse_field("length", fields[4])?,
        clip_start: parse_field("clip_start", fields[5])?,
        clip_end: parse_field("clip_end", fields[6])?,
        target: Target::from_str(fields[7])?,
        te_family: optional_field(fields[8]),
        mate: optional_field(fields[9]),
    };
    read.validate()?;

    Ok(read)
}

fn is_ignorable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(COMMENT_PREFIX)
}

fn is_header(line: &str) -> bool {
    line.split('\t').next() == Some(RECORD_HEADER_FIRST_FIELD)
}

///
/// Read every record from a buffered reader. Bad lines are skipped and
/// counted; only I/O failures abort the read.
///
pub fn read_records<R: BufRead>(reader: R) -> MapperResult<RecordBatch> {
    let mut batch = RecordBatch::default();
    let mut first = true;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if is_ignorable(line) {
            continue;
        }
        if std::mem::take(&mut first) && is_header(line) {
            continue;
        }

        match parse_record(line) {
            Ok(read) => batch.reads.push(read),
            Err(reason) => {
                let error = MapperError::MalformedRecord {
                    line: index + 1,
                    source: reason.clone(),
                };
                warn!("Skipping record: {}", error);
                batch.skipped.push(SkippedRecord {
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

///
/// Read an alignment record file, gzip'd or not.
///
/// # Arguments
/// - path: path to the record file
///
pub fn read_alignment_file(path: &Path) -> Result<RecordBatch> {
    let reader = get_dynamic_reader(path)?;
    read_records(reader).with_context(|| format!("Failed to read alignment records: {:?}", path))
}
