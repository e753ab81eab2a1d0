use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use temap_core::models::InsertionCall;
use temap_core::utils::get_dynamic_writer;

use crate::consts::CALLS_HEADER;
use crate::errors::{MapperError, MapperResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {other} (expected tsv or json)")),
        }
    }
}

fn call_order(a: &InsertionCall, b: &InsertionCall) -> Ordering {
    (
        &a.contig,
        a.estimated_position,
        a.strand,
        a.interval_start,
        a.interval_end,
        &a.te_family,
    )
        .cmp(&(
            &b.contig,
            b.estimated_position,
            b.strand,
            b.interval_start,
            b.interval_end,
            &b.te_family,
        ))
}

///
/// Put calls in output order: by contig, then position. The remaining fields
/// only break ties, so the order is the same however the calls were produced.
///
pub fn sort_calls(calls: &mut [InsertionCall]) {
    calls.sort_by(call_order);
}

pub trait CallsWrite {
    ///
    /// Write calls as tab-separated lines, with a header row.
    ///
    /// # Arguments
    /// - writer: where to write the calls
    fn write_tsv<W: Write>(&self, writer: &mut W) -> MapperResult<()>;

    ///
    /// Write calls as a pretty-printed JSON array.
    ///
    /// # Arguments
    /// - writer: where to write the calls
    fn write_json<W: Write>(&self, writer: &mut W) -> MapperResult<()>;

    ///
    /// Write calls to a file, gzip'd if the path ends in `.gz`.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    /// - format: tsv or json
    fn write_calls<T: AsRef<Path>>(&self, path: T, format: OutputFormat) -> anyhow::Result<()>;
}

impl CallsWrite for [InsertionCall] {
    fn write_tsv<W: Write>(&self, writer: &mut W) -> MapperResult<()> {
        writeln!(writer, "{}", CALLS_HEADER)?;
        for call in self {
            writeln!(writer, "{}", call.as_string())?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, writer: &mut W) -> MapperResult<()> {
        serde_json::to_writer_pretty(&mut *writer, self).map_err(MapperError::Json)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_calls<T: AsRef<Path>>(&self, path: T, format: OutputFormat) -> anyhow::Result<()> {
        let mut writer = get_dynamic_writer(path.as_ref())?;
        match format {
            OutputFormat::Tsv => self.write_tsv(&mut writer)?,
            OutputFormat::Json => self.write_json(&mut writer)?,
        }
        writer.flush()?;
        Ok(())
    }
}
