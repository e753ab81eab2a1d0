//! Run-level counters, returned alongside the calls.
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::Serialize;

use temap_core::models::{ClassifiedRead, DiscardReason, ReadClass};

use crate::adapter::SkippedRecord;
use crate::config::AnchorWindowSource;
use crate::errors::MapperError;

/// How many units landed in each class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub junction: u64,
    pub anchor: u64,
    pub discarded: u64,
    pub discard_reasons: BTreeMap<DiscardReason, u64>,
}

impl ClassCounts {
    pub fn record(&mut self, read: &ClassifiedRead) {
        match read.class {
            ReadClass::Junction => self.junction += 1,
            ReadClass::Anchor => self.anchor += 1,
            ReadClass::Discard(reason) => {
                self.discarded += 1;
                *self.discard_reasons.entry(reason).or_default() += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &ClassCounts) {
        self.junction += other.junction;
        self.anchor += other.anchor;
        self.discarded += other.discarded;
        for (reason, count) in &other.discard_reasons {
            *self.discard_reasons.entry(*reason).or_default() += count;
        }
    }

    pub fn total(&self) -> u64 {
        self.junction + self.anchor + self.discarded
    }
}

/// A contig whose calls were dropped because processing it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContigFailure {
    pub contig: String,
    pub cause: String,
}

impl ContigFailure {
    pub fn new(contig: &str, error: &MapperError) -> Self {
        ContigFailure {
            contig: contig.to_string(),
            cause: error.to_string(),
        }
    }
}

impl Display for ContigFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to process contig {}: {}", self.contig, self.cause)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records_read: u64,
    pub records_skipped: u64,
    pub classes: ClassCounts,
    pub clusters_formed: u64,
    pub calls_emitted: u64,
    pub contigs_processed: u64,
    pub failed_contigs: Vec<ContigFailure>,
    pub cancelled_contigs: Vec<String>,
    pub window_size_anchor: u64,
    pub anchor_window_source: AnchorWindowSource,
    #[serde(skip)]
    pub skipped: Vec<SkippedRecord>,
}

impl RunSummary {
    pub fn new(window_size_anchor: u64, anchor_window_source: AnchorWindowSource) -> Self {
        RunSummary {
            records_read: 0,
            records_skipped: 0,
            classes: ClassCounts::default(),
            clusters_formed: 0,
            calls_emitted: 0,
            contigs_processed: 0,
            failed_contigs: Vec::new(),
            cancelled_contigs: Vec::new(),
            window_size_anchor,
            anchor_window_source,
            skipped: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed_contigs.is_empty() && self.cancelled_contigs.is_empty()
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Records: {} read, {} skipped",
            self.records_read, self.records_skipped
        )?;
        writeln!(
            f,
            "Classified: {} junction, {} anchor, {} discarded",
            self.classes.junction, self.classes.anchor, self.classes.discarded
        )?;
        for (reason, count) in &self.classes.discard_reasons {
            writeln!(f, "  {reason}: {count}")?;
        }
        writeln!(
            f,
            "Anchor window: {} ({})",
            self.window_size_anchor, self.anchor_window_source
        )?;
        writeln!(f, "Clusters formed: {}", self.clusters_formed)?;
        writeln!(f, "Calls emitted: {}", self.calls_emitted)?;
        write!(f, "Contigs processed: {}", self.contigs_processed)?;
        for failure in &self.failed_contigs {
            write!(f, "\n{}", failure)?;
        }
        if !self.cancelled_contigs.is_empty() {
            write!(f, "\nCancelled contigs: {}", self.cancelled_contigs.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_merge_counts() {
        let mut a = ClassCounts {
            junction: 2,
            anchor: 5,
            discarded: 1,
            discard_reasons: BTreeMap::from([(DiscardReason::BothGenome, 1)]),
        };
        let b = ClassCounts {
            junction: 1,
            anchor: 0,
            discarded: 3,
            discard_reasons: BTreeMap::from([
                (DiscardReason::BothGenome, 2),
                (DiscardReason::Ambiguous, 1),
            ]),
        };
        a.merge(&b);

        assert_eq!(a.total(), 12);
        assert_eq!(a.discard_reasons[&DiscardReason::BothGenome], 3);
        assert_eq!(a.discard_reasons[&DiscardReason::Ambiguous], 1);
    }

    #[rstest]
    fn test_display_and_json() {
        let mut summary = RunSummary::new(500, AnchorWindowSource::Default);
        summary.records_read = 10;
        summary.records_skipped = 1;
        summary.failed_contigs.push(ContigFailure::new(
            "3R",
            &MapperError::CoordinateOverflow("r9".to_string()),
        ));

        let text = summary.to_string();
        assert!(text.contains("Records: 10 read, 1 skipped"));
        assert!(text.contains(
            "Failed to process contig 3R: Coordinate overflow while computing the breakpoint of read r9"
        ));
        assert!(!summary.is_complete());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["records_skipped"], 1);
        assert_eq!(json["anchor_window_source"], "default");
        assert_eq!(json["failed_contigs"][0]["contig"], "3R");
    }
}
