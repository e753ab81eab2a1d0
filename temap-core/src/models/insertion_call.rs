use std::fmt::{self, Display};

use super::aligned_read::Strand;

/// Label used when no single TE family clearly dominates an event.
pub const AMBIGUOUS_FAMILY: &str = "AMBIGUOUS";

/// Placeholder for an optional output column without a value.
pub const MISSING_VALUE: &str = ".";

#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord)]
pub enum TeFamily {
    Named(String),
    Ambiguous,
}

impl TeFamily {
    pub fn as_str(&self) -> &str {
        match self {
            TeFamily::Named(name) => name,
            TeFamily::Ambiguous => AMBIGUOUS_FAMILY,
        }
    }
}

impl Display for TeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TeFamily {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

///
/// Orientation of the inserted TE relative to the genome: `+/+` when its
/// sequence reads the same way as the reference, `+/-` when it is reverse
/// complemented.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[cfg_attr(feature = "serde", serde(rename = "+/+"))]
    Same,
    #[cfg_attr(feature = "serde", serde(rename = "+/-"))]
    Opposite,
}

impl Orientation {
    ///
    /// Orientation implied by an anchor pair. The mates of a fragment face each
    /// other, so a TE in the reference's orientation puts the TE mate on the
    /// strand opposite to the genome mate.
    ///
    pub fn of_mates(genome_strand: Strand, te_strand: Strand) -> Self {
        if genome_strand == te_strand {
            Orientation::Opposite
        } else {
            Orientation::Same
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Same => "+/+",
            Orientation::Opposite => "+/-",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn optional<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING_VALUE.to_string(),
    }
}

/// Confidence tiers, ordered from weakest to strongest evidence.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "LOW"),
            Confidence::Medium => write!(f, "MEDIUM"),
            Confidence::High => write!(f, "HIGH"),
        }
    }
}

///
/// A called TE insertion. Field order here is the order of the output columns.
///
/// `interval_start`/`interval_end` bound every breakpoint that supports the
/// call; `flanks` is 2 when evidence from both sides of the insertion was paired.
///
/// With both flanks paired, `tsd_start`/`tsd_end` span the target-site
/// duplication: the stretch between the upstream (`+`) and downstream (`-`)
/// flank breakpoints. `upstream_support` and `downstream_support` count the
/// reads on each flank and add up to the total support.
///
#[derive(Eq, PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InsertionCall {
    pub contig: String,
    pub estimated_position: u64,
    pub interval_start: u64,
    pub interval_end: u64,
    pub tsd_start: Option<u64>,
    pub tsd_end: Option<u64>,
    pub strand: Strand,
    pub orientation: Option<Orientation>,
    pub te_family: TeFamily,
    pub junction_support: u32,
    pub anchor_support: u32,
    pub upstream_support: u32,
    pub downstream_support: u32,
    pub flanks: u8,
    pub confidence: Confidence,
}

impl InsertionCall {
    pub fn total_support(&self) -> u32 {
        self.junction_support + self.anchor_support
    }

    pub fn both_flanks(&self) -> bool {
        self.flanks >= 2
    }

    ///
    /// Tab-separated line in output column order.
    ///
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.contig,
            self.estimated_position,
            self.interval_start,
            self.interval_end,
            optional(&self.tsd_start),
            optional(&self.tsd_end),
            self.strand,
            optional(&self.orientation),
            self.te_family,
            self.junction_support,
            self.anchor_support,
            self.upstream_support,
            self.downstream_support,
            self.flanks,
            self.confidence,
        )
    }
}

impl Display for InsertionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[rstest]
    #[case(Strand::Forward, Strand::Reverse, Orientation::Same)]
    #[case(Strand::Reverse, Strand::Forward, Orientation::Same)]
    #[case(Strand::Forward, Strand::Forward, Orientation::Opposite)]
    #[case(Strand::Reverse, Strand::Reverse, Orientation::Opposite)]
    fn test_orientation_of_mates(
        #[case] genome: Strand,
        #[case] te: Strand,
        #[case] expected: Orientation,
    ) {
        assert_eq!(Orientation::of_mates(genome, te), expected);
    }

    #[fixture]
    fn paired_call() -> InsertionCall {
        InsertionCall {
            contig: "2L".to_string(),
            estimated_position: 1005,
            interval_start: 1000,
            interval_end: 1020,
            tsd_start: Some(1005),
            tsd_end: Some(1013),
            strand: Strand::Forward,
            orientation: Some(Orientation::Same),
            te_family: TeFamily::Ambiguous,
            junction_support: 2,
            anchor_support: 10,
            upstream_support: 10,
            downstream_support: 2,
            flanks: 2,
            confidence: Confidence::High,
        }
    }

    #[rstest]
    fn test_as_string(paired_call: InsertionCall) {
        assert_eq!(
            paired_call.as_string(),
            "2L\t1005\t1000\t1020\t1005\t1013\t+\t+/+\tAMBIGUOUS\t2\t10\t10\t2\t2\tHIGH"
        );
        assert_eq!(paired_call.total_support(), 12);
        assert!(paired_call.both_flanks());
    }

    #[rstest]
    fn test_as_string_one_flank(paired_call: InsertionCall) {
        let call = InsertionCall {
            tsd_start: None,
            tsd_end: None,
            orientation: None,
            upstream_support: 12,
            downstream_support: 0,
            flanks: 1,
            confidence: Confidence::Medium,
            ..paired_call
        };
        assert_eq!(
            call.as_string(),
            "2L\t1005\t1000\t1020\t.\t.\t+\t.\tAMBIGUOUS\t2\t10\t12\t0\t1\tMEDIUM"
        );
    }
}
