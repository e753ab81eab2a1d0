use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::{RecordError, RecordResult};

/// Contig name aligners report for a segment without a placement.
pub const UNMAPPED_CONTIG: &str = "*";

#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Forward,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Reverse,
}

impl Strand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        }
    }
}

impl FromStr for Strand {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(RecordError::InvalidField {
                field: "strand",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which reference a segment was aligned against.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Target {
    Genome,
    TeLibrary,
}

impl FromStr for Target {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GENOME" => Ok(Target::Genome),
            "TE_LIBRARY" => Ok(Target::TeLibrary),
            _ => Err(RecordError::InvalidField {
                field: "target",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Genome => write!(f, "GENOME"),
            Target::TeLibrary => write!(f, "TE_LIBRARY"),
        }
    }
}

///
/// One aligned segment, as reported by the upstream aligner.
///
/// `mate` names the paired segment by read id only; segments never own
/// their mates.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct AlignedRead {
    pub read_id: String,
    pub contig: String,
    /// 1-based leftmost mapped coordinate.
    pub position: u64,
    /// Number of reference bases covered by the alignment.
    pub length: u64,
    pub strand: Strand,
    pub clip_start: u32,
    pub clip_end: u32,
    pub target: Target,
    pub te_family: Option<String>,
    pub mate: Option<String>,
}

impl AlignedRead {
    pub fn is_mapped(&self) -> bool {
        self.contig != UNMAPPED_CONTIG
    }

    pub fn is_genome(&self) -> bool {
        self.target == Target::Genome
    }

    ///
    /// 1-based rightmost mapped coordinate, or `None` if it does not fit in a u64.
    ///
    pub fn end(&self) -> Option<u64> {
        self.position.checked_add(self.length)?.checked_sub(1)
    }

    ///
    /// Key shared by both segments of a pair: the smaller of the read id and
    /// the mate id. Unpaired segments use their own id.
    ///
    pub fn pair_key(&self) -> &str {
        match &self.mate {
            Some(mate) if mate.as_str() < self.read_id.as_str() => mate,
            _ => &self.read_id,
        }
    }

    ///
    /// Check the record-level invariants of an aligned segment.
    ///
    pub fn validate(&self) -> RecordResult<()> {
        if self.read_id.is_empty() {
            return Err(RecordError::EmptyReadId);
        }
        if self.contig.is_empty() {
            return Err(RecordError::EmptyContig(self.read_id.clone()));
        }
        if self.target == Target::TeLibrary
            && self.te_family.as_deref().is_none_or(str::is_empty)
        {
            return Err(RecordError::MissingTeFamily(self.read_id.clone()));
        }
        if self.is_mapped() {
            if self.position == 0 {
                return Err(RecordError::ZeroPosition(self.read_id.clone()));
            }
            if self.length == 0 {
                return Err(RecordError::ZeroLength(self.read_id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn genome_read() -> AlignedRead {
        AlignedRead {
            read_id: "r1".to_string(),
            contig: "2L".to_string(),
            position: 100,
            length: 50,
            strand: Strand::Forward,
            clip_start: 0,
            clip_end: 0,
            target: Target::Genome,
            te_family: None,
            mate: None,
        }
    }

    #[rstest]
    fn test_end_coordinate(genome_read: AlignedRead) {
        assert_eq!(genome_read.end(), Some(149));
    }

    #[rstest]
    fn test_end_coordinate_overflow(mut genome_read: AlignedRead) {
        genome_read.position = u64::MAX;
        assert_eq!(genome_read.end(), None);
    }

    #[rstest]
    #[case("r1", None, "r1")]
    #[case("r1/2", Some("r1/1"), "r1/1")]
    #[case("r1/1", Some("r1/2"), "r1/1")]
    #[case("r1", Some("r1"), "r1")]
    fn test_pair_key(
        mut genome_read: AlignedRead,
        #[case] id: &str,
        #[case] mate: Option<&str>,
        #[case] expected: &str,
    ) {
        genome_read.read_id = id.to_string();
        genome_read.mate = mate.map(str::to_string);
        assert_eq!(genome_read.pair_key(), expected);
    }

    #[rstest]
    fn test_validate_ok(genome_read: AlignedRead) {
        assert!(genome_read.validate().is_ok());
    }

    #[rstest]
    fn test_te_library_without_family_is_malformed(mut genome_read: AlignedRead) {
        genome_read.target = Target::TeLibrary;
        assert_eq!(
            genome_read.validate(),
            Err(RecordError::MissingTeFamily("r1".to_string()))
        );

        genome_read.te_family = Some(String::new());
        assert!(genome_read.validate().is_err());

        genome_read.te_family = Some("roo".to_string());
        assert!(genome_read.validate().is_ok());
    }

    #[rstest]
    fn test_unmapped_may_have_zero_position(mut genome_read: AlignedRead) {
        genome_read.position = 0;
        assert_eq!(
            genome_read.validate(),
            Err(RecordError::ZeroPosition("r1".to_string()))
        );

        genome_read.contig = UNMAPPED_CONTIG.to_string();
        assert!(genome_read.validate().is_ok());
    }

    #[rstest]
    #[case("+", Strand::Forward)]
    #[case("-", Strand::Reverse)]
    fn test_strand_from_str(#[case] s: &str, #[case] expected: Strand) {
        assert_eq!(s.parse::<Strand>().unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }

    #[rstest]
    fn test_target_from_str() {
        assert_eq!("GENOME".parse::<Target>().unwrap(), Target::Genome);
        assert_eq!("te_library".parse::<Target>().unwrap(), Target::TeLibrary);
        assert!("transcriptome".parse::<Target>().is_err());
    }
}
