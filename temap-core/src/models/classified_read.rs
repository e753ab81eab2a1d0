use std::fmt::{self, Display};

use super::aligned_read::{AlignedRead, Strand};
use super::insertion_call::Orientation;

/// The two kinds of breakpoint evidence kept apart until resolution.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EvidenceKind {
    Junction,
    Anchor,
}

impl Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceKind::Junction => write!(f, "junction"),
            EvidenceKind::Anchor => write!(f, "anchor"),
        }
    }
}

/// Why a read (or pair) carries no usable TE evidence.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiscardReason {
    /// The same read aligned to more than one place.
    Ambiguous,
    /// Both mates aligned to the genome and neither is a junction read.
    BothGenome,
    /// Both mates aligned to the TE library.
    BothTeLibrary,
    /// A single genome segment without a qualifying TE clip.
    NoTeEvidence,
    /// Only TE-library segments, nothing placed on the genome.
    TeOnly,
    /// The genome-side segment has no placement.
    Unmapped,
    /// The genome contig is outside the configured allow-list.
    ExcludedContig,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::Ambiguous => "ambiguous",
            DiscardReason::BothGenome => "both_genome",
            DiscardReason::BothTeLibrary => "both_te_library",
            DiscardReason::NoTeEvidence => "no_te_evidence",
            DiscardReason::TeOnly => "te_only",
            DiscardReason::Unmapped => "unmapped",
            DiscardReason::ExcludedContig => "excluded_contig",
        }
    }
}

impl Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum ReadClass {
    Junction,
    Anchor,
    Discard(DiscardReason),
}

///
/// An aligned read (or the genome side of a read pair) labelled with the kind
/// of TE evidence it provides.
///
/// `breakpoint` and `te_family` are set for junction and anchor reads only.
/// `flank` is the side of the insertion the read supports: `+` when the TE
/// lies to the right of the breakpoint, `-` when it lies to the left. For an
/// anchor that is the genome mate's strand; for a junction read it comes from
/// which end was clipped, not from the strand the read was sequenced on.
/// `orientation` is known only for anchors, from the strand of the TE mate.
/// `order` is the position of the read in the input and breaks ties between
/// equal breakpoints.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ClassifiedRead {
    pub segment: AlignedRead,
    pub class: ReadClass,
    pub breakpoint: Option<u64>,
    pub te_family: Option<String>,
    pub flank: Strand,
    pub orientation: Option<Orientation>,
    pub order: usize,
}

impl ClassifiedRead {
    pub fn junction(
        segment: AlignedRead,
        breakpoint: u64,
        flank: Strand,
        te_family: String,
        order: usize,
    ) -> Self {
        ClassifiedRead {
            segment,
            class: ReadClass::Junction,
            breakpoint: Some(breakpoint),
            te_family: Some(te_family),
            flank,
            orientation: None,
            order,
        }
    }

    ///
    /// Anchor evidence from a genome mate and the strand its TE mate aligned to.
    ///
    pub fn anchor(
        segment: AlignedRead,
        breakpoint: u64,
        te_family: String,
        te_strand: Strand,
        order: usize,
    ) -> Self {
        let flank = segment.strand;
        ClassifiedRead {
            segment,
            class: ReadClass::Anchor,
            breakpoint: Some(breakpoint),
            te_family: Some(te_family),
            flank,
            orientation: Some(Orientation::of_mates(flank, te_strand)),
            order,
        }
    }

    pub fn discard(segment: AlignedRead, reason: DiscardReason, order: usize) -> Self {
        let flank = segment.strand;
        ClassifiedRead {
            segment,
            class: ReadClass::Discard(reason),
            breakpoint: None,
            te_family: None,
            flank,
            orientation: None,
            order,
        }
    }

    pub fn read_id(&self) -> &str {
        &self.segment.read_id
    }

    pub fn contig(&self) -> &str {
        &self.segment.contig
    }

    pub fn strand(&self) -> Strand {
        self.segment.strand
    }

    pub fn flank(&self) -> Strand {
        self.flank
    }

    pub fn evidence(&self) -> Option<EvidenceKind> {
        match self.class {
            ReadClass::Junction => Some(EvidenceKind::Junction),
            ReadClass::Anchor => Some(EvidenceKind::Anchor),
            ReadClass::Discard(_) => None,
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.class, ReadClass::Discard(_))
    }
}
