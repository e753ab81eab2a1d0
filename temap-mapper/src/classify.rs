//! Labelling reads and read pairs as junction, anchor or discard evidence.
use temap_core::models::{
    AlignedRead, ClassifiedRead, DiscardReason, Strand, Target, UNMAPPED_CONTIG,
};

use crate::config::MapperParams;
use crate::errors::{MapperError, MapperResult};
use crate::grouping::ReadUnit;

///
/// Decides whether the soft-clipped part of a genome segment is TE sequence,
/// and if so, which family.
///
pub trait ClipMatcher: Send + Sync {
    fn clip_family(&self, read: &AlignedRead) -> Option<String>;
}

///
/// Trusts the aligner's annotation: a genome segment whose `te_family` column
/// is filled had its clipped part aligned to that family.
///
#[derive(Debug, Default, Clone, Copy)]
pub struct AnnotatedClipMatcher;

impl ClipMatcher for AnnotatedClipMatcher {
    fn clip_family(&self, read: &AlignedRead) -> Option<String> {
        read.te_family.as_deref().filter(|f| !f.is_empty()).map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipSide {
    Start,
    End,
}

impl ClipSide {
    /// A clipped end puts the TE to the right of the breakpoint, a clipped start to its left.
    fn flank(self) -> Strand {
        match self {
            ClipSide::End => Strand::Forward,
            ClipSide::Start => Strand::Reverse,
        }
    }
}

struct JunctionCandidate<'a> {
    order: usize,
    read: &'a AlignedRead,
    side: ClipSide,
    clip: u32,
    breakpoint: u64,
    family: String,
}

pub struct ReadClassifier<'a> {
    params: &'a MapperParams,
    matcher: &'a dyn ClipMatcher,
}

impl<'a> ReadClassifier<'a> {
    pub fn new(params: &'a MapperParams, matcher: &'a dyn ClipMatcher) -> Self {
        ReadClassifier { params, matcher }
    }

    fn qualifying_clip(&self, read: &AlignedRead) -> Option<(ClipSide, u32)> {
        let min = self.params.min_junction_clip;
        match (read.clip_start >= min, read.clip_end >= min) {
            (true, true) if read.clip_end > read.clip_start => Some((ClipSide::End, read.clip_end)),
            (true, _) => Some((ClipSide::Start, read.clip_start)),
            (false, true) => Some((ClipSide::End, read.clip_end)),
            (false, false) => None,
        }
    }

    fn junction_candidate<'r>(
        &self,
        order: usize,
        read: &'r AlignedRead,
    ) -> MapperResult<Option<JunctionCandidate<'r>>> {
        if !(read.is_genome() && read.is_mapped()) {
            return Ok(None);
        }
        let Some((side, clip)) = self.qualifying_clip(read) else {
            return Ok(None);
        };
        let Some(family) = self.matcher.clip_family(read) else {
            return Ok(None);
        };

        let breakpoint = match side {
            ClipSide::Start => read.position,
            ClipSide::End => read
                .end()
                .ok_or_else(|| MapperError::CoordinateOverflow(read.read_id.clone()))?,
        };

        Ok(Some(JunctionCandidate {
            order,
            read,
            side,
            clip,
            breakpoint,
            family,
        }))
    }

    ///
    /// Best junction segment on `contig`: longest qualifying clip, then
    /// leftmost breakpoint, then forward strand.
    ///
    fn best_junction<'r>(
        &self,
        unit: &'r ReadUnit,
        contig: &str,
    ) -> MapperResult<Option<JunctionCandidate<'r>>> {
        let mut best: Option<JunctionCandidate<'r>> = None;
        for (order, read) in unit.segments.iter().filter(|(_, r)| r.contig == contig) {
            let Some(candidate) = self.junction_candidate(*order, read)? else {
                continue;
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    (candidate.clip, current.breakpoint, current.read.strand)
                        > (current.clip, candidate.breakpoint, candidate.read.strand)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        Ok(best)
    }

    fn classify_pair(
        &self,
        unit: &ReadUnit,
        a: &AlignedRead,
        b: &AlignedRead,
    ) -> MapperResult<ClassifiedRead> {
        let order = unit.order();
        let (genome, te) = match (a.target, b.target) {
            (Target::Genome, Target::TeLibrary) => (a, b),
            (Target::TeLibrary, Target::Genome) => (b, a),
            (Target::Genome, Target::Genome) => {
                let reason = if a.is_mapped() && b.is_mapped() {
                    DiscardReason::BothGenome
                } else {
                    DiscardReason::Unmapped
                };
                return Ok(discard_unit(unit, reason));
            }
            (Target::TeLibrary, Target::TeLibrary) => {
                return Ok(discard_unit(unit, DiscardReason::BothTeLibrary));
            }
        };

        if !(genome.is_mapped() && te.is_mapped()) {
            return Ok(discard_unit(unit, DiscardReason::Unmapped));
        }
        let Some(family) = te.te_family.clone() else {
            return Ok(discard_unit(unit, DiscardReason::NoTeEvidence));
        };

        // the TE mate sits beyond the outer edge of the genome mate
        let breakpoint = match genome.strand {
            Strand::Forward => genome
                .end()
                .ok_or_else(|| MapperError::CoordinateOverflow(genome.read_id.clone()))?,
            Strand::Reverse => genome.position,
        };
        let genome_order = unit
            .segments
            .iter()
            .find(|(_, r)| r.is_genome())
            .map(|(i, _)| *i)
            .unwrap_or(order);

        Ok(ClassifiedRead::anchor(
            genome.clone(),
            breakpoint,
            family,
            te.strand,
            genome_order,
        ))
    }

    ///
    /// Classify one unit. Junction evidence wins over anchor evidence; anything
    /// else is discarded with a reason.
    ///
    pub fn classify_unit(&self, unit: &ReadUnit) -> MapperResult<ClassifiedRead> {
        if unit.is_multi_mapped() {
            return Ok(discard_unit(unit, DiscardReason::Ambiguous));
        }

        let contig = match unit.genome_contig() {
            Some(contig) => contig,
            None if unit
                .mate_pair()
                .is_some_and(|(a, b)| !a.is_genome() && !b.is_genome()) =>
            {
                return Ok(discard_unit(unit, DiscardReason::BothTeLibrary));
            }
            None if unit.reads().any(AlignedRead::is_genome) => {
                return Ok(discard_unit(unit, DiscardReason::Unmapped));
            }
            None if unit.reads().any(AlignedRead::is_mapped) => {
                return Ok(discard_unit(unit, DiscardReason::TeOnly));
            }
            None => return Ok(discard_unit(unit, DiscardReason::Unmapped)),
        };
        if !self.params.allows_contig(contig) {
            return Ok(discard_unit(unit, DiscardReason::ExcludedContig));
        }

        if let Some(junction) = self.best_junction(unit, contig)? {
            return Ok(ClassifiedRead::junction(
                junction.read.clone(),
                junction.breakpoint,
                junction.side.flank(),
                junction.family,
                junction.order,
            ));
        }

        match unit.mate_pair() {
            Some((a, b)) => self.classify_pair(unit, a, b),
            None => Ok(discard_unit(unit, DiscardReason::NoTeEvidence)),
        }
    }

    pub fn classify_units(&self, units: &[ReadUnit]) -> MapperResult<Vec<ClassifiedRead>> {
        units.iter().map(|unit| self.classify_unit(unit)).collect()
    }
}

///
/// Discard a unit, keeping its genome-side segment (or the first segment when
/// there is none) for diagnostics.
///
fn discard_unit(unit: &ReadUnit, reason: DiscardReason) -> ClassifiedRead {
    let (order, segment) = unit
        .segments
        .iter()
        .find(|(_, r)| r.is_genome())
        .or_else(|| unit.segments.first())
        .map(|(i, r)| (*i, r.clone()))
        .unwrap_or_else(|| {
            (
                unit.order(),
                AlignedRead {
                    read_id: unit.key.clone(),
                    contig: UNMAPPED_CONTIG.to_string(),
                    position: 0,
                    length: 0,
                    strand: Strand::Forward,
                    clip_start: 0,
                    clip_end: 0,
                    target: Target::Genome,
                    te_family: None,
                    mate: None,
                },
            )
        });
    ClassifiedRead::discard(segment, reason, order)
}
