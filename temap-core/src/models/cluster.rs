use std::sync::Arc;

use super::aligned_read::Strand;
use super::classified_read::{ClassifiedRead, EvidenceKind};
use crate::errors::{ClusterError, ClusterResult};

///
/// A growing set of same-stream reads believed to support one insertion edge.
///
/// `contig`, `strand` and `evidence` come from the seed read and never change;
/// `strand` is the flank the members support.
/// Members are shared with the caller, so reads stay addressable by id after
/// clustering.
///
#[derive(Debug, Clone)]
pub struct Cluster {
    pub contig: String,
    pub strand: Strand,
    pub evidence: EvidenceKind,
    pub breakpoint_min: u64,
    pub breakpoint_max: u64,
    pub members: Vec<Arc<ClassifiedRead>>,
    closed: bool,
}

fn breakpoint_of(read: &ClassifiedRead) -> ClusterResult<u64> {
    read.breakpoint
        .ok_or_else(|| ClusterError::NoBreakpoint(read.read_id().to_string()))
}

impl Cluster {
    ///
    /// Open a new cluster seeded by a junction or anchor read.
    ///
    pub fn seed(read: Arc<ClassifiedRead>) -> ClusterResult<Self> {
        let breakpoint = breakpoint_of(&read)?;
        let evidence = read
            .evidence()
            .ok_or_else(|| ClusterError::NoBreakpoint(read.read_id().to_string()))?;

        Ok(Cluster {
            contig: read.contig().to_string(),
            strand: read.flank(),
            evidence,
            breakpoint_min: breakpoint,
            breakpoint_max: breakpoint,
            members: vec![read],
            closed: false,
        })
    }

    ///
    /// Add a read to the cluster, widening the breakpoint range.
    ///
    pub fn push(&mut self, read: Arc<ClassifiedRead>) -> ClusterResult<()> {
        if self.closed {
            return Err(ClusterError::Closed(self.contig.clone()));
        }
        let breakpoint = breakpoint_of(&read)?;
        if read.contig() != self.contig
            || read.flank() != self.strand
            || read.evidence() != Some(self.evidence)
        {
            return Err(ClusterError::StreamMismatch {
                read_id: read.read_id().to_string(),
                contig: self.contig.clone(),
                strand: self.strand.to_string(),
                evidence: self.evidence.to_string(),
            });
        }

        self.breakpoint_min = self.breakpoint_min.min(breakpoint);
        self.breakpoint_max = self.breakpoint_max.max(breakpoint);
        self.members.push(read);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn span(&self) -> u64 {
        self.breakpoint_max - self.breakpoint_min
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    ///
    /// Distance between the breakpoint ranges of two clusters; 0 when they overlap.
    ///
    pub fn gap_to(&self, other: &Cluster) -> u64 {
        if other.breakpoint_min > self.breakpoint_max {
            other.breakpoint_min - self.breakpoint_max
        } else if self.breakpoint_min > other.breakpoint_max {
            self.breakpoint_min - other.breakpoint_max
        } else {
            0
        }
    }

    ///
    /// Split a cluster whose span exceeds `window` into consecutive clusters
    /// that each fit inside the window. Members must be in breakpoint order.
    /// A cluster that already fits is returned unchanged.
    ///
    pub fn split_to_window(self, window: u64) -> ClusterResult<Vec<Cluster>> {
        if self.span() <= window {
            return Ok(vec![self]);
        }

        let closed = self.closed;
        let mut pieces: Vec<Cluster> = Vec::new();
        for read in self.members {
            let breakpoint = breakpoint_of(&read)?;
            match pieces.last_mut() {
                Some(current) if breakpoint.saturating_sub(current.breakpoint_min) <= window => {
                    current.push(read)?;
                }
                _ => pieces.push(Cluster::seed(read)?),
            }
        }

        if closed {
            pieces.iter_mut().for_each(Cluster::close);
        }
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::aligned_read::{AlignedRead, Target};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn anchor_at(id: &str, strand: Strand, breakpoint: u64) -> Arc<ClassifiedRead> {
        let segment = AlignedRead {
            read_id: id.to_string(),
            contig: "2L".to_string(),
            position: breakpoint,
            length: 1,
            strand,
            clip_start: 0,
            clip_end: 0,
            target: Target::Genome,
            te_family: None,
            mate: Some(id.to_string()),
        };
        Arc::new(ClassifiedRead::anchor(
            segment,
            breakpoint,
            "roo".to_string(),
            Strand::Reverse,
            0,
        ))
    }

    #[rstest]
    fn test_push_widens_range() {
        let mut cluster = Cluster::seed(anchor_at("a", Strand::Forward, 100)).unwrap();
        cluster.push(anchor_at("b", Strand::Forward, 120)).unwrap();
        cluster.push(anchor_at("c", Strand::Forward, 90)).unwrap();

        assert_eq!(cluster.breakpoint_min, 90);
        assert_eq!(cluster.breakpoint_max, 120);
        assert_eq!(cluster.span(), 30);
        assert_eq!(cluster.len(), 3);
    }

    #[rstest]
    fn test_push_rejects_other_strand() {
        let mut cluster = Cluster::seed(anchor_at("a", Strand::Forward, 100)).unwrap();
        let res = cluster.push(anchor_at("b", Strand::Reverse, 101));
        assert!(matches!(res, Err(ClusterError::StreamMismatch { .. })));
        assert_eq!(cluster.len(), 1);
    }

    #[rstest]
    fn test_push_rejects_closed() {
        let mut cluster = Cluster::seed(anchor_at("a", Strand::Forward, 100)).unwrap();
        cluster.close();
        assert!(cluster.push(anchor_at("b", Strand::Forward, 101)).is_err());
    }

    #[rstest]
    fn test_seed_rejects_discard() {
        let segment = anchor_at("a", Strand::Forward, 100).segment.clone();
        let read = ClassifiedRead::discard(segment, crate::models::DiscardReason::BothGenome, 0);
        assert!(Cluster::seed(Arc::new(read)).is_err());
    }

    #[rstest]
    #[case(100, 110, 200, 210, 90)]
    #[case(100, 110, 105, 130, 0)]
    #[case(200, 210, 100, 110, 90)]
    fn test_gap_to(
        #[case] a_min: u64,
        #[case] a_max: u64,
        #[case] b_min: u64,
        #[case] b_max: u64,
        #[case] expected: u64,
    ) {
        let mut a = Cluster::seed(anchor_at("a1", Strand::Forward, a_min)).unwrap();
        a.push(anchor_at("a2", Strand::Forward, a_max)).unwrap();
        let mut b = Cluster::seed(anchor_at("b1", Strand::Forward, b_min)).unwrap();
        b.push(anchor_at("b2", Strand::Forward, b_max)).unwrap();

        assert_eq!(a.gap_to(&b), expected);
        assert_eq!(b.gap_to(&a), expected);
    }

    #[rstest]
    fn test_split_to_window() {
        let mut cluster = Cluster::seed(anchor_at("a", Strand::Forward, 100)).unwrap();
        for (i, bp) in [103, 106, 109, 112].iter().enumerate() {
            cluster.push(anchor_at(&format!("r{i}"), Strand::Forward, *bp)).unwrap();
        }
        cluster.close();

        let pieces = cluster.split_to_window(5).unwrap();
        let ranges: Vec<(u64, u64, usize)> = pieces
            .iter()
            .map(|c| (c.breakpoint_min, c.breakpoint_max, c.len()))
            .collect();

        assert_eq!(ranges, vec![(100, 103, 2), (106, 109, 2), (112, 112, 1)]);
        assert!(pieces.iter().all(|c| c.is_closed() && c.span() <= 5));
    }

    #[rstest]
    fn test_split_keeps_fitting_cluster() {
        let mut cluster = Cluster::seed(anchor_at("a", Strand::Forward, 100)).unwrap();
        cluster.push(anchor_at("b", Strand::Forward, 104)).unwrap();
        let pieces = cluster.split_to_window(5).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 2);
    }
}
