//! Window sweep over sorted breakpoints, one independent sweep per evidence stream.
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::Arc;

use temap_core::errors::ClusterError;
use temap_core::models::{ClassifiedRead, Cluster, EvidenceKind, Strand};

use crate::config::MapperParams;
use crate::errors::{MapperError, MapperResult};

///
/// Selects one of the four clustering streams of a contig.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    pub evidence: EvidenceKind,
    pub strand: Strand,
}

impl StreamKey {
    pub fn of(read: &ClassifiedRead) -> Option<StreamKey> {
        Some(StreamKey {
            evidence: read.evidence()?,
            strand: read.flank(),
        })
    }
}

impl Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.evidence, self.strand)
    }
}

#[derive(Debug)]
enum SweepState {
    Idle,
    Open(Cluster),
}

///
/// Sequential sweep over one stream. Reads must arrive sorted by
/// `(breakpoint, order)`; a read further than `window` from the open
/// cluster's `breakpoint_max` closes it and seeds the next one.
///
#[derive(Debug)]
pub struct ClusterSweep {
    key: StreamKey,
    window: u64,
    state: SweepState,
    last: Option<(u64, usize)>,
    closed: Vec<Cluster>,
}

impl ClusterSweep {
    pub fn new(key: StreamKey, window: u64) -> Self {
        ClusterSweep {
            key,
            window,
            state: SweepState::Idle,
            last: None,
            closed: Vec::new(),
        }
    }

    fn close(&mut self, mut cluster: Cluster) -> MapperResult<()> {
        cluster.close();
        self.closed.extend(cluster.split_to_window(self.window)?);
        Ok(())
    }

    pub fn feed(&mut self, read: Arc<ClassifiedRead>) -> MapperResult<()> {
        let breakpoint = read
            .breakpoint
            .ok_or_else(|| ClusterError::NoBreakpoint(read.read_id().to_string()))?;

        if let Some((previous, previous_order)) = self.last {
            if (breakpoint, read.order) < (previous, previous_order) {
                return Err(MapperError::SweepOrder {
                    read_id: read.read_id().to_string(),
                    breakpoint,
                    previous,
                });
            }
        }
        self.last = Some((breakpoint, read.order));

        self.state = match std::mem::replace(&mut self.state, SweepState::Idle) {
            SweepState::Open(mut open)
                if breakpoint.saturating_sub(open.breakpoint_max) <= self.window =>
            {
                open.push(read)?;
                SweepState::Open(open)
            }
            SweepState::Open(open) => {
                self.close(open)?;
                SweepState::Open(Cluster::seed(read)?)
            }
            SweepState::Idle => SweepState::Open(Cluster::seed(read)?),
        };
        Ok(())
    }

    ///
    /// Close the open cluster, if any, and return every cluster of the stream
    /// in breakpoint order.
    ///
    pub fn finish(mut self) -> MapperResult<Vec<Cluster>> {
        if let SweepState::Open(open) = std::mem::replace(&mut self.state, SweepState::Idle) {
            self.close(open)?;
        }
        Ok(self.closed)
    }
}

///
/// Cluster the junction and anchor reads of one contig. Discarded reads are
/// ignored. Streams are returned in `StreamKey` order.
///
pub fn cluster_reads(
    reads: Vec<Arc<ClassifiedRead>>,
    params: &MapperParams,
) -> MapperResult<BTreeMap<StreamKey, Vec<Cluster>>> {
    let mut streams: BTreeMap<StreamKey, Vec<Arc<ClassifiedRead>>> = BTreeMap::new();
    for read in reads {
        if let Some(key) = StreamKey::of(&read) {
            streams.entry(key).or_default().push(read);
        }
    }

    let mut clusters = BTreeMap::new();
    for (key, mut stream) in streams {
        stream.sort_by_key(|r| (r.breakpoint, r.order));

        let mut sweep = ClusterSweep::new(key, params.window_for(key.evidence));
        for read in stream {
            sweep.feed(read)?;
        }
        clusters.insert(key, sweep.finish()?);
    }

    Ok(clusters)
}
