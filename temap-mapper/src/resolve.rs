//! Turning the closed clusters of a contig into insertion calls.
//!
//! Same-strand junction and anchor clusters close to each other are merged
//! into one flank event. A forward and a reverse flank event close to each
//! other are the two sides of one insertion and become a single call; an
//! unpaired event still yields a call, with at most `MEDIUM` confidence.
use std::collections::BTreeMap;
use std::sync::Arc;

use temap_core::models::{
    ClassifiedRead, Cluster, Confidence, InsertionCall, Orientation, ReadClass, Strand, TeFamily,
};

use crate::cluster::StreamKey;
use crate::config::MapperParams;
use crate::disjoint_set::DisjointSet;

///
/// Junction and anchor clusters of one strand believed to mark the same
/// insertion edge.
///
#[derive(Debug, Clone)]
pub struct FlankEvent {
    pub strand: Strand,
    pub breakpoint_min: u64,
    pub breakpoint_max: u64,
    pub clusters: Vec<Cluster>,
}

impl FlankEvent {
    fn from_clusters(strand: Strand, clusters: Vec<Cluster>) -> Self {
        let breakpoint_min = clusters.iter().map(|c| c.breakpoint_min).min().unwrap_or_default();
        let breakpoint_max = clusters.iter().map(|c| c.breakpoint_max).max().unwrap_or_default();
        FlankEvent {
            strand,
            breakpoint_min,
            breakpoint_max,
            clusters,
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &Arc<ClassifiedRead>> {
        self.clusters.iter().flat_map(|c| c.members.iter())
    }

    pub fn len(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    ///
    /// Breakpoint this flank points at: the most common junction breakpoint,
    /// or without junction reads the anchor edge facing the insertion.
    ///
    pub fn edge(&self) -> u64 {
        let junctions: Vec<u64> = self
            .members()
            .filter(|r| r.class == ReadClass::Junction)
            .filter_map(|r| r.breakpoint)
            .collect();
        match (mode_smallest(&junctions), self.strand) {
            (Some(bp), _) => bp,
            (None, Strand::Forward) => self.breakpoint_max,
            (None, Strand::Reverse) => self.breakpoint_min,
        }
    }

    pub fn gap_to(&self, other: &FlankEvent) -> u64 {
        if other.breakpoint_min > self.breakpoint_max {
            other.breakpoint_min - self.breakpoint_max
        } else if self.breakpoint_min > other.breakpoint_max {
            self.breakpoint_min - other.breakpoint_max
        } else {
            0
        }
    }
}

///
/// Plurality family of an event. When the runner-up is within `margin` reads
/// of the winner the family is reported as ambiguous. Count ties are broken by
/// name so the result does not depend on member order.
///
pub fn resolve_family<'a>(families: impl IntoIterator<Item = &'a str>, margin: u32) -> TeFamily {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for family in families {
        *counts.entry(family).or_default() += 1;
    }

    let mut ranked: Vec<(&str, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    match ranked.as_slice() {
        [] => TeFamily::Ambiguous,
        [(top, _)] => TeFamily::Named(top.to_string()),
        [(top, first), (_, second), ..] => {
            if first - second <= margin {
                TeFamily::Ambiguous
            } else {
                TeFamily::Named(top.to_string())
            }
        }
    }
}

///
/// Confidence tier from the evidence mix. Without junction support a call is
/// `LOW` regardless of flanks; `HIGH` needs both flanks, a junction read and
/// enough anchor reads.
///
pub fn assign_confidence(
    both_flanks: bool,
    junction_support: u32,
    anchor_support: u32,
    min_anchor_support: u32,
) -> Confidence {
    if junction_support == 0 {
        Confidence::Low
    } else if both_flanks && anchor_support >= min_anchor_support {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

///
/// Majority orientation of the anchor reads; `None` without anchors or on a tie.
///
pub fn resolve_orientation<'a>(
    reads: impl IntoIterator<Item = &'a Arc<ClassifiedRead>>,
) -> Option<Orientation> {
    let (mut same, mut opposite) = (0u32, 0u32);
    for orientation in reads.into_iter().filter_map(|r| r.orientation) {
        match orientation {
            Orientation::Same => same += 1,
            Orientation::Opposite => opposite += 1,
        }
    }
    match same.cmp(&opposite) {
        std::cmp::Ordering::Greater => Some(Orientation::Same),
        std::cmp::Ordering::Less => Some(Orientation::Opposite),
        std::cmp::Ordering::Equal => None,
    }
}

fn mode_smallest(values: &[u64]) -> Option<u64> {
    let mut counts: BTreeMap<u64, u32> = BTreeMap::new();
    for v in values {
        *counts.entry(*v).or_default() += 1;
    }
    // max_by_key keeps the last maximum, so iterate from the right
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(value, _)| value)
}

pub struct InsertionResolver<'a> {
    params: &'a MapperParams,
}

impl<'a> InsertionResolver<'a> {
    pub fn new(params: &'a MapperParams) -> Self {
        InsertionResolver { params }
    }

    ///
    /// Merge the clusters of one strand into flank events: a junction cluster
    /// and an anchor cluster within the anchor window of each other end up in
    /// the same event. Events are returned in coordinate order.
    ///
    pub fn flank_events(&self, strand: Strand, mut clusters: Vec<Cluster>) -> Vec<FlankEvent> {
        let window = self.params.window_size_anchor;
        clusters.sort_by_key(|c| (c.breakpoint_min, c.breakpoint_max, c.evidence));

        let mut set = DisjointSet::new(clusters.len());
        for i in 0..clusters.len() {
            let reach = clusters[i].breakpoint_max.saturating_add(window);
            for j in (i + 1)..clusters.len() {
                if clusters[j].breakpoint_min > reach {
                    break;
                }
                if clusters[i].evidence != clusters[j].evidence {
                    set.union(i, j);
                }
            }
        }

        let mut slots: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
        let mut events: Vec<FlankEvent> = set
            .groups()
            .into_iter()
            .map(|group| {
                let members = group.into_iter().filter_map(|i| slots[i].take()).collect();
                FlankEvent::from_clusters(strand, members)
            })
            .collect();
        events.sort_by_key(|e| (e.breakpoint_min, e.breakpoint_max));
        events
    }

    ///
    /// Pair forward and reverse events one-to-one. Every forward/reverse
    /// combination within the anchor window is a candidate; candidates are
    /// taken closest first (smallest gap, then leftmost forward, then leftmost
    /// reverse), skipping any whose events are already paired. Returns one
    /// group per forward event, with its partner if it has one, then the
    /// leftover reverse events.
    ///
    pub fn pair_flanks(
        &self,
        forward: Vec<FlankEvent>,
        reverse: Vec<FlankEvent>,
    ) -> Vec<Vec<FlankEvent>> {
        let window = self.params.window_size_anchor;

        let mut candidates: Vec<(u64, u64, u64, usize, usize)> = Vec::new();
        for (f, fwd) in forward.iter().enumerate() {
            for (r, rev) in reverse.iter().enumerate() {
                let gap = fwd.gap_to(rev);
                if gap <= window {
                    candidates.push((gap, fwd.breakpoint_min, rev.breakpoint_min, f, r));
                }
            }
        }
        candidates.sort_unstable();

        let mut partners: Vec<Option<usize>> = vec![None; forward.len()];
        let mut taken = vec![false; reverse.len()];
        for (_, _, _, f, r) in candidates {
            if partners[f].is_none() && !taken[r] {
                partners[f] = Some(r);
                taken[r] = true;
            }
        }

        let mut reverse: Vec<Option<FlankEvent>> = reverse.into_iter().map(Some).collect();
        let mut groups: Vec<Vec<FlankEvent>> = Vec::new();
        for (fwd, partner) in forward.into_iter().zip(partners) {
            match partner.and_then(|r| reverse[r].take()) {
                Some(rev) => groups.push(vec![fwd, rev]),
                None => groups.push(vec![fwd]),
            }
        }
        groups.extend(reverse.into_iter().flatten().map(|rev| vec![rev]));
        groups
    }

    ///
    /// Build the call supported by one or two flank events.
    ///
    pub fn make_call(&self, contig: &str, events: &[FlankEvent]) -> Option<InsertionCall> {
        let members: Vec<&Arc<ClassifiedRead>> = events.iter().flat_map(|e| e.members()).collect();
        if members.is_empty() {
            return None;
        }

        let mut junction_breakpoints: Vec<u64> = Vec::new();
        let mut anchor_breakpoints: Vec<u64> = Vec::new();
        for read in &members {
            match (read.class, read.breakpoint) {
                (ReadClass::Junction, Some(bp)) => junction_breakpoints.push(bp),
                (ReadClass::Anchor, Some(bp)) => anchor_breakpoints.push(bp),
                _ => {}
            }
        }
        let all = junction_breakpoints.iter().chain(anchor_breakpoints.iter());
        let interval_start = all.clone().min().copied()?;
        let interval_end = all.max().copied()?;

        let estimated_position = match mode_smallest(&junction_breakpoints) {
            Some(bp) => bp,
            None => {
                let min = anchor_breakpoints.iter().min().copied()?;
                let max = anchor_breakpoints.iter().max().copied()?;
                min + (max - min) / 2
            }
        };

        let te_family = resolve_family(
            members.iter().filter_map(|r| r.te_family.as_deref()),
            self.params.family_ambiguity_margin,
        );

        let upstream = events.iter().find(|e| e.strand == Strand::Forward);
        let downstream = events.iter().find(|e| e.strand == Strand::Reverse);
        let upstream_support = upstream.map(FlankEvent::len).unwrap_or_default() as u32;
        let downstream_support = downstream.map(FlankEvent::len).unwrap_or_default() as u32;
        let strand = if downstream_support > upstream_support {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        let (tsd_start, tsd_end) = match (upstream, downstream) {
            (Some(up), Some(down)) => {
                let (a, b) = (up.edge(), down.edge());
                (Some(a.min(b)), Some(a.max(b)))
            }
            _ => (None, None),
        };

        let junction_support = junction_breakpoints.len() as u32;
        let anchor_support = anchor_breakpoints.len() as u32;
        let flanks = events.len().min(2) as u8;

        Some(InsertionCall {
            contig: contig.to_string(),
            estimated_position,
            interval_start,
            interval_end,
            tsd_start,
            tsd_end,
            strand,
            orientation: resolve_orientation(members.iter().copied()),
            te_family,
            junction_support,
            anchor_support,
            upstream_support,
            downstream_support,
            flanks,
            confidence: assign_confidence(
                flanks >= 2,
                junction_support,
                anchor_support,
                self.params.min_anchor_support,
            ),
        })
    }

    ///
    /// Resolve every closed cluster of one contig into calls.
    ///
    pub fn resolve(
        &self,
        contig: &str,
        clusters: BTreeMap<StreamKey, Vec<Cluster>>,
    ) -> Vec<InsertionCall> {
        let mut by_strand: BTreeMap<Strand, Vec<Cluster>> = BTreeMap::new();
        for (key, stream) in clusters {
            by_strand.entry(key.strand).or_default().extend(stream);
        }

        let forward = self.flank_events(
            Strand::Forward,
            by_strand.remove(&Strand::Forward).unwrap_or_default(),
        );
        let reverse = self.flank_events(
            Strand::Reverse,
            by_strand.remove(&Strand::Reverse).unwrap_or_default(),
        );

        self.pair_flanks(forward, reverse)
            .iter()
            .filter_map(|events| self.make_call(contig, events))
            .collect()
    }
}
