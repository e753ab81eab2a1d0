//! Grouping aligned segments into reads / read pairs and partitioning them by contig.
use fxhash::FxHashMap as HashMap;

use temap_core::models::AlignedRead;

///
/// All segments that share one pair key, in input order. A unit is a single
/// read, a read pair, or (when the aligner reported several placements for
/// the same read) a multi-mapped group.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadUnit {
    pub key: String,
    /// (input index, segment)
    pub segments: Vec<(usize, AlignedRead)>,
}

impl ReadUnit {
    /// Input index of the first segment.
    pub fn order(&self) -> usize {
        self.segments.first().map(|(i, _)| *i).unwrap_or_default()
    }

    pub fn reads(&self) -> impl Iterator<Item = &AlignedRead> {
        self.segments.iter().map(|(_, read)| read)
    }

    ///
    /// Two segments that name each other as mates.
    ///
    pub fn mate_pair(&self) -> Option<(&AlignedRead, &AlignedRead)> {
        match self.segments.as_slice() {
            [(_, a), (_, b)]
                if a.mate.as_deref() == Some(b.read_id.as_str())
                    && b.mate.as_deref() == Some(a.read_id.as_str()) =>
            {
                Some((a, b))
            }
            _ => None,
        }
    }

    ///
    /// More segments than one read (or one pair) can account for.
    ///
    pub fn is_multi_mapped(&self) -> bool {
        match self.segments.len() {
            0 | 1 => false,
            2 => self.mate_pair().is_none(),
            _ => true,
        }
    }

    ///
    /// Genome contig the unit is assigned to: the smallest contig name among
    /// its mapped genome segments, so the choice does not depend on input order.
    ///
    pub fn genome_contig(&self) -> Option<&str> {
        self.reads()
            .filter(|r| r.is_genome() && r.is_mapped())
            .map(|r| r.contig.as_str())
            .min()
    }
}

///
/// Group segments by pair key, keeping units in order of first appearance.
///
pub fn group_into_units(reads: Vec<AlignedRead>) -> Vec<ReadUnit> {
    let mut index: HashMap<String, usize> = HashMap::default();
    let mut units: Vec<ReadUnit> = Vec::new();

    for (order, read) in reads.into_iter().enumerate() {
        let key = read.pair_key().to_string();
        match index.get(&key) {
            Some(&i) => units[i].segments.push((order, read)),
            None => {
                index.insert(key.clone(), units.len());
                units.push(ReadUnit {
                    key,
                    segments: vec![(order, read)],
                });
            }
        }
    }

    units
}

/// Units placed on one genome contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigBatch {
    pub contig: String,
    pub units: Vec<ReadUnit>,
}

///
/// Split units by genome contig. Returns the per-contig batches sorted by
/// contig name, plus the units that have no genome placement at all.
///
pub fn partition_by_contig(units: Vec<ReadUnit>) -> (Vec<ContigBatch>, Vec<ReadUnit>) {
    let mut by_contig: HashMap<String, Vec<ReadUnit>> = HashMap::default();
    let mut unplaced: Vec<ReadUnit> = Vec::new();

    for unit in units {
        match unit.genome_contig().map(str::to_string) {
            Some(contig) => by_contig.entry(contig).or_default().push(unit),
            None => unplaced.push(unit),
        }
    }

    let mut batches: Vec<ContigBatch> = by_contig
        .into_iter()
        .map(|(contig, units)| ContigBatch { contig, units })
        .collect();
    batches.sort_by(|a, b| a.contig.cmp(&b.contig));

    (batches, unplaced)
}
