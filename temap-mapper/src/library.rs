//! Library fragment-size estimation from genome/genome read pairs.
use temap_core::models::Strand;

use crate::grouping::ReadUnit;

///
/// Outer fragment length of a properly oriented pair: both mates on the
/// genome, same contig, forward mate leftmost, reverse mate rightmost.
///
fn fragment_length(unit: &ReadUnit) -> Option<u64> {
    let (a, b) = unit.mate_pair()?;
    if !(a.is_genome() && b.is_genome() && a.is_mapped() && b.is_mapped()) {
        return None;
    }
    if a.contig != b.contig || a.strand == b.strand {
        return None;
    }

    let (fwd, rev) = match a.strand {
        Strand::Forward => (a, b),
        Strand::Reverse => (b, a),
    };
    let rev_end = rev.end()?;
    if fwd.position > rev_end {
        return None;
    }
    Some(rev_end - fwd.position + 1)
}

///
/// Median outer fragment length over all properly oriented pairs, or `None`
/// if the input has no such pairs. Used as the anchor clustering window when
/// none is configured.
///
pub fn estimate_insert_size(units: &[ReadUnit]) -> Option<u64> {
    let mut lengths: Vec<u64> = units.iter().filter_map(fragment_length).collect();
    if lengths.is_empty() {
        return None;
    }
    lengths.sort_unstable();
    Some(lengths[(lengths.len() - 1) / 2])
}
