pub mod aligned_read;
pub mod classified_read;
pub mod cluster;
pub mod insertion_call;

// re-export for cleaner imports
pub use self::aligned_read::{AlignedRead, Strand, Target, UNMAPPED_CONTIG};
pub use self::classified_read::{ClassifiedRead, DiscardReason, EvidenceKind, ReadClass};
pub use self::cluster::Cluster;
pub use self::insertion_call::{
    AMBIGUOUS_FAMILY, Confidence, InsertionCall, MISSING_VALUE, Orientation, TeFamily,
};
