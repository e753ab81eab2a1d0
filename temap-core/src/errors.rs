use thiserror::Error;

/// Reasons an alignment record is rejected before it reaches the classifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Expected {expected} tab-separated columns, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid value for column `{field}`: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Record has an empty read id")]
    EmptyReadId,

    #[error("Read {0} has an empty contig name")]
    EmptyContig(String),

    #[error("Read {0} is aligned to the TE library but carries no TE family")]
    MissingTeFamily(String),

    #[error("Read {0} is mapped at position 0 (positions are 1-based)")]
    ZeroPosition(String),

    #[error("Read {0} is mapped with an aligned length of 0")]
    ZeroLength(String),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Violations of the cluster membership rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Read {0} carries no breakpoint and cannot join a cluster")]
    NoBreakpoint(String),

    #[error("Read {read_id} does not match the cluster stream {contig}:{strand}:{evidence}")]
    StreamMismatch {
        read_id: String,
        contig: String,
        strand: String,
        evidence: String,
    },

    #[error("Cluster on {0} is closed and cannot be extended")]
    Closed(String),
}

pub type ClusterResult<T> = std::result::Result<T, ClusterError>;
