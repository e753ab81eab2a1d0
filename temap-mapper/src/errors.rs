use thiserror::Error;

use temap_core::errors::{ClusterError, RecordError};

/// Invalid run parameters. Raised before any record is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("`{name}` must not be negative, got {value}")]
    Negative { name: &'static str, value: i64 },

    #[error("`{name}` must be greater than zero")]
    Zero { name: &'static str },

    #[error("`{name}` is too large: {value}")]
    TooLarge { name: &'static str, value: i64 },

    #[error("`contigs` was given but lists no contigs")]
    EmptyContigList,

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed record at line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("Coordinate overflow while computing the breakpoint of read {0}")]
    CoordinateOverflow(String),

    #[error("Read {read_id} reached the sweep out of order ({breakpoint} after {previous})")]
    SweepOrder {
        read_id: String,
        breakpoint: u64,
        previous: u64,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type MapperResult<T> = std::result::Result<T, MapperError>;
