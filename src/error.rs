//! Crate-wide error taxonomy.
//!
//! Every fallible operation in `chunkdex` returns this one [Error] type.
//! Sentinel variants ([Error::NotSealed], [Error::ChunkNotFound],
//! [Error::Cancelled], [Error::IndexNotFound], [Error::NoMoreRecords]) carry
//! just enough context to report back to a caller but are cheap to match on
//! by variant.

use crate::ids::ChunkId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chunk {0} is not sealed")]
    NotSealed(ChunkId),

    #[error("chunk {0} not found")]
    ChunkNotFound(ChunkId),

    #[error("index {0} not found for chunk {1}")]
    IndexNotFound(&'static str, ChunkId),

    #[error("build cancelled")]
    Cancelled,

    #[error("no more records")]
    NoMoreRecords,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{phase}: {source}")]
    Io {
        phase: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("indexer {indexer} failed: {source}")]
    IndexBuildFailed {
        indexer: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn io(phase: &'static str, source: std::io::Error) -> Error {
        Error::Io { phase, source }
    }
}
