use thiserror::Error;

use crate::dispatch::Isa;

/// Rejected inputs at the query boundary. The kernel itself cannot fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("result buffer holds {len} bytes, a full block needs 64")]
    ResultTooShort { len: usize },

    #[error("index {index} at position {position} is outside the bit array ({blocks} blocks)")]
    IndexOutOfRange {
        position: usize,
        index: u16,
        blocks: usize,
    },

    #[error("{0:?} is not supported by this cpu")]
    UnsupportedIsa(Isa),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid index configuration: {0}")]
    InvalidConfig(String),

    #[error("document {doc} does not exist, index holds {documents} documents")]
    UnknownDocument { doc: u64, documents: u64 },

    #[error(transparent)]
    Query(#[from] QueryError),
}
