//! Blocked bit array intersection with early exit, and the bit-sliced bloom
//! index built on top of it.

pub mod bitarray;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod instructions;
pub mod query;
pub mod visitor;
mod util;

pub use {
    bitarray::{BitArray, Row},
    dispatch::{Isa, QueryKernel},
    error::{IndexError, QueryError},
    index::{BloomIndex, DocId, IndexConfig},
    instructions::{Block, BLOCK_BYTES},
    query::{query, query_core, Termination},
};
