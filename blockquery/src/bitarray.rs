use crate::{
    error::QueryError,
    instructions::{Block, BLOCK_BYTES},
};

pub const WORDS_PER_BLOCK: usize = BLOCK_BYTES / std::mem::size_of::<u64>();

/// A block viewed as machine words.
pub type Row = [u64; WORDS_PER_BLOCK];

/// Read-only view of a bit array split into 64-byte blocks. Trailing bytes
/// that do not fill a block are never addressed.
#[derive(Debug, Clone, Copy)]
pub struct BitArray<'a> {
    bytes: &'a [u8],
}

impl<'a> BitArray<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn from_rows(rows: &'a [Row]) -> Self {
        Self::new(bytemuck::cast_slice(rows))
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn block_count(&self) -> usize {
        self.bytes.len() / BLOCK_BYTES
    }

    pub fn block(&self, index: u16) -> Option<&'a Block> {
        let start = index as usize * BLOCK_BYTES;
        self.bytes
            .get(start..start + BLOCK_BYTES)
            .and_then(|block| block.try_into().ok())
    }

    /// Ensure every index names a whole block. Indices an early exit would
    /// skip are checked too, so acceptance does not depend on the data.
    pub fn check_indices(&self, indices: &[u16]) -> Result<(), QueryError> {
        let blocks = self.block_count();
        match indices.iter().position(|&index| index as usize >= blocks) {
            Some(position) => Err(QueryError::IndexOutOfRange {
                position,
                index: indices[position],
                blocks,
            }),
            None => Ok(()),
        }
    }
}

impl<'a> From<&'a [u8]> for BitArray<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}
