//! Bit-sliced bloom index over documents, after BitFunnel
//! (http://bitfunnel.org/strangeloop/).
//!
//! Documents are grouped into blocks of 512. A block stores one 512-bit row
//! per hash position, and bit `d` of a row belongs to document slot `d`. A
//! query ANDs the rows its terms hash to; the surviving bits are candidate
//! documents. A second, coarser level (meta blocks) records which blocks
//! could match so most blocks are never visited.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;
use crate::{
    bitarray::{BitArray, Row, WORDS_PER_BLOCK},
    dispatch::QueryKernel,
    error::IndexError,
    instructions::{Block, BLOCK_BYTES},
    visitor::{visit_set_bits, Offset, Visitor},
};

pub const DOCS_PER_BLOCK: usize = BLOCK_BYTES * 8;

/// Largest power of two whose masked positions still fit a `u16` index.
const MAX_POSITIONS: usize = 1 << 16;
const MAX_ROWS: usize = 1024;

pub type DocId = u64;

type Positions = SmallVec<[u16; 32]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Rows per document block. Power of two.
    pub rows: usize,
    /// Hash positions set per term.
    pub hashes: u16,
    /// Meta blocks have `rows * meta_scale` rows. Power of two.
    pub meta_scale: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            rows: 256,
            hashes: 4,
            meta_scale: 64,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), IndexError> {
        let invalid = |msg: String| Err(IndexError::InvalidConfig(msg));

        if !self.rows.is_power_of_two() || self.rows > MAX_ROWS {
            return invalid(format!("rows must be a power of two up to {}, got {}", MAX_ROWS, self.rows));
        }
        if self.hashes == 0 {
            return invalid("hashes must be at least 1".to_string());
        }
        if !self.meta_scale.is_power_of_two() {
            return invalid(format!("meta_scale must be a power of two, got {}", self.meta_scale));
        }
        match self.rows.checked_mul(self.meta_scale) {
            Some(meta_rows) if meta_rows <= MAX_POSITIONS => Ok(()),
            _ => invalid(format!(
                "rows * meta_scale must not exceed {}, got {} * {}",
                MAX_POSITIONS, self.rows, self.meta_scale)),
        }
    }

    fn mask(&self) -> u16 {
        (self.rows - 1) as u16
    }

    fn meta_mask(&self) -> u16 {
        (self.rows * self.meta_scale - 1) as u16
    }
}

/// Marsaglia's xorshift32.
pub fn xorshift32(mut y: u32) -> u32 {
    y ^= y << 13;
    y ^= y >> 17;
    y ^= y << 5;
    y
}

/// Double hashing: position `i` is `h1 + i * h2` in wrapping 16-bit
/// arithmetic, where `h1` and `h2` are the halves of `xorshift32(term)`.
pub fn hash_positions(term: u32, hashes: u16) -> impl Iterator<Item = u16> {
    let h = xorshift32(term);
    let (h1, h2) = ((h >> 16) as u16, h as u16);
    (0..hashes).map(move |i| h1.wrapping_add(i.wrapping_mul(h2)))
}

/// Up to 512 documents, one row of bits per hash position.
#[derive(Debug, Clone)]
pub struct DocBlock {
    rows: Vec<Row>,
    valid: usize,
}

impl DocBlock {
    pub fn new(rows: usize) -> Self {
        Self {
            rows: vec![[0; WORDS_PER_BLOCK]; rows],
            valid: 0,
        }
    }

    pub fn num_documents(&self) -> usize {
        self.valid
    }

    pub fn is_full(&self) -> bool {
        self.valid == DOCS_PER_BLOCK
    }

    /// Claim the next document slot, or `None` when the block is full.
    pub fn add_document(&mut self) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        let slot = self.valid as u16;
        self.valid += 1;
        Some(slot)
    }

    /// # Panics
    /// If `row` is not below the block's row count or `slot` is not below 512.
    pub fn set_bit(&mut self, slot: u16, row: u16) {
        self.rows[row as usize][slot as usize >> 6] |= 1 << (slot & 0x3f);
    }

    /// # Panics
    /// Same conditions as [`DocBlock::set_bit`].
    pub fn get_bit(&self, slot: u16, row: u16) -> bool {
        self.rows[row as usize][slot as usize >> 6] & (1 << (slot & 0x3f)) != 0
    }

    pub fn bits(&self) -> BitArray<'_> {
        BitArray::from_rows(&self.rows)
    }

    /// AND together `rows` and keep only occupied slots. No rows selects no
    /// documents.
    pub fn query(&self, rows: &[u16], kernel: QueryKernel) -> Result<Row, IndexError> {
        if rows.is_empty() {
            return Ok([0; WORDS_PER_BLOCK]);
        }

        let mut result: Block = [0; BLOCK_BYTES];
        kernel.query(&mut result, self.bits().as_bytes(), rows)?;

        let mut words: Row = bytemuck::cast(result);
        mask_valid(&mut words, self.valid);
        Ok(words)
    }
}

fn mask_valid(words: &mut Row, valid: usize) {
    for (i, word) in words.iter_mut().enumerate() {
        let keep = valid.saturating_sub(i * 64).min(64);
        if keep < 64 {
            *word &= (1u64 << keep) - 1;
        }
    }
}

/// Two-level bit-sliced bloom index.
#[derive(Debug, Clone)]
pub struct BloomIndex {
    config: IndexConfig,
    blocks: Vec<DocBlock>,
    meta: Vec<DocBlock>,
    kernel: QueryKernel,
}

impl BloomIndex {
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        Self::with_kernel(config, QueryKernel::best())
    }

    pub fn with_kernel(config: IndexConfig, kernel: QueryKernel) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self {
            config,
            blocks: Vec::new(),
            meta: Vec::new(),
            kernel,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn kernel(&self) -> QueryKernel {
        self.kernel
    }

    pub fn len(&self) -> u64 {
        match self.blocks.last() {
            Some(last) => ((self.blocks.len() - 1) * DOCS_PER_BLOCK + last.num_documents()) as u64,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn add_document(&mut self) -> DocId {
        loop {
            if let Some(slot) = self.blocks.last_mut().and_then(DocBlock::add_document) {
                let block_id = self.blocks.len() - 1;
                return (block_id * DOCS_PER_BLOCK) as DocId + slot as DocId;
            }
            self.push_block();
        }
    }

    fn push_block(&mut self) {
        let block_id = self.blocks.len();
        self.blocks.push(DocBlock::new(self.config.rows));

        if block_id % DOCS_PER_BLOCK == 0 {
            self.meta.push(DocBlock::new(self.config.rows * self.config.meta_scale));
            trace!(meta_id = self.meta.len() - 1, "allocated meta block");
        }
        if let Some(meta) = self.meta.last_mut() {
            let slot = meta.add_document();
            debug_assert_eq!(slot, Some((block_id % DOCS_PER_BLOCK) as u16));
        }
        trace!(block_id, "allocated document block");
    }

    /// Record that document `doc` contains `terms`.
    pub fn add_terms(&mut self, doc: DocId, terms: &[u32]) -> Result<(), IndexError> {
        let documents = self.len();
        if doc >= documents {
            return Err(IndexError::UnknownDocument { doc, documents });
        }

        let block_id = (doc / DOCS_PER_BLOCK as u64) as usize;
        let slot = (doc % DOCS_PER_BLOCK as u64) as u16;
        let meta_id = block_id / DOCS_PER_BLOCK;
        let meta_slot = (block_id % DOCS_PER_BLOCK) as u16;
        let (mask, meta_mask) = (self.config.mask(), self.config.meta_mask());

        for &term in terms {
            for pos in hash_positions(term, self.config.hashes) {
                self.blocks[block_id].set_bit(slot, pos & mask);
                self.meta[meta_id].set_bit(meta_slot, pos & meta_mask);
            }
        }
        Ok(())
    }

    /// Documents that may contain every term, in ascending order.
    pub fn query(&self, terms: &[u32]) -> Result<Vec<DocId>, IndexError> {
        let mut docs = Vec::new();
        self.query_with(terms, &mut docs)?;
        Ok(docs)
    }

    pub fn query_with<V: Visitor<DocId>>(&self, terms: &[u32], visitor: &mut V) -> Result<(), IndexError> {
        if terms.is_empty() {
            return Ok(());
        }

        let (mask, meta_mask) = (self.config.mask(), self.config.meta_mask());
        let mut rows = Positions::new();
        let mut meta_rows = Positions::new();
        for &term in terms {
            for pos in hash_positions(term, self.config.hashes) {
                rows.push(pos & mask);
                meta_rows.push(pos & meta_mask);
            }
        }

        for (meta_id, meta) in self.meta.iter().enumerate() {
            let hits = meta.query(&meta_rows, self.kernel)?;

            let mut candidates: Vec<usize> = Vec::new();
            visit_set_bits(&hits[..], &mut candidates);
            trace!(meta_id, candidates = candidates.len(), "meta block filtered");

            for slot in candidates {
                let block_id = meta_id * DOCS_PER_BLOCK + slot;
                let docs = self.blocks[block_id].query(&rows, self.kernel)?;
                let base = (block_id * DOCS_PER_BLOCK) as DocId;
                visit_set_bits(&docs[..], &mut Offset::new(base, visitor));
            }
        }
        Ok(())
    }
}
