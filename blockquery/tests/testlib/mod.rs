pub mod properties;

use quickcheck::{Arbitrary, Gen};
use blockquery::{Block, Isa, BLOCK_BYTES};

// Arbitrary Bit Array and Index Sequence //
#[derive(Debug, Clone)]
pub struct QueryInput {
    pub bits: Vec<u8>,
    pub indices: Vec<u16>,
}

impl QueryInput {
    pub fn block_count(&self) -> usize {
        self.bits.len() / BLOCK_BYTES
    }
}

impl Arbitrary for QueryInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let blocks = (usize::arbitrary(g) % 16) + 1;

        let mut bits = Vec::with_capacity(blocks * BLOCK_BYTES);
        for _ in 0..blocks {
            bits.extend(arbitrary_block(g));
        }

        let len = usize::arbitrary(g) % 12;
        let indices = (0..len)
            .map(|_| (usize::arbitrary(g) % blocks) as u16)
            .collect();

        QueryInput { bits, indices }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let bits = self.bits.clone();
        Box::new(self.indices.shrink().map(move |indices| QueryInput {
            bits: bits.clone(),
            indices,
        }))
    }
}

// Mostly dense blocks so that full passes are common, with the occasional
// sparse or empty block to trigger early exits.
fn arbitrary_block(g: &mut Gen) -> Block {
    let kind = u8::arbitrary(g) % 8;
    let mut block = [0u8; BLOCK_BYTES];
    for byte in block.iter_mut() {
        *byte = match kind {
            0 => 0,
            1 => 0xff,
            2 => u8::arbitrary(g) & u8::arbitrary(g),
            _ => u8::arbitrary(g) | u8::arbitrary(g) | u8::arbitrary(g),
        };
    }
    block
}

// Arbitrary Back-end //
#[derive(Debug, Clone, Copy)]
pub struct AvailableIsa(pub Isa);

impl Arbitrary for AvailableIsa {
    fn arbitrary(g: &mut Gen) -> Self {
        let available = Isa::available();
        AvailableIsa(*g.choose(&available).unwrap_or(&Isa::Portable))
    }
}

/// Byte-wise AND over the processed prefix of `indices`, stopping at the
/// first all-zero accumulator. Returns the result and how many indices were
/// consumed if it stopped early.
pub fn reference_query(bits: &[u8], indices: &[u16]) -> (Block, Option<usize>) {
    let mut acc = [0xffu8; BLOCK_BYTES];
    for (i, &index) in indices.iter().enumerate() {
        let start = index as usize * BLOCK_BYTES;
        for (a, b) in acc.iter_mut().zip(&bits[start..start + BLOCK_BYTES]) {
            *a &= b;
        }
        if acc.iter().all(|&b| b == 0) {
            return (acc, Some(i + 1));
        }
    }
    (acc, None)
}

/// Plain AND over every index, no early exit.
pub fn full_and(bits: &[u8], indices: &[u16]) -> Block {
    let mut acc = [0xffu8; BLOCK_BYTES];
    for &index in indices {
        let start = index as usize * BLOCK_BYTES;
        for (a, b) in acc.iter_mut().zip(&bits[start..start + BLOCK_BYTES]) {
            *a &= b;
        }
    }
    acc
}

/// Build a bit array from explicit blocks.
pub fn bit_array(blocks: &[Block]) -> Vec<u8> {
    blocks.iter().flatten().copied().collect()
}
