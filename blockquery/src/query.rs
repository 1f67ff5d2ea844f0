//! Block intersection with early exit.
//!
//! Given a bit array of 64-byte blocks and a sequence of block indices, AND
//! the addressed blocks together, stopping as soon as the running AND is zero.
//! The algorithm is written once in [`query_lanes`] and instantiated per
//! back-end with that back-end's instruction set enabled.

use crate::{
    dispatch::QueryKernel,
    error::QueryError,
    instructions::{Block, Lanes, Portable, BLOCK_BYTES},
    util::unlikely,
};
#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
use crate::instructions::{Avx2, Sse41};

/// Terminal state of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Every index was consulted; the result is the exact AND.
    Exhausted,
    /// The running AND became zero after `processed` indices. Later indices
    /// were never read and the result is all-zero.
    Empty { processed: usize },
}

impl Termination {
    /// True when the query stopped early on an all-zero intersection.
    pub fn is_empty(&self) -> bool {
        matches!(self, Termination::Empty { .. })
    }
}

/// Signature shared by every back-end entry point.
pub type QueryFn = unsafe fn(result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination;

/// # Safety
/// `index * 64 + 64 <= bits.len()` must hold for every index, and the host
/// must support the instructions `L` is built from.
#[inline(always)]
pub unsafe fn query_lanes<L: Lanes>(result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination {
    let base = bits.as_ptr();
    let mut acc = L::ones();
    let mut termination = Termination::Exhausted;

    for (i, &index) in indices.iter().enumerate() {
        let block = &*(base.add(index as usize * BLOCK_BYTES) as *const Block);
        acc.and_block(block);
        if unlikely(acc.is_zero()) {
            termination = Termination::Empty { processed: i + 1 };
            break;
        }
    }

    acc.store(result);
    termination
}

/// # Safety
/// See [`query_lanes`].
pub unsafe fn query_portable(result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination {
    query_lanes::<Portable>(result, bits, indices)
}

/// # Safety
/// See [`query_lanes`]. The host must support SSE4.1.
#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
#[target_feature(enable = "sse4.1")]
pub unsafe fn query_sse41(result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination {
    query_lanes::<Sse41>(result, bits, indices)
}

/// # Safety
/// See [`query_lanes`]. The host must support AVX2.
#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
#[target_feature(enable = "avx2")]
pub unsafe fn query_avx2(result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination {
    query_lanes::<Avx2>(result, bits, indices)
}

/// Intersect the blocks of `bits` named by `indices` using the best kernel
/// for this cpu.
pub fn query(result: &mut Block, bits: &[u8], indices: &[u16]) -> Result<Termination, QueryError> {
    QueryKernel::best().query(result, bits, indices)
}

/// As [`query`], for a result buffer of unknown length. Only the first 64
/// bytes are written; shorter buffers are rejected.
pub fn query_core(result: &mut [u8], bits: &[u8], indices: &[u16]) -> Result<Termination, QueryError> {
    let len = result.len();
    let block: &mut Block = result
        .get_mut(..BLOCK_BYTES)
        .and_then(|head| head.try_into().ok())
        .ok_or(QueryError::ResultTooShort { len })?;
    query(block, bits, indices)
}
