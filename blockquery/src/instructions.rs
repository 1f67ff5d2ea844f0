//! Accumulator back-ends for the block intersection kernel.
//!
//! Each back-end holds the 512-bit running AND as four 128-bit lanes (or an
//! equivalent register layout) and provides the three operations the kernel
//! is built from: AND a block in, OR-reduce and test for zero, store.

use crate::util::or_4;

#[cfg(all(feature = "simd", target_arch = "x86"))]
use std::arch::x86::*;
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
use std::arch::x86_64::*;

pub const BLOCK_BYTES: usize = 64;
pub const LANES: usize = 4;

/// One 512-bit block of the bit array, also the shape of a query result.
pub type Block = [u8; BLOCK_BYTES];

/// Running AND over 64-byte blocks.
///
/// # Safety
/// Back-ends may be built from instructions the host lacks. Implementors must
/// keep byte `i` of every stored result equal to the AND of byte `i` of every
/// block passed to `and_block`, and callers must only use a back-end once
/// the host is known to support it (see [`crate::dispatch::Isa`]).
pub unsafe trait Lanes: Copy {
    /// All-ones, the identity of AND.
    unsafe fn ones() -> Self;

    unsafe fn and_block(&mut self, block: &Block);

    /// OR the lanes together and test the result against zero.
    unsafe fn is_zero(&self) -> bool;

    unsafe fn store(self, out: &mut Block);
}

/// Plain integer lanes, available everywhere.
#[derive(Clone, Copy, Debug)]
pub struct Portable([u128; LANES]);

unsafe impl Lanes for Portable {
    #[inline(always)]
    unsafe fn ones() -> Self {
        Portable([u128::MAX; LANES])
    }

    #[inline(always)]
    unsafe fn and_block(&mut self, block: &Block) {
        let words: [u128; LANES] = bytemuck::cast(*block);
        for (lane, word) in self.0.iter_mut().zip(words) {
            *lane &= word;
        }
    }

    #[inline(always)]
    unsafe fn is_zero(&self) -> bool {
        or_4(self.0) == 0
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut Block) {
        *out = bytemuck::cast(self.0);
    }
}

/// Four xmm registers: PAND, POR, PTEST.
#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
#[derive(Clone, Copy, Debug)]
pub struct Sse41([__m128i; LANES]);

#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
unsafe impl Lanes for Sse41 {
    #[inline(always)]
    unsafe fn ones() -> Self {
        let zero = _mm_setzero_si128();
        Sse41([_mm_cmpeq_epi32(zero, zero); LANES])
    }

    #[inline(always)]
    unsafe fn and_block(&mut self, block: &Block) {
        let src = block.as_ptr() as *const __m128i;
        for (i, lane) in self.0.iter_mut().enumerate() {
            *lane = _mm_and_si128(*lane, _mm_loadu_si128(src.add(i)));
        }
    }

    #[inline(always)]
    unsafe fn is_zero(&self) -> bool {
        let [a, b, c, d] = self.0;
        let test = _mm_or_si128(_mm_or_si128(a, b), _mm_or_si128(c, d));
        _mm_testz_si128(test, test) == 1
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut Block) {
        let dst = out.as_mut_ptr() as *mut __m128i;
        for (i, lane) in self.0.into_iter().enumerate() {
            _mm_storeu_si128(dst.add(i), lane);
        }
    }
}

/// Two ymm registers covering the same four 128-bit lanes, in order.
#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
#[derive(Clone, Copy, Debug)]
pub struct Avx2([__m256i; LANES / 2]);

#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
unsafe impl Lanes for Avx2 {
    #[inline(always)]
    unsafe fn ones() -> Self {
        Avx2([_mm256_set1_epi8(-1); LANES / 2])
    }

    #[inline(always)]
    unsafe fn and_block(&mut self, block: &Block) {
        let src = block.as_ptr() as *const __m256i;
        for (i, half) in self.0.iter_mut().enumerate() {
            *half = _mm256_and_si256(*half, _mm256_loadu_si256(src.add(i)));
        }
    }

    #[inline(always)]
    unsafe fn is_zero(&self) -> bool {
        let test = _mm256_or_si256(self.0[0], self.0[1]);
        _mm256_testz_si256(test, test) == 1
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut Block) {
        let dst = out.as_mut_ptr() as *mut __m256i;
        for (i, half) in self.0.into_iter().enumerate() {
            _mm256_storeu_si256(dst.add(i), half);
        }
    }
}
