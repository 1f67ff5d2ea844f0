//! Runtime selection of the query back-end.
//!
//! The best back-end is detected once per process and then reused; explicit
//! back-ends can be requested for testing and benchmarking.

use std::{fmt, str::FromStr, sync::OnceLock};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{
    bitarray::BitArray,
    error::QueryError,
    instructions::Block,
    query::{self, QueryFn, Termination},
};

/// Instruction set tier of a query back-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Isa {
    Portable,
    Sse41,
    Avx2,
}

impl Isa {
    pub const ALL: [Isa; 3] = [Isa::Portable, Isa::Sse41, Isa::Avx2];

    /// Best tier this host supports.
    pub fn detect() -> Isa {
        Self::ALL
            .into_iter()
            .rev()
            .find(|isa| isa.is_supported())
            .unwrap_or(Isa::Portable)
    }

    /// Every tier this host supports, lowest first.
    pub fn available() -> Vec<Isa> {
        Self::ALL.into_iter().filter(|isa| isa.is_supported()).collect()
    }

    #[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
    pub fn is_supported(self) -> bool {
        match self {
            Isa::Portable => true,
            Isa::Sse41 => is_x86_feature_detected!("sse4.1"),
            Isa::Avx2 => is_x86_feature_detected!("avx2"),
        }
    }

    #[cfg(not(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64"))))]
    pub fn is_supported(self) -> bool {
        self == Isa::Portable
    }

    pub fn name(self) -> &'static str {
        match self {
            Isa::Portable => "portable",
            Isa::Sse41 => "sse41",
            Isa::Avx2 => "avx2",
        }
    }

    // Only called once support has been confirmed.
    fn entry(self) -> QueryFn {
        match self {
            #[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
            Isa::Sse41 => query::query_sse41,
            #[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
            Isa::Avx2 => query::query_avx2,
            _ => query::query_portable,
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Isa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|isa| isa.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown instruction set: {}", s))
    }
}

/// A query back-end bound to an instruction set the host supports.
#[derive(Clone, Copy)]
pub struct QueryKernel {
    isa: Isa,
    func: QueryFn,
}

static BEST: OnceLock<QueryKernel> = OnceLock::new();

impl QueryKernel {
    pub fn new(isa: Isa) -> Result<Self, QueryError> {
        if !isa.is_supported() {
            return Err(QueryError::UnsupportedIsa(isa));
        }
        Ok(Self { isa, func: isa.entry() })
    }

    /// The fastest kernel for this host, detected on first use.
    pub fn best() -> Self {
        *BEST.get_or_init(|| {
            let isa = Isa::detect();
            debug!(isa = isa.name(), "selected block query kernel");
            Self { isa, func: isa.entry() }
        })
    }

    pub fn isa(&self) -> Isa {
        self.isa
    }

    /// Bounds-checked query. On error `result` is left untouched.
    pub fn query(
        &self,
        result: &mut Block,
        bits: &[u8],
        indices: &[u16]) -> Result<Termination, QueryError>
    {
        BitArray::new(bits).check_indices(indices)?;
        Ok(unsafe { (self.func)(result, bits, indices) })
    }

    /// # Safety
    /// Every index must satisfy `index * 64 + 64 <= bits.len()`.
    #[inline]
    pub unsafe fn query_unchecked(&self, result: &mut Block, bits: &[u8], indices: &[u16]) -> Termination {
        debug_assert!(BitArray::new(bits).check_indices(indices).is_ok());
        (self.func)(result, bits, indices)
    }
}

impl Default for QueryKernel {
    fn default() -> Self {
        Self::best()
    }
}

impl fmt::Debug for QueryKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryKernel").field("isa", &self.isa).finish()
    }
}
