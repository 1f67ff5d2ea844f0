use std::{
    hint,
    time::{Duration, Instant},
};
use blockquery::{Block, QueryKernel, Termination, BLOCK_BYTES};

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStats {
    pub elapsed: Duration,
    pub empty: usize,
    pub processed: usize,
}

/// Run every query once after a warmup period. Queries are bounds checked
/// before timing starts and then run unchecked.
pub fn time_queries(
    warmup: Duration,
    kernel: QueryKernel,
    bits: &[u8],
    queries: &[Vec<u16>]) -> Result<QueryStats, String>
{
    let array = blockquery::BitArray::new(bits);
    for query in queries {
        array.check_indices(query).map_err(|e| e.to_string())?;
    }

    let mut result: Block = [0; BLOCK_BYTES];

    let warmup_start = Instant::now();
    while warmup_start.elapsed() < warmup {
        for query in queries {
            hint::black_box(unsafe { kernel.query_unchecked(&mut result, bits, query) });
        }
    }

    let mut stats = QueryStats::default();
    let start = Instant::now();
    for query in queries {
        let termination = hint::black_box(unsafe { kernel.query_unchecked(&mut result, bits, query) });
        if termination.is_empty() {
            stats.empty += 1;
        }
        stats.processed += match termination {
            Termination::Exhausted => query.len(),
            Termination::Empty { processed } => processed,
        };
    }
    stats.elapsed = start.elapsed();
    hint::black_box(&result);

    Ok(stats)
}
