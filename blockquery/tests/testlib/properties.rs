use blockquery::{Block, Termination};
use super::reference_query;

pub fn prop_query_correct(
    bits: &[u8],
    indices: &[u16],
    result: &Block,
    termination: Termination) -> bool
{
    let (expected, stopped) = reference_query(bits, indices);
    prop_termination_matches(termination, stopped) &&
    result == &expected
}

pub fn prop_termination_matches(termination: Termination, stopped: Option<usize>) -> bool {
    match (termination, stopped) {
        (Termination::Exhausted, None) => true,
        (Termination::Empty { processed }, Some(at)) => processed == at,
        _ => false,
    }
}

pub fn prop_all_zero(result: &Block) -> bool {
    result.iter().all(|&b| b == 0)
}
