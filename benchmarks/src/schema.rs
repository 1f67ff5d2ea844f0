use serde::{Serialize, Deserialize};
use blockquery::Isa;

#[derive(Serialize, Deserialize, Debug)]
pub struct Experiment {
    pub experiment: Vec<ExperimentEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct ExperimentEntry {
    pub name: String,
    /// Blocks in the generated bit array.
    pub blocks: u16,
    /// Indices per query.
    pub sequence_len: usize,
    /// Probability of a bit being set, in thousandths.
    pub density: u32,
    pub queries: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Back-ends to run. Defaults to every back-end the host supports.
    #[serde(default)]
    pub isa: Vec<Isa>,
}

fn default_seed() -> u64 {
    0x5eed
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Results {
    pub runs: Vec<ResultRun>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResultRun {
    pub experiment: String,
    pub isa: Isa,
    pub queries: usize,
    pub total_nanos: u64,
    /// Queries that stopped early on an all-zero accumulator.
    pub empty: usize,
    /// Indices read across all queries.
    pub processed: usize,
}

impl ResultRun {
    pub fn nanos_per_query(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.total_nanos as f64 / self.queries as f64
        }
    }
}
