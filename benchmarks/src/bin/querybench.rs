use std::{fs, path::PathBuf, time::Duration};
use benchmarks::{
    fmt_open_err, path_str,
    generators::{gen_bit_array, gen_queries},
    harness::time_queries,
    schema::*,
};
use blockquery::{Isa, QueryKernel};
use clap::Parser;
use colored::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(default_value = "experiment.toml", long)]
    experiment: PathBuf,
    #[arg(default_value = "results.json", long)]
    out: PathBuf,
    /// Warmup per experiment and back-end, in milliseconds.
    #[arg(default_value_t = 100, long)]
    warmup: u64,
    // Ignore --bench provided by cargo.
    #[arg(long, action)]
    bench: bool,
    experiments: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cfg!(debug_assertions) {
        println!("{}", "warning: running in debug mode".yellow().bold());
    }

    if let Err(e) = bench_from_file(&cli) {
        let msg = format!("error: {}", e);
        println!("{}", msg.red().bold());
    }
}

fn bench_from_file(cli: &Cli) -> Result<(), String> {
    let experiment_toml = fs::read_to_string(&cli.experiment)
        .map_err(|e| fmt_open_err(e, &cli.experiment))?;

    let experiment: Experiment = toml::from_str(&experiment_toml)
        .map_err(|e| format!(
            "invalid toml file {}: {}",
            path_str(&cli.experiment), e
        ))?;

    let selected: Vec<&ExperimentEntry> = experiment.experiment
        .iter()
        .filter(|e| cli.experiments.is_empty() || cli.experiments.contains(&e.name))
        .collect();

    if selected.is_empty() {
        return Err("no experiment matches found".to_string());
    }

    info!(best = %QueryKernel::best().isa(), "detected cpu back-end");

    let mut runs = Vec::new();
    for entry in selected {
        runs.extend(run_experiment(cli, entry)?);
    }

    let results = Results { runs };
    let json = serde_json::to_string_pretty(&results)
        .map_err(|e| e.to_string())?;
    fs::write(&cli.out, json)
        .map_err(|e| format!("unable to write {}: {}", path_str(&cli.out), e))?;

    println!("{}", format!("results written to {}", path_str(&cli.out)).green());
    Ok(())
}

fn run_experiment(cli: &Cli, entry: &ExperimentEntry) -> Result<Vec<ResultRun>, String> {
    println!("{}", entry.name.bold());

    let mut rng = ChaCha8Rng::seed_from_u64(entry.seed);
    let bits = gen_bit_array(&mut rng, entry.blocks, entry.density)?;
    let queries = gen_queries(&mut rng, entry.blocks, entry.sequence_len, entry.queries)?;

    let isas = if entry.isa.is_empty() {
        Isa::available()
    } else {
        entry.isa.clone()
    };

    let mut runs = Vec::new();
    for isa in isas {
        let kernel = match QueryKernel::new(isa) {
            Ok(kernel) => kernel,
            Err(e) => {
                warn!(experiment = %entry.name, %isa, "skipping: {}", e);
                continue;
            }
        };

        let stats = time_queries(
            Duration::from_millis(cli.warmup), kernel, &bits, &queries)?;

        let run = ResultRun {
            experiment: entry.name.clone(),
            isa,
            queries: queries.len(),
            total_nanos: stats.elapsed.as_nanos() as u64,
            empty: stats.empty,
            processed: stats.processed,
        };
        println!("  {:<10} {:>10.1} ns/query  {:>6} empty  {:>8} blocks read",
            isa.to_string().cyan(), run.nanos_per_query(), run.empty, run.processed);
        runs.push(run);
    }
    Ok(runs)
}
