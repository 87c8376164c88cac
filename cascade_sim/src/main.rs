//! Cascade estimator CLI
//!
//! Estimate per-node activation probabilities on a catalog network or an
//! edge-list file.

use cascade_env::{NodeId, SeedSet};
use cascade_sim::{
    resolve_network, sample_probes, EdgeListMode, EstimateExport, EstimateRunner, NetworkId,
    SimError,
};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Independent Cascade Monte Carlo estimator
#[derive(Parser, Debug)]
#[command(name = "cascade-sim")]
#[command(
    about = "Estimate activation probabilities under the Independent Cascade model",
    long_about = None
)]
struct Args {
    /// Catalog network name or path to an edge-list file
    #[arg(short, long, default_value = "kite")]
    network: String,

    /// Edge activation probability
    #[arg(short, long, default_value = "0.5")]
    p: f64,

    /// Comma-separated seed node ids, in order
    #[arg(long, default_value = "0")]
    seeds: String,

    /// Monte Carlo iterations
    #[arg(short, long, default_value = "1000")]
    iterations: usize,

    /// Worker threads (0 = available parallelism)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Base seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Edge-list handling: directed, symmetrized (largest SCC, undirected) or undirected
    #[arg(long, default_value = "symmetrized")]
    edges: EdgeListMode,

    /// Scan p for low / medium / high spreadability
    #[arg(long)]
    search: bool,

    /// Probe nodes sampled with replacement for the spreadability scan
    #[arg(long, default_value = "1000")]
    probes: usize,

    /// Iterations per probe and grid point in the spreadability scan
    #[arg(long, default_value = "1")]
    search_iterations: usize,

    /// Report the minimum probability of every seed prefix
    #[arg(long)]
    prefixes: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output on stdout
    #[arg(long)]
    json: bool,

    /// Export results to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn parse_seeds(text: &str) -> Result<Vec<NodeId>, SimError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map(NodeId::new)
                .map_err(|e| SimError::parse(1, format!("bad seed '{}': {}", s, e)))
        })
        .collect()
}

fn run(args: &Args) -> Result<(), SimError> {
    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };
    if args.seed == 0 {
        info!("Using clock-derived seed {} (pass --seed {} to replay)", base_seed, base_seed);
    }

    let (name, graph) = resolve_network(&args.network, args.edges)?;
    let seeds: SeedSet = parse_seeds(&args.seeds)?.into_iter().collect();

    let mut runner = EstimateRunner::new(base_seed).with_iterations(args.iterations);
    if args.threads > 0 {
        runner = runner.with_threads(args.threads);
    }

    let mut export = EstimateExport::new(&name, base_seed);

    let result = runner.run(&name, &graph, args.p, &seeds)?;
    if !args.json {
        for (i, prob) in result.probabilities.iter().enumerate() {
            info!("  node {:>4}: {:.4}", i, prob);
        }
        info!(
            "✓ min={:.4} spread={:.2}/{} ({:.1}ms)",
            result.min_probability, result.expected_spread, result.node_count, result.elapsed_ms
        );
    }
    export.add_run(result);

    if args.prefixes {
        let minimums = runner.run_prefixes(&graph, args.p, &seeds)?;
        if !args.json {
            for (k, min) in minimums.iter().enumerate() {
                info!("  first {} seeds: min {:.4}", k + 1, min);
            }
        }
        export.set_prefix_minimums(minimums);
    }

    if args.search {
        let probes = sample_probes(graph.node_count(), args.probes, base_seed)?;
        let mut search_runner =
            EstimateRunner::new(base_seed).with_iterations(args.search_iterations);
        if args.threads > 0 {
            search_runner = search_runner.with_threads(args.threads);
        }
        let search = search_runner.run_search(&graph, &probes)?;
        export.set_spreadability(search);
    }

    if args.json {
        println!("{}", export.to_json()?);
    }

    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        info!("Exported {} run(s) to {}", export.runs.len(), path);
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Cascade Estimator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    if let Err(e) = run(&args) {
        error!("✗ {}", e);
        if matches!(e, SimError::UnknownNetwork(_)) {
            let names: Vec<&str> = NetworkId::all().iter().map(|n| n.name()).collect();
            error!("Available networks: {}", names.join(", "));
        }
        std::process::exit(1);
    }
}
