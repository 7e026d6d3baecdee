use clap::Parser;
use std::{sync::Arc, time::Instant};

use route_tour::layers::{
    error::Error, export::CoordinateTransform, graph::Graph, metric::Metric, path::Path,
};
use route_tour::opt::aco::{Colony, Parameters};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    vertices: String,

    #[arg(long)]
    edges: String,

    /// Also load lines tagged `[DEBUG] `
    #[arg(long)]
    include_debug: bool,

    /// JSON file with colony parameters
    #[arg(long)]
    config: Option<String>,

    #[arg(long, value_enum)]
    metric: Option<Metric>,

    #[arg(long)]
    ants: Option<usize>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Wander on the calling thread only
    #[arg(long)]
    sequential: bool,

    #[arg(long)]
    report_every: Option<usize>,

    #[arg(long, default_value = "output")]
    output_dir: String,
}

impl Args {
    // flags win over the config file, which wins over defaults
    fn parameters(&self) -> Result<Parameters, Error> {
        let mut params = match &self.config {
            Some(path) => Parameters::from_json_file(path)?,
            None => Parameters::default(),
        };
        if let Some(metric) = self.metric {
            params.metric = metric;
        }
        if let Some(ants) = self.ants {
            params.num_ants = ants;
        }
        if let Some(iterations) = self.iterations {
            params.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if self.sequential {
            params.parallel = false;
        }
        if let Some(report_every) = self.report_every {
            params.report_every = report_every;
        }
        params.validate()?;
        Ok(params)
    }
}

fn run(args: Args) -> Result<(), Error> {
    let params = args.parameters()?;

    log::info!("Reading network from {} and {}", args.vertices, args.edges);
    let start = Instant::now();
    let graph = Graph::load(&args.vertices, &args.edges, args.include_debug)?;
    log::info!("Network loaded in {}ms", start.elapsed().as_millis());
    graph.print_stats();
    params.print_stats();

    let graph = Arc::new(graph);
    let metric = params.metric;
    log::info!("Initializing colony");
    let mut colony = Colony::new(graph.clone(), params)?;

    log::info!("Running colony!");
    let start = Instant::now();
    let mut observer = |iteration: usize, path: &Path, cost: u64| {
        log::info!(
            "Iteration {}: best tour has {} edges, {:?} cost {}",
            iteration,
            path.num_edges(),
            metric,
            cost
        );
    };
    colony.learn(Some(&mut observer))?;
    log::info!("Colony finished in {}ms", start.elapsed().as_millis());

    let best = colony
        .best_path()
        .ok_or_else(|| Error::Error("colony produced no tour".to_string()))?;
    log::info!(
        "Best tour: {} edges, cost {}",
        best.num_edges(),
        best.cost(metric)?
    );
    CoordinateTransform::default().write_route(best, &graph, &args.output_dir)?;
    log::info!("Route written to {}", args.output_dir);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
