use petgraph::graph::NodeIndex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path as FsPath, sync::Arc, time::Instant};

use crate::layers::{error::Error, graph::Graph, metric::Metric, path::Path};

use super::{
    ant::{Ant, WanderContext},
    cache::PathCache,
    pheromone::PheromoneMatrix,
};

// struct to store all the tunable parameters for the colony
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub metric: Metric,
    /// Deposit exponent
    #[serde(alias = "Q")]
    pub q: f64,
    /// Fraction of each trail kept on evaporation, 0 to 1
    pub rho: f64,
    /// Added to every candidate's desirability so none is ever ruled out
    pub temperature: f64,
    /// Pheromone exponent
    pub alpha: f64,
    /// Heuristic exponent
    pub beta: f64,
    /// Top ants that keep their tour instead of wandering again
    pub best: usize,
    pub num_ants: usize,
    pub iterations: usize,
    pub parallel: bool,
    /// Observer cadence in iterations
    pub report_every: usize,
    pub seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            metric: Metric::WalkDistance,
            q: 1.0,
            rho: 0.8,
            temperature: 0.1,
            alpha: 3.0,
            beta: 3.0,
            best: 2,
            num_ants: 1024,
            iterations: 20,
            parallel: true,
            report_every: 1,
            seed: None,
        }
    }
}

impl Parameters {
    /// Read parameters from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<FsPath>>(path: P) -> Result<Parameters, Error> {
        let reader = BufReader::new(File::open(path)?);
        let params: Parameters = serde_json::from_reader(reader)?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidParameter(msg));
        if !(0.0..=1.0).contains(&self.rho) {
            return invalid(format!("rho must be within [0, 1], got {}", self.rho));
        }
        if !(self.temperature >= 0.0 && self.temperature.is_finite()) {
            return invalid(format!(
                "temperature must be finite and >= 0, got {}",
                self.temperature
            ));
        }
        for (name, value) in [("q", self.q), ("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() {
                return invalid(format!("{} must be finite, got {}", name, value));
            }
        }
        if self.num_ants == 0 {
            return invalid("num_ants must be at least 1".to_string());
        }
        if self.best > self.num_ants {
            return invalid(format!(
                "best ({}) cannot exceed num_ants ({})",
                self.best, self.num_ants
            ));
        }
        if self.report_every == 0 {
            return invalid("report_every must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn print_stats(&self) {
        log::info!("Colony parameters:");
        log::info!("  metric: {:?}", self.metric);
        log::info!("  Q: {}", self.q);
        log::info!("  rho: {}", self.rho);
        log::info!("  temperature: {}", self.temperature);
        log::info!("  alpha: {}", self.alpha);
        log::info!("  beta: {}", self.beta);
        log::info!("  best: {}", self.best);
        log::info!("  num_ants: {}", self.num_ants);
        log::info!("  iterations: {}", self.iterations);
        log::info!("  parallel: {}", self.parallel);
        log::info!("  report_every: {}", self.report_every);
        log::info!("  seed: {:?}", self.seed);
    }
}

/// Receives the colony's best tour after an iteration
pub trait Observer {
    fn on_iteration(&mut self, iteration: usize, best: &Path, cost: u64);
}

impl<F> Observer for F
where
    F: FnMut(usize, &Path, u64),
{
    fn on_iteration(&mut self, iteration: usize, best: &Path, cost: u64) {
        self(iteration, best, cost)
    }
}

/// Ant colony searching for a cheap closed tour through every vertex.
///
/// The graph and the pairwise shortest paths never change after
/// construction. Pheromones are only written between wander phases.
pub struct Colony {
    graph: Arc<Graph>,
    params: Parameters,
    paths: PathCache,
    pheromones: PheromoneMatrix,
    ants: Vec<Ant>,
    rng: StdRng,
    iteration: usize,
}

impl Colony {
    /// Precompute the shortest path between every ordered pair of vertices
    /// and start every trail at the same strength.
    ///
    /// Fails if the parameters are invalid, if the graph has fewer than two
    /// vertices, or if some vertex cannot reach another.
    pub fn new(graph: Arc<Graph>, params: Parameters) -> Result<Colony, Error> {
        params.validate()?;
        let n = graph.vertex_count();
        if n < 2 {
            return Err(Error::GraphTooSmall(n));
        }
        let start = Instant::now();
        let paths = PathCache::build(&graph, params.metric)?;
        log::info!(
            "Precomputed {} shortest paths in {}ms",
            n * (n - 1),
            start.elapsed().as_millis()
        );
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ants = (0..params.num_ants).map(Ant::new).collect();
        Ok(Colony {
            graph,
            pheromones: PheromoneMatrix::new(n),
            paths,
            params,
            ants,
            rng,
            iteration: 0,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn pheromones(&self) -> &PheromoneMatrix {
        &self.pheromones
    }

    pub fn paths(&self) -> &PathCache {
        &self.paths
    }

    /// Ants in ranking order after the last completed iteration
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Run `params.iterations` iterations, reporting to `observer` every
    /// `params.report_every` of them. Calling it again continues where the
    /// last call stopped.
    pub fn learn(&mut self, mut observer: Option<&mut dyn Observer>) -> Result<(), Error> {
        for _ in 0..self.params.iterations {
            let cost = self.step()?;
            if self.iteration % self.params.report_every == 0 {
                if let (Some(observer), Some(best)) = (observer.as_deref_mut(), self.best_path()) {
                    observer.on_iteration(self.iteration, best, cost);
                }
            }
        }
        Ok(())
    }

    /// One iteration: wander, update pheromones, rank. Returns the best cost.
    pub fn step(&mut self) -> Result<u64, Error> {
        self.iteration += 1;
        let start = Instant::now();
        self.wander()?;
        self.update_pheromones();
        self.sort_ants();
        let cost = self.ants.first().and_then(|a| a.cost()).unwrap_or(u64::MAX);
        log::info!("{}: {}", self.iteration, cost);
        log::debug!(
            "Iteration {} finished in {}ms",
            self.iteration,
            start.elapsed().as_millis()
        );
        Ok(cost)
    }

    /// Send every non-elite ant out from a random start. Returns once all of
    /// them are back.
    fn wander(&mut self) -> Result<(), Error> {
        let elite = if self.iteration == 1 {
            0
        } else {
            self.params.best.min(self.ants.len())
        };
        // starts and seeds are drawn up front so the outcome does not depend
        // on scheduling
        let vertices = self.graph.vertex_set();
        let jobs: Vec<(NodeIndex, u64)> = (elite..self.ants.len())
            .map(|_| {
                let start = vertices[self.rng.gen_range(0..vertices.len())];
                (start, self.rng.gen::<u64>())
            })
            .collect();

        let ctx = WanderContext {
            graph: &self.graph,
            paths: &self.paths,
            pheromones: &self.pheromones,
            params: &self.params,
        };
        let wanderers = &mut self.ants[elite..];
        log::debug!(
            "Iteration {}: {} ants wandering, {} kept",
            self.iteration,
            wanderers.len(),
            elite
        );
        if self.params.parallel {
            wanderers
                .par_iter_mut()
                .zip(jobs.par_iter())
                .try_for_each(|(ant, &(start, seed))| {
                    ant.wander(&ctx, start, &mut StdRng::seed_from_u64(seed))
                })
        } else {
            wanderers
                .iter_mut()
                .zip(jobs.iter())
                .try_for_each(|(ant, &(start, seed))| {
                    ant.wander(&ctx, start, &mut StdRng::seed_from_u64(seed))
                })
        }
    }

    /// Evaporate every trail, then let each ant reinforce the legs between
    /// its key vertices in both directions by `(best_cost / cost)^Q`
    pub fn update_pheromones(&mut self) {
        self.pheromones.evaporate(self.params.rho);

        let best = match self.ants.iter().filter_map(|a| a.cost()).min() {
            Some(best) => best,
            None => return,
        };
        for ant in self.ants.iter() {
            let cost = match ant.cost() {
                Some(cost) => cost,
                None => continue,
            };
            let ratio = if cost == 0 {
                1.0
            } else {
                best as f64 / cost as f64
            };
            let amount = ratio.powf(self.params.q);
            for w in ant.key_vertices().windows(2) {
                self.pheromones.deposit(w[0], w[1], amount);
            }
        }
    }

    fn sort_ants(&mut self) {
        self.ants.sort_by_key(|a| a.cost().unwrap_or(u64::MAX));
    }

    /// The lowest-cost ant, first in ranking order on ties
    pub fn best_ant(&self) -> Option<&Ant> {
        self.ants
            .iter()
            .filter(|a| a.path().is_some())
            .min_by_key(|a| a.cost().unwrap_or(u64::MAX))
    }

    /// The colony's answer: the cheapest tour found by any current ant
    pub fn best_path(&self) -> Option<&Path> {
        self.best_ant().and_then(|a| a.path())
    }
}
