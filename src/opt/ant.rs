use petgraph::graph::NodeIndex;
use rand::Rng;
use std::{collections::BTreeSet, sync::Arc};

use crate::layers::{
    error::Error,
    graph::{Edge, Graph},
    path::Path,
};

use super::{aco::Parameters, cache::PathCache, pheromone::PheromoneMatrix};

/// Everything an ant reads while wandering. Nothing in here is written
/// until every ant of the iteration has finished.
pub struct WanderContext<'a> {
    pub graph: &'a Graph,
    pub paths: &'a PathCache,
    pub pheromones: &'a PheromoneMatrix,
    pub params: &'a Parameters,
}

/// One agent of the colony. Its working state is reset on every wander.
#[derive(Debug, Clone, Default)]
pub struct Ant {
    pub id: usize,
    edges: Vec<Arc<Edge>>,
    unvisited: BTreeSet<NodeIndex>,
    key_vertices: Vec<NodeIndex>,
    path: Option<Path>,
    cost: Option<u64>,
}

impl Ant {
    pub fn new(id: usize) -> Self {
        Ant {
            id,
            ..Default::default()
        }
    }

    /// The tour found by the last wander
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Cost of [`Ant::path`] under the colony's metric
    pub fn cost(&self) -> Option<u64> {
        self.cost
    }

    /// Waypoints chosen as targets, starting and ending at the start vertex
    pub fn key_vertices(&self) -> &[NodeIndex] {
        &self.key_vertices
    }

    /// Build a closed tour from `start` that passes through every vertex.
    ///
    /// Each step picks an unvisited target and follows the cached shortest
    /// path to it; once nothing is left unvisited the ant heads back to
    /// `start`. At most one target per vertex is chosen, so this always ends.
    pub fn wander<R: Rng>(
        &mut self,
        ctx: &WanderContext,
        start: NodeIndex,
        rng: &mut R,
    ) -> Result<(), Error> {
        self.edges.clear();
        self.key_vertices.clear();
        self.path = None;
        self.cost = None;
        self.unvisited = ctx
            .graph
            .vertex_set()
            .into_iter()
            .filter(|&v| v != start)
            .collect();
        self.key_vertices.push(start);

        let mut current = start;
        loop {
            let next = if self.unvisited.is_empty() {
                start
            } else {
                self.choose_next(ctx, current, rng)?
            };
            self.key_vertices.push(next);
            let leg = ctx.paths.get(current, next).ok_or(Error::Unreachable {
                from: ctx.graph.vertex(current).id,
                to: ctx.graph.vertex(next).id,
            })?;
            for edge in leg.edges() {
                self.unvisited.remove(&edge.dst);
                self.edges.push(Arc::clone(edge));
            }
            current = next;
            if next == start {
                break;
            }
        }

        let path = Path::new(std::mem::take(&mut self.edges))?;
        self.cost = Some(path.cost(ctx.params.metric)?);
        self.path = Some(path);
        log::trace!(
            "Ant {} closed a tour of {} key vertices, cost {:?}",
            self.id,
            self.key_vertices.len(),
            self.cost
        );
        Ok(())
    }

    /// Vertices of `leg` that are still unvisited
    fn num_new_vertices(&self, leg: &Path) -> usize {
        leg.vertices()
            .iter()
            .filter(|v| self.unvisited.contains(v))
            .count()
    }

    // tau is the trail strength, eta the count of new vertices per 1000ft of
    // the shortest path from a to b
    fn desirability(&self, ctx: &WanderContext, a: NodeIndex, b: NodeIndex) -> Result<f64, Error> {
        let params = ctx.params;
        let tau = ctx.pheromones.get(a, b);
        let leg = ctx.paths.get(a, b).ok_or(Error::Unreachable {
            from: ctx.graph.vertex(a).id,
            to: ctx.graph.vertex(b).id,
        })?;
        // zero-length legs would divide by zero
        let cost = leg.cost(params.metric)?.max(1);
        let eta = 1000.0 * self.num_new_vertices(leg) as f64 / cost as f64;
        Ok(tau.powf(params.alpha) * eta.powf(params.beta))
    }

    fn choose_next<R: Rng>(
        &self,
        ctx: &WanderContext,
        current: NodeIndex,
        rng: &mut R,
    ) -> Result<NodeIndex, Error> {
        let candidates: Vec<NodeIndex> = self.unvisited.iter().copied().collect();
        let weights = candidates
            .iter()
            .map(|&v| {
                self.desirability(ctx, current, v)
                    .map(|d| d + ctx.params.temperature)
            })
            .collect::<Result<Vec<f64>, Error>>()?;
        Ok(candidates[roulette(&weights, rng)])
    }
}

/// Roulette-wheel selection: index `i` is picked with probability
/// `weights[i] / sum(weights)`. Falls back to a uniform pick when the
/// weights carry no information (all zero or not finite).
///
/// # Panics
/// Panics if `weights` is empty.
pub fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.gen_range(0..weights.len());
    }
    let mut target = rng.gen::<f64>() * total;
    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        target -= weight;
        if target <= 0.0 {
            return i;
        }
    }
    // rounding can leave a sliver past the last weight
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len() - 1)
}
