use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use std::time::Instant;

use crate::layers::{error::Error, graph::Graph, metric::Metric, path::Path};

use super::dijkstra::Dijkstra;

/// Exact shortest path for every ordered pair of distinct vertices.
///
/// Built once, read-only afterwards. One full Dijkstra run per source
/// vertex covers every destination, with the same answers as a separate
/// early-exit run per pair.
pub struct PathCache {
    n: usize,
    metric: Metric,
    paths: Vec<Option<Path>>,
}

impl PathCache {
    /// Fails with [`Error::Unreachable`] unless every vertex can reach every other
    pub fn build(graph: &Graph, metric: Metric) -> Result<PathCache, Error> {
        let start = Instant::now();
        let n = graph.vertex_count();
        let vertices = graph.vertex_set();
        let rows = vertices
            .par_iter()
            .map_init(
                || Dijkstra::new(graph),
                |dijkstra, &source| -> Result<Vec<Option<Path>>, Error> {
                    let tree = dijkstra.shortest_path_tree(source, metric)?;
                    let mut row = Vec::with_capacity(n);
                    for &target in vertices.iter() {
                        if target == source {
                            row.push(None);
                            continue;
                        }
                        let path = tree.path_to(target).ok_or(Error::Unreachable {
                            from: graph.vertex(source).id,
                            to: graph.vertex(target).id,
                        })?;
                        // warm the cost cell before the path is shared
                        path.cost(metric)?;
                        row.push(Some(path));
                    }
                    Ok(row)
                },
            )
            .collect::<Result<Vec<_>, Error>>()?;
        log::debug!(
            "Shortest paths for {} pairs computed in {}ms",
            n * n.saturating_sub(1),
            start.elapsed().as_millis()
        );
        Ok(PathCache {
            n,
            metric,
            paths: rows.into_iter().flatten().collect(),
        })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// `None` only for `from == to`
    pub fn get(&self, from: NodeIndex, to: NodeIndex) -> Option<&Path> {
        self.paths.get(from.index() * self.n + to.index())?.as_ref()
    }
}
