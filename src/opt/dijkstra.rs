use petgraph::graph::NodeIndex;
use std::sync::Arc;

use crate::layers::{
    error::Error,
    graph::{Edge, Graph},
    metric::{self, Metric},
    path::Path,
};

use super::heap::IndexedMinHeap;

/// Reusable shortest-path search over a [`Graph`].
///
/// Scratch tables are sized once per graph and cleared between runs.
pub struct Dijkstra<'a> {
    graph: &'a Graph,
    heap: IndexedMinHeap<u64>,
    settled: Vec<bool>,
    back_pointers: Vec<Option<Arc<Edge>>>,
}

/// Every shortest path out of one source vertex
pub struct ShortestPathTree {
    source: NodeIndex,
    back_pointers: Vec<Option<Arc<Edge>>>,
    distances: Vec<Option<u64>>,
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn distance(&self, to: NodeIndex) -> Option<u64> {
        self.distances.get(to.index()).copied().flatten()
    }

    /// The path from the source to `to`, or `None` when `to` cannot be reached
    /// or is the source itself
    pub fn path_to(&self, to: NodeIndex) -> Option<Path> {
        if to == self.source {
            return None;
        }
        let edges = walk_back(&self.back_pointers, to)?;
        Path::new(edges).ok()
    }
}

fn walk_back(back_pointers: &[Option<Arc<Edge>>], finish: NodeIndex) -> Option<Vec<Arc<Edge>>> {
    let mut edges = vec![];
    let mut edge = back_pointers.get(finish.index())?.clone();
    while let Some(e) = edge {
        edge = back_pointers[e.src.index()].clone();
        edges.push(e);
    }
    if edges.is_empty() {
        return None;
    }
    edges.reverse();
    Some(edges)
}

impl<'a> Dijkstra<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let n = graph.vertex_count();
        Dijkstra {
            graph,
            heap: IndexedMinHeap::with_capacity(n),
            settled: vec![false; n],
            back_pointers: vec![None; n],
        }
    }

    /// Exact cheapest path from `start` to `finish` under `metric`.
    ///
    /// Stops as soon as `finish` is popped. An unreachable finish is
    /// [`Error::Unreachable`]; so is `start == finish`, since a path always
    /// has at least one edge.
    pub fn shortest_path(
        &mut self,
        start: NodeIndex,
        finish: NodeIndex,
        metric: Metric,
    ) -> Result<Path, Error> {
        let graph = self.graph;
        let unreachable = || Error::Unreachable {
            from: graph.vertex(start).id,
            to: graph.vertex(finish).id,
        };
        if start == finish {
            return Err(unreachable());
        }
        if !self.search(start, Some(finish), metric)? {
            return Err(unreachable());
        }
        let edges = walk_back(&self.back_pointers, finish).ok_or_else(unreachable)?;
        Path::new(edges)
    }

    /// Runs to exhaustion from `start`, keeping every back-pointer
    pub fn shortest_path_tree(
        &mut self,
        start: NodeIndex,
        metric: Metric,
    ) -> Result<ShortestPathTree, Error> {
        self.search(start, None, metric)?;
        let distances = (0..self.settled.len())
            .map(|i| {
                if self.settled[i] {
                    self.heap.score(i)
                } else {
                    None
                }
            })
            .collect();
        Ok(ShortestPathTree {
            source: start,
            back_pointers: self.back_pointers.clone(),
            distances,
        })
    }

    /// Returns whether `finish` was reached; with no finish, always false
    fn search(
        &mut self,
        start: NodeIndex,
        finish: Option<NodeIndex>,
        metric: Metric,
    ) -> Result<bool, Error> {
        self.heap.clear();
        self.settled.iter_mut().for_each(|s| *s = false);
        self.back_pointers.iter_mut().for_each(|b| *b = None);

        self.heap.insert(start.index(), 0)?;
        while !self.heap.is_empty() {
            let current = NodeIndex::new(self.heap.pop_min()?);
            self.settled[current.index()] = true;
            if Some(current) == finish {
                return Ok(true);
            }
            self.relax(current, metric)?;
        }
        Ok(false)
    }

    fn relax(&mut self, vertex: NodeIndex, metric: Metric) -> Result<(), Error> {
        let graph = self.graph;
        let distance = self
            .heap
            .score(vertex.index())
            .ok_or(Error::NotInHeap(vertex.index()))?;
        for edge in graph.outgoing_edges(vertex) {
            let neighbor = edge.dst.index();
            if self.settled[neighbor] {
                continue;
            }
            let candidate = distance + metric::cost(edge, metric)?;
            if !self.heap.contains(neighbor) {
                self.heap.insert(neighbor, candidate)?;
                self.back_pointers[neighbor] = Some(Arc::clone(edge));
            } else if self.heap.decrease_if_smaller(neighbor, candidate)? {
                self.back_pointers[neighbor] = Some(Arc::clone(edge));
            }
        }
        Ok(())
    }
}
