use petgraph::graph::NodeIndex;
use std::sync::{Arc, OnceLock};

use super::{
    error::Error,
    graph::Edge,
    metric::{self, Metric},
};

/// A non-empty walk through the network.
///
/// Consecutive edges always join up (`edges[i].dst == edges[i + 1].src`).
/// Costs are memoized per metric, so a shared path can be costed from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Path {
    edges: Vec<Arc<Edge>>,
    costs: [OnceLock<u64>; 4],
}

impl Path {
    pub fn new(edges: Vec<Arc<Edge>>) -> Result<Path, Error> {
        if edges.is_empty() {
            return Err(Error::BrokenPath("a path needs at least one edge".into()));
        }
        for w in edges.windows(2) {
            if w[0].dst != w[1].src {
                return Err(Error::BrokenPath(format!(
                    "edge {} does not continue from edge {}",
                    w[1].id, w[0].id
                )));
            }
        }
        Ok(Path {
            edges,
            costs: Default::default(),
        })
    }

    pub fn edges(&self) -> &[Arc<Edge>] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn start(&self) -> NodeIndex {
        self.edges[0].src
    }

    pub fn end(&self) -> NodeIndex {
        self.edges[self.edges.len() - 1].dst
    }

    /// Every vertex passed through, `num_edges() + 1` entries
    pub fn vertices(&self) -> Vec<NodeIndex> {
        let mut vertices = Vec::with_capacity(self.edges.len() + 1);
        vertices.push(self.start());
        vertices.extend(self.edges.iter().map(|e| e.dst));
        vertices
    }

    pub fn cost(&self, metric: Metric) -> Result<u64, Error> {
        let cell = &self.costs[metric.index()];
        if let Some(&cost) = cell.get() {
            return Ok(cost);
        }
        let cost = metric::path_cost(self.edges.iter().map(|e| e.as_ref()), metric)?;
        // a racing thread can only have stored the same value
        let _ = cell.set(cost);
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: u32, src: usize, dst: usize, length: u32, edge_type: char) -> Arc<Edge> {
        Arc::new(Edge {
            src: NodeIndex::new(src),
            dst: NodeIndex::new(dst),
            id,
            name: format!("e{id}"),
            length,
            angle: 0,
            direction: "N".into(),
            edge_type,
        })
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(Path::new(vec![]), Err(Error::BrokenPath(_))));
    }

    #[test]
    fn test_gap_rejected() {
        let edges = vec![edge(1, 0, 1, 10, 'f'), edge(2, 2, 3, 10, 'f')];
        assert!(matches!(Path::new(edges), Err(Error::BrokenPath(_))));
    }

    #[test]
    fn test_vertices_follow_edges() {
        let path = Path::new(vec![
            edge(1, 0, 1, 10, 'f'),
            edge(2, 1, 2, 10, 'f'),
            edge(3, 2, 0, 10, 'f'),
        ])
        .unwrap();
        let vertices: Vec<usize> = path.vertices().iter().map(|v| v.index()).collect();
        assert_eq!(vertices, vec![0, 1, 2, 0]);
        assert_eq!(path.start(), NodeIndex::new(0));
        assert_eq!(path.end(), NodeIndex::new(0));
    }

    #[test]
    fn test_cost_per_metric() {
        let path = Path::new(vec![edge(1, 0, 1, 10, 'F'), edge(2, 1, 2, 5, 'f')]).unwrap();
        assert_eq!(path.cost(Metric::WalkDistance).unwrap(), 15);
        assert_eq!(
            path.cost(Metric::SkateTime).unwrap(),
            10 * metric::WALK_SPEED * 2 + 5 * metric::WALK_SPEED
        );
        assert_eq!(path.cost(Metric::WalkTime).unwrap(), 15 * metric::WALK_SPEED);
        // cached values stay per metric
        assert_eq!(path.cost(Metric::WalkDistance).unwrap(), 15);
    }

    #[test]
    fn test_illegal_code_surfaces_from_cost() {
        let path = Path::new(vec![edge(1, 0, 1, 10, 'z')]).unwrap();
        assert_eq!(path.cost(Metric::SkateDistance).unwrap(), 10);
        assert!(matches!(
            path.cost(Metric::SkateTime),
            Err(Error::IllegalEdgeType('z'))
        ));
    }
}
