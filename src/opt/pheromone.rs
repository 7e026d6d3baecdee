use petgraph::graph::NodeIndex;

/// Trails never evaporate below this
pub const PHEROMONE_FLOOR: f64 = 0.5;
pub const INIT_PHEROMONE: f64 = 1.0;

/// Dense trail strengths for every ordered pair of distinct vertices.
///
/// Only the colony writes to it, and only between wander phases.
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    n: usize,
    values: Vec<f64>,
}

impl PheromoneMatrix {
    pub fn new(n: usize) -> Self {
        let mut values = vec![INIT_PHEROMONE; n * n];
        for i in 0..n {
            values[i * n + i] = 0.0;
        }
        PheromoneMatrix { n, values }
    }

    pub fn len(&self) -> usize {
        self.n * self.n.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.values[from.index() * self.n + to.index()]
    }

    /// Reinforce the trail in both directions
    pub fn deposit(&mut self, a: NodeIndex, b: NodeIndex, amount: f64) {
        if a == b {
            return;
        }
        self.values[a.index() * self.n + b.index()] += amount;
        self.values[b.index() * self.n + a.index()] += amount;
    }

    /// Scale every trail by `rho`, but never below [`PHEROMONE_FLOOR`]
    pub fn evaporate(&mut self, rho: f64) {
        for i in 0..self.n {
            for j in 0..self.n {
                if i != j {
                    let value = &mut self.values[i * self.n + j];
                    *value = (*value * rho).max(PHEROMONE_FLOOR);
                }
            }
        }
    }

    /// Smallest trail over all distinct pairs
    pub fn min(&self) -> Option<f64> {
        (0..self.n)
            .flat_map(|i| (0..self.n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.values[i * self.n + j])
            .reduce(f64::min)
    }
}
