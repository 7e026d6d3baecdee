use geo_types::Point;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    Directed, Direction,
};
use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

// Directed graph of the walkway network. Vertices are keyed by their external
// id; the optimizer works on the dense petgraph node handles.
pub struct Graph {
    graph: petgraph::Graph<Vertex, Arc<Edge>, Directed>,
    node_map: HashMap<u32, NodeIndex>,
}

/// A point of the network. Equality and hashing use `id` only.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: u32,
    pub name: String,
    pub label: String,
    /// Planar position in feet
    pub geom: Point<f64>,
}

impl Vertex {
    pub fn new(id: u32, name: &str, label: &str, x: f64, y: f64) -> Self {
        Vertex {
            id,
            name: name.to_string(),
            label: label.to_string(),
            geom: Point::new(x, y),
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Attributes of a directed edge, before its endpoints are resolved
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub id: u32,
    pub name: String,
    /// Length in feet
    pub length: u32,
    pub angle: i32,
    pub direction: String,
    /// Surface code: uppercase can be skated, lowercase is the walk-only variant
    pub edge_type: char,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub src: NodeIndex,
    pub dst: NodeIndex,
    pub id: u32,
    pub name: String,
    pub length: u32,
    pub angle: i32,
    pub direction: String,
    pub edge_type: char,
}

impl Edge {
    pub fn can_skate(&self) -> bool {
        self.edge_type.is_uppercase()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            graph: petgraph::Graph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn print_stats(&self) {
        log::info!("Walkway network:");
        log::info!("  Vertices: {}", self.graph.node_count());
        log::info!("  Edges: {}", self.graph.edge_count());
    }

    /// Adds a vertex, or returns the existing handle if its id is already present
    pub fn add_vertex(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&vertex.id) {
            return index;
        }
        let id = vertex.id;
        let index = self.graph.add_node(vertex);
        self.node_map.insert(id, index);
        index
    }

    /// Adds a directed edge from `src` to `dst`, creating either endpoint if absent
    pub fn add_edge(&mut self, src: Vertex, dst: Vertex, data: EdgeData) -> EdgeIndex {
        let src = self.add_vertex(src);
        let dst = self.add_vertex(dst);
        let edge = Edge {
            src,
            dst,
            id: data.id,
            name: data.name,
            length: data.length,
            angle: data.angle,
            direction: data.direction,
            edge_type: data.edge_type,
        };
        self.graph.add_edge(src, dst, Arc::new(edge))
    }

    /// Outgoing edges of `vertex` in insertion order
    pub fn outgoing_edges(&self, vertex: NodeIndex) -> Vec<&Arc<Edge>> {
        // petgraph walks a node's edge list newest first
        let mut edges: Vec<&Arc<Edge>> = self
            .graph
            .edges_directed(vertex, Direction::Outgoing)
            .map(|e| e.weight())
            .collect();
        edges.reverse();
        edges
    }

    pub fn neighbors(&self, vertex: NodeIndex) -> Vec<NodeIndex> {
        self.outgoing_edges(vertex).iter().map(|e| e.dst).collect()
    }

    /// First edge from `from` to `to` in insertion order
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&Arc<Edge>> {
        self.outgoing_edges(from).into_iter().find(|e| e.dst == to)
    }

    pub fn vertex_by_id(&self, id: u32) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    /// # Panics
    /// Panics if `index` was not produced by this graph.
    pub fn vertex(&self, index: NodeIndex) -> &Vertex {
        &self.graph[index]
    }

    /// Snapshot of every vertex handle, in insertion order
    pub fn vertex_set(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Arc<Edge>> {
        self.graph.edge_weights()
    }
}
