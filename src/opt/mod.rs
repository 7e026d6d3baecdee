pub mod aco;
pub mod ant;
pub mod cache;
pub mod dijkstra;
pub mod heap;
pub mod pheromone;
