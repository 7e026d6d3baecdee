pub mod builder;
pub mod error;
pub mod export;
pub mod graph;
pub mod metric;
pub mod path;
