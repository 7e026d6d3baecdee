use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Error(String),
    #[error("Cannot read file")]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// A record in a graph source file could not be parsed
    #[error("malformed record on line {line} of '{file}': {reason}")]
    Parse {
        file: String,
        line: u64,
        reason: String,
    },
    /// An edge references a vertex id that was never declared
    #[error("The vertex id {0} is not known")]
    UnknownVertex(u32),
    #[error("illegal edge type code '{0}'")]
    IllegalEdgeType(char),
    #[error("cannot remove from empty heap")]
    EmptyHeap,
    #[error("item {0} is not in the heap")]
    NotInHeap(usize),
    #[error("item {0} is already in the heap")]
    AlreadyInHeap(usize),
    /// The finish vertex cannot be reached from the start vertex
    #[error("no route from vertex {from} to vertex {to}")]
    Unreachable { from: u32, to: u32 },
    #[error("edges do not form a walk: {0}")]
    BrokenPath(String),
    #[error("graph has {0} vertices, at least 2 are needed for a tour")]
    GraphTooSmall(usize),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
