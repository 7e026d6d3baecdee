use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{error::Error, graph::Edge};

/// Feet per minute walking on flat ground
pub const WALK_SPEED: u64 = 272;

/// Selects how an edge is costed.
///
/// Distance metrics use the raw edge length. Time metrics weight the length by
/// a speed multiplier chosen from the edge type code; only `SkateTime` keeps
/// uppercase (skate-capable) codes, `WalkTime` lower-cases every code first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    #[default]
    WalkDistance,
    WalkTime,
    SkateDistance,
    SkateTime,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::WalkDistance,
        Metric::WalkTime,
        Metric::SkateDistance,
        Metric::SkateTime,
    ];

    /// Dense index, used for per-metric caches
    pub fn index(self) -> usize {
        match self {
            Metric::WalkDistance => 0,
            Metric::WalkTime => 1,
            Metric::SkateDistance => 2,
            Metric::SkateTime => 3,
        }
    }
}

fn speed_multiplier(edge_type: char) -> Result<f64, Error> {
    match edge_type {
        'F' => Ok(2.0),
        'U' => Ok(1.1),
        'D' => Ok(5.0),
        'f' => Ok(1.0),
        'u' => Ok(0.9),
        'd' => Ok(1.1),
        's' => Ok(0.5),
        't' => Ok(0.9),
        'b' => Ok(1.0),
        other => Err(Error::IllegalEdgeType(other)),
    }
}

/// Cost of traversing `edge` under `metric`.
///
/// An edge type code outside the multiplier table is an error for the time
/// metrics only; distance metrics never look at the code.
pub fn cost(edge: &Edge, metric: Metric) -> Result<u64, Error> {
    let edge_type = match metric {
        Metric::WalkDistance | Metric::SkateDistance => return Ok(edge.length as u64),
        Metric::WalkTime => edge.edge_type.to_ascii_lowercase(),
        Metric::SkateTime => edge.edge_type,
    };
    let multiplier = speed_multiplier(edge_type)?;
    Ok(((edge.length as u64 * WALK_SPEED) as f64 * multiplier) as u64)
}

/// Total cost of a sequence of edges
pub fn path_cost<'a, I>(edges: I, metric: Metric) -> Result<u64, Error>
where
    I: IntoIterator<Item = &'a Edge>,
{
    edges
        .into_iter()
        .try_fold(0u64, |total, edge| Ok(total + cost(edge, metric)?))
}
