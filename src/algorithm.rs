mod astar;
mod traversal;

pub(crate) use astar::a_star_search;
pub(crate) use traversal::grid_search;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::common::{Path, TimeState};

/// Static-graph search used for a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchAlgorithm {
    /// Depth-first exploration; finds some path, not necessarily the shortest.
    Unordered,
    BreadthFirst,
    /// A* with the Manhattan heuristic.
    BestFirst,
}

type Trace = HashMap<TimeState, TimeState>;

fn construct_path(trace: &Trace, mut current: TimeState) -> Path {
    let mut path = vec![current];
    while let Some(&previous) = trace.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
