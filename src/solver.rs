mod cbs;
mod single;

pub use cbs::CBS;
pub use single::SingleAgent;

use crate::algorithm::SearchAlgorithm;
use crate::common::{Agent, Solution, Waypoint};
use crate::map::Map;

use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Agent name used in single-agent solutions.
pub const SINGLE_AGENT_NAME: &str = "agent0";

pub trait Solver {
    fn solve(&mut self) -> Option<Solution>;
}

/// Plan one agent between two cell ids. Returns an empty solution when the
/// goal cannot be reached.
#[instrument(skip(map), level = "debug")]
pub fn single_agent_search(
    algorithm: SearchAlgorithm,
    map: &mut Map,
    start: usize,
    goal: usize,
) -> Solution {
    map.reset();
    let mut solver = SingleAgent::new(algorithm, map, start, goal);
    solver.solve().unwrap_or_else(|| {
        info!("{algorithm:?} search finds no path");
        Solution::default()
    })
}

/// Plan all agents jointly with conflict-based search. Agents are ordered by
/// name. Returns an empty solution when an agent cannot reach its goal or no
/// conflict-free plan exists within the time horizon.
#[instrument(skip_all, level = "debug")]
pub fn multi_agent_search(
    map: &mut Map,
    waypoints: &BTreeMap<String, Waypoint>,
    max_time_step: Option<usize>,
) -> Solution {
    map.reset();
    let agents = agents_from_waypoints(waypoints);
    let mut solver = CBS::new(agents, map, max_time_step);
    solver.solve().unwrap_or_else(|| {
        info!("cbs search finds no solution");
        Solution::default()
    })
}

pub fn agents_from_waypoints(waypoints: &BTreeMap<String, Waypoint>) -> Vec<Agent> {
    waypoints
        .iter()
        .enumerate()
        .map(|(id, (name, waypoint))| Agent::new(id, name.clone(), waypoint.start, waypoint.goal))
        .collect()
}
