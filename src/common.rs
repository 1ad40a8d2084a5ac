mod constraint;
mod highlevel;
mod lowlevel;

pub use constraint::{
    Conflict, ConflictType, Constraint, ConstraintSet, EdgeConstraint, VertexConstraint,
};
pub(crate) use highlevel::{detect_conflict, ConstraintTreeNode};
pub(crate) use lowlevel::LowLevelOpenNode;

use crate::map::Map;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A grid position. `x` is the column and `y` the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Location {
    pub x: usize,
    pub y: usize,
}

impl Location {
    pub fn new(x: usize, y: usize) -> Self {
        Location { x, y }
    }

    pub fn manhattan(&self, other: &Location) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<[usize; 2]> for Location {
    fn from([x, y]: [usize; 2]) -> Self {
        Location { x, y }
    }
}

impl From<Location> for [usize; 2] {
    fn from(location: Location) -> Self {
        [location.x, location.y]
    }
}

/// A location at a given time step, the node type of the time-expanded search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeState {
    pub time_step: usize,
    pub location: Location,
}

impl TimeState {
    pub fn new(time_step: usize, location: Location) -> Self {
        TimeState {
            time_step,
            location,
        }
    }
}

pub type Path = Vec<TimeState>;

/// Location of an agent at `time_step`, holding its last position once the
/// path has ended.
pub(crate) fn position_at(path: &[TimeState], time_step: usize) -> Location {
    path[time_step.min(path.len() - 1)].location
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub start: Location,
    pub goal: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub name: String,
    pub start: Location,
    pub goal: Location,
}

impl Agent {
    pub fn new(id: usize, name: impl Into<String>, start: Location, goal: Location) -> Self {
        Agent {
            id,
            name: name.into(),
            start,
            goal,
        }
    }

    /// Start and goal must be free cells inside the map.
    pub fn verify(&self, map: &Map) -> bool {
        map.is_passable(self.start) && map.is_passable(self.goal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedPosition {
    pub t: usize,
    pub x: usize,
    pub y: usize,
}

impl From<&TimeState> for TimedPosition {
    fn from(state: &TimeState) -> Self {
        TimedPosition {
            t: state.time_step,
            x: state.location.x,
            y: state.location.y,
        }
    }
}

impl From<&TimedPosition> for TimeState {
    fn from(position: &TimedPosition) -> Self {
        TimeState::new(position.t, Location::new(position.x, position.y))
    }
}

/// Per-agent timed positions. An empty solution means no plan was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution {
    pub paths: BTreeMap<String, Vec<TimedPosition>>,
}

impl Solution {
    pub(crate) fn from_paths(agents: &[Agent], paths: Vec<Path>) -> Self {
        Solution {
            paths: agents
                .iter()
                .zip(paths)
                .map(|(agent, path)| {
                    (
                        agent.name.clone(),
                        path.iter().map(TimedPosition::from).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sum of per-agent path lengths, counted in timed positions.
    pub fn cost(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    pub fn makespan(&self) -> usize {
        self.paths.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Check that every agent walks from its start to its goal through free,
    /// adjacent cells and that no two agents collide or swap.
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        let mut paths = Vec::with_capacity(agents.len());

        for agent in agents {
            let Some(positions) = self.paths.get(&agent.name) else {
                debug!("agent {} has no path", agent.name);
                return false;
            };
            let path: Path = positions.iter().map(TimeState::from).collect();

            match (path.first(), path.last()) {
                (Some(first), Some(last))
                    if first.location == agent.start && last.location == agent.goal => {}
                _ => {
                    debug!("agent {} does not connect start and goal", agent.name);
                    return false;
                }
            }

            for (step, state) in path.iter().enumerate() {
                if state.time_step != step || !map.is_passable(state.location) {
                    debug!("agent {} has invalid state {state:?}", agent.name);
                    return false;
                }
            }

            if path
                .windows(2)
                .any(|pair| pair[0].location.manhattan(&pair[1].location) > 1)
            {
                debug!("agent {} jumps between cells", agent.name);
                return false;
            }

            paths.push(path);
        }

        if let Some(conflict) = detect_conflict(&paths) {
            debug!("solution has conflict {conflict:?}");
            return false;
        }

        true
    }
}
