use super::{position_at, Agent, Conflict, ConflictType, ConstraintSet, Path};
use crate::algorithm::a_star_search;
use crate::map::Map;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// A node of the constraint tree.
///
/// Identity is the pair (cost, paths): nodes reached through different
/// constraint sets but holding the same joint plan compare equal, so the
/// open and closed lists of the planner treat them as one node.
#[derive(Clone, Debug)]
pub(crate) struct ConstraintTreeNode {
    pub(crate) constraints: Vec<ConstraintSet>,
    pub(crate) paths: Vec<Path>,
    pub(crate) cost: usize, // Sum of path lengths, start position included
}

impl PartialEq for ConstraintTreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.paths == other.paths
    }
}

impl Eq for ConstraintTreeNode {}

impl Hash for ConstraintTreeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cost.hash(state);
        self.paths.hash(state);
    }
}

impl Ord for ConstraintTreeNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            // Paths break ties so the expansion order is reproducible.
            .then_with(|| self.paths.cmp(&other.paths))
    }
}

impl PartialOrd for ConstraintTreeNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ConstraintTreeNode {
    pub(crate) fn new(
        agents: &[Agent],
        map: &Map,
        max_time_step: usize,
        stats: &mut Stats,
    ) -> Option<Self> {
        let constraints = vec![ConstraintSet::new(); agents.len()];
        let mut paths = Vec::with_capacity(agents.len());

        for agent in agents {
            let Some(path) =
                a_star_search(map, agent, &constraints[agent.id], max_time_step, stats)
            else {
                debug!("agent {} cannot reach its goal", agent.name);
                return None;
            };
            paths.push(path);
        }

        let cost = paths.iter().map(Vec::len).sum();
        let root = ConstraintTreeNode {
            constraints,
            paths,
            cost,
        };
        debug!("High level root node {root:?}");
        Some(root)
    }

    pub(crate) fn detect_conflict(&self) -> Option<Conflict> {
        detect_conflict(&self.paths)
    }

    /// Child node where one side of `conflict` is forbidden and that agent
    /// replanned. `None` if the agent has no path left.
    pub(crate) fn update_constraint(
        &self,
        conflict: &Conflict,
        resolve_first: bool,
        agents: &[Agent],
        map: &Map,
        max_time_step: usize,
        stats: &mut Stats,
    ) -> Option<ConstraintTreeNode> {
        let (first, second) = conflict.constraints();
        let (agent_to_update, constraint) = if resolve_first {
            (conflict.agent_1, first)
        } else {
            (conflict.agent_2, second)
        };

        let mut new_constraints = self.constraints.clone();
        new_constraints[agent_to_update].insert(constraint);

        let new_path = a_star_search(
            map,
            &agents[agent_to_update],
            &new_constraints[agent_to_update],
            max_time_step,
            stats,
        )?;
        debug!("Update agent {agent_to_update:?} with path {new_path:?} for conflict {conflict:?}");

        let mut new_paths = self.paths.clone();
        let new_cost = self.cost - new_paths[agent_to_update].len() + new_path.len();
        new_paths[agent_to_update] = new_path;

        Some(ConstraintTreeNode {
            constraints: new_constraints,
            paths: new_paths,
            cost: new_cost,
        })
    }
}

/// First occupation or swap conflict, scanning time steps in increasing order
/// and agent pairs (i < j) in index order within a time step. Agents hold
/// their final position once their path ends.
pub(crate) fn detect_conflict(paths: &[Path]) -> Option<Conflict> {
    let max_length = paths.iter().map(Vec::len).max().unwrap_or(0);

    for time_step in 0..max_length {
        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                let pos1 = position_at(&paths[i], time_step);
                let pos2 = position_at(&paths[j], time_step);

                if pos1 == pos2 {
                    return Some(Conflict {
                        agent_1: i,
                        agent_2: j,
                        time_step,
                        conflict_type: ConflictType::Occupation { location: pos1 },
                    });
                }

                let next_pos1 = position_at(&paths[i], time_step + 1);
                let next_pos2 = position_at(&paths[j], time_step + 1);

                if pos1 == next_pos2 && next_pos1 == pos2 {
                    return Some(Conflict {
                        agent_1: i,
                        agent_2: j,
                        time_step,
                        conflict_type: ConflictType::Swap {
                            from: pos1,
                            to: next_pos1,
                        },
                    });
                }
            }
        }
    }

    None
}
