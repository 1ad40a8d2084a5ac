use super::Solver;
use crate::common::{Agent, ConstraintTreeNode, Solution};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, info};

pub struct CBS {
    agents: Vec<Agent>,
    map: Map,
    max_time_step: usize,
    stats: Stats,
}

impl CBS {
    /// `max_time_step` bounds the length of every low-level path. It defaults
    /// to the number of free cells times the number of agents.
    pub fn new(agents: Vec<Agent>, map: &Map, max_time_step: Option<usize>) -> Self {
        let max_time_step = max_time_step
            .unwrap_or_else(|| (map.num_passable_cells() * agents.len()).max(1));
        CBS {
            agents,
            map: map.clone(),
            max_time_step,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl Solver for CBS {
    fn solve(&mut self) -> Option<Solution> {
        let total_solve_start_time = Instant::now();
        let mut open = BTreeSet::new();
        let mut closed = HashSet::new();

        let root = ConstraintTreeNode::new(
            &self.agents,
            &self.map,
            self.max_time_step,
            &mut self.stats,
        )?;
        open.insert(root);

        while let Some(current_node) = open.pop_first() {
            self.stats.high_level_expand_nodes += 1;

            let Some(conflict) = current_node.detect_conflict() else {
                // No conflicts, return solution.
                self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
                self.stats.costs = current_node.cost;
                self.stats.print("cbs");
                return Some(Solution::from_paths(&self.agents, current_node.paths));
            };
            debug!("conflict: {conflict:?}");

            let mut children = Vec::with_capacity(2);
            for resolve_first in [true, false] {
                if let Some(child) = current_node.update_constraint(
                    &conflict,
                    resolve_first,
                    &self.agents,
                    &self.map,
                    self.max_time_step,
                    &mut self.stats,
                ) {
                    children.push(child);
                }
            }

            closed.insert(current_node);
            for child in children {
                if !closed.contains(&child) {
                    open.insert(child);
                }
            }
        }

        info!(
            "cbs exhausts the constraint tree after {} expansions",
            self.stats.high_level_expand_nodes
        );
        None
    }
}
