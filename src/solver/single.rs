use super::{Solver, SINGLE_AGENT_NAME};
use crate::algorithm::{grid_search, SearchAlgorithm};
use crate::common::{Agent, Solution};
use crate::map::Map;
use crate::stat::Stats;

use std::time::Instant;

pub struct SingleAgent<'a> {
    algorithm: SearchAlgorithm,
    map: &'a mut Map,
    start: usize,
    goal: usize,
    stats: Stats,
}

impl<'a> SingleAgent<'a> {
    pub fn new(algorithm: SearchAlgorithm, map: &'a mut Map, start: usize, goal: usize) -> Self {
        SingleAgent {
            algorithm,
            map,
            start,
            goal,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

impl Solver for SingleAgent<'_> {
    fn solve(&mut self) -> Option<Solution> {
        let total_solve_start_time = Instant::now();
        let path = grid_search(
            self.algorithm,
            self.map,
            self.start,
            self.goal,
            &mut self.stats,
        )?;

        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.costs = path.len();
        self.stats.print(&format!("{:?}", self.algorithm));

        let agent = Agent::new(
            0,
            SINGLE_AGENT_NAME,
            self.map.location(self.start),
            self.map.location(self.goal),
        );
        Some(Solution::from_paths(&[agent], vec![path]))
    }
}
