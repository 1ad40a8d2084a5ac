use anyhow::{bail, Context, Result};
use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing::{debug, info};

use crate::common::{Agent, Waypoint};
use crate::map::Map;
use crate::solver::agents_from_waypoints;

/// Start and goal of every agent, keyed by agent name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub agents: BTreeMap<String, Waypoint>,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("cannot open scenario {path}"))?;
        let reader = BufReader::new(file);
        let scenario = serde_yaml::from_reader(reader)
            .with_context(|| format!("invalid scenario {path}"))?;
        Ok(scenario)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Scenario> {
        serde_yaml::from_str(yaml).context("invalid scenario")
    }

    pub fn write_to_file(&self, path: &str) -> Result<()> {
        let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(self)?;
        writer.write_all(yaml_data.as_bytes())?;

        Ok(())
    }

    /// Pick `num_agents` start/goal pairs on free cells. No two agents share
    /// a start or a goal, and nobody starts on its own goal.
    pub fn generate_randomly<R: Rng + ?Sized>(
        map: &Map,
        num_agents: usize,
        rng: &mut R,
    ) -> Result<Scenario> {
        let mut free_cells: Vec<usize> = (0..map.num_cells())
            .filter(|&id| map.cell(id).is_passable())
            .collect();
        if free_cells.len() < 2 * num_agents {
            bail!(
                "{} free cells cannot hold {num_agents} distinct starts and goals",
                free_cells.len()
            );
        }

        free_cells.shuffle(rng);
        let agents = free_cells
            .chunks_exact(2)
            .take(num_agents)
            .enumerate()
            .map(|(index, pair)| {
                (
                    format!("agent{}", index + 1),
                    Waypoint {
                        start: map.location(pair[0]),
                        goal: map.location(pair[1]),
                    },
                )
            })
            .collect();

        let scenario = Scenario { agents };
        info!("Generate scen: {:?}", scenario.agents);
        Ok(scenario)
    }

    pub fn agents(&self) -> Vec<Agent> {
        agents_from_waypoints(&self.agents)
    }
}

/// Turn a random 20% to 30% of the cells into obstacles. Returns the ids of
/// the chosen cells.
pub fn randomize_obstacles<R: Rng + ?Sized>(map: &mut Map, rng: &mut R) -> Vec<usize> {
    let num_cells = map.num_cells();
    let last_id = num_cells.saturating_sub(1);
    let lower_bound = last_id / 5;
    let upper_bound = last_id * 3 / 10;
    let total_obstacles = rng.gen_range(lower_bound..=upper_bound);

    let obstacles = index::sample(rng, num_cells, total_obstacles).into_vec();
    for &id in &obstacles {
        map.set_obstacle(id, true);
    }
    debug!("random obstacles: {obstacles:?}");
    obstacles
}
