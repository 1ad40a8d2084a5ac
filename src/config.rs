use crate::algorithm::SearchAlgorithm;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    Unordered,
    BreadthFirst,
    BestFirst,
    Cbs,
}

impl SolverKind {
    /// The static-graph search for single-agent solvers, `None` for CBS.
    pub fn single_agent_algorithm(self) -> Option<SearchAlgorithm> {
        match self {
            SolverKind::Unordered => Some(SearchAlgorithm::Unordered),
            SolverKind::BreadthFirst => Some(SearchAlgorithm::BreadthFirst),
            SolverKind::BestFirst => Some(SearchAlgorithm::BestFirst),
            SolverKind::Cbs => None,
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "grid_mapf",
    about = "Single-agent and conflict-based multi-agent path planning on a grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to the YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Grid width when no map file is given")]
    pub width: Option<usize>,

    #[arg(long, help = "Grid height when no map file is given")]
    pub height: Option<usize>,

    #[arg(long, help = "Path to the YAML scenario file")]
    pub scenario_path: Option<String>,

    #[arg(long, value_enum, help = "Solver to use")]
    pub solver: Option<SolverKind>,

    #[arg(long, help = "Number of randomly generated agents")]
    pub num_agents: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Turn 20% to 30% of the cells into obstacles")]
    pub random_obstacles: bool,

    #[arg(long, help = "Time horizon of the low-level search")]
    pub max_time_step: Option<usize>,

    #[arg(long, help = "Write the plan as JSON to this file instead of stdout")]
    pub output_path: Option<String>,

    #[arg(long, help = "Write the scenario in use to this YAML file")]
    pub save_scenario: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map_path: Option<String>,
    pub width: usize,
    pub height: usize,
    pub scenario_path: Option<String>,
    pub solver: SolverKind,
    pub num_agents: usize,
    pub seed: u64,
    pub random_obstacles: bool,
    pub max_time_step: Option<usize>,
    pub output_path: Option<String>,
    pub save_scenario: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            width: 8,
            height: 8,
            scenario_path: None,
            solver: SolverKind::Cbs,
            num_agents: 4,
            seed: 0,
            random_obstacles: false,
            max_time_step: None,
            output_path: None,
            save_scenario: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid config")
    }

    /// Values given on the command line win over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(width) = cli.width {
            self.width = width;
        }
        if let Some(height) = cli.height {
            self.height = height;
        }
        if let Some(scenario_path) = &cli.scenario_path {
            self.scenario_path = Some(scenario_path.clone());
        }
        if let Some(solver) = cli.solver {
            self.solver = solver;
        }
        if let Some(num_agents) = cli.num_agents {
            self.num_agents = num_agents;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        self.random_obstacles |= cli.random_obstacles;
        if let Some(max_time_step) = cli.max_time_step {
            self.max_time_step = Some(max_time_step);
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(save_scenario) = &cli.save_scenario {
            self.save_scenario = Some(save_scenario.clone());
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.map_path.is_none() && (self.width == 0 || self.height == 0) {
            return Err(anyhow!(
                "Grid dimensions must be positive, got {}x{}",
                self.width,
                self.height
            ));
        }

        if self.scenario_path.is_none() && self.num_agents == 0 {
            return Err(anyhow!("Number of agents must be at least 1"));
        }

        if self.max_time_step == Some(0) {
            return Err(anyhow!("Max time step must be at least 1"));
        }
        Ok(())
    }
}
