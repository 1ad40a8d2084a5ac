use grid_mapf::common::{Agent, Solution};
use grid_mapf::config::{Cli, Config};
use grid_mapf::map::Map;
use grid_mapf::scenario::{randomize_obstacles, Scenario};
use grid_mapf::solver::{multi_agent_search, single_agent_search, SINGLE_AGENT_NAME};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut map = match &config.map_path {
        Some(map_path) => Map::from_file(map_path)?,
        None => Map::new(config.width, config.height),
    };
    if config.random_obstacles {
        randomize_obstacles(&mut map, &mut rng);
    }

    let algorithm = config.solver.single_agent_algorithm();
    let scenario = match &config.scenario_path {
        Some(scenario_path) => Scenario::load_from_file(scenario_path)?,
        None => {
            let num_agents = if algorithm.is_some() { 1 } else { config.num_agents };
            Scenario::generate_randomly(&map, num_agents, &mut rng)?
        }
    };
    if let Some(path) = &config.save_scenario {
        scenario.write_to_file(path)?;
        info!("Scenario saved to {path}");
    }

    let agents = scenario.agents();
    if agents.is_empty() {
        bail!("scenario has no agents");
    }
    for agent in &agents {
        if !agent.verify(&map) {
            bail!(
                "agent {} has an invalid start {:?} or goal {:?}",
                agent.name,
                agent.start,
                agent.goal
            );
        }
    }

    let (solution, planned): (Solution, Vec<Agent>) = match algorithm {
        Some(algorithm) => {
            let agent = &agents[0];
            let start = map.cell_id(agent.start);
            let goal = map.cell_id(agent.goal);
            let planned = vec![Agent::new(0, SINGLE_AGENT_NAME, agent.start, agent.goal)];
            (
                single_agent_search(algorithm, &mut map, start, goal),
                planned,
            )
        }
        None => (
            multi_agent_search(&mut map, &scenario.agents, config.max_time_step),
            agents,
        ),
    };

    if solution.is_empty() {
        info!("No plan found");
    } else if !solution.verify(&map, &planned) {
        error!("Plan failed verification");
    } else {
        info!(
            "Plan cost {} makespan {}",
            solution.cost(),
            solution.makespan()
        );
    }

    let output = serde_json::to_string_pretty(&solution)
        .map_err(|err| anyhow!("cannot serialize plan: {err}"))?;
    match &config.output_path {
        Some(output_path) => std::fs::write(output_path, output)
            .with_context(|| format!("cannot write plan to {output_path}"))?,
        None => println!("{output}"),
    }

    Ok(())
}
