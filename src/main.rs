/*
 * Swarm Simulation
 *
 * Agents move under flocking rules (alignment, cohesion, separation), push
 * balls toward a goal, recruit neighbours through relayed broadcasts and
 * coordinate through a pheromone field. A small food/larva economy lets the
 * colony hatch new agents.
 *
 * Parameters come from a scenario preset, optionally layered with a TOML
 * config file and command-line overrides, and can be adjusted live from the
 * control panel and keyboard.
 */

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use swarm::params::{Scenario, SimulationParams};
use swarm::{app, config};

#[derive(Parser, Debug)]
#[command(name = "swarm", version, about = "2D swarm simulation with flocking, recruitment and pheromones")]
struct Cli {
    /// TOML file with parameter overrides.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario preset to start from.
    #[arg(short, long, value_enum)]
    scenario: Option<Scenario>,

    /// Number of agents at startup.
    #[arg(short = 'n', long)]
    agents: Option<usize>,

    /// Seed for a repeatable run.
    #[arg(long)]
    seed: Option<u64>,

    /// Image drawn for each agent instead of a triangle.
    #[arg(long)]
    sprite: Option<PathBuf>,

    /// Print the resolved parameters as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, params: &mut SimulationParams) {
        if let Some(agents) = self.agents {
            params.num_agents = agents;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(sprite) = &self.sprite {
            params.sprite_path = Some(sprite.clone());
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut params = config::load_params(cli.config.as_deref(), cli.scenario).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config: {}", path.display()),
        None => "Failed to build scenario preset".to_string(),
    })?;
    cli.apply(&mut params);
    params.validate().context("Invalid command-line override")?;

    if cli.print_config {
        print!("{}", config::to_toml(&params)?);
        return Ok(());
    }

    info!(
        scenario = params.scenario.label(),
        agents = params.num_agents,
        world = %format!("{}x{}", params.world_width, params.world_height),
        seed = ?params.seed,
        "starting swarm simulation"
    );

    app::set_launch_params(params).map_err(|_| anyhow!("launch parameters were already set"))?;
    nannou::app(app::model).update(app::update).run();
    Ok(())
}
