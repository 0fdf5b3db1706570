/*
 * Swarm Simulation - Module Definitions
 *
 * This file defines the module structure for the swarm simulation.
 * The simulation core (steering, agents, objects, pheromones, colony and the
 * step pipeline) has no windowing dependencies beyond nannou's math types;
 * app, input, renderer and ui wire it into a nannou window.
 */

// Re-export key components for easier access
pub use agent::Agent;
pub use app::Model;
pub use colony::Colony;
pub use debug::DebugInfo;
pub use error::{SwarmError, SwarmResult};
pub use params::{Scenario, SimulationParams};
pub use pheromone::{Channel, PheromoneField};
pub use spatial_grid::SpatialGrid;
pub use swarm::Swarm;

// Define modules
pub mod agent;
pub mod app;
pub mod colony;
pub mod config;
pub mod debug;
pub mod error;
pub mod input;
pub mod objects;
pub mod params;
pub mod pheromone;
pub mod renderer;
pub mod spatial_grid;
pub mod steering;
pub mod swarm;
pub mod ui;
