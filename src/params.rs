/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters for the swarm simulation. The parameters are passed
 * by reference into the simulation step and are only mutated by the UI and
 * input commands. Presets reproduce the successive scenario iterations
 * (plain flocking, target following, object pushing, pheromone colony).
 */

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{SwarmError, SwarmResult};

// Upper bound of the agent slider
pub const MAX_AGENTS: usize = 2000;

// Which iteration of the simulation to start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Flocking agents bouncing off the walls, user-placed blocks as obstacles
    Flocking,
    /// Wrapping flock that can be attracted toward a clicked target
    Target,
    /// Agents scatter, find balls and push them toward the goal
    Soccer,
    /// Soccer plus pheromone trails and a food/larva economy
    #[default]
    Colony,
}

impl Scenario {
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Flocking => "Flocking",
            Scenario::Target => "Target",
            Scenario::Soccer => "Soccer",
            Scenario::Colony => "Colony",
        }
    }
}

// What happens when an agent reaches the edge of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    Wrap,
    Bounce,
}

// The per-agent steering behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Alignment, cohesion and separation (plus an optional target)
    Flock,
    /// Random scatter, attraction toward balls, pushing balls toward the goal
    Forage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingParams {
    pub neighbor_radius: f32,
    pub separation_radius: f32,
    pub obstacle_separation_radius: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_weight: f32,
    pub target_attraction: f32,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            neighbor_radius: 200.0,
            separation_radius: 30.0,
            obstacle_separation_radius: 50.0,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            separation_weight: 1.5,
            target_attraction: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectParams {
    pub count: usize,
    pub push_force: f32,
    pub push_range: f32,
    pub attraction_radius: f32,
    pub broadcast_radius: f32,
    // Impulse handed to a ball when an agent bounces off it
    pub collision_push: f32,
    // Balls closer than this to the goal centre count as settled
    pub settle_radius: f32,
    pub goal_radius: f32,
    // Distance of the goal centre from the bottom-right corner of the world
    pub goal_inset: f32,
}

impl Default for ObjectParams {
    fn default() -> Self {
        Self {
            count: 3,
            push_force: 0.2,
            push_range: 30.0,
            attraction_radius: 100.0,
            broadcast_radius: 300.0,
            collision_push: 0.5,
            settle_radius: 30.0,
            goal_radius: 40.0,
            goal_inset: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PheromoneParams {
    pub enabled: bool,
    pub cell_size: f32,
    pub evaporation_rate: f32,
    pub diffusion_rate: f32,
    pub diffusion_radius: usize,
    pub max_concentration: f32,
    pub min_concentration: f32,
    pub trail_deposit: f32,
    pub recruit_deposit: f32,
    pub follow_weight: f32,
}

impl Default for PheromoneParams {
    fn default() -> Self {
        Self {
            enabled: false,
            cell_size: 20.0,
            evaporation_rate: 0.01,
            diffusion_rate: 0.1,
            diffusion_radius: 1,
            max_concentration: 10.0,
            min_concentration: 0.001,
            trail_deposit: 0.05,
            recruit_deposit: 1.0,
            follow_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyParams {
    pub enabled: bool,
    pub starting_food: u32,
    pub food_per_delivery: u32,
    pub egg_food_cost: u32,
    pub hatch_food_cost: u32,
    pub max_agents: usize,
}

impl Default for ColonyParams {
    fn default() -> Self {
        Self {
            enabled: false,
            starting_food: 10,
            food_per_delivery: 5,
            egg_food_cost: 2,
            hatch_food_cost: 3,
            max_agents: 500,
        }
    }
}

// Parameters for the simulation that can be adjusted via UI, keys or config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub scenario: Scenario,
    pub world_width: f32,
    pub world_height: f32,
    pub num_agents: usize,
    pub max_speed: f32,
    pub max_force: f32,
    pub edge_mode: EdgeMode,
    pub behavior: Behavior,
    pub flocking: FlockingParams,
    pub objects: ObjectParams,
    pub pheromone: PheromoneParams,
    pub colony: ColonyParams,
    pub physics_fps: f32,
    pub enable_parallel: bool,
    pub enable_spatial_grid: bool,
    pub seed: Option<u64>,
    pub sprite_path: Option<PathBuf>,
    pub show_debug: bool,
    pub show_fov: bool,
    pub show_pheromones: bool,
    pub pause_simulation: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    pub previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Debug, Clone, PartialEq)]
struct ParamSnapshot {
    num_agents: usize,
    max_speed: f32,
    max_force: f32,
    flocking: FlockingParams,
    physics_fps: f32,
    pheromone_enabled: bool,
    show_fov: bool,
    show_pheromones: bool,
    show_debug: bool,
    pause_simulation: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::for_scenario(Scenario::default())
    }
}

impl SimulationParams {
    // Build the parameter preset for one of the scenario iterations
    pub fn for_scenario(scenario: Scenario) -> Self {
        let base = Self {
            scenario,
            world_width: 1000.0,
            world_height: 1000.0,
            num_agents: 30,
            max_speed: 10.0,
            max_force: 1.0,
            edge_mode: EdgeMode::Bounce,
            behavior: Behavior::Flock,
            flocking: FlockingParams::default(),
            objects: ObjectParams::default(),
            pheromone: PheromoneParams::default(),
            colony: ColonyParams::default(),
            physics_fps: 30.0,
            enable_parallel: true,
            enable_spatial_grid: true,
            seed: None,
            sprite_path: None,
            show_debug: false,
            show_fov: false,
            show_pheromones: false,
            pause_simulation: false,
            previous_values: None,
        };

        match scenario {
            Scenario::Flocking => Self {
                objects: ObjectParams { count: 0, ..base.objects.clone() },
                ..base
            },
            Scenario::Target => Self {
                num_agents: 50,
                max_speed: 3.5,
                max_force: 0.08,
                edge_mode: EdgeMode::Wrap,
                flocking: FlockingParams {
                    neighbor_radius: 80.0,
                    separation_radius: 24.0,
                    cohesion_weight: 0.85,
                    separation_weight: 1.2,
                    ..FlockingParams::default()
                },
                objects: ObjectParams { count: 0, ..base.objects.clone() },
                physics_fps: 60.0,
                ..base
            },
            Scenario::Soccer => Self {
                behavior: Behavior::Forage,
                ..base
            },
            Scenario::Colony => Self {
                behavior: Behavior::Forage,
                pheromone: PheromoneParams { enabled: true, ..PheromoneParams::default() },
                colony: ColonyParams { enabled: true, ..ColonyParams::default() },
                show_pheromones: true,
                ..base
            },
        }
    }

    // Largest radius used for neighbour lookups, drives the spatial grid cell size
    pub fn interaction_radius(&self) -> f32 {
        self.flocking
            .neighbor_radius
            .max(self.flocking.separation_radius)
            .max(self.flocking.obstacle_separation_radius)
            .max(1.0)
    }

    // Reject parameter combinations the simulation cannot run with
    pub fn validate(&self) -> SwarmResult<()> {
        fn positive(field: &'static str, value: f32) -> SwarmResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SwarmError::InvalidParam {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                })
            }
        }

        fn unit_interval(field: &'static str, value: f32) -> SwarmResult<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SwarmError::InvalidParam {
                    field,
                    reason: format!("must lie in [0, 1], got {}", value),
                })
            }
        }

        positive("world_width", self.world_width)?;
        positive("world_height", self.world_height)?;
        positive("max_speed", self.max_speed)?;
        positive("max_force", self.max_force)?;
        positive("physics_fps", self.physics_fps)?;
        positive("flocking.neighbor_radius", self.flocking.neighbor_radius)?;
        positive("flocking.separation_radius", self.flocking.separation_radius)?;
        positive("objects.goal_radius", self.objects.goal_radius)?;
        positive("pheromone.cell_size", self.pheromone.cell_size)?;
        positive("pheromone.max_concentration", self.pheromone.max_concentration)?;
        unit_interval("pheromone.evaporation_rate", self.pheromone.evaporation_rate)?;
        unit_interval("pheromone.diffusion_rate", self.pheromone.diffusion_rate)?;

        if self.pheromone.min_concentration < 0.0
            || self.pheromone.min_concentration >= self.pheromone.max_concentration
        {
            return Err(SwarmError::InvalidParam {
                field: "pheromone.min_concentration",
                reason: "must be non-negative and below max_concentration".to_string(),
            });
        }

        if self.colony.enabled && self.num_agents > self.colony.max_agents {
            return Err(SwarmError::InvalidParam {
                field: "num_agents",
                reason: format!("exceeds colony.max_agents ({})", self.colony.max_agents),
            });
        }

        Ok(())
    }

    // Bounded nudges, matching the +/- controls
    pub fn nudge_max_speed(&mut self, increase: bool) {
        if increase {
            self.max_speed += 1.0;
        } else if self.max_speed > 1.0 {
            self.max_speed = (self.max_speed - 1.0).max(1.0);
        }
    }

    pub fn nudge_max_force(&mut self, increase: bool) {
        if increase {
            self.max_force += 0.1;
        } else if self.max_force > 0.1 {
            self.max_force = (self.max_force - 0.1).max(0.1);
        }
    }

    pub fn nudge_neighbor_radius(&mut self, increase: bool) {
        nudge_radius(&mut self.flocking.neighbor_radius, increase);
    }

    pub fn nudge_separation_radius(&mut self, increase: bool) {
        nudge_radius(&mut self.flocking.separation_radius, increase);
    }

    pub fn nudge_obstacle_separation_radius(&mut self, increase: bool) {
        nudge_radius(&mut self.flocking.obstacle_separation_radius, increase);
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    // Check if any parameters have changed since the last snapshot
    // Returns a tuple of (num_agents_changed, any_changed)
    pub fn detect_changes(&self) -> (bool, bool) {
        match &self.previous_values {
            Some(prev) => {
                let current = self.snapshot();
                (current.num_agents != prev.num_agents, current != *prev)
            }
            None => (false, false),
        }
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            num_agents: self.num_agents,
            max_speed: self.max_speed,
            max_force: self.max_force,
            flocking: self.flocking.clone(),
            physics_fps: self.physics_fps,
            pheromone_enabled: self.pheromone.enabled,
            show_fov: self.show_fov,
            show_pheromones: self.show_pheromones,
            show_debug: self.show_debug,
            pause_simulation: self.pause_simulation,
        }
    }

    // Get parameter ranges for UI sliders
    // Largest population the controls may reach; the colony caps it further
    pub fn population_cap(&self) -> usize {
        if self.colony.enabled {
            self.colony.max_agents.min(MAX_AGENTS)
        } else {
            MAX_AGENTS
        }
    }

    pub fn num_agents_range(&self) -> std::ops::RangeInclusive<usize> {
        0..=self.population_cap()
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        1.0..=30.0
    }

    pub fn get_max_force_range() -> std::ops::RangeInclusive<f32> {
        0.01..=3.0
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=3.0
    }

    pub fn get_radius_range() -> std::ops::RangeInclusive<f32> {
        10.0..=400.0
    }

    pub fn get_rate_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }
}

fn nudge_radius(radius: &mut f32, increase: bool) {
    if increase {
        *radius += 10.0;
    } else if *radius > 10.0 {
        *radius = (*radius - 10.0).max(10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_cap_follows_colony() {
        let colony = SimulationParams::for_scenario(Scenario::Colony);
        assert_eq!(colony.num_agents_range(), 0..=colony.colony.max_agents);

        let flocking = SimulationParams::for_scenario(Scenario::Flocking);
        assert_eq!(flocking.population_cap(), MAX_AGENTS);
    }

    #[test]
    fn presets_are_valid() {
        for scenario in [Scenario::Flocking, Scenario::Target, Scenario::Soccer, Scenario::Colony] {
            let params = SimulationParams::for_scenario(scenario);
            assert!(params.validate().is_ok(), "{:?} preset failed validation", scenario);
            assert_eq!(params.scenario, scenario);
        }
    }

    #[test]
    fn target_preset_wraps_and_flocks() {
        let params = SimulationParams::for_scenario(Scenario::Target);
        assert_eq!(params.edge_mode, EdgeMode::Wrap);
        assert_eq!(params.behavior, Behavior::Flock);
        assert_eq!(params.num_agents, 50);
        assert_eq!(params.objects.count, 0);
    }

    #[test]
    fn colony_preset_enables_field_and_economy() {
        let params = SimulationParams::default();
        assert_eq!(params.scenario, Scenario::Colony);
        assert!(params.pheromone.enabled);
        assert!(params.colony.enabled);
        assert_eq!(params.behavior, Behavior::Forage);
    }

    #[test]
    fn nudges_respect_floors() {
        let mut params = SimulationParams::for_scenario(Scenario::Flocking);
        params.max_speed = 1.0;
        params.nudge_max_speed(false);
        assert_eq!(params.max_speed, 1.0);
        params.nudge_max_speed(true);
        assert_eq!(params.max_speed, 2.0);

        params.max_force = 0.1;
        params.nudge_max_force(false);
        assert!((params.max_force - 0.1).abs() < 1e-6);

        params.flocking.separation_radius = 10.0;
        params.nudge_separation_radius(false);
        assert_eq!(params.flocking.separation_radius, 10.0);
        params.nudge_separation_radius(true);
        assert_eq!(params.flocking.separation_radius, 20.0);
    }

    #[test]
    fn validate_rejects_bad_rates() {
        let mut params = SimulationParams::default();
        params.pheromone.evaporation_rate = 1.5;
        match params.validate() {
            Err(SwarmError::InvalidParam { field, .. }) => {
                assert_eq!(field, "pheromone.evaporation_rate")
            }
            other => panic!("expected InvalidParam, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_non_positive_speed() {
        let mut params = SimulationParams::default();
        params.max_speed = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn change_detection_tracks_agent_count() {
        let mut params = SimulationParams::default();
        assert_eq!(params.detect_changes(), (false, false));

        params.take_snapshot();
        assert_eq!(params.detect_changes(), (false, false));

        params.show_fov = !params.show_fov;
        assert_eq!(params.detect_changes(), (false, true));

        params.num_agents += 5;
        assert_eq!(params.detect_changes(), (true, true));
    }
}
