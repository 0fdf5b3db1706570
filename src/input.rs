/*
 * Input Module
 *
 * This module turns keyboard, mouse and panel events into Commands and
 * applies them to the swarm and its parameters.
 *
 * Features:
 * - Keyboard shortcuts for every control
 * - Left click toggles the flock target or grabs a ball to drag
 * - Right click places a block
 * - Clicks over the control panel are left to egui
 */

use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use tracing::{info, warn};

use crate::app::Model;
use crate::error::{SwarmError, SwarmResult};
use crate::params::{Behavior, Scenario, SimulationParams};
use crate::renderer;
use crate::swarm::Swarm;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePause,
    ToggleFov,
    TogglePheromones,
    ToggleDebug,
    AddAgent,
    RemoveAgent,
    Reset,
    LayEgg,
    Hatch,
    SpeedUp,
    SlowDown,
    MoreForce,
    LessForce,
    NeighborRadius(bool),
    SeparationRadius(bool),
    ObstacleRadius(bool),
    SwitchScenario(Scenario),
    ToggleTarget(Point2),
    PlaceBlock(Point2),
}

pub fn command_for_key(key: Key) -> Option<Command> {
    let command = match key {
        Key::Space => Command::TogglePause,
        Key::F => Command::ToggleFov,
        Key::P => Command::TogglePheromones,
        Key::D => Command::ToggleDebug,
        Key::Plus | Key::Equals | Key::NumpadAdd | Key::A => Command::AddAgent,
        Key::Minus | Key::NumpadSubtract => Command::RemoveAgent,
        Key::R => Command::Reset,
        Key::L => Command::LayEgg,
        Key::H => Command::Hatch,
        Key::Up => Command::SpeedUp,
        Key::Down => Command::SlowDown,
        Key::Right => Command::MoreForce,
        Key::Left => Command::LessForce,
        _ => return None,
    };
    Some(command)
}

// Apply a command; colony operations and adding past the population cap can fail
pub fn apply_command(swarm: &mut Swarm, params: &mut SimulationParams, command: Command) -> SwarmResult<()> {
    match command {
        Command::TogglePause => params.pause_simulation = !params.pause_simulation,
        Command::ToggleFov => params.show_fov = !params.show_fov,
        Command::TogglePheromones => params.show_pheromones = !params.show_pheromones,
        Command::ToggleDebug => params.show_debug = !params.show_debug,
        Command::AddAgent => {
            let cap = params.population_cap();
            if swarm.agents.len() >= cap {
                return Err(SwarmError::PopulationCap(cap));
            }
            swarm.add_agent(params);
            params.num_agents = swarm.agents.len();
        }
        Command::RemoveAgent => {
            swarm.remove_agent();
            params.num_agents = swarm.agents.len();
        }
        Command::Reset => swarm.reset(params),
        Command::LayEgg => swarm.lay_egg(params)?,
        Command::Hatch => {
            swarm.hatch(params)?;
            params.num_agents = swarm.agents.len();
        }
        Command::SpeedUp => params.nudge_max_speed(true),
        Command::SlowDown => params.nudge_max_speed(false),
        Command::MoreForce => params.nudge_max_force(true),
        Command::LessForce => params.nudge_max_force(false),
        Command::NeighborRadius(increase) => params.nudge_neighbor_radius(increase),
        Command::SeparationRadius(increase) => params.nudge_separation_radius(increase),
        Command::ObstacleRadius(increase) => params.nudge_obstacle_separation_radius(increase),
        Command::SwitchScenario(scenario) => {
            let seed = params.seed;
            let sprite_path = params.sprite_path.take();
            *params = SimulationParams {
                seed,
                sprite_path,
                ..SimulationParams::for_scenario(scenario)
            };
            info!(scenario = scenario.label(), "switched scenario");
            swarm.reset(params);
        }
        Command::ToggleTarget(position) => swarm.toggle_target(position),
        Command::PlaceBlock(position) => swarm.place_block(position),
    }
    Ok(())
}

// Run a command from a nannou handler, logging refused colony operations
pub fn dispatch(model: &mut Model, command: Command) {
    if let Err(err) = apply_command(&mut model.swarm, &mut model.params, command) {
        warn!(?command, %err, "command refused");
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }
    if let Some(command) = command_for_key(key) {
        dispatch(model, command);
    }
}

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    model.mouse_position = pos;
    let world_pos = renderer::screen_to_world(pos, app.window_rect(), model.swarm.bounds);
    model.swarm.drag_objects(world_pos);
}

// Mouse pressed event handler
pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let world_pos = renderer::screen_to_world(model.mouse_position, app.window_rect(), model.swarm.bounds);
    match button {
        MouseButton::Left => {
            if model.swarm.grab_object(world_pos) {
                return;
            }
            if model.params.behavior == Behavior::Flock {
                dispatch(model, Command::ToggleTarget(world_pos));
            }
        }
        MouseButton::Right => dispatch(model, Command::PlaceBlock(world_pos)),
        _ => {}
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.swarm.release_objects();
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    model.egui.handle_raw_event(event);
}
